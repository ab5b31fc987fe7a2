//! Effect toggles, tuning, and the store that broadcasts their changes.

use tracing::debug;

/// Upper bound on blur iterations per frame
pub const MAX_BLOOM_RADIUS: u32 = 16;
pub const MAX_BLOOM_INTENSITY: f32 = 2.0;

/// An individually toggleable post effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Bloom,
    Chromatic,
    Vignette,
    Grain,
    ColorGrade,
    AudioReactive,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::Bloom,
        Effect::Chromatic,
        Effect::Vignette,
        Effect::Grain,
        Effect::ColorGrade,
        Effect::AudioReactive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Bloom => "Bloom",
            Effect::Chromatic => "Chromatic",
            Effect::Vignette => "Vignette",
            Effect::Grain => "Grain",
            Effect::ColorGrade => "Color grade",
            Effect::AudioReactive => "Audio reactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectToggles {
    /// Master switch; off means the unprocessed surface is shown
    pub enabled: bool,
    pub bloom: bool,
    pub chromatic: bool,
    pub vignette: bool,
    pub grain: bool,
    pub color_grade: bool,
    /// Let bass modulate bloom, aberration and vignette
    pub audio_reactive: bool,
}

impl Default for EffectToggles {
    fn default() -> Self {
        Self {
            enabled: true,
            bloom: true,
            chromatic: true,
            vignette: true,
            grain: true,
            color_grade: true,
            audio_reactive: true,
        }
    }
}

impl EffectToggles {
    pub fn get(&self, effect: Effect) -> bool {
        *self.slot(effect)
    }

    fn slot(&self, effect: Effect) -> &bool {
        match effect {
            Effect::Bloom => &self.bloom,
            Effect::Chromatic => &self.chromatic,
            Effect::Vignette => &self.vignette,
            Effect::Grain => &self.grain,
            Effect::ColorGrade => &self.color_grade,
            Effect::AudioReactive => &self.audio_reactive,
        }
    }

    fn slot_mut(&mut self, effect: Effect) -> &mut bool {
        match effect {
            Effect::Bloom => &mut self.bloom,
            Effect::Chromatic => &mut self.chromatic,
            Effect::Vignette => &mut self.vignette,
            Effect::Grain => &mut self.grain,
            Effect::ColorGrade => &mut self.color_grade,
            Effect::AudioReactive => &mut self.audio_reactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsTuning {
    pub bloom_threshold: f32,
    pub bloom_intensity: f32,
    /// Horizontal + vertical blur iterations
    pub bloom_radius: u32,
    pub chromatic_strength: f32,
    pub vignette_strength: f32,
    pub grain_strength: f32,
    pub saturation: f32,
    pub contrast: f32,
}

impl Default for EffectsTuning {
    fn default() -> Self {
        Self {
            bloom_threshold: 0.6,
            bloom_intensity: 0.8,
            bloom_radius: 4,
            chromatic_strength: 0.003,
            vignette_strength: 0.4,
            grain_strength: 0.08,
            saturation: 1.15,
            contrast: 1.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectsConfig {
    pub toggles: EffectToggles,
    pub tuning: EffectsTuning,
}

impl EffectsConfig {
    /// Bloom mix strength for this frame; bass pushes it up to 1.5x.
    pub fn bloom_intensity(&self, bass: f32) -> f32 {
        if self.toggles.audio_reactive {
            self.tuning.bloom_intensity * (1.0 + bass * 0.5)
        } else {
            self.tuning.bloom_intensity
        }
    }
}

type Listener = Box<dyn FnMut(&EffectsConfig)>;

/// Owner of the authoritative [`EffectsConfig`].
///
/// Every mutation is pushed to all listeners, in subscription order.
#[derive(Default)]
pub struct FxStore {
    config: EffectsConfig,
    listeners: Vec<Listener>,
}

impl FxStore {
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    /// Register a listener. It is called once right away with the current value.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&EffectsConfig) + 'static) {
        listener(&self.config);
        self.listeners.push(Box::new(listener));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.toggles.enabled = enabled;
        self.notify();
    }

    /// Flip the master switch, returning the new state.
    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = !self.config.toggles.enabled;
        self.set_enabled(enabled);
        enabled
    }

    /// Flip one effect, returning its new state.
    pub fn toggle(&mut self, effect: Effect) -> bool {
        let slot = self.config.toggles.slot_mut(effect);
        *slot = !*slot;
        let state = *slot;
        self.notify();
        state
    }

    /// Partially update the numeric tuning.
    pub fn update_tuning(&mut self, update: impl FnOnce(&mut EffectsTuning)) {
        update(&mut self.config.tuning);
        self.notify();
    }

    /// Step the bloom mix strength, keeping it in `0..=MAX_BLOOM_INTENSITY`.
    /// Returns the new strength.
    pub fn adjust_bloom_intensity(&mut self, step: f32) -> f32 {
        self.update_tuning(|t| {
            t.bloom_intensity = (t.bloom_intensity + step).clamp(0.0, MAX_BLOOM_INTENSITY);
        });
        self.config().tuning.bloom_intensity
    }

    fn notify(&mut self) {
        debug!("Effects changed: {:?}", self.config.toggles);
        for listener in &mut self.listeners {
            listener(&self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults_all_on() {
        let config = EffectsConfig::default();
        assert!(config.toggles.enabled);
        assert!(Effect::ALL.iter().all(|e| config.toggles.get(*e)));
        assert_eq!(config.tuning.bloom_radius, 4);
        assert_eq!(config.tuning.chromatic_strength, 0.003);
    }

    #[test]
    fn test_audio_reactive_bloom_intensity() {
        let mut config = EffectsConfig::default();
        assert!((config.bloom_intensity(1.0) - 1.2).abs() < 1e-6);
        assert!((config.bloom_intensity(0.0) - 0.8).abs() < 1e-6);
        config.toggles.audio_reactive = false;
        assert!((config.bloom_intensity(1.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_listeners_see_every_change() {
        let seen: Rc<RefCell<Vec<EffectsConfig>>> = Rc::default();
        let mut store = FxStore::default();
        {
            let seen = Rc::clone(&seen);
            store.subscribe(move |config| seen.borrow_mut().push(*config));
        }
        assert_eq!(seen.borrow().len(), 1);

        assert!(!store.toggle(Effect::Grain));
        assert!(!store.toggle_enabled());
        store.update_tuning(|t| t.bloom_radius = 2);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert!(!seen[1].toggles.grain);
        assert!(!seen[2].toggles.enabled);
        assert_eq!(seen[3].tuning.bloom_radius, 2);
        assert_eq!(seen[3].tuning.saturation, 1.15);
    }

    #[test]
    fn test_bloom_intensity_steps_are_clamped() {
        let mut store = FxStore::default();
        assert!((store.adjust_bloom_intensity(0.1) - 0.9).abs() < 1e-6);
        for _ in 0..30 {
            store.adjust_bloom_intensity(0.1);
        }
        assert_eq!(store.config().tuning.bloom_intensity, MAX_BLOOM_INTENSITY);
        for _ in 0..30 {
            store.adjust_bloom_intensity(-0.1);
        }
        assert_eq!(store.adjust_bloom_intensity(-0.1), 0.0);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let mut store = FxStore::default();
        for effect in Effect::ALL {
            assert!(!store.toggle(effect));
            assert!(store.toggle(effect));
        }
        assert_eq!(*store.config(), EffectsConfig::default());
    }
}
