//! Visual-pattern plugins and the mode registry.

mod bars;
mod bass_ring;
mod fire;
mod galaxy;
mod helix;
mod kaleidoscope;
mod neon_grid;
mod nova;
mod particles;
mod shockwave;
mod sphere;
mod starfield;
mod surface;
mod trap_nation;
mod tunnel;
mod vortex;

use std::fmt;
use std::str::FromStr;

use beatglow_api::{FrameContext, Visualization};
use clap::ValueEnum;
use nannou::prelude::*;

pub use surface::SourceSurface;

/// Every selectable pattern, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum VisualizationMode {
    Sphere,
    Bars,
    Particles,
    Helix,
    Kaleidoscope,
    Tunnel,
    Vortex,
    #[value(name = "trapnation")]
    TrapNation,
    Shockwave,
    Nova,
    #[value(name = "bassring")]
    BassRing,
    Galaxy,
    #[value(name = "neongrid")]
    NeonGrid,
    Starfield,
    Fire,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 15] = [
        VisualizationMode::Sphere,
        VisualizationMode::Bars,
        VisualizationMode::Particles,
        VisualizationMode::Helix,
        VisualizationMode::Kaleidoscope,
        VisualizationMode::Tunnel,
        VisualizationMode::Vortex,
        VisualizationMode::TrapNation,
        VisualizationMode::Shockwave,
        VisualizationMode::Nova,
        VisualizationMode::BassRing,
        VisualizationMode::Galaxy,
        VisualizationMode::NeonGrid,
        VisualizationMode::Starfield,
        VisualizationMode::Fire,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            VisualizationMode::Sphere => "Sphere",
            VisualizationMode::Bars => "Bars",
            VisualizationMode::Particles => "Particles",
            VisualizationMode::Helix => "Helix",
            VisualizationMode::Kaleidoscope => "Kaleidoscope",
            VisualizationMode::Tunnel => "Tunnel",
            VisualizationMode::Vortex => "Vortex",
            VisualizationMode::TrapNation => "Trap Nation",
            VisualizationMode::Shockwave => "Shockwave",
            VisualizationMode::Nova => "Nova",
            VisualizationMode::BassRing => "Bass Ring",
            VisualizationMode::Galaxy => "Galaxy",
            VisualizationMode::NeonGrid => "Neon Grid",
            VisualizationMode::Starfield => "Starfield",
            VisualizationMode::Fire => "Fire",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn create(self) -> Box<dyn Visualization> {
        match self {
            VisualizationMode::Sphere => Box::<sphere::Sphere>::default(),
            VisualizationMode::Bars => Box::<bars::Bars>::default(),
            VisualizationMode::Particles => Box::<particles::Particles>::default(),
            VisualizationMode::Helix => Box::<helix::Helix>::default(),
            VisualizationMode::Kaleidoscope => Box::new(kaleidoscope::Kaleidoscope),
            VisualizationMode::Tunnel => Box::new(tunnel::Tunnel),
            VisualizationMode::Vortex => Box::new(vortex::Vortex),
            VisualizationMode::TrapNation => Box::new(trap_nation::TrapNation),
            VisualizationMode::Shockwave => Box::<shockwave::Shockwave>::default(),
            VisualizationMode::Nova => Box::new(nova::Nova),
            VisualizationMode::BassRing => Box::new(bass_ring::BassRing),
            VisualizationMode::Galaxy => Box::<galaxy::Galaxy>::default(),
            VisualizationMode::NeonGrid => Box::new(neon_grid::NeonGrid),
            VisualizationMode::Starfield => Box::<starfield::Starfield>::default(),
            VisualizationMode::Fire => Box::<fire::Fire>::default(),
        }
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VisualizationMode {
    type Err = String;

    /// Accepts the CLI ids (`trapnation`, `bassring`, ...), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true)
    }
}

/// One live plugin per mode. Plugins keep their state while other modes are
/// shown.
pub struct Registry {
    plugins: Vec<Box<dyn Visualization>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            plugins: VisualizationMode::ALL.iter().map(|m| m.create()).collect(),
        }
    }
}

impl Registry {
    pub fn draw(&mut self, mode: VisualizationMode, ctx: &FrameContext) {
        self.plugins[mode.index()].draw(ctx);
    }

    pub fn reset(&mut self, mode: VisualizationMode) {
        self.plugins[mode.index()].reset();
    }

    pub fn plugin_name(&self, mode: VisualizationMode) -> &'static str {
        self.plugins[mode.index()].name()
    }
}

/// Approximate a radial gradient with stacked translucent discs. The center
/// accumulates roughly `color`'s alpha; the edge fades to nothing.
pub(crate) fn radial_glow(draw: &Draw, center: Vec2, radius: f32, color: Rgba, layers: usize) {
    if radius <= 0.0 || layers == 0 {
        return;
    }
    let alpha = color.alpha / layers as f32;
    for layer in 0..layers {
        let r = radius * (1.0 - layer as f32 / layers as f32);
        draw.ellipse()
            .xy(center)
            .radius(r)
            .color(rgba(color.red, color.green, color.blue, alpha));
    }
}

/// Palette entry as a nannou color.
pub(crate) fn tint(rgb: [u8; 3], alpha: f32) -> Rgba {
    rgba(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha,
    )
}

/// Frequency bin for position `t` in `[0, 1)` of a `len`-bin spectrum.
pub(crate) fn bin_at(t: f32, len: usize) -> usize {
    ((t * len as f32) as usize).min(len.saturating_sub(1))
}
