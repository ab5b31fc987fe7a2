//! Multi-pass post-processing: bloom extraction, separable blur, combine, and
//! a final composite (chromatic aberration, color grade, vignette, grain).
//!
//! [`PostProcessor`] owns the pass graph and the framebuffer pools; the GPU
//! work goes through a [`GpuBackend`].

mod backend;
mod effects;
mod shaders;
mod uniforms;
mod wgpu_backend;

#[cfg(test)]
mod recording;

pub use backend::GpuBackend;
pub use effects::{
    Effect, EffectToggles, EffectsConfig, EffectsTuning, FxStore, MAX_BLOOM_RADIUS,
};
pub use wgpu_backend::{WgpuBackend, OFFSCREEN_FORMAT};

use backend::{
    BufferId, DrawPass, FramebufferId, PassInput, PassUniforms, ProgramId, RenderTarget,
    ShaderPass, TextureId,
};
use tracing::{debug, info, warn};
use uniforms::{BlurUniforms, CombineUniforms, FinalUniforms, ThresholdUniforms};

use crate::error::PostResult;

/// Ping-pong pair
const POOL_SIZE: usize = 2;

struct Programs {
    passthrough: ProgramId,
    threshold: ProgramId,
    blur: ProgramId,
    combine: ProgramId,
    final_pass: ProgramId,
}

impl Programs {
    fn ids(&self) -> [ProgramId; 5] {
        [
            self.passthrough,
            self.threshold,
            self.blur,
            self.combine,
            self.final_pass,
        ]
    }
}

/// GPU resources, alive between `init` and `destroy`.
struct Resources {
    programs: Programs,
    quad: BufferId,
    source: Option<TextureId>,
    full: Vec<FramebufferId>,
    half: Vec<FramebufferId>,
}

fn half_size(size: [u32; 2]) -> [u32; 2] {
    [(size[0] / 2).max(1), (size[1] / 2).max(1)]
}

pub struct PostProcessor<B: GpuBackend> {
    backend: B,
    effects: EffectsConfig,
    supported: bool,
    resources: Option<Resources>,
    size: [u32; 2],
    opacity: f32,
}

impl<B: GpuBackend> PostProcessor<B> {
    pub fn new(backend: B, effects: EffectsConfig) -> Self {
        Self {
            backend,
            effects,
            supported: false,
            resources: None,
            size: [0, 0],
            opacity: 0.0,
        }
    }

    /// Compile every pass and allocate resources for a `size` viewport.
    ///
    /// Returns false when a shader fails; the processor then stays inert and
    /// the caller should present the unprocessed surface.
    pub fn init(&mut self, size: [u32; 2]) -> bool {
        self.destroy();

        let programs = match self.create_programs() {
            Ok(programs) => programs,
            Err(e) => {
                warn!("Post-processing unavailable: {}", e);
                self.supported = false;
                return false;
            }
        };

        let quad = match self.backend.create_quad() {
            Ok(quad) => quad,
            Err(e) => {
                warn!("Post-processing unavailable: {}", e);
                for id in programs.ids() {
                    self.backend.delete_program(id);
                }
                self.supported = false;
                return false;
            }
        };

        self.resources = Some(Resources {
            programs,
            quad,
            source: None,
            full: Vec::new(),
            half: Vec::new(),
        });
        self.supported = true;
        self.resize(size);
        info!("Post-processing ready at {}x{}", size[0], size[1]);
        true
    }

    fn create_programs(&mut self) -> PostResult<Programs> {
        let mut created = Vec::with_capacity(ShaderPass::ALL.len());
        for pass in ShaderPass::ALL {
            match self.backend.create_program(pass) {
                Ok(id) => created.push(id),
                Err(e) => {
                    for id in created {
                        self.backend.delete_program(id);
                    }
                    return Err(e);
                }
            }
        }
        Ok(Programs {
            passthrough: created[0],
            threshold: created[1],
            blur: created[2],
            combine: created[3],
            final_pass: created[4],
        })
    }

    /// Rebuild the source texture and both framebuffer pools at `size`.
    pub fn resize(&mut self, size: [u32; 2]) {
        self.size = size;
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        let backend = &mut self.backend;

        if let Some(source) = resources.source.take() {
            backend.delete_texture(source);
        }
        for id in resources.full.drain(..).chain(resources.half.drain(..)) {
            backend.delete_framebuffer(id);
        }

        match backend.create_texture(size) {
            Ok(id) => resources.source = Some(id),
            Err(e) => warn!("No source texture at {}x{}: {}", size[0], size[1], e),
        }
        resources.full = create_pool(backend, size);
        resources.half = create_pool(backend, half_size(size));
        debug!(
            "Post pools: {} full, {} half at {:?}",
            resources.full.len(),
            resources.half.len(),
            half_size(size)
        );
    }

    /// Run one pass sequence from `source` into `target`.
    ///
    /// Returns true when `target` now holds the processed frame. False means
    /// no GPU work was done this frame.
    pub fn render(
        &mut self,
        source: &B::Source,
        target: &B::Target,
        time_ms: f64,
        bass: f32,
    ) -> bool {
        let effects = self.effects;
        let active = effects.toggles.enabled && self.supported;
        self.opacity = if active { 1.0 } else { 0.0 };
        if !active {
            return false;
        }
        let Some(resources) = self.resources.as_ref() else {
            return false;
        };
        let Some(source_texture) = resources.source else {
            return false;
        };

        self.backend.begin_frame();
        let result = encode_passes(
            &mut self.backend,
            resources,
            source_texture,
            source,
            target,
            &effects,
            self.size,
            time_ms,
            bass,
        );
        self.backend.end_frame();

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Post-processing frame dropped: {}", e);
                false
            }
        }
    }

    /// Release every GPU resource. Safe to call more than once.
    pub fn destroy(&mut self) {
        let Some(resources) = self.resources.take() else {
            return;
        };
        for id in resources.full.into_iter().chain(resources.half) {
            self.backend.delete_framebuffer(id);
        }
        if let Some(source) = resources.source {
            self.backend.delete_texture(source);
        }
        self.backend.delete_buffer(resources.quad);
        for id in resources.programs.ids() {
            self.backend.delete_program(id);
        }
        self.supported = false;
        debug!("Post-processing resources released");
    }

    pub fn apply_effects(&mut self, effects: &EffectsConfig) {
        self.effects = *effects;
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// 1 while processed output is shown, 0 when the raw surface is.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[cfg(test)]
    fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: GpuBackend> Drop for PostProcessor<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Allocate a full pool or nothing.
fn create_pool<B: GpuBackend>(backend: &mut B, size: [u32; 2]) -> Vec<FramebufferId> {
    let mut pool = Vec::with_capacity(POOL_SIZE);
    for _ in 0..POOL_SIZE {
        match backend.create_framebuffer(size) {
            Ok(id) => pool.push(id),
            Err(e) => {
                warn!("Framebuffer pool at {}x{} unavailable: {}", size[0], size[1], e);
                for id in pool.drain(..) {
                    backend.delete_framebuffer(id);
                }
                break;
            }
        }
    }
    pool
}

#[allow(clippy::too_many_arguments)]
fn encode_passes<B: GpuBackend>(
    backend: &mut B,
    resources: &Resources,
    source_texture: TextureId,
    source: &B::Source,
    target: &B::Target,
    effects: &EffectsConfig,
    size: [u32; 2],
    time_ms: f64,
    bass: f32,
) -> PostResult<()> {
    let programs = &resources.programs;
    let quad = resources.quad;

    backend.upload_source(programs.passthrough, quad, source, source_texture)?;
    let mut scene = PassInput::Texture(source_texture);

    let bloom_ready = resources.full.len() >= POOL_SIZE && resources.half.len() >= POOL_SIZE;
    if effects.toggles.bloom && bloom_ready {
        let half = half_size(size);
        let (half_a, half_b) = (resources.half[0], resources.half[1]);

        backend.draw(DrawPass {
            program: programs.threshold,
            quad,
            inputs: &[scene],
            target: RenderTarget::Framebuffer(half_a),
            uniforms: PassUniforms::Threshold(ThresholdUniforms::new(
                effects.tuning.bloom_threshold,
            )),
        })?;

        for _ in 0..effects.tuning.bloom_radius.min(MAX_BLOOM_RADIUS) {
            backend.draw(DrawPass {
                program: programs.blur,
                quad,
                inputs: &[PassInput::Framebuffer(half_a)],
                target: RenderTarget::Framebuffer(half_b),
                uniforms: PassUniforms::Blur(BlurUniforms::horizontal(half)),
            })?;
            backend.draw(DrawPass {
                program: programs.blur,
                quad,
                inputs: &[PassInput::Framebuffer(half_b)],
                target: RenderTarget::Framebuffer(half_a),
                uniforms: PassUniforms::Blur(BlurUniforms::vertical(half)),
            })?;
        }

        let combined = resources.full[0];
        backend.draw(DrawPass {
            program: programs.combine,
            quad,
            inputs: &[scene, PassInput::Framebuffer(half_a)],
            target: RenderTarget::Framebuffer(combined),
            uniforms: PassUniforms::Combine(CombineUniforms::new(effects.bloom_intensity(bass))),
        })?;
        scene = PassInput::Framebuffer(combined);
    }

    backend.draw(DrawPass {
        program: programs.final_pass,
        quad,
        inputs: &[scene],
        target: RenderTarget::Screen(target),
        uniforms: PassUniforms::Final(FinalUniforms::new(effects, time_ms, bass, size)),
    })
}
