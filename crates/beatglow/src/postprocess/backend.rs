//! Handle-based seam between the pass graph and a concrete GPU API.

use crate::error::PostResult;

use super::uniforms::{BlurUniforms, CombineUniforms, FinalUniforms, ThresholdUniforms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// The shader programs the pipeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    Passthrough,
    Threshold,
    Blur,
    Combine,
    Final,
}

impl ShaderPass {
    pub const ALL: [ShaderPass; 5] = [
        ShaderPass::Passthrough,
        ShaderPass::Threshold,
        ShaderPass::Blur,
        ShaderPass::Combine,
        ShaderPass::Final,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShaderPass::Passthrough => "passthrough",
            ShaderPass::Threshold => "threshold",
            ShaderPass::Blur => "blur",
            ShaderPass::Combine => "combine",
            ShaderPass::Final => "final",
        }
    }

    /// Number of textures the pass samples.
    pub fn input_count(&self) -> usize {
        match self {
            ShaderPass::Combine => 2,
            _ => 1,
        }
    }

    pub fn has_uniforms(&self) -> bool {
        !matches!(self, ShaderPass::Passthrough)
    }

    /// Whether the pass writes to the visible target rather than offscreen.
    pub fn presents(&self) -> bool {
        matches!(self, ShaderPass::Final)
    }
}

/// A texture a pass samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassInput {
    Texture(TextureId),
    Framebuffer(FramebufferId),
}

/// Where a pass writes.
#[derive(Debug)]
pub enum RenderTarget<'a, T: ?Sized> {
    Framebuffer(FramebufferId),
    /// The visible output, cleared to transparent first
    Screen(&'a T),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassUniforms {
    None,
    Threshold(ThresholdUniforms),
    Blur(BlurUniforms),
    Combine(CombineUniforms),
    Final(FinalUniforms),
}

impl PassUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PassUniforms::None => &[],
            PassUniforms::Threshold(u) => bytemuck::bytes_of(u),
            PassUniforms::Blur(u) => bytemuck::bytes_of(u),
            PassUniforms::Combine(u) => bytemuck::bytes_of(u),
            PassUniforms::Final(u) => bytemuck::bytes_of(u),
        }
    }
}

/// One fullscreen-quad draw.
pub struct DrawPass<'a, T: ?Sized> {
    pub program: ProgramId,
    pub quad: BufferId,
    pub inputs: &'a [PassInput],
    pub target: RenderTarget<'a, T>,
    pub uniforms: PassUniforms,
}

/// GPU operations the post-processor needs. Resources are addressed by
/// handle; deleting an unknown handle is a no-op.
pub trait GpuBackend {
    /// The 2D drawing surface uploaded each frame
    type Source: ?Sized;
    /// The visible output
    type Target: ?Sized;

    /// Compile and link one pass. Failure means the pipeline is unsupported.
    fn create_program(&mut self, pass: ShaderPass) -> PostResult<ProgramId>;
    fn delete_program(&mut self, id: ProgramId);

    /// Vertex buffer holding a fullscreen quad.
    fn create_quad(&mut self) -> PostResult<BufferId>;
    fn delete_buffer(&mut self, id: BufferId);

    /// Texture that receives the uploaded source surface.
    fn create_texture(&mut self, size: [u32; 2]) -> PostResult<TextureId>;
    fn delete_texture(&mut self, id: TextureId);

    /// Render target with its own color texture.
    fn create_framebuffer(&mut self, size: [u32; 2]) -> PostResult<FramebufferId>;
    fn delete_framebuffer(&mut self, id: FramebufferId);

    fn begin_frame(&mut self);

    /// Copy `source` into `texture` through the passthrough `program`.
    fn upload_source(
        &mut self,
        program: ProgramId,
        quad: BufferId,
        source: &Self::Source,
        texture: TextureId,
    ) -> PostResult<()>;

    fn draw(&mut self, pass: DrawPass<'_, Self::Target>) -> PostResult<()>;

    /// Submit everything recorded since `begin_frame`.
    fn end_frame(&mut self);
}
