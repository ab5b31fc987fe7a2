//! Test backend that records every call instead of touching a GPU.

use std::collections::{HashMap, HashSet};

use super::backend::{
    BufferId, DrawPass, FramebufferId, GpuBackend, PassInput, PassUniforms, ProgramId,
    RenderTarget, ShaderPass, TextureId,
};
use crate::error::{PostError, PostResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateProgram(ShaderPass),
    DeleteProgram(ProgramId),
    CreateQuad,
    DeleteBuffer(BufferId),
    CreateTexture([u32; 2]),
    DeleteTexture(TextureId),
    CreateFramebuffer([u32; 2]),
    DeleteFramebuffer(FramebufferId),
    BeginFrame,
    Upload(TextureId),
    Draw {
        pass: ShaderPass,
        inputs: Vec<PassInput>,
        target: Option<FramebufferId>,
        uniforms: PassUniforms,
    },
    EndFrame,
}

#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    /// Compilation of this pass fails
    pub fail_pass: Option<ShaderPass>,
    /// Framebuffer creation fails once this many have been created
    pub framebuffer_limit: Option<usize>,

    next_id: u32,
    in_frame: bool,
    framebuffers_created: usize,
    programs: HashMap<u32, ShaderPass>,
    buffers: HashSet<u32>,
    textures: HashSet<u32>,
    framebuffers: HashMap<u32, [u32; 2]>,
    pub created: usize,
    pub deleted: usize,
}

impl RecordingBackend {
    pub fn failing(pass: ShaderPass) -> Self {
        Self {
            fail_pass: Some(pass),
            ..Self::default()
        }
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.created += 1;
        self.next_id
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Live framebuffer sizes, sorted.
    pub fn live_framebuffers(&self) -> Vec<[u32; 2]> {
        let mut sizes: Vec<_> = self.framebuffers.values().copied().collect();
        sizes.sort();
        sizes
    }

    pub fn draws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .collect()
    }

    pub fn count_draws(&self, pass: ShaderPass) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw { pass: p, .. } if *p == pass))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl GpuBackend for RecordingBackend {
    type Source = ();
    type Target = ();

    fn create_program(&mut self, pass: ShaderPass) -> PostResult<ProgramId> {
        self.calls.push(Call::CreateProgram(pass));
        if self.fail_pass == Some(pass) {
            return Err(PostError::ShaderCompile {
                pass: pass.name(),
                message: "rejected by test".to_string(),
            });
        }
        let id = self.allocate_id();
        self.programs.insert(id, pass);
        Ok(ProgramId(id))
    }

    fn delete_program(&mut self, id: ProgramId) {
        self.calls.push(Call::DeleteProgram(id));
        if self.programs.remove(&id.0).is_some() {
            self.deleted += 1;
        }
    }

    fn create_quad(&mut self) -> PostResult<BufferId> {
        self.calls.push(Call::CreateQuad);
        let id = self.allocate_id();
        self.buffers.insert(id);
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, id: BufferId) {
        self.calls.push(Call::DeleteBuffer(id));
        if self.buffers.remove(&id.0) {
            self.deleted += 1;
        }
    }

    fn create_texture(&mut self, size: [u32; 2]) -> PostResult<TextureId> {
        self.calls.push(Call::CreateTexture(size));
        if size[0] == 0 || size[1] == 0 {
            return Err(PostError::ResourceCreation("source texture"));
        }
        let id = self.allocate_id();
        self.textures.insert(id);
        Ok(TextureId(id))
    }

    fn delete_texture(&mut self, id: TextureId) {
        self.calls.push(Call::DeleteTexture(id));
        if self.textures.remove(&id.0) {
            self.deleted += 1;
        }
    }

    fn create_framebuffer(&mut self, size: [u32; 2]) -> PostResult<FramebufferId> {
        self.calls.push(Call::CreateFramebuffer(size));
        let over_limit = self
            .framebuffer_limit
            .is_some_and(|limit| self.framebuffers_created >= limit);
        if over_limit || size[0] == 0 || size[1] == 0 {
            return Err(PostError::ResourceCreation("framebuffer"));
        }
        self.framebuffers_created += 1;
        let id = self.allocate_id();
        self.framebuffers.insert(id, size);
        Ok(FramebufferId(id))
    }

    fn delete_framebuffer(&mut self, id: FramebufferId) {
        self.calls.push(Call::DeleteFramebuffer(id));
        if self.framebuffers.remove(&id.0).is_some() {
            self.deleted += 1;
        }
    }

    fn begin_frame(&mut self) {
        self.calls.push(Call::BeginFrame);
        self.in_frame = true;
    }

    fn upload_source(
        &mut self,
        program: ProgramId,
        quad: BufferId,
        _source: &(),
        texture: TextureId,
    ) -> PostResult<()> {
        if !self.in_frame {
            return Err(PostError::NoFrame);
        }
        if self.programs.get(&program.0) != Some(&ShaderPass::Passthrough) {
            return Err(PostError::UnknownHandle {
                kind: "program",
                id: program.0,
            });
        }
        if !self.buffers.contains(&quad.0) || !self.textures.contains(&texture.0) {
            return Err(PostError::UnknownHandle {
                kind: "texture",
                id: texture.0,
            });
        }
        self.calls.push(Call::Upload(texture));
        Ok(())
    }

    fn draw(&mut self, pass: DrawPass<'_, ()>) -> PostResult<()> {
        if !self.in_frame {
            return Err(PostError::NoFrame);
        }
        let shader = *self
            .programs
            .get(&pass.program.0)
            .ok_or(PostError::UnknownHandle {
                kind: "program",
                id: pass.program.0,
            })?;
        if pass.inputs.len() != shader.input_count() {
            return Err(PostError::UnknownHandle {
                kind: "input",
                id: pass.inputs.len() as u32,
            });
        }
        for input in pass.inputs {
            let known = match input {
                PassInput::Texture(id) => self.textures.contains(&id.0),
                PassInput::Framebuffer(id) => self.framebuffers.contains_key(&id.0),
            };
            if !known {
                return Err(PostError::UnknownHandle {
                    kind: "input",
                    id: 0,
                });
            }
        }
        let target = match pass.target {
            RenderTarget::Framebuffer(id) => Some(id),
            RenderTarget::Screen(_) => None,
        };
        self.calls.push(Call::Draw {
            pass: shader,
            inputs: pass.inputs.to_vec(),
            target,
            uniforms: pass.uniforms,
        });
        Ok(())
    }

    fn end_frame(&mut self) {
        self.calls.push(Call::EndFrame);
        self.in_frame = false;
    }
}
