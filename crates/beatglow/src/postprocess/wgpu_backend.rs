//! [`GpuBackend`] on top of nannou's wgpu device.
//!
//! One command encoder is recorded per frame, between `begin_frame` and
//! `end_frame`. Each pass clears its target, binds its inputs and the
//! shared linear sampler, and draws the fullscreen quad.

use std::collections::HashMap;
use std::sync::Arc;

use nannou::prelude::*;
use nannou::wgpu;

use super::backend::{
    BufferId, DrawPass, FramebufferId, GpuBackend, PassInput, ProgramId, RenderTarget,
    ShaderPass, TextureId,
};
use super::shaders;
use crate::error::{PostError, PostResult};

/// Format of every offscreen texture. Not sRGB: the passes read and write
/// the encoded values as they are, and only the final pass decodes them.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    tex_coords: [f32; 2],
}

// Clip-space y points up while texture v points down, so the bottom-left
// corner samples (0, 1). The image keeps its orientation.
const FULLSCREEN_QUAD: [QuadVertex; 6] = [
    QuadVertex {
        position: [-1.0, -1.0],
        tex_coords: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        tex_coords: [1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        tex_coords: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, -1.0],
        tex_coords: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        tex_coords: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        tex_coords: [0.0, 0.0],
    },
];

struct Program {
    pass: ShaderPass,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

struct RenderTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// A view named by handle, or one owned by the caller.
#[derive(Clone, Copy)]
enum View<'a> {
    Texture(u32),
    Framebuffer(u32),
    External(&'a wgpu::TextureView),
}

pub struct WgpuBackend {
    device: Arc<wgpu::DeviceQueuePair>,
    screen_format: wgpu::TextureFormat,
    screen_samples: u32,
    sampler: wgpu::Sampler,

    next_id: u32,
    programs: HashMap<u32, Program>,
    buffers: HashMap<u32, wgpu::Buffer>,
    textures: HashMap<u32, RenderTexture>,
    framebuffers: HashMap<u32, RenderTexture>,

    encoder: Option<wgpu::CommandEncoder>,
    // Bind groups and uniform buffers referenced by the open encoder
    frame_resources: Vec<(wgpu::BindGroup, Option<wgpu::Buffer>)>,
}

impl WgpuBackend {
    /// `screen_format` and `screen_samples` describe the texture the final
    /// pass writes into (the window frame).
    pub fn new(
        device: Arc<wgpu::DeviceQueuePair>,
        screen_format: wgpu::TextureFormat,
        screen_samples: u32,
    ) -> Self {
        let sampler_desc = wgpu::SamplerBuilder::new()
            .mag_filter(wgpu::FilterMode::Linear)
            .min_filter(wgpu::FilterMode::Linear)
            .address_mode(wgpu::AddressMode::ClampToEdge)
            .into_descriptor();
        let sampler = device.device().create_sampler(&sampler_desc);

        Self {
            device,
            screen_format,
            screen_samples,
            sampler,
            next_id: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            encoder: None,
            frame_resources: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn create_render_texture(
        &self,
        size: [u32; 2],
        what: &'static str,
    ) -> PostResult<RenderTexture> {
        if size[0] == 0 || size[1] == 0 {
            return Err(PostError::ResourceCreation(what));
        }
        let texture = wgpu::TextureBuilder::new()
            .size(size)
            .usage(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING)
            .sample_count(1)
            .format(OFFSCREEN_FORMAT)
            .build(self.device.device());
        let view = texture.view().build();
        Ok(RenderTexture {
            _texture: texture,
            view,
        })
    }

    /// Record one fullscreen-quad pass into the open encoder.
    fn encode(
        &mut self,
        program_id: ProgramId,
        quad_id: BufferId,
        inputs: &[View<'_>],
        target: View<'_>,
        uniforms: &[u8],
    ) -> PostResult<()> {
        let Self {
            device,
            sampler,
            programs,
            buffers,
            textures,
            framebuffers,
            encoder,
            frame_resources,
            ..
        } = self;

        let program = programs.get(&program_id.0).ok_or(PostError::UnknownHandle {
            kind: "program",
            id: program_id.0,
        })?;
        let quad = buffers.get(&quad_id.0).ok_or(PostError::UnknownHandle {
            kind: "buffer",
            id: quad_id.0,
        })?;
        let encoder = encoder.as_mut().ok_or(PostError::NoFrame)?;
        let device = device.device();

        let inputs = inputs
            .iter()
            .map(|view| resolve(textures, framebuffers, *view))
            .collect::<PostResult<Vec<_>>>()?;
        let target = resolve(textures, framebuffers, target)?;

        let uniform_buffer = program.pass.has_uniforms().then(|| {
            device.create_buffer_init(&wgpu::BufferInitDescriptor {
                label: Some("Post Uniforms"),
                contents: uniforms,
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });

        let mut entries: Vec<wgpu::BindGroupEntry> = inputs
            .iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: inputs.len() as u32,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        if let Some(buffer) = &uniform_buffer {
            entries.push(wgpu::BindGroupEntry {
                binding: inputs.len() as u32 + 1,
                resource: buffer.as_entire_binding(),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Post Bind Group"),
            layout: &program.bind_group_layout,
            entries: &entries,
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(program.pass.name()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.set_vertex_buffer(0, quad.slice(..));
            render_pass.draw(0..6, 0..1);
        }

        frame_resources.push((bind_group, uniform_buffer));
        Ok(())
    }
}

fn resolve<'a>(
    textures: &'a HashMap<u32, RenderTexture>,
    framebuffers: &'a HashMap<u32, RenderTexture>,
    view: View<'a>,
) -> PostResult<&'a wgpu::TextureView> {
    match view {
        View::Texture(id) => lookup(textures, "texture", id),
        View::Framebuffer(id) => lookup(framebuffers, "framebuffer", id),
        View::External(view) => Ok(view),
    }
}

fn lookup<'a>(
    map: &'a HashMap<u32, RenderTexture>,
    kind: &'static str,
    id: u32,
) -> PostResult<&'a wgpu::TextureView> {
    map.get(&id)
        .map(|t| &t.view)
        .ok_or(PostError::UnknownHandle { kind, id })
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Textures first, then the sampler, then the uniform block if any.
fn layout_entries(pass: ShaderPass) -> Vec<wgpu::BindGroupLayoutEntry> {
    let inputs = pass.input_count() as u32;
    let mut entries: Vec<_> = (0..inputs).map(texture_entry).collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: inputs,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu_types::SamplerBindingType::Filtering),
        count: None,
    });
    if pass.has_uniforms() {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: inputs + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }
    entries
}

impl GpuBackend for WgpuBackend {
    type Source = wgpu::TextureView;
    type Target = wgpu::TextureView;

    fn create_program(&mut self, pass: ShaderPass) -> PostResult<ProgramId> {
        shaders::validate(pass)?;

        let device = self.device.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(pass.name()),
            source: wgpu::ShaderSource::Wgsl(shaders::source(pass).into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(pass.name()),
            entries: &layout_entries(pass),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(pass.name()),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let (format, samples) = if pass.presents() {
            (self.screen_format, self.screen_samples)
        } else {
            (OFFSCREEN_FORMAT, 1)
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(pass.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: shaders::VERTEX_ENTRY,
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: shaders::FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: samples,
                ..Default::default()
            },
            multiview: None,
        });

        let id = self.allocate_id();
        self.programs.insert(
            id,
            Program {
                pass,
                pipeline,
                bind_group_layout,
            },
        );
        Ok(ProgramId(id))
    }

    fn delete_program(&mut self, id: ProgramId) {
        self.programs.remove(&id.0);
    }

    fn create_quad(&mut self) -> PostResult<BufferId> {
        let buffer = self
            .device
            .device()
            .create_buffer_init(&wgpu::BufferInitDescriptor {
                label: Some("Fullscreen Quad"),
                contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = self.allocate_id();
        self.buffers.insert(id, buffer);
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, id: BufferId) {
        self.buffers.remove(&id.0);
    }

    fn create_texture(&mut self, size: [u32; 2]) -> PostResult<TextureId> {
        let texture = self.create_render_texture(size, "source texture")?;
        let id = self.allocate_id();
        self.textures.insert(id, texture);
        Ok(TextureId(id))
    }

    fn delete_texture(&mut self, id: TextureId) {
        self.textures.remove(&id.0);
    }

    fn create_framebuffer(&mut self, size: [u32; 2]) -> PostResult<FramebufferId> {
        let texture = self.create_render_texture(size, "framebuffer")?;
        let id = self.allocate_id();
        self.framebuffers.insert(id, texture);
        Ok(FramebufferId(id))
    }

    fn delete_framebuffer(&mut self, id: FramebufferId) {
        self.framebuffers.remove(&id.0);
    }

    fn begin_frame(&mut self) {
        let encoder = self
            .device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Post Encoder"),
            });
        self.encoder = Some(encoder);
    }

    fn upload_source(
        &mut self,
        program: ProgramId,
        quad: BufferId,
        source: &wgpu::TextureView,
        texture: TextureId,
    ) -> PostResult<()> {
        self.encode(
            program,
            quad,
            &[View::External(source)],
            View::Texture(texture.0),
            &[],
        )
    }

    fn draw(&mut self, pass: DrawPass<'_, wgpu::TextureView>) -> PostResult<()> {
        let inputs: Vec<View<'_>> = pass
            .inputs
            .iter()
            .map(|input| match *input {
                PassInput::Texture(id) => View::Texture(id.0),
                PassInput::Framebuffer(id) => View::Framebuffer(id.0),
            })
            .collect();
        let target = match pass.target {
            RenderTarget::Framebuffer(id) => View::Framebuffer(id.0),
            RenderTarget::Screen(view) => View::External(view),
        };
        self.encode(
            pass.program,
            pass.quad,
            &inputs,
            target,
            pass.uniforms.as_bytes(),
        )
    }

    fn end_frame(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.device.queue().submit(Some(encoder.finish()));
        }
        self.frame_resources.clear();
    }
}
