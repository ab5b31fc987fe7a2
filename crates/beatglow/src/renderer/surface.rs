//! Persistent offscreen surface the active plugin draws into.
//!
//! The texture is never cleared between frames; the per-frame fade rect
//! drawn by the app is what turns old frames into trails.
//!
//! Storage is sRGB so the draw renderer's linear colors are encoded on
//! write. Post-processing samples a plain view of the same texture and sees
//! the encoded values.

use nannou::prelude::*;
use nannou::wgpu;

use crate::postprocess::OFFSCREEN_FORMAT;

const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

pub struct SourceSurface {
    texture: wgpu::Texture,
    /// Decodes on sampling, for the unprocessed blit
    view: wgpu::TextureView,
    /// Same texels, no decoding
    encoded_view: wgpu::TextureView,
    draw_renderer: nannou::draw::Renderer,
    // Blits the surface to the window when post-processing is off
    reshaper: wgpu::TextureReshaper,
    size: [u32; 2],
}

impl SourceSurface {
    pub fn new(
        device: &wgpu::Device,
        size: [u32; 2],
        window_sample_count: u32,
        window_format: wgpu::TextureFormat,
    ) -> Self {
        let size = [size[0].max(1), size[1].max(1)];
        let texture = Self::create_texture(device, size);
        let view = texture.view().build();
        let encoded_view = texture.view().format(OFFSCREEN_FORMAT).build();
        let draw_renderer = nannou::draw::RendererBuilder::new()
            .build_from_texture_descriptor(device, texture.descriptor());
        let reshaper = wgpu::TextureReshaper::new(
            device,
            &view,
            1,
            wgpu::TextureSampleType::Float { filterable: true },
            window_sample_count,
            window_format,
        );

        Self {
            texture,
            view,
            encoded_view,
            draw_renderer,
            reshaper,
            size,
        }
    }

    fn descriptor(size: [u32; 2]) -> wgpu::TextureDescriptor<'static> {
        let mut descriptor = wgpu::TextureBuilder::new()
            .size(size)
            .usage(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING)
            .sample_count(1)
            .format(SURFACE_FORMAT)
            .into_descriptor();
        descriptor.view_formats = &[OFFSCREEN_FORMAT];
        descriptor
    }

    fn create_texture(device: &wgpu::Device, size: [u32; 2]) -> wgpu::Texture {
        wgpu::TextureBuilder::from(Self::descriptor(size)).build(device)
    }

    /// Recreate the texture at `size`. Trails are lost.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        size: [u32; 2],
        window_sample_count: u32,
        window_format: wgpu::TextureFormat,
    ) {
        let size = [size[0].max(1), size[1].max(1)];
        if size == self.size {
            return;
        }
        *self = Self::new(device, size, window_sample_count, window_format);
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// The surface as the post-processor's source.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.encoded_view
    }

    /// Render `draw` on top of what the surface already holds.
    pub fn render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, draw: &Draw) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Surface Encoder"),
        });
        self.draw_renderer
            .render_to_texture(device, &mut encoder, draw, &self.texture);
        queue.submit(Some(encoder.finish()));
    }

    /// Copy the surface unprocessed into `frame_view`.
    pub fn present(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_view: &wgpu::TextureView,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Surface Present Encoder"),
        });
        self.reshaper.encode_render_pass(frame_view, &mut encoder);
        queue.submit(Some(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_allows_an_undecoded_view() {
        let descriptor = SourceSurface::descriptor([64, 32]);
        assert!(descriptor.format.is_srgb());
        assert_eq!(descriptor.view_formats, &[SURFACE_FORMAT.remove_srgb_suffix()]);
        assert_eq!(OFFSCREEN_FORMAT, SURFACE_FORMAT.remove_srgb_suffix());
    }
}
