// src/preview.rs
//! Fullscreen preview pass for the synthesized LCD texture.
//!
//! The watch face is drawn as a single fullscreen triangle that samples the
//! screen texture and applies the active theme's exposure. The quad keeps the
//! texture's square aspect by letterboxing inside the window.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::texture::ScreenTextureGpu;
use crate::theme::Theme;

const PREVIEW_SHADER: &str = r#"
struct ViewParams {
    // x = horizontal scale, y = vertical scale, z = exposure, w = unused
    params: vec4<f32>,
};

@group(0) @binding(0) var screen_tex: texture_2d<f32>;
@group(0) @binding(1) var screen_samp: sampler;
@group(1) @binding(0) var<uniform> view_params: ViewParams;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VsOut {
    // Oversized triangle covering the viewport.
    var out: VsOut;
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let pos = uv * 2.0 - 1.0;
    out.position = vec4<f32>(pos * view_params.params.xy, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let color = textureSample(screen_tex, screen_samp, in.uv);
    return vec4<f32>(color.rgb * view_params.params.z, color.a);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ViewParams {
    params: [f32; 4],
}

impl ViewParams {
    fn new(window_width: u32, window_height: u32, exposure: f32) -> Self {
        // Fit the square face inside the window.
        let (w, h) = (window_width.max(1) as f32, window_height.max(1) as f32);
        let (sx, sy) = if w > h { (h / w, 1.0) } else { (1.0, w / h) };
        Self {
            params: [sx, sy, exposure, 0.0],
        }
    }
}

pub struct PreviewPipeline {
    pipeline: wgpu::RenderPipeline,
    screen_bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
}

impl PreviewPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        screen: &ScreenTextureGpu,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("preview_shader"),
            source: wgpu::ShaderSource::Wgsl(PREVIEW_SHADER.into()),
        });

        let screen_layout = ScreenTextureGpu::bind_group_layout(device);
        let screen_bind_group = screen.create_bind_group(device, &screen_layout);

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("preview_params_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("preview_params"),
            contents: bytemuck::bytes_of(&ViewParams::new(1, 1, 1.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("preview_params_bind_group"),
            layout: &params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("preview_pipeline_layout"),
            bind_group_layouts: &[&screen_layout, &params_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("preview_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            screen_bind_group,
            params_buffer,
            params_bind_group,
        }
    }

    /// Refresh the letterbox scale and exposure. Call on resize and on
    /// theme changes.
    pub fn update_view(
        &self,
        queue: &wgpu::Queue,
        window_width: u32,
        window_height: u32,
        theme: Theme,
    ) {
        let params = ViewParams::new(window_width, window_height, theme.exposure());
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, theme: Theme) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("preview_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(theme.clear_color()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.screen_bind_group, &[]);
        rpass.set_bind_group(1, &self.params_bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_params_letterbox_the_shorter_axis() {
        let wide = ViewParams::new(1600, 800, 1.0);
        assert!((wide.params[0] - 0.5).abs() < 1e-6);
        assert!((wide.params[1] - 1.0).abs() < 1e-6);

        let tall = ViewParams::new(600, 1200, 1.0);
        assert!((tall.params[0] - 1.0).abs() < 1e-6);
        assert!((tall.params[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn view_params_carry_theme_exposure() {
        let p = ViewParams::new(800, 800, Theme::Light.exposure());
        assert!((p.params[2] - 1.45).abs() < 1e-6);
    }
}
