//! GLSL compilation and the two render pipelines.
//!
//! Both passes share the fullscreen-triangle vertex stage, the uniform
//! layout (set 0), and the texture/sampler layout (set 1). The garden pass
//! writes the accumulation target; the present pass writes the swapchain.

use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use super::targets::HISTORY_FORMAT;

const VERTEX_SHADER: &str = include_str!("../shaders/fullscreen.vert");
const GARDEN_FRAGMENT: &str = include_str!("../shaders/garden.frag");
const PRESENT_FRAGMENT: &str = include_str!("../shaders/present.frag");

pub(crate) struct GardenPipelines {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub history_layout: wgpu::BindGroupLayout,
    pub garden: wgpu::RenderPipeline,
    pub present: wgpu::RenderPipeline,
}

impl GardenPipelines {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("garden uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let history_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("history layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("garden pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &history_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = compile_shader(
            device,
            "fullscreen triangle vertex",
            VERTEX_SHADER,
            ShaderStage::Vertex,
        );
        let garden_module = compile_shader(
            device,
            "garden fragment",
            GARDEN_FRAGMENT,
            ShaderStage::Fragment,
        );
        let present_module = compile_shader(
            device,
            "present fragment",
            PRESENT_FRAGMENT,
            ShaderStage::Fragment,
        );

        let garden = build_pipeline(
            device,
            "garden pipeline",
            &pipeline_layout,
            &vertex_module,
            &garden_module,
            HISTORY_FORMAT,
        );
        let present = build_pipeline(
            device,
            "present pipeline",
            &pipeline_layout,
            &vertex_module,
            &present_module,
            surface_format,
        );

        Self {
            uniform_layout,
            history_layout,
            garden,
            present,
        }
    }
}

fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
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
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
