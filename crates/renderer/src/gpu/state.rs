//! Glue that turns a `FrameInput` into a presented frame.
//!
//! Frame order is fixed: upload uniforms, run the garden pass into the write
//! target with last frame's accumulation bound as history, run the present
//! pass over the swapchain frame with the fresh accumulation bound, present,
//! flip the target index.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use super::context::{GardenInitError, GpuContext};
use super::pipeline::GardenPipelines;
use super::targets::HistoryTargets;
use super::uniforms::{FrameInput, GardenUniforms};

pub(crate) struct GpuState {
    context: GpuContext,
    pipelines: GardenPipelines,
    targets: HistoryTargets,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: GardenUniforms,
}

impl GpuState {
    pub fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self, GardenInitError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let pipelines = GardenPipelines::new(&context.device, context.format());
        let targets = HistoryTargets::new(&context.device, &pipelines.history_layout, context.size());

        let uniforms = GardenUniforms::new(context.size().width, context.size().height);
        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("garden uniform buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("garden uniform bind group"),
                layout: &pipelines.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        Ok(Self {
            context,
            pipelines,
            targets,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size()
    }

    /// Resizes the swapchain and recreates both accumulation targets. The
    /// recreated targets come back blank; the caller's suppression window
    /// keeps the transition invisible.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if !self.context.resize(new_size) {
            return;
        }
        self.targets.resize(
            &self.context.device,
            &self.pipelines.history_layout,
            new_size,
        );
        self.uniforms
            .set_resolution(new_size.width as f32, new_size.height as f32);
        tracing::debug!(
            width = new_size.width,
            height = new_size.height,
            "recreated accumulation targets"
        );
    }

    /// Reapplies the surface configuration after a Lost/Outdated error.
    pub fn recover_surface(&mut self) {
        self.context.reconfigure();
    }

    pub fn render_frame(&mut self, frame: FrameInput) -> Result<(), wgpu::SurfaceError> {
        self.uniforms.apply(&frame);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let surface_frame = self.context.acquire()?;
        let surface_view = surface_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("garden encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("garden pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.write().view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.garden);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.targets.read().bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.present);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.targets.write().bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        surface_frame.present();
        // This frame's write target is next frame's history.
        self.targets.swap();
        Ok(())
    }
}
