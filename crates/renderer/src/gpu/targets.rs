//! The ping-pong pair of accumulation render targets.
//!
//! Two explicitly indexed slots with a 0/1 toggle; ownership is explicit and
//! nothing swaps references around. The writer of frame N becomes the reader
//! of frame N+1, so no render pass ever samples the texture it is attached
//! to.

use winit::dpi::PhysicalSize;

/// Accumulation format. Non-sRGB so history round-trips through the sampler
/// without gamma conversion.
pub(crate) const HISTORY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(crate) struct HistorySlot {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Texture+sampler bind group used when this slot is the read source.
    pub bind_group: wgpu::BindGroup,
}

pub(crate) struct HistoryTargets {
    slots: [HistorySlot; 2],
    index: usize,
    sampler: wgpu::Sampler,
}

impl HistoryTargets {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        size: PhysicalSize<u32>,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("history sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let slots = [
            make_slot(device, layout, &sampler, size, 0),
            make_slot(device, layout, &sampler, size, 1),
        ];
        Self {
            slots,
            index: 0,
            sampler,
        }
    }

    /// The slot holding last frame's accumulated image.
    pub fn read(&self) -> &HistorySlot {
        &self.slots[self.index]
    }

    /// The slot this frame renders into.
    pub fn write(&self) -> &HistorySlot {
        &self.slots[self.index ^ 1]
    }

    /// Flips read/write roles; call once per presented frame.
    pub fn swap(&mut self) {
        self.index ^= 1;
    }

    /// Recreates both slots at the new size. wgpu zero-initialises fresh
    /// textures, so the accumulated image starts blank after a resize;
    /// callers cover the transition with the suppression window.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        size: PhysicalSize<u32>,
    ) {
        self.slots = [
            make_slot(device, layout, &self.sampler, size, 0),
            make_slot(device, layout, &self.sampler, size, 1),
        ];
        self.index = 0;
    }
}

fn make_slot(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    size: PhysicalSize<u32>,
    index: usize,
) -> HistorySlot {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("history target #{index}")),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HISTORY_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("history bind group #{index}")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    HistorySlot {
        _texture: texture,
        view,
        bind_group,
    }
}
