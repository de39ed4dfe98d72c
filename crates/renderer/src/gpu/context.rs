//! wgpu instance/device/surface wiring and swapchain reconfiguration.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

/// Initialization failures that make the whole feature unavailable.
///
/// These are deliberately separated from `anyhow` plumbing: the caller is
/// expected to treat them as "the garden cannot run here" and degrade to a
/// clean no-op instead of crashing whatever shell hosts the view.
#[derive(Debug, thiserror::Error)]
pub enum GardenInitError {
    #[error("failed to acquire a window or display handle: {0}")]
    Handle(String),
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("no compatible GPU adapter available: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
}

/// Owns the surface, device, and queue; knows how to reconfigure on resize.
pub(crate) struct GpuContext {
    /// Kept alive for the lifetime of the surface it produced.
    _instance: wgpu::Instance,
    /// Adapter limits, used to validate resize requests.
    limits: wgpu::Limits,
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl GpuContext {
    pub fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self, GardenInitError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();
        let raw_window_handle = target
            .window_handle()
            .map_err(|err| GardenInitError::Handle(err.to_string()))?
            .as_raw();
        let raw_display_handle = target
            .display_handle()
            .map_err(|err| GardenInitError::Handle(err.to_string()))?
            .as_raw();
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle,
                raw_window_handle,
            })
        }
        .map_err(|err| GardenInitError::Surface(err.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| GardenInitError::Adapter(err.to_string()))?;

        let limits = adapter.limits();
        let width = initial_size.width.max(1);
        let height = initial_size.height.max(1);
        let max_dimension = limits.max_texture_dimension_2d;
        if width > max_dimension || height > max_dimension {
            return Err(GardenInitError::Surface(format!(
                "requested surface {width}x{height} exceeds GPU max texture dimension {max_dimension}"
            )));
        }

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("petalfall device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        };
        let (device, queue) = pollster::block_on(adapter.request_device(&device_descriptor))
            .map_err(|err| GardenInitError::Device(err.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let size = PhysicalSize::new(width, height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);
        tracing::info!(
            width,
            height,
            format = ?surface_format,
            "initialised garden surface"
        );

        Ok(Self {
            _instance: instance,
            limits,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigures the swapchain. Returns false for degenerate or oversized
    /// requests, which are ignored rather than applied.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        if new_size.width == 0 || new_size.height == 0 {
            return false;
        }
        let max_dimension = self.limits.max_texture_dimension_2d;
        if new_size.width > max_dimension || new_size.height > max_dimension {
            tracing::warn!(
                width = new_size.width,
                height = new_size.height,
                max_dimension,
                "ignoring resize beyond GPU texture limits"
            );
            return false;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Reapplies the current configuration (after Lost/Outdated surfaces).
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}
