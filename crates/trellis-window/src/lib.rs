//! trellis-window: winit window + wgpu surface that presents software-rendered
//! frames.
//!
//! Responsibilities:
//! - Create window + surface + device/queue.
//! - Keep the surface configured across resizes and scale changes.
//! - Fold pointer and wheel events into one [`FrameInput`] per redraw.
//! - Present the pixmap a [`FrameHandler`] draws.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tiny_skia::Pixmap;
use trellis_config::WindowConfig;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

mod input;
mod presenter;

pub use input::{FrameInput, InputState};
pub use presenter::Presenter;

pub trait FrameHandler {
    /// Build and draw one frame. The returned pixmap is presented as-is and
    /// should be `input.physical_size()` large.
    fn frame(&mut self, input: &FrameInput) -> Result<&Pixmap>;
}

pub struct AppWindow {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    high_dpi: bool,
}

fn choose_srgb_format(caps: &wgpu::SurfaceCapabilities) -> Result<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| anyhow!("surface reports no formats"))
}

fn choose_present_mode(caps: &wgpu::SurfaceCapabilities, vsync: bool) -> wgpu::PresentMode {
    let preferred: &[wgpu::PresentMode] = if vsync {
        &[wgpu::PresentMode::Fifo]
    } else {
        &[wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo]
    };
    preferred
        .iter()
        .copied()
        .find(|mode| caps.present_modes.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

impl AppWindow {
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .with_resizable(config.resizable)
            .build(&event_loop)?;
        let window = Arc::new(window);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .context("no suitable GPU adapter found")?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;

        let caps = surface.get_capabilities(&adapter);
        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: choose_srgb_format(&caps)?,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&caps, config.vsync),
            alpha_mode: caps
                .alpha_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::CompositeAlphaMode::Opaque)
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "window {}x{} (scale {:.2}), {:?}, {:?}",
            size.width,
            size.height,
            window.scale_factor(),
            surface_config.format,
            surface_config.present_mode
        );

        Ok(Self {
            event_loop,
            window,
            surface,
            device,
            queue,
            config: surface_config,
            high_dpi: config.high_dpi,
        })
    }

    /// Run until the window closes or the handler fails.
    pub fn run(self, mut handler: impl FrameHandler) -> Result<()> {
        let Self { event_loop, window, surface, device, queue, mut config, high_dpi } = self;
        let mut presenter = Presenter::new(&device, config.format);
        let mut input = InputState::new();
        let mut failure: Option<anyhow::Error> = None;

        let reconfigure = |config: &mut wgpu::SurfaceConfiguration, size: PhysicalSize<u32>| {
            if size.width > 0 && size.height > 0 {
                config.width = size.width;
                config.height = size.height;
                surface.configure(&device, config);
            }
        };

        event_loop.run(|event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => reconfigure(&mut config, size),
                WindowEvent::ScaleFactorChanged { .. } => {
                    reconfigure(&mut config, window.inner_size())
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.cursor_moved([position.x, position.y], window.scale_factor());
                }
                WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                    input.left_button(state == ElementState::Pressed);
                }
                WindowEvent::MouseWheel { delta, .. } => match delta {
                    MouseScrollDelta::LineDelta(x, y) => input.wheel_lines(x, y),
                    MouseScrollDelta::PixelDelta(p) => input.wheel_pixels(p.x, p.y),
                },
                WindowEvent::RedrawRequested => {
                    let size = window.inner_size();
                    if size.width == 0 || size.height == 0 {
                        return;
                    }
                    let window_scale = window.scale_factor();
                    let logical: LogicalSize<f32> = size.to_logical(window_scale);
                    let scale = if high_dpi { window_scale as f32 } else { 1.0 };
                    let frame =
                        input.take_frame(Instant::now(), [logical.width, logical.height], scale);

                    let presented = handler
                        .frame(&frame)
                        .and_then(|pixmap| presenter.present(&device, &queue, &surface, pixmap));
                    match presented {
                        Ok(()) => {}
                        Err(err) => match err.downcast_ref::<wgpu::SurfaceError>() {
                            Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                log::warn!("surface lost, reconfiguring");
                                reconfigure(&mut config, size);
                            }
                            Some(wgpu::SurfaceError::Timeout) => {
                                log::warn!("surface timeout, skipping frame")
                            }
                            _ => {
                                failure = Some(err);
                                elwt.exit();
                            }
                        },
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        })?;

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
