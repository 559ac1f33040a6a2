use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::foundation::core::Size;
use crate::foundation::error::{TableauError, TableauResult};
use crate::render::frame::Frame;
use crate::render::surface::{Display, EventSource, InputEvent};

const WINDOW_TITLE: &str = "tableau";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

const BLIT_WGSL: &str = r#"
@group(0) @binding(0) var frame_tex: texture_2d<f32>;
@group(0) @binding(1) var frame_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) i: u32) -> VsOut {
    var uvs = array<vec2<f32>, 3>(vec2(0.0, 0.0), vec2(2.0, 0.0), vec2(0.0, 2.0));
    let uv = uvs[i];
    var out: VsOut;
    out.pos = vec4(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(frame_tex, frame_sampler, in.uv);
}
"#;

/// Borderless fullscreen window on one monitor, presenting frames through `wgpu`.
///
/// Frames are aspect-fit to the physical window; `size()` reports the logical output size the
/// caller composes at.
pub struct WindowDisplay {
    event_loop: EventLoop<()>,
    app: WindowApp,
    size: Size,
}

impl WindowDisplay {
    /// Open the window on `monitor`, falling back to the first monitor when it does not exist.
    #[tracing::instrument]
    pub fn open(monitor: usize, size: Size) -> TableauResult<Self> {
        let mut event_loop = EventLoop::new()
            .map_err(|e| TableauError::backend(format!("failed to create event loop: {e}")))?;
        let mut app = WindowApp {
            monitor,
            window: None,
            gpu: None,
            events: Vec::new(),
            failure: None,
        };

        let deadline = Instant::now() + STARTUP_TIMEOUT;
        while app.gpu.is_none() {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(16)), &mut app)
            {
                return Err(TableauError::backend(format!(
                    "event loop exited during startup with code {code}"
                )));
            }
            if let Some(err) = app.failure.take() {
                return Err(err);
            }
            if Instant::now() >= deadline {
                return Err(TableauError::backend("timed out waiting for the window"));
            }
        }

        tracing::info!(width = size.width, height = size.height, "display ready");
        Ok(Self {
            event_loop,
            app,
            size,
        })
    }
}

impl Display for WindowDisplay {
    fn size(&self) -> Size {
        self.size
    }

    fn present(&mut self, frame: &Frame) {
        let Some(gpu) = self.app.gpu.as_mut() else {
            return;
        };
        if let Some(window) = self.app.window.as_ref() {
            window.pre_present_notify();
        }
        gpu.present(frame);
    }
}

impl EventSource for WindowDisplay {
    fn poll(&mut self) -> Vec<InputEvent> {
        if let PumpStatus::Exit(_) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app)
        {
            self.app.events.push(InputEvent::Quit);
        }
        std::mem::take(&mut self.app.events)
    }
}

struct WindowApp {
    monitor: usize,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    events: Vec<InputEvent>,
    failure: Option<TableauError>,
}

impl WindowApp {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> TableauResult<()> {
        let monitors: Vec<_> = event_loop.available_monitors().collect();
        let index = if self.monitor < monitors.len() {
            self.monitor
        } else {
            tracing::warn!(
                requested = self.monitor,
                available = monitors.len(),
                "monitor not found, using monitor 0"
            );
            0
        };

        let window = event_loop
            .create_window(Window::default_attributes().with_title(WINDOW_TITLE))
            .map_err(|e| TableauError::backend(format!("failed to create window: {e}")))?;
        let window = Arc::new(window);
        window.set_fullscreen(Some(Fullscreen::Borderless(monitors.get(index).cloned())));
        window.set_cursor_visible(false);

        let gpu = Gpu::new(Arc::clone(&window))?;
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        if let Err(err) = self.create(event_loop) {
            self.failure = Some(err);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => self.events.push(InputEvent::Quit),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => self.events.push(InputEvent::Quit),
                Key::Character(text) => self.events.push(InputEvent::from_key_text(&text)),
                _ => {}
            },
            _ => {}
        }
    }
}

struct Gpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    texture: Option<FrameTexture>,
}

struct FrameTexture {
    texture: wgpu::Texture,
    bind: wgpu::BindGroup,
    size: Size,
}

impl Gpu {
    fn new(window: Arc<Window>) -> TableauResult<Self> {
        let instance = wgpu::Instance::default();
        let physical = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| TableauError::backend(format!("failed to create surface: {e}")))?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| TableauError::backend(format!("no suitable GPU adapter: {e}")))?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("tableau-device"),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|e| TableauError::backend(format!("failed to create GPU device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| TableauError::backend("surface reports no texture formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: physical.width.max(1),
            height: physical.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tableau-frame-layout"),
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
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tableau-frame-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tableau-blit"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(BLIT_WGSL)),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tableau-blit-layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tableau-blit-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            surface,
            config,
            bind_layout,
            sampler,
            pipeline,
            texture: None,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    fn upload(&mut self, frame: &Frame) {
        let size = frame.size();
        if self.texture.as_ref().map(|t| t.size) != Some(size) {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("tableau-frame"),
                size: wgpu::Extent3d {
                    width: size.width,
                    height: size.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tableau-frame-bind"),
                layout: &self.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.texture = Some(FrameTexture {
                texture,
                bind,
                size,
            });
        }

        let Some(target) = self.texture.as_ref() else {
            return;
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn present(&mut self, frame: &Frame) {
        self.upload(frame);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropped a frame");
                return;
            }
        };
        let Some(target) = self.texture.as_ref() else {
            return;
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tableau-present"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tableau-present-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
            let (x, y, w, h) = aspect_fit(target.size, self.config.width, self.config.height);
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &target.bind, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
    }
}

/// Centered rectangle with `image`'s aspect ratio that fills as much of the screen as possible.
pub fn aspect_fit(image: Size, screen_w: u32, screen_h: u32) -> (f32, f32, f32, f32) {
    let iw = image.width as f32;
    let ih = image.height as f32;
    let sw = screen_w as f32;
    let sh = screen_h as f32;
    let scale = (sw / iw).min(sh / ih);
    let w = iw * scale;
    let h = ih * scale;
    ((sw - w) * 0.5, (sh - h) * 0.5, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/render/window.rs"]
mod tests;
