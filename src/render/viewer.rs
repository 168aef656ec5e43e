//! Windowed slideshow viewer: owns the winit event loop, the wgpu surface,
//! and the timer-driven transition state machine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, error, info, warn};
use wgpu::SurfaceError;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    monitor::MonitorHandle,
    window::{Fullscreen, Window, WindowAttributes, WindowId, WindowLevel},
};

use crate::config::{Settings, WindowMode};
use crate::events::{DecodeJob, PrefetchOutcome, PreparedImage};
use crate::playlist::{NextFile, Playlist};
use crate::render::loader::Prefetcher;
use crate::shell::{Action, InputEvent, Key, Shell};
use crate::transition::{
    MotionOptions, PanZoomPlan, Placement, ZoomDirection, ease_in_sine, ease_out_sine,
    plan_pan_zoom,
};

/// How long one advance tick waits on the decode channel before giving up.
const PREFETCH_WAIT: Duration = Duration::from_secs(1);
/// Retry delay after a recoverable tick error.
const RETRY_DELAY: Duration = Duration::from_millis(100);
/// Delay before the first tick and after mode toggles, letting window
/// geometry settle.
const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Run the slideshow until the user quits or the playlist is exhausted.
pub fn run(playlist: Playlist, settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to build event loop")?;
    let mut app = App::new(playlist, settings);
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    Vertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    Vertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    Vertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    Vertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SlideParams {
    scale: [f32; 2],
    offset: [f32; 2],
    alpha: f32,
    _pad: [f32; 3],
}

fn slide_params(p: &Placement, stage_w: f32, stage_h: f32, alpha: f32) -> SlideParams {
    let center_x = p.x + p.w / 2.0;
    let center_y = p.y + p.h / 2.0;
    SlideParams {
        scale: [p.w / stage_w, p.h / stage_h],
        offset: [
            center_x / stage_w * 2.0 - 1.0,
            1.0 - center_y / stage_h * 2.0,
        ],
        alpha,
        _pad: [0.0; 3],
    }
}

/// One on-screen image: its texture binding plus the animation it follows.
struct Slide {
    bind_group: wgpu::BindGroup,
    params: wgpu::Buffer,
    plan: PanZoomPlan,
    motion_started: Instant,
    motion_duration: Duration,
    fade_started: Instant,
    fade_duration: Duration,
    fading_out: bool,
}

impl Slide {
    fn placement(&self, now: Instant) -> Placement {
        let t = if self.motion_duration.is_zero() {
            1.0
        } else {
            now.saturating_duration_since(self.motion_started)
                .as_secs_f32()
                / self.motion_duration.as_secs_f32()
        };
        Placement::lerp(&self.plan.start, &self.plan.end, t)
    }

    fn fade_progress(&self, now: Instant) -> f32 {
        if self.fade_duration.is_zero() {
            return 1.0;
        }
        (now.saturating_duration_since(self.fade_started).as_secs_f32()
            / self.fade_duration.as_secs_f32())
        .clamp(0.0, 1.0)
    }

    fn alpha(&self, now: Instant) -> f32 {
        let t = self.fade_progress(now);
        if self.fading_out {
            1.0 - ease_in_sine(t)
        } else {
            ease_out_sine(t)
        }
    }

    fn begin_fade_out(&mut self, now: Instant) {
        self.fading_out = true;
        self.fade_started = now;
    }

    fn faded_out(&self, now: Instant) -> bool {
        self.fading_out && self.fade_progress(now) >= 1.0
    }
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vbuf: wgpu::Buffer,
}

impl Gpu {
    fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(caps.formats[0]);

        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("slideshow-device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "surface configured",
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("slide-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/slide.wgsl").into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("slide-bind-layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("slide-pipeline-layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("slide-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("slide-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slide-quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_layout,
            sampler,
            vbuf,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        debug!(
            width = self.config.width,
            height = self.config.height,
            "surface resized",
        );
    }

    /// Upload a decoded frame and wire it to its own params buffer and bind
    /// group; the slide then only needs per-frame uniform writes.
    fn upload_slide(&self, img: &PreparedImage) -> (wgpu::Buffer, wgpu::BindGroup) {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("slide-texture"),
            size: wgpu::Extent3d {
                width: img.width,
                height: img.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            texture.as_image_copy(),
            &img.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * img.width),
                rows_per_image: Some(img.height),
            },
            wgpu::Extent3d {
                width: img.width,
                height: img.height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let params = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("slide-params"),
            size: std::mem::size_of::<SlideParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("slide-bind-group"),
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        });
        (params, bind_group)
    }
}

struct App {
    settings: Settings,
    playlist: Playlist,
    shell: Shell,
    zoom_direction: ZoomDirection,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    prefetcher: Option<Prefetcher>,
    next_tick_at: Option<Instant>,
    current: Option<Slide>,
    previous: Option<Slide>,
}

impl App {
    fn new(playlist: Playlist, settings: Settings) -> Self {
        let shell = Shell::new(settings.mode, settings.quit_on_motion);
        Self {
            settings,
            playlist,
            shell,
            zoom_direction: ZoomDirection::default(),
            window: None,
            gpu: None,
            prefetcher: None,
            next_tick_at: None,
            current: None,
            previous: None,
        }
    }

    fn pick_monitor(&self, event_loop: &ActiveEventLoop) -> Option<MonitorHandle> {
        let monitors: Vec<MonitorHandle> = event_loop.available_monitors().collect();
        if monitors.is_empty() {
            return None;
        }
        let index = self.settings.monitor.clamp(1, monitors.len()) - 1;
        monitors.into_iter().nth(index)
    }

    fn center_on_monitor(window: &Window, monitor: &MonitorHandle) {
        let mpos = monitor.position();
        let msize = monitor.size();
        let wsize = window.outer_size();
        window.set_outer_position(PhysicalPosition::new(
            mpos.x + (msize.width.saturating_sub(wsize.width) / 2) as i32,
            mpos.y + (msize.height.saturating_sub(wsize.height) / 2) as i32,
        ));
    }

    fn apply_window_mode(&self, window: &Window, monitor: Option<MonitorHandle>) {
        match self.settings.mode {
            WindowMode::Fullscreen => {
                window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
                window.set_cursor_visible(false);
                set_skip_taskbar(window, true);
            }
            WindowMode::Maximized => window.set_maximized(true),
            WindowMode::Desktop => {
                window.set_maximized(true);
                window.set_decorations(false);
                window.set_window_level(WindowLevel::AlwaysOnBottom);
            }
            WindowMode::Window => {}
            WindowMode::Undecorated => window.set_decorations(false),
        }
        if self.settings.hide_from_taskbar {
            set_skip_taskbar(window, true);
        }
    }

    fn motion_options(&self) -> MotionOptions {
        MotionOptions {
            zoom: self.settings.zoom,
            pan: self.settings.pan,
            ar_target: self.settings.ar_target,
        }
    }

    /// Decode bound: the stage inflated by the zoom margin.
    fn max_decode_dims(&self) -> (u32, u32) {
        let (w, h) = self
            .gpu
            .as_ref()
            .map(|gpu| (gpu.config.width, gpu.config.height))
            .unwrap_or((1, 1));
        let margin = 1.0 + 2.0 * self.settings.zoom;
        ((w as f32 * margin) as u32, (h as f32 * margin) as u32)
    }

    /// Hand the traversal's next file to the decode worker. Returns `false`
    /// when the playlist is exhausted and the show is stopping.
    fn request_next_prefetch(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let (max_width, max_height) = self.max_decode_dims();
        match self.playlist.next_file() {
            NextFile::Path(path) => {
                if let Some(prefetcher) = &self.prefetcher {
                    prefetcher.request(DecodeJob {
                        path,
                        max_width,
                        max_height,
                    });
                }
                true
            }
            NextFile::Exhausted => {
                error!("could not find any non-corrupt images, exiting");
                event_loop.exit();
                false
            }
        }
    }

    /// One advance tick: consume the prefetched result, swap slides, and
    /// schedule the next tick. Failure sentinels are absorbed in a loop so a
    /// run of bad files never recurses or kills the show.
    fn advance(&mut self, event_loop: &ActiveEventLoop, now: Instant) -> Result<()> {
        let Some(results) = self.prefetcher.as_ref().map(|p| p.results.clone()) else {
            return Ok(());
        };
        loop {
            match results.recv_timeout(PREFETCH_WAIT) {
                Ok(PrefetchOutcome::Ready(img)) => {
                    self.show_image(&img, now)?;
                    self.next_tick_at = Some(now + self.settings.interval());
                    self.request_next_prefetch(event_loop);
                    return Ok(());
                }
                Ok(PrefetchOutcome::Failed(path)) => {
                    self.playlist.mark_bad(path);
                    if !self.request_next_prefetch(event_loop) {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("no decoded image within {PREFETCH_WAIT:?}; retrying shortly");
                    self.next_tick_at = Some(now + RETRY_DELAY);
                    return Ok(());
                }
                Err(RecvTimeoutError::Disconnected) => bail!("decode worker channel closed"),
            }
        }
    }

    /// Build the incoming slide, start the cross-fade and pan/zoom, and
    /// rotate the slide pair. Only the displayed slide and the one fading
    /// out stay alive.
    fn show_image(&mut self, img: &PreparedImage, now: Instant) -> Result<()> {
        let Some(gpu) = &self.gpu else {
            bail!("no GPU state for incoming image");
        };
        debug!(path = %img.path.display(), "showing image");

        let enlarge = self.zoom_direction.next();
        let (stage_w, stage_h) = (gpu.config.width as f32, gpu.config.height as f32);
        let plan = plan_pan_zoom(
            &mut rand::rng(),
            stage_w,
            stage_h,
            img.width as f32,
            img.height as f32,
            &self.motion_options(),
            enlarge,
        );

        let fade_time = self.settings.fade_time();
        let (params, bind_group) = gpu.upload_slide(img);
        let incoming = Slide {
            bind_group,
            params,
            plan,
            motion_started: now,
            motion_duration: self.settings.interval() + fade_time,
            fade_started: now,
            fade_duration: fade_time,
            fading_out: false,
        };

        if let Some(mut outgoing) = self.current.take() {
            outgoing.begin_fade_out(now);
            self.previous = Some(outgoing);
        }
        self.current = Some(incoming);
        Ok(())
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("surface lost; reconfiguring");
                let size = window.inner_size();
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(err) => {
                warn!("surface frame unavailable: {err}");
                return;
            }
        };

        let now = Instant::now();
        let (stage_w, stage_h) = (gpu.config.width as f32, gpu.config.height as f32);
        // Outgoing below, incoming on top.
        for slide in [self.previous.as_ref(), self.current.as_ref()]
            .into_iter()
            .flatten()
        {
            let params = slide_params(
                &slide.placement(now),
                stage_w,
                stage_h,
                slide.alpha(now),
            );
            gpu.queue
                .write_buffer(&slide.params, 0, bytemuck::bytes_of(&params));
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("slide-encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("slide-pass"),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&gpu.pipeline);
            rpass.set_vertex_buffer(0, gpu.vbuf.slice(..));
            for slide in [self.previous.as_ref(), self.current.as_ref()]
                .into_iter()
                .flatten()
            {
                rpass.set_bind_group(0, &slide.bind_group, &[]);
                rpass.draw(0..4, 0..1);
            }
        }
        gpu.queue.submit([encoder.finish()]);
        frame.present();
    }

    fn apply_action(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };
        match action {
            Action::Quit => {
                info!("exiting...");
                event_loop.exit();
            }
            Action::EnterFullscreen => {
                let monitor = window.current_monitor();
                window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
                window.set_cursor_visible(false);
                self.next_tick_at = Some(Instant::now() + SETTLE_DELAY);
            }
            Action::LeaveFullscreen => {
                window.set_fullscreen(None);
                window.set_cursor_visible(true);
                self.next_tick_at = Some(Instant::now() + SETTLE_DELAY);
            }
            Action::SetDecorated(decorated) => window.set_decorations(decorated),
        }
    }

    fn handle_input(&mut self, event_loop: &ActiveEventLoop, input: InputEvent) {
        if let Some(action) = self.shell.dispatch(input) {
            self.apply_action(event_loop, action);
        }
    }
}

#[cfg(target_os = "windows")]
fn set_skip_taskbar(window: &Window, skip: bool) {
    use winit::platform::windows::WindowExtWindows;
    window.set_skip_taskbar(skip);
}

#[cfg(not(target_os = "windows"))]
fn set_skip_taskbar(_window: &Window, _skip: bool) {
    // No portable hint on this platform; window managers decide.
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(600.0, 400.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let monitor = self.pick_monitor(event_loop);
        if let Some(monitor) = &monitor {
            Self::center_on_monitor(&window, monitor);
        }
        self.apply_window_mode(&window, monitor);

        match Gpu::new(window.clone()) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(err) => {
                error!("failed to initialize GPU state: {err:?}");
                event_loop.exit();
                return;
            }
        }
        self.window = Some(window);

        self.prefetcher = Some(Prefetcher::spawn());
        self.request_next_prefetch(event_loop);
        self.next_tick_at = Some(Instant::now() + SETTLE_DELAY);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.handle_input(event_loop, InputEvent::CloseRequested);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    let key = match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
                        PhysicalKey::Code(KeyCode::KeyF) | PhysicalKey::Code(KeyCode::F11) => {
                            Key::FullscreenToggle
                        }
                        PhysicalKey::Code(KeyCode::KeyD) => Key::DecorationsToggle,
                        _ => Key::Other,
                    };
                    self.handle_input(event_loop, InputEvent::Key(key));
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => {
                self.handle_input(event_loop, InputEvent::PointerPress);
            }
            WindowEvent::CursorMoved { .. } => {
                self.handle_input(event_loop, InputEvent::PointerMotion);
            }
            WindowEvent::RedrawRequested => self.draw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() {
            return;
        }
        let now = Instant::now();

        if let Some(at) = self.next_tick_at {
            if now >= at {
                self.next_tick_at = None;
                if let Err(err) = self.advance(event_loop, now) {
                    // A single bad tick must not end the show.
                    error!("advance tick failed: {err:#}; retrying shortly");
                    self.next_tick_at = Some(now + RETRY_DELAY);
                }
            }
        }

        // Retire the outgoing slide once its fade completes.
        if self.previous.as_ref().is_some_and(|s| s.faded_out(now)) {
            self.previous = None;
        }

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
