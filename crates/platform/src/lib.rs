use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use app_api::{RepaintHandle, UiApp};
use bus::CoreEvent;
use egui::{Context as EguiContext, viewport::ViewportId};
use egui_wgpu::wgpu;
use egui_winit::{State as EguiWinitState, accesskit_winit};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

mod gpu;

use gpu::Gpu;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

enum UserEvent {
    /// A runtime posted a `CoreEvent`; drain the bus on this thread.
    Wake,
    /// Screen reader or UI-automation client talking to the window.
    AccessKit(accesskit_winit::Event),
}

impl From<accesskit_winit::Event> for UserEvent {
    fn from(event: accesskit_winit::Event) -> Self {
        UserEvent::AccessKit(event)
    }
}

pub struct Platform {
    event_loop: EventLoop<UserEvent>,
    title: String,
}

impl Platform {
    pub fn new(title: impl Into<String>) -> Result<Self, PlatformError> {
        let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
        Ok(Self {
            event_loop,
            title: title.into(),
        })
    }

    /// A waker that runtimes call after posting to the event channel.
    pub fn repaint_handle(&self) -> RepaintHandle {
        let proxy: EventLoopProxy<UserEvent> = self.event_loop.create_proxy();
        RepaintHandle::new(move || {
            // Closed loop means we are shutting down.
            let _ = proxy.send_event(UserEvent::Wake);
        })
    }

    /// Runs the UI thread until the window closes. `app` only ever sees
    /// `CoreEvent`s from here, never from the thread that produced them.
    pub fn run(self, app: Box<dyn UiApp>, evt_rx: Receiver<CoreEvent>) -> Result<(), PlatformError> {
        let mut host = PlatformApp {
            proxy: self.event_loop.create_proxy(),
            title: self.title,
            app,
            evt_rx,
            window: None,
            egui_ctx: EguiContext::default(),
            egui_state: None,
            gpu: None,
            fatal: None,
        };
        self.event_loop.set_control_flow(ControlFlow::Wait);
        self.event_loop.run_app(&mut host)?;

        match host.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct PlatformApp {
    proxy: EventLoopProxy<UserEvent>,
    title: String,
    app: Box<dyn UiApp>,
    evt_rx: Receiver<CoreEvent>,
    window: Option<Arc<Window>>,
    egui_ctx: EguiContext,
    egui_state: Option<EguiWinitState>,
    gpu: Option<Gpu>,
    fatal: Option<PlatformError>,
}

impl PlatformApp {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                // accesskit must attach before the window is first shown.
                let attrs = Window::default_attributes()
                    .with_title(self.title.as_str())
                    .with_inner_size(LogicalSize::new(420.0, 520.0))
                    .with_visible(false);
                let window = Arc::new(event_loop.create_window(attrs)?);
                self.window = Some(window.clone());
                window
            }
        };

        if self.egui_state.is_none() {
            let mut state = EguiWinitState::new(
                self.egui_ctx.clone(),
                ViewportId::ROOT,
                &window,
                Some(window.scale_factor() as f32),
                None,
                None,
            );
            state.init_accesskit(event_loop, &window, self.proxy.clone());
            self.egui_state = Some(state);
            window.set_visible(true);
        }

        if self.gpu.is_none() {
            self.gpu = Some(Gpu::new(window)?);
        }
        Ok(())
    }

    fn drain_core_events(&mut self) -> bool {
        let mut any = false;
        while let Ok(evt) = self.evt_rx.try_recv() {
            self.app.on_core_event(evt);
            any = true;
        }
        any
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.drain_core_events();

        let (Some(window), Some(state), Some(gpu)) =
            (self.window.as_ref(), self.egui_state.as_mut(), self.gpu.as_mut())
        else {
            return;
        };

        let raw_input = state.take_egui_input(window);
        let app = &mut self.app;
        let full_output = self.egui_ctx.run(raw_input, |ctx| app.ui(ctx));
        state.handle_platform_output(window, full_output.platform_output);

        let ppp = full_output.pixels_per_point;
        let clipped = self.egui_ctx.tessellate(full_output.shapes, ppp);
        gpu.paint(&clipped, &full_output.textures_delta, ppp);

        let delay = full_output
            .viewport_output
            .get(&ViewportId::ROOT)
            .map(|v| v.repaint_delay)
            .unwrap_or(Duration::MAX);
        if delay.is_zero() {
            window.request_redraw();
        } else if let Some(at) = Instant::now().checked_add(delay) {
            event_loop.set_control_flow(ControlFlow::WaitUntil(at));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn on_accesskit_event(&mut self, event: accesskit_winit::WindowEvent) {
        match event {
            accesskit_winit::WindowEvent::InitialTreeRequested => {
                log::debug!("accessibility client attached");
                self.egui_ctx.enable_accesskit();
            }
            accesskit_winit::WindowEvent::ActionRequested(request) => {
                if let Some(state) = self.egui_state.as_mut() {
                    state.on_accesskit_action_request(request);
                }
            }
            accesskit_winit::WindowEvent::AccessibilityDeactivated => {
                log::debug!("accessibility client detached");
                self.egui_ctx.disable_accesskit();
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler<UserEvent> for PlatformApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.init_window(event_loop) {
            log::error!("platform init failed: {err}");
            self.fatal = Some(err);
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Wake => {
                self.drain_core_events();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            UserEvent::AccessKit(event) => self.on_accesskit_event(event.window_event),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(window), Some(state)) = (self.window.as_ref(), self.egui_state.as_mut()) {
            let response = state.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
