//! Windowed host.
//!
//! A winit application that owns a [`FieldDriver`] and a [`GpuCanvas`]. The
//! driver is attached when the window first appears and ticked on every
//! `RedrawRequested`; another redraw is requested only after a rendered
//! frame, so a stopped, faulted or minimized field costs nothing.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::driver::{FieldDriver, FrameStatus, Viewport};
use crate::error::RunError;
use crate::gpu::GpuCanvas;
use crate::input::PointerEvent;

/// Frames between window title refreshes.
const TITLE_REFRESH_FRAMES: u64 = 60;
const TITLE: &str = "gravfield";

/// Open a window and run the field until it is closed.
pub fn run(config: FieldConfig) -> Result<(), RunError> {
    let driver = FieldDriver::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(driver);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    canvas: Option<GpuCanvas>,
    driver: FieldDriver,
    occluded: bool,
    error: Option<RunError>,
    #[cfg(feature = "egui")]
    egui: Option<crate::gpu::egui_integration::EguiIntegration>,
}

impl App {
    fn new(driver: FieldDriver) -> Self {
        Self {
            window: None,
            canvas: None,
            driver,
            occluded: false,
            error: None,
            #[cfg(feature = "egui")]
            egui: None,
        }
    }

    fn viewport(window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::from_physical(size.width, size.height, window.scale_factor())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.driver.detach();
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(canvas)) = (&self.window, &mut self.canvas) else {
            return;
        };

        let status = self.driver.tick(canvas);
        if status == FrameStatus::Rendered {
            #[cfg(feature = "egui")]
            let result = match &mut self.egui {
                Some(egui) => {
                    egui.begin_frame(window);
                    crate::panel::tuning_panel(&egui.ctx, &mut self.driver);
                    let output = egui.end_frame(window);
                    let result = canvas.present_with(|target| egui.paint(target, &output));
                    egui.cleanup(&output);
                    result
                }
                None => canvas.present(),
            };
            #[cfg(not(feature = "egui"))]
            let result = canvas.present();

            match result {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    canvas.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory");
                    self.driver.detach();
                    event_loop.exit();
                    return;
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }

            let frame = self.driver.frame_count();
            if frame % TITLE_REFRESH_FRAMES == 0 {
                window.set_title(&format!("{} - {:.0} fps", TITLE, self.driver.time().fps()));
            }
        }

        // skipped frames wait for the resize that makes the surface usable
        if status == FrameStatus::Rendered && !self.occluded {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let background = self.driver.config().render.palette.void;
        let canvas = match pollster::block_on(GpuCanvas::new(window.clone(), background)) {
            Ok(canvas) => canvas,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        #[cfg(feature = "egui")]
        {
            self.egui = Some(crate::gpu::egui_integration::EguiIntegration::new(
                canvas.device(),
                canvas.format(),
                &window,
            ));
        }

        self.driver.attach(Self::viewport(&window));
        window.request_redraw();
        self.canvas = Some(canvas);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        #[cfg(feature = "egui")]
        if let Some(egui) = &mut self.egui {
            let consumed = egui.on_window_event(&window, &event);
            if matches!(event, WindowEvent::CursorMoved { .. }) && (consumed || egui.wants_pointer()) {
                self.driver.pointer(PointerEvent::Left);
                return;
            }
        }

        if let Some(pointer) = PointerEvent::from_window_event(&event, window.scale_factor()) {
            self.driver.pointer(pointer);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.driver.detach();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(&window, physical_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.resize(&window, window.inner_size());
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                if !occluded {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

impl App {
    fn resize(&mut self, window: &Window, size: PhysicalSize<u32>) {
        if let Some(canvas) = &mut self.canvas {
            canvas.resize(size, window.scale_factor());
        }
        self.driver
            .resize(Viewport::from_physical(size.width, size.height, window.scale_factor()));
        window.request_redraw();
    }
}
