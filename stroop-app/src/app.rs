use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::sync::Arc;
use stroop_core::{Color, SessionPhase};
use stroop_render::{FrameRenderer, HitTarget, hit_test};
use stroop_session::{Session, SessionConfig, SessionInput};
use stroop_timing::MonotonicClock;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<FrameRenderer>,
    session: Session<MonotonicClock, ThreadRng>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    cursor: Option<PhysicalPosition<f64>>,
    should_exit: bool,
}

impl App {
    pub fn new() -> Result<App> {
        let session = Session::new(
            SessionConfig::default(),
            MonotonicClock::new(),
            rand::rng(),
        );
        Ok(App {
            window: None,
            pixels: None,
            renderer: None,
            session,
            current_size: None,
            scale_factor: 1.0,
            cursor: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        println!("=== STROOP EXPERIMENT ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Respond with R / B / G / Y or the on-screen buttons.");
        println!("Press SPACE to start, ESC to exit.\n");

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("no monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Stroop")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        println!(
            "Display: {}x{} at scale {:.2}",
            physical_size.width, physical_size.height, self.scale_factor
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(FrameRenderer::new(
            physical_size.width,
            physical_size.height,
        )?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (&mut self.pixels, &mut self.renderer) else {
            return Ok(());
        };
        let view = self.session.view();
        renderer.render_frame(&view, pixels.frame_mut())?;
        pixels.render()?;
        Ok(())
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyR => self.forward(SessionInput::Key(Color::Red.key())),
            KeyCode::KeyB => self.forward(SessionInput::Key(Color::Blue.key())),
            KeyCode::KeyG => self.forward(SessionInput::Key(Color::Green.key())),
            KeyCode::KeyY => self.forward(SessionInput::Key(Color::Yellow.key())),
            KeyCode::Space => match self.session.phase() {
                SessionPhase::Instructions => self.forward(SessionInput::Begin),
                SessionPhase::Results => self.forward(SessionInput::Repeat),
                _ => {}
            },
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            _ => {}
        }
    }

    fn handle_click(&mut self) {
        let (Some(size), Some(cursor)) = (self.current_size, self.cursor) else {
            return;
        };
        match hit_test(size.width, size.height, cursor.x as f32, cursor.y as f32) {
            Some(HitTarget::ResponseButton(color)) => {
                self.forward(SessionInput::Key(color.key()));
            }
            Some(HitTarget::ActionButton) => match self.session.phase() {
                SessionPhase::Instructions => self.forward(SessionInput::Begin),
                SessionPhase::Results => self.forward(SessionInput::Repeat),
                _ => {}
            },
            None => {}
        }
    }

    fn forward(&mut self, input: SessionInput) {
        self.session.handle_input(input);
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                eprintln!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                eprintln!("Failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                eprintln!("Failed to resize renderer: {e}");
            }
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        println!("\nSession ended.");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                eprintln!("Failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.session.tick();
                if let Err(e) = self.render() {
                    eprintln!("Render error: {e}");
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
