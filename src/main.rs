//! famicore runner.
//!
//! `famicore <rom.nes> [frames] [screenshot.png]`
//!
//! Without the `display` feature (or with a frame count given) the ROM runs
//! headless for the requested frames and the last frame can be written to a
//! PNG. With `display` and no frame count a window opens instead.

use std::path::PathBuf;
use std::process;

use famicore::{Bus, Cartridge};

const DEFAULT_FRAMES: u32 = 60;

struct CliArgs {
    rom_path: PathBuf,
    frames: Option<u32>,
    screenshot_path: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let rom_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: famicore <rom.nes> [frames] [screenshot.png]")?;
    let frames = args
        .next()
        .map(|s| s.parse::<u32>().map_err(|e| format!("bad frame count {s:?}: {e}")))
        .transpose()?;
    let screenshot_path = args.next().map(PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument {extra:?}"));
    }
    Ok(CliArgs {
        rom_path,
        frames,
        screenshot_path,
    })
}

fn load(cli: &CliArgs) -> Result<Bus, String> {
    let cart = Cartridge::from_ines_file(&cli.rom_path)
        .map_err(|e| format!("{}: {e}", cli.rom_path.display()))?;
    Ok(Bus::with_cartridge(cart))
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs) -> Result<(), String> {
    let mut bus = load(cli)?;
    let frames = cli.frames.unwrap_or(DEFAULT_FRAMES);
    for _ in 0..frames {
        bus.run_frame().map_err(|e| e.to_string())?;
    }
    let cpu = bus.cpu();
    println!(
        "{frames} frames, {} CPU cycles; A={:02X} X={:02X} Y={:02X} SP={:02X} PC={:04X} P={:08b}",
        bus.cpu_cycles(),
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.sp(),
        cpu.pc(),
        cpu.status(),
    );

    if let Some(path) = &cli.screenshot_path {
        save_screenshot(&bus, path)?;
    }
    Ok(())
}

#[cfg(feature = "screenshot")]
fn save_screenshot(bus: &Bus, path: &std::path::Path) -> Result<(), String> {
    famicore::screenshot::save_png(bus.framebuffer(), path).map_err(|e| e.to_string())
}

#[cfg(not(feature = "screenshot"))]
fn save_screenshot(_bus: &Bus, path: &std::path::Path) -> Result<(), String> {
    Err(format!(
        "cannot write {}: built without the `screenshot` feature",
        path.display()
    ))
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

#[cfg(feature = "display")]
mod window {
    use std::time::{Duration, Instant};

    use famicore::{Bus, Button, NES_HEIGHT, NES_WIDTH};
    use pixels::{Pixels, SurfaceTexture};
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, EventLoop};
    use winit::keyboard::{KeyCode, PhysicalKey};
    use winit::window::{Window, WindowAttributes, WindowId};

    const SCALE: u32 = 3;
    const FRAME_DURATION: Duration = Duration::from_micros(16_639);

    fn map_keycode(key: KeyCode) -> Option<Button> {
        match key {
            KeyCode::KeyZ => Some(Button::A),
            KeyCode::KeyX => Some(Button::B),
            KeyCode::ShiftRight => Some(Button::Select),
            KeyCode::Enter => Some(Button::Start),
            KeyCode::ArrowUp => Some(Button::Up),
            KeyCode::ArrowDown => Some(Button::Down),
            KeyCode::ArrowLeft => Some(Button::Left),
            KeyCode::ArrowRight => Some(Button::Right),
            _ => None,
        }
    }

    struct App {
        bus: Bus,
        window: Option<&'static Window>,
        pixels: Option<Pixels<'static>>,
        last_frame: Instant,
        error: Option<String>,
    }

    impl App {
        fn fail(&mut self, event_loop: &ActiveEventLoop, msg: String) {
            self.error = Some(msg);
            event_loop.exit();
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            let size = winit::dpi::LogicalSize::new(
                NES_WIDTH as u32 * SCALE,
                NES_HEIGHT as u32 * SCALE,
            );
            let attrs = WindowAttributes::default()
                .with_title("famicore")
                .with_inner_size(size)
                .with_resizable(false);

            let window = match event_loop.create_window(attrs) {
                Ok(w) => &*Box::leak(Box::new(w)),
                Err(e) => return self.fail(event_loop, format!("window: {e}")),
            };
            let inner = window.inner_size();
            let surface = SurfaceTexture::new(inner.width, inner.height, window);
            match Pixels::new(NES_WIDTH as u32, NES_HEIGHT as u32, surface) {
                Ok(p) => self.pixels = Some(p),
                Err(e) => return self.fail(event_loop, format!("pixels: {e}")),
            }
            self.window = Some(window);
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
            match event {
                WindowEvent::CloseRequested => event_loop.exit(),
                WindowEvent::KeyboardInput { event, .. } => {
                    let PhysicalKey::Code(key) = event.physical_key else {
                        return;
                    };
                    let pressed = event.state == ElementState::Pressed;
                    if key == KeyCode::Escape && pressed {
                        event_loop.exit();
                    } else if let Some(button) = map_keycode(key) {
                        self.bus.gamepad_mut(0).set_button(button, pressed);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    if now.duration_since(self.last_frame) >= FRAME_DURATION {
                        if let Err(e) = self.bus.run_frame() {
                            return self.fail(event_loop, e.to_string());
                        }
                        if let Some(pixels) = self.pixels.as_mut() {
                            pixels.frame_mut().copy_from_slice(self.bus.framebuffer());
                        }
                        self.last_frame = now;
                    }
                    if let Some(Err(e)) = self.pixels.as_ref().map(Pixels::render) {
                        self.fail(event_loop, format!("render: {e}"));
                    }
                }
                _ => {}
            }
        }

        fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
            if let Some(window) = self.window {
                window.request_redraw();
            }
        }
    }

    pub fn run(bus: Bus) -> Result<(), String> {
        let event_loop = EventLoop::new().map_err(|e| format!("event loop: {e}"))?;
        let mut app = App {
            bus,
            window: None,
            pixels: None,
            last_frame: Instant::now(),
            error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| format!("event loop: {e}"))?;
        app.error.map_or(Ok(()), Err)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[cfg(feature = "display")]
fn run_windowed(cli: &CliArgs) -> Result<(), String> {
    window::run(load(cli)?)
}

#[cfg(not(feature = "display"))]
fn run_windowed(cli: &CliArgs) -> Result<(), String> {
    run_headless(cli)
}

fn run() -> Result<(), String> {
    let cli = parse_args()?;
    if cli.frames.is_none() {
        run_windowed(&cli)
    } else {
        run_headless(&cli)
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("famicore: {e}");
        process::exit(1);
    }
}
