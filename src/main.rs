//! Demo host: a winit window with a `pixels` frame that opens the colour
//! picker whenever it is clicked.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colorwheel::{
    open_picker, Canvas, Color, Host, InputEvent, Key, LayoutConfig, Point, PointerButton, Rect,
    Surface, WheelCache,
};
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

const BACKDROP: Color = Color::new(0x20, 0x20, 0x28);
const SWATCH_SIZE: i32 = 96;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick a colour from an HSV wheel")]
struct Cli {
    /// Wheel radius in pixels
    #[arg(long, default_value_t = 88)]
    radius: u32,
    /// Window width in pixels
    #[arg(long, default_value_t = 480)]
    width: u32,
    /// Window height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,
    /// TrueType/OpenType font used for the dialog labels
    #[arg(long)]
    font: Option<PathBuf>,
    /// Colour the picker starts with, as #rrggbb
    #[arg(long)]
    initial: Option<Color>,
}

// ============================================================================
// WINDOW HOST
// ============================================================================

struct WindowHost {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: usize,
    height: usize,
    /// What the application looks like without the dialog.
    backdrop: Vec<u8>,
    cursor: (f32, f32),
    pending: VecDeque<InputEvent>,
    reserved: Option<Rect>,
    close_requested: bool,
    exited: bool,
}

impl WindowHost {
    fn new(width: u32, height: u32) -> Result<Self, Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title("colorwheel")
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = Arc::new(window);

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(width, height, surface_texture)?;

        let (width, height) = (width as usize, height as usize);
        Ok(Self {
            event_loop,
            window,
            pixels,
            width,
            height,
            backdrop: vec![0; width * height * 4],
            cursor: (0.0, 0.0),
            pending: VecDeque::new(),
            reserved: None,
            close_requested: false,
            exited: false,
        })
    }

    /// Redraws the backdrop with a swatch of the current colour.
    fn paint_backdrop(&mut self, current: Option<Color>) {
        let (width, height) = (self.width, self.height);
        let mut canvas = Canvas::new(&mut self.backdrop, width, height);
        canvas.clear(BACKDROP);
        if let Some(color) = current {
            let swatch = Rect::centered_in(width, height, SWATCH_SIZE, SWATCH_SIZE);
            canvas.fill_rect(swatch, color);
            canvas.stroke_rect(swatch, Color::WHITE);
            self.window.set_title(&format!("colorwheel: {color}"));
        }
    }

    fn close_requested(&self) -> bool {
        self.close_requested
    }
}

fn translate(event: WindowEvent, cursor: &mut (f32, f32)) -> Option<InputEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            *cursor = (position.x as f32, position.y as f32);
            Some(InputEvent::PointerMoved)
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Middle,
                MouseButton::Other(id) => PointerButton::Other(id),
                MouseButton::Back | MouseButton::Forward => return None,
            };
            Some(match state {
                ElementState::Pressed => InputEvent::PointerDown { button },
                ElementState::Released => InputEvent::PointerUp { button },
            })
        }
        WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
            let key = match event.logical_key {
                WinitKey::Named(NamedKey::Escape) => Key::Escape,
                WinitKey::Named(NamedKey::Enter) => Key::Enter,
                _ => Key::Other,
            };
            Some(InputEvent::KeyDown(key))
        }
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        WindowEvent::RedrawRequested | WindowEvent::Resized(_) => Some(InputEvent::Expose),
        _ => None,
    }
}

impl Host for WindowHost {
    fn surface_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn surface(&mut self) -> Canvas<'_> {
        Canvas::new(self.pixels.frame_mut(), self.width, self.height)
    }

    fn wait_event(&mut self) -> Option<InputEvent> {
        let Self {
            event_loop,
            pending,
            cursor,
            exited,
            ..
        } = self;

        while pending.is_empty() && !*exited {
            let status = event_loop.pump_events(None, |event, _| {
                if let Event::WindowEvent { event, .. } = event {
                    if let Some(input) = translate(event, cursor) {
                        pending.push_back(input);
                    }
                }
            });
            if let PumpStatus::Exit(code) = status {
                log::debug!("event loop exited with code {code}");
                *exited = true;
            }
        }

        let event = self.pending.pop_front()?;
        if event == InputEvent::CloseRequested {
            self.close_requested = true;
        }
        Some(event)
    }

    fn pointer_position(&self) -> Point {
        let (x, y) = match self.pixels.window_pos_to_pixel(self.cursor) {
            Ok((x, y)) => (x as i32, y as i32),
            Err((x, y)) => (x as i32, y as i32),
        };
        Point::new(x, y)
    }

    fn repaint_background(&mut self) {
        let width = self.width;
        let reserved = self.reserved;
        let frame = self.pixels.frame_mut();
        for (i, (dst, src)) in frame
            .chunks_exact_mut(4)
            .zip(self.backdrop.chunks_exact(4))
            .enumerate()
        {
            let p = Point::new((i % width) as i32, (i / width) as i32);
            if !reserved.is_some_and(|r| r.contains(p)) {
                dst.copy_from_slice(src);
            }
        }
    }

    fn reserved_region(&self) -> Option<Rect> {
        self.reserved
    }

    fn set_reserved_region(&mut self, region: Option<Rect>) {
        self.reserved = region;
    }

    fn present(&mut self) {
        if let Err(err) = self.pixels.render() {
            log::error!("failed to present frame: {err}");
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let font_data = cli.font.as_deref().map(std::fs::read).transpose()?;
    let config = LayoutConfig::builder()
        .radius(cli.radius)
        .maybe_font_data(font_data)
        .build();
    config.validate_for_surface(cli.width as usize, cli.height as usize)?;

    let mut host = WindowHost::new(cli.width, cli.height)?;
    let cache = WheelCache::new();
    let mut current = cli.initial;

    host.paint_backdrop(current);
    host.repaint_background();
    host.present();
    log::info!("click to open the colour picker, Esc to quit");

    while let Some(event) = host.wait_event() {
        match event {
            InputEvent::CloseRequested | InputEvent::KeyDown(Key::Escape) => break,
            InputEvent::PointerDown {
                button: PointerButton::Primary,
            } => {
                if let Some(color) = open_picker(&mut host, &cache, &config, current) {
                    println!("{color}");
                    current = Some(color);
                    host.paint_backdrop(current);
                    host.repaint_background();
                    host.present();
                }
                if host.close_requested() {
                    break;
                }
            }
            InputEvent::Expose => {
                host.repaint_background();
                host.present();
            }
            _ => {}
        }
    }

    Ok(())
}
