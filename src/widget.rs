//! The controls that make up the picker dialog.

use std::sync::Arc;

use rusttype::Font;

use crate::canvas::{draw_text, Point, Rect, Surface};
use crate::color::{Color, PolarSample};
use crate::config::Theme;
use crate::wheel::WheelBuffer;

// ============================================================================
// INPUT AND SIGNALS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Other,
}

/// An input event as delivered by the host.
///
/// Pointer events carry no position: controls are handed the mapped pointer
/// position alongside the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown { button: PointerButton },
    PointerUp { button: PointerButton },
    PointerMoved,
    KeyDown(Key),
    CloseRequested,
    /// The host's window contents were invalidated.
    Expose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonRole {
    Confirm,
    Cancel,
}

/// Notification raised by a control in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    ValueCommitted(Color),
    Activated(ButtonRole),
}

/// Shared drawing resources for one frame.
#[derive(Clone, Copy)]
pub struct Style<'a> {
    pub theme: &'a Theme,
    pub font: Option<&'a Font<'a>>,
    pub font_size: f32,
}

// ============================================================================
// CAPABILITIES
// ============================================================================

pub trait Drawable {
    /// Positions the control at `rect` translated by `offset`.
    fn place(&mut self, rect: Rect, offset: Point);

    fn draw(&mut self, surface: &mut dyn Surface, style: &Style<'_>);
}

pub trait PointerTarget {
    fn handle_pointer(&mut self, event: &InputEvent, pointer: Point) -> Option<Signal>;
}

/// The closed set of controls a picker dialog holds.
#[derive(Debug)]
pub enum Control {
    Wheel(WheelWidget),
    Button(Button),
}

impl Control {
    /// The wheel's current value; buttons carry none.
    pub fn selected(&self) -> Option<Color> {
        match self {
            Control::Wheel(wheel) => wheel.selected(),
            Control::Button(_) => None,
        }
    }
}

impl Drawable for Control {
    fn place(&mut self, rect: Rect, offset: Point) {
        match self {
            Control::Wheel(wheel) => wheel.place(rect, offset),
            Control::Button(button) => button.place(rect, offset),
        }
    }

    fn draw(&mut self, surface: &mut dyn Surface, style: &Style<'_>) {
        match self {
            Control::Wheel(wheel) => wheel.draw(surface, style),
            Control::Button(button) => button.draw(surface, style),
        }
    }
}

impl PointerTarget for Control {
    fn handle_pointer(&mut self, event: &InputEvent, pointer: Point) -> Option<Signal> {
        match self {
            Control::Wheel(wheel) => wheel.handle_pointer(event, pointer),
            Control::Button(button) => button.handle_pointer(event, pointer),
        }
    }
}

// ============================================================================
// WHEEL WIDGET
// ============================================================================

/// Displays a cached wheel buffer and turns clicks on it into colors.
#[derive(Debug)]
pub struct WheelWidget {
    buffer: Arc<WheelBuffer>,
    screen_rect: Option<Rect>,
    selected: Option<Color>,
    needs_redraw: bool,
}

impl WheelWidget {
    pub fn new(buffer: Arc<WheelBuffer>) -> Self {
        Self {
            buffer,
            screen_rect: None,
            selected: None,
            needs_redraw: true,
        }
    }

    pub fn radius(&self) -> u32 {
        self.buffer.radius()
    }

    pub fn selected(&self) -> Option<Color> {
        self.selected
    }

    pub fn set_selected(&mut self, color: Option<Color>) {
        self.selected = color;
    }

    pub fn screen_rect(&self) -> Option<Rect> {
        self.screen_rect
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Screen point a click would need to land on to pick `color`, ignoring
    /// its value component. `None` until the widget has been placed.
    pub fn color_position(&self, color: Color) -> Option<Point> {
        let center = self.screen_rect?.center();
        let (dx, dy) = PolarSample::from_color(color).to_offset(f64::from(self.radius()));
        Some(Point::new(
            center.x + dx.round() as i32,
            center.y + dy.round() as i32,
        ))
    }
}

impl Drawable for WheelWidget {
    fn place(&mut self, rect: Rect, offset: Point) {
        self.screen_rect = Some(rect.offset(offset));
    }

    fn draw(&mut self, surface: &mut dyn Surface, style: &Style<'_>) {
        let Some(rect) = self.screen_rect else {
            return;
        };
        if !self.needs_redraw {
            return;
        }
        self.needs_redraw = false;

        surface.fill_rect(rect, style.theme.background);
        let radius = self.radius() as i32;
        let center = rect.center();
        surface.blit(&self.buffer, Point::new(center.x - radius, center.y - radius));
    }
}

impl PointerTarget for WheelWidget {
    fn handle_pointer(&mut self, event: &InputEvent, pointer: Point) -> Option<Signal> {
        let InputEvent::PointerDown {
            button: PointerButton::Primary,
        } = event
        else {
            return None;
        };
        let rect = self.screen_rect?;
        if !rect.contains_inclusive(pointer) {
            return None;
        }

        let center = rect.center();
        let dx = f64::from(pointer.x - center.x);
        let dy = f64::from(pointer.y - center.y);
        let radius = f64::from(self.radius());
        if dx.hypot(dy) > radius {
            return None;
        }

        let color = PolarSample::from_offset(dx, dy, radius).to_color();
        log::debug!("colour wheel picked {color} at offset ({dx}, {dy})");
        self.selected = Some(color);
        Some(Signal::ValueCommitted(color))
    }
}

// ============================================================================
// BUTTON
// ============================================================================

/// A push button that activates on release over itself.
#[derive(Debug)]
pub struct Button {
    role: ButtonRole,
    label: String,
    screen_rect: Option<Rect>,
    armed: bool,
    needs_redraw: bool,
}

impl Button {
    pub fn new(role: ButtonRole, label: impl Into<String>) -> Self {
        Self {
            role,
            label: label.into(),
            screen_rect: None,
            armed: false,
            needs_redraw: true,
        }
    }

    pub fn role(&self) -> ButtonRole {
        self.role
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    fn set_armed(&mut self, armed: bool) {
        if self.armed != armed {
            self.armed = armed;
            self.needs_redraw = true;
        }
    }
}

impl Drawable for Button {
    fn place(&mut self, rect: Rect, offset: Point) {
        self.screen_rect = Some(rect.offset(offset));
    }

    fn draw(&mut self, surface: &mut dyn Surface, style: &Style<'_>) {
        let Some(rect) = self.screen_rect else {
            return;
        };
        if !self.needs_redraw {
            return;
        }
        self.needs_redraw = false;

        let face = if self.armed {
            style.theme.highlight
        } else {
            style.theme.background
        };
        surface.fill_rect(rect, face);
        surface.stroke_rect(rect, style.theme.foreground);
        if let Some(font) = style.font {
            draw_text(
                surface,
                rect.center(),
                &self.label,
                font,
                style.font_size,
                style.theme.foreground,
            );
        }
    }
}

impl PointerTarget for Button {
    fn handle_pointer(&mut self, event: &InputEvent, pointer: Point) -> Option<Signal> {
        let inside = self.screen_rect.is_some_and(|rect| rect.contains(pointer));
        match event {
            InputEvent::PointerDown {
                button: PointerButton::Primary,
            } if inside => {
                self.set_armed(true);
                None
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
            } => {
                let was_armed = self.armed;
                self.set_armed(false);
                (was_armed && inside).then_some(Signal::Activated(self.role))
            }
            _ => None,
        }
    }
}
