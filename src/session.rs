//! The modal selection loop and the host interface it runs against.

use std::ops::{Deref, DerefMut};

use rusttype::Font;

use crate::canvas::{draw_text, Canvas, Point, Rect, Surface};
use crate::color::Color;
use crate::config::LayoutConfig;
use crate::wheel::WheelCache;
use crate::widget::{
    Button, ButtonRole, Control, Drawable, InputEvent, Key, PointerTarget, Signal, Style,
    WheelWidget,
};

// ============================================================================
// HOST INTERFACE
// ============================================================================

/// Everything the picker needs from the surrounding application.
pub trait Host {
    /// Width and height of the drawing surface in pixels.
    fn surface_size(&self) -> (usize, usize);

    fn surface(&mut self) -> Canvas<'_>;

    /// Blocks until the next input event. `None` means the event source is
    /// gone and no more input will arrive.
    fn wait_event(&mut self) -> Option<InputEvent>;

    /// Current pointer location in surface pixels.
    fn pointer_position(&self) -> Point;

    /// Redraws the application beneath the dialog, leaving the reserved
    /// region alone.
    fn repaint_background(&mut self);

    fn reserved_region(&self) -> Option<Rect>;

    fn set_reserved_region(&mut self, region: Option<Rect>);

    /// Shows the current surface contents.
    fn present(&mut self);
}

/// Holds a screen region reserved for the dialog while it is open.
///
/// Dropping the guard restores whatever region was reserved before and
/// repaints, whichever way the session ended.
pub struct ReservedRegion<'h, H: Host + ?Sized> {
    host: &'h mut H,
    previous: Option<Rect>,
}

impl<'h, H: Host + ?Sized> ReservedRegion<'h, H> {
    pub fn acquire(host: &'h mut H, region: Rect) -> Self {
        let previous = host.reserved_region();
        host.set_reserved_region(Some(region));
        Self { host, previous }
    }
}

impl<H: Host + ?Sized> Deref for ReservedRegion<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Host + ?Sized> DerefMut for ReservedRegion<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Host + ?Sized> Drop for ReservedRegion<'_, H> {
    fn drop(&mut self) {
        self.host.set_reserved_region(self.previous.take());
        self.host.repaint_background();
        self.host.present();
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Committed(Color),
    Cancelled,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Outcome::Committed(color) => Some(color),
            Outcome::Pending | Outcome::Cancelled => None,
        }
    }
}

/// One opening of the picker dialog.
pub struct SelectionSession<'c> {
    config: &'c LayoutConfig,
    font: Option<Font<'c>>,
    dialog: Rect,
    controls: Vec<(Rect, Control)>,
    outcome: Outcome,
    frame_needs_redraw: bool,
}

impl<'c> SelectionSession<'c> {
    /// Lays the dialog out centered on a `surface_size` surface.
    ///
    /// # Panics
    ///
    /// Panics if `config.radius` is zero or too large to lay out; see
    /// [`LayoutConfig::validate`].
    pub fn new(
        surface_size: (usize, usize),
        cache: &WheelCache,
        config: &'c LayoutConfig,
        initial: Option<Color>,
    ) -> Self {
        let (w, h) = config.dialog_size();
        let dialog = Rect::centered_in(surface_size.0, surface_size.1, w, h);

        let mut wheel = WheelWidget::new(cache.get_or_render(config.radius));
        wheel.set_selected(initial);
        let controls = vec![
            (config.wheel_rect(), Control::Wheel(wheel)),
            (
                config.confirm_rect(),
                Control::Button(Button::new(ButtonRole::Confirm, &config.confirm_label)),
            ),
            (
                config.cancel_rect(),
                Control::Button(Button::new(ButtonRole::Cancel, &config.cancel_label)),
            ),
        ];

        let font = config.font();
        if config.font_data.is_some() && font.is_none() {
            log::warn!("picker font failed to parse, labels will not be drawn");
        }

        let mut session = Self {
            config,
            font,
            dialog,
            controls,
            outcome: Outcome::Pending,
            frame_needs_redraw: true,
        };
        session.place_controls();
        session
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn dialog_rect(&self) -> Rect {
        self.dialog
    }

    /// The wheel's current value.
    pub fn selected(&self) -> Option<Color> {
        self.controls.iter().find_map(|(_, control)| control.selected())
    }

    fn place_controls(&mut self) {
        let origin = self.dialog.origin();
        for (rect, control) in &mut self.controls {
            control.place(*rect, origin);
        }
    }

    /// Routes one event to every control and applies the resulting signals.
    ///
    /// Once the outcome is terminal further events are ignored.
    pub fn handle_event(&mut self, event: &InputEvent, pointer: Point) -> Outcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        let signals: Vec<Signal> = match event {
            InputEvent::CloseRequested | InputEvent::KeyDown(Key::Escape) => {
                vec![Signal::Activated(ButtonRole::Cancel)]
            }
            InputEvent::KeyDown(Key::Enter) => vec![Signal::Activated(ButtonRole::Confirm)],
            _ => self
                .controls
                .iter_mut()
                .filter_map(|(_, control)| control.handle_pointer(event, pointer))
                .collect(),
        };

        for signal in signals {
            self.outcome = self.apply(signal);
            if self.outcome.is_terminal() {
                break;
            }
        }
        self.outcome
    }

    fn apply(&self, signal: Signal) -> Outcome {
        match signal {
            Signal::ValueCommitted(color) => Outcome::Committed(color),
            Signal::Activated(ButtonRole::Confirm) => match self.selected() {
                Some(color) => Outcome::Committed(color),
                None => {
                    log::debug!("confirm pressed with nothing selected");
                    Outcome::Pending
                }
            },
            Signal::Activated(ButtonRole::Cancel) => Outcome::Cancelled,
        }
    }

    /// Draws whatever part of the dialog is out of date.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let style = Style {
            theme: &self.config.theme,
            font: self.font.as_ref(),
            font_size: self.config.font_size,
        };

        if self.frame_needs_redraw {
            self.frame_needs_redraw = false;
            let theme = &self.config.theme;
            surface.fill_rect(self.dialog, theme.background);
            let title = self.config.title_rect().offset(self.dialog.origin());
            surface.fill_rect(title, theme.highlight);
            surface.stroke_rect(self.dialog, theme.foreground);
            if let Some(font) = style.font {
                draw_text(
                    surface,
                    title.center(),
                    &self.config.title,
                    font,
                    style.font_size,
                    theme.foreground,
                );
            }
        }

        for (_, control) in &mut self.controls {
            control.draw(surface, &style);
        }
    }

    fn redraw<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.repaint_background();
        self.draw(&mut host.surface());
        host.present();
    }

    /// Pumps host events until the outcome is terminal.
    ///
    /// The dialog's region stays reserved for the whole loop and is handed
    /// back on every exit path.
    pub fn run<H: Host + ?Sized>(mut self, host: &mut H) -> Outcome {
        log::debug!("opening colour picker at {:?}", self.dialog);
        let mut host = ReservedRegion::acquire(host, self.dialog);
        self.redraw(&mut *host);

        while !self.outcome.is_terminal() {
            let outcome = match host.wait_event() {
                Some(event) => {
                    let pointer = host.pointer_position();
                    self.handle_event(&event, pointer)
                }
                None => {
                    log::debug!("input source closed while the colour picker was open");
                    self.outcome = Outcome::Cancelled;
                    self.outcome
                }
            };
            if !outcome.is_terminal() {
                self.redraw(&mut *host);
            }
        }

        log::info!("colour picker closed: {:?}", self.outcome);
        self.outcome
    }
}

/// Opens the picker and blocks until the user commits a color or cancels.
///
/// Returns `None` on cancellation.
///
/// # Panics
///
/// Panics if `config.radius` is zero.
pub fn open_picker<H: Host + ?Sized>(
    host: &mut H,
    cache: &WheelCache,
    config: &LayoutConfig,
    initial: Option<Color>,
) -> Option<Color> {
    SelectionSession::new(host.surface_size(), cache, config, initial)
        .run(host)
        .color()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::PointerButton;
    use std::collections::VecDeque;

    const DOWN: InputEvent = InputEvent::PointerDown {
        button: PointerButton::Primary,
    };
    const UP: InputEvent = InputEvent::PointerUp {
        button: PointerButton::Primary,
    };

    const BACKDROP: Color = Color::new(10, 20, 30);

    /// Plays back a fixed script of events and records what the session did.
    struct ScriptedHost {
        width: usize,
        height: usize,
        frame: Vec<u8>,
        script: VecDeque<(InputEvent, Point)>,
        pointer: Point,
        reserved: Option<Rect>,
        reserved_history: Vec<Option<Rect>>,
        presents: usize,
    }

    impl ScriptedHost {
        fn new(script: Vec<(InputEvent, Point)>) -> Self {
            let (width, height) = (320, 240);
            Self {
                width,
                height,
                frame: vec![0; width * height * 4],
                script: script.into(),
                pointer: Point::default(),
                reserved: Some(Rect::new(0, 0, 1, 1)),
                reserved_history: Vec::new(),
                presents: 0,
            }
        }
    }

    impl Host for ScriptedHost {
        fn surface_size(&self) -> (usize, usize) {
            (self.width, self.height)
        }

        fn surface(&mut self) -> Canvas<'_> {
            Canvas::new(&mut self.frame, self.width, self.height)
        }

        fn wait_event(&mut self) -> Option<InputEvent> {
            let (event, pointer) = self.script.pop_front()?;
            self.pointer = pointer;
            Some(event)
        }

        fn pointer_position(&self) -> Point {
            self.pointer
        }

        fn repaint_background(&mut self) {
            let reserved = self.reserved;
            let mut canvas = Canvas::new(&mut self.frame, self.width, self.height);
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    if !reserved.is_some_and(|r| r.contains(Point::new(x, y))) {
                        canvas.set_pixel(x, y, BACKDROP);
                    }
                }
            }
        }

        fn reserved_region(&self) -> Option<Rect> {
            self.reserved
        }

        fn set_reserved_region(&mut self, region: Option<Rect>) {
            self.reserved_history.push(region);
            self.reserved = region;
        }

        fn present(&mut self) {
            self.presents += 1;
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig::builder().radius(60).build()
    }

    /// Dialog is 136x164, centered on 320x240 at (92, 38).
    fn wheel_center(config: &LayoutConfig) -> Point {
        let dialog = Rect::centered_in(320, 240, config.dialog_size().0, config.dialog_size().1);
        config.wheel_rect().offset(dialog.origin()).center()
    }

    fn button_center(config: &LayoutConfig, rect: Rect) -> Point {
        let dialog = Rect::centered_in(320, 240, config.dialog_size().0, config.dialog_size().1);
        rect.offset(dialog.origin()).center()
    }

    fn click(at: Point) -> Vec<(InputEvent, Point)> {
        vec![(DOWN, at), (UP, at)]
    }

    #[test]
    fn test_wheel_click_commits_immediately() {
        let config = config();
        let east = Point::new(wheel_center(&config).x + 60, wheel_center(&config).y);
        let mut script = click(east);
        script.extend(click(button_center(&config, config.cancel_rect())));
        let mut host = ScriptedHost::new(script);

        let picked = open_picker(&mut host, &WheelCache::new(), &config, None);
        assert_eq!(picked, Some(Color::new(255, 0, 0)));
        // The wheel commits on the down event; everything after stays queued.
        assert_eq!(host.script.len(), 3);
    }

    #[test]
    fn test_cancel_flow() {
        let config = config();
        let mut host = ScriptedHost::new(click(button_center(&config, config.cancel_rect())));
        let picked = open_picker(&mut host, &WheelCache::new(), &config, None);
        assert_eq!(picked, None);
        assert!(host.script.is_empty());
    }

    #[test]
    fn test_confirm_without_selection_stays_pending() {
        let config = config();
        let cache = WheelCache::new();
        let mut session = SelectionSession::new((320, 240), &cache, &config, None);
        let confirm = button_center(&config, config.confirm_rect());

        assert_eq!(session.handle_event(&DOWN, confirm), Outcome::Pending);
        assert_eq!(session.handle_event(&UP, confirm), Outcome::Pending);
        assert_eq!(
            session.handle_event(&InputEvent::KeyDown(Key::Enter), confirm),
            Outcome::Pending
        );
    }

    #[test]
    fn test_confirm_without_selection_keeps_looping() {
        let config = config();
        let mut script = click(button_center(&config, config.confirm_rect()));
        script.extend(click(button_center(&config, config.cancel_rect())));
        let mut host = ScriptedHost::new(script);

        let outcome = SelectionSession::new((320, 240), &WheelCache::new(), &config, None)
            .run(&mut host);
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(host.script.is_empty());
    }

    #[test]
    fn test_confirm_after_click_keeps_color() {
        let config = config();
        let cache = WheelCache::new();
        let mut session = SelectionSession::new((320, 240), &cache, &config, None);
        let center = wheel_center(&config);
        let west = Point::new(center.x - 60, center.y);
        let cyan = Color::new(0, 255, 255);

        assert_eq!(session.handle_event(&DOWN, west), Outcome::Committed(cyan));
        let confirm = button_center(&config, config.confirm_rect());
        session.handle_event(&DOWN, confirm);
        assert_eq!(session.handle_event(&UP, confirm), Outcome::Committed(cyan));
        assert_eq!(session.selected(), Some(cyan));
    }

    #[test]
    fn test_initial_color_confirms() {
        let config = config();
        let initial = Color::new(12, 34, 56);
        let mut host = ScriptedHost::new(click(button_center(&config, config.confirm_rect())));
        let picked = open_picker(&mut host, &WheelCache::new(), &config, Some(initial));
        assert_eq!(picked, Some(initial));
    }

    #[test]
    fn test_dismissal_inputs_cancel() {
        let config = config();
        for event in [InputEvent::KeyDown(Key::Escape), InputEvent::CloseRequested] {
            let mut host = ScriptedHost::new(vec![(event, Point::default())]);
            let picked = open_picker(&mut host, &WheelCache::new(), &config, Some(Color::WHITE));
            assert_eq!(picked, None, "{event:?}");
        }
    }

    #[test]
    fn test_enter_confirms_selection() {
        let config = config();
        let mut host = ScriptedHost::new(vec![(InputEvent::KeyDown(Key::Enter), Point::default())]);
        let picked = open_picker(&mut host, &WheelCache::new(), &config, Some(Color::WHITE));
        assert_eq!(picked, Some(Color::WHITE));
    }

    #[test]
    fn test_exhausted_input_cancels() {
        let config = config();
        let mut host = ScriptedHost::new(vec![(InputEvent::PointerMoved, Point::default())]);
        let picked = open_picker(&mut host, &WheelCache::new(), &config, Some(Color::WHITE));
        assert_eq!(picked, None);
    }

    #[test]
    fn test_outside_clicks_are_ignored() {
        let config = config();
        let mut script = click(Point::new(2, 2));
        // Inside the dialog but between the buttons.
        let confirm = button_center(&config, config.confirm_rect());
        let cancel = button_center(&config, config.cancel_rect());
        script.extend(click(Point::new((confirm.x + cancel.x) / 2, confirm.y)));
        script.extend(click(cancel));
        let mut host = ScriptedHost::new(script);

        let outcome = SelectionSession::new((320, 240), &WheelCache::new(), &config, None)
            .run(&mut host);
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn test_reserved_region_restored_on_every_exit() {
        let config = config();
        let center = wheel_center(&config);
        let scripts = [
            click(center),
            click(button_center(&config, config.cancel_rect())),
            vec![(InputEvent::CloseRequested, Point::default())],
            Vec::new(),
        ];
        for script in scripts {
            let mut host = ScriptedHost::new(script);
            let previous = host.reserved;
            let session = SelectionSession::new((320, 240), &WheelCache::new(), &config, None);
            let dialog = session.dialog_rect();
            session.run(&mut host);
            assert_eq!(host.reserved_history, vec![Some(dialog), previous]);
            assert_eq!(host.reserved, previous);
        }
    }

    #[test]
    fn test_dialog_survives_background_repaint() {
        let config = config();
        let center = wheel_center(&config);
        let mut host = ScriptedHost::new(vec![(InputEvent::Expose, Point::default())]);
        let mut session = SelectionSession::new((320, 240), &WheelCache::new(), &config, None);

        host.reserved = Some(session.dialog_rect());
        session.redraw(&mut host);
        session.handle_event(&InputEvent::Expose, Point::default());
        session.redraw(&mut host);

        let canvas = host.surface();
        assert_eq!(canvas.pixel(center.x, center.y), Some(Color::WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(BACKDROP));
        assert_eq!(canvas.pixel(92, 38), Some(config.theme.foreground));
        assert_eq!(host.presents, 2);
    }

    #[test]
    fn test_repaint_covers_pixels_past_dialog_edges() {
        let config = config();
        let mut host = ScriptedHost::new(Vec::new());
        let mut session = SelectionSession::new((320, 240), &WheelCache::new(), &config, None);
        let dialog = session.dialog_rect();

        host.reserved = Some(dialog);
        session.redraw(&mut host);
        host.repaint_background();

        let canvas = host.surface();
        // The column at right() and the row at bottom() are outside the dialog.
        assert_eq!(canvas.pixel(dialog.right(), 100), Some(BACKDROP));
        assert_eq!(canvas.pixel(150, dialog.bottom()), Some(BACKDROP));
        assert_eq!(
            canvas.pixel(dialog.right() - 1, 100),
            Some(config.theme.foreground)
        );
    }

    #[test]
    fn test_dialog_is_centered() {
        let config = config();
        let session = SelectionSession::new((320, 240), &WheelCache::new(), &config, None);
        assert_eq!(config.dialog_size(), (136, 164));
        assert_eq!(session.dialog_rect(), Rect::new(92, 38, 136, 164));
    }

    #[test]
    fn test_sessions_share_cached_wheel() {
        let config = config();
        let cache = WheelCache::new();
        for _ in 0..3 {
            let mut host = ScriptedHost::new(Vec::new());
            open_picker(&mut host, &cache, &config, None);
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(60));
    }
}
