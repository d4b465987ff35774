//! Surface abstraction, the RGBA frame canvas and the geometry both share.

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::color::Color;
use crate::wheel::WheelBuffer;

// ============================================================================
// GEOMETRY
// ============================================================================

/// A pixel position on the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A `w × h` rectangle centered inside a `width × height` area.
    pub fn centered_in(width: usize, height: usize, w: i32, h: i32) -> Self {
        let x = (width as i32 - w) / 2;
        let y = (height as i32 - h) / 2;
        Self::new(x, y, w, h)
    }

    pub const fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }

    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn center(self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// Half-open: `right()` and `bottom()` lie outside, matching the pixels
    /// [`Surface::fill_rect`] covers.
    pub const fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Like [`contains`](Self::contains) but with the far edges inside too,
    /// so a point one radius east of a wheel's center still hits the wheel.
    pub const fn contains_inclusive(self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// Pixel-level drawing target supplied by the host.
///
/// Writes outside the surface are dropped silently.
pub trait Surface {
    fn size(&self) -> (usize, usize);

    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    fn pixel(&self, x: i32, y: i32) -> Option<Color>;

    /// Blends `color` over the existing pixel with coverage `alpha` in `[0, 1]`.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if alpha >= 0.5 {
            self.set_pixel(x, y, color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (width, height) = self.size();
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(width as i32);
        let y1 = rect.bottom().min(height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// One-pixel outline just inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0 || rect.h <= 0 {
            return;
        }
        for x in rect.x..rect.right() {
            self.set_pixel(x, rect.y, color);
            self.set_pixel(x, rect.bottom() - 1, color);
        }
        for y in rect.y..rect.bottom() {
            self.set_pixel(rect.x, y, color);
            self.set_pixel(rect.right() - 1, y, color);
        }
    }

    /// Copies a wheel buffer with its top-left corner at `origin`, leaving
    /// out-of-wheel pixels untouched.
    fn blit(&mut self, buffer: &WheelBuffer, origin: Point) {
        for (row, pixels) in buffer.rows().enumerate() {
            for (col, pixel) in pixels.iter().enumerate() {
                if let Some(color) = pixel {
                    self.set_pixel(origin.x + col as i32, origin.y + row as i32, *color);
                }
            }
        }
    }
}

// ============================================================================
// RGBA FRAME CANVAS
// ============================================================================

/// A [`Surface`] over an RGBA8 frame, row-major, as handed out by `pixels`.
#[derive(Debug)]
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    /// # Panics
    ///
    /// Panics if `frame` is shorter than `width × height × 4` bytes.
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        assert!(
            frame.len() >= width * height * 4,
            "frame of {} bytes cannot hold {width}x{height} RGBA pixels",
            frame.len()
        );
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let (r, g, b) = color.as_tuple();
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[r, g, b, 0xff]);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * 4)
    }
}

impl Surface for Canvas<'_> {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            let (r, g, b) = color.as_tuple();
            self.frame[idx..idx + 4].copy_from_slice(&[r, g, b, 0xff]);
        }
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        Some(Color::new(
            self.frame[idx],
            self.frame[idx + 1],
            self.frame[idx + 2],
        ))
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let (r, g, b) = color.as_tuple();
        for (channel, src) in self.frame[idx..idx + 3].iter_mut().zip([r, g, b]) {
            *channel = (f32::from(src) * a + f32::from(*channel) * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Draws `text` centered on `center`, blending glyph coverage over the surface.
pub fn draw_text(
    surface: &mut dyn Surface,
    center: Point,
    text: &str,
    font: &Font<'_>,
    size: f32,
    color: Color,
) {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let offset_x = center.x - (max_x - min_x) / 2;
    let offset_y = center.y - (max_y - min_y) / 2;

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                surface.blend_pixel(px, py, color, coverage);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> Vec<u8> {
        vec![0; width * height * 4]
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Point::new(10, 10)));
        assert!(rect.contains(Point::new(29, 29)));
        assert!(!rect.contains(Point::new(30, 20)));
        assert!(!rect.contains(Point::new(20, 30)));
        assert!(!rect.contains(Point::new(20, 9)));
        assert_eq!(rect.center(), Point::new(20, 20));
    }

    #[test]
    fn test_rect_contains_inclusive_edges() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains_inclusive(Point::new(10, 10)));
        assert!(rect.contains_inclusive(Point::new(30, 30)));
        assert!(!rect.contains_inclusive(Point::new(31, 20)));
        assert!(!rect.contains_inclusive(Point::new(20, 9)));
    }

    #[test]
    fn test_contains_matches_fill_rect() {
        let mut data = frame(12, 12);
        let mut canvas = Canvas::new(&mut data, 12, 12);
        let rect = Rect::new(2, 3, 6, 5);
        canvas.fill_rect(rect, Color::WHITE);
        for y in 0..12 {
            for x in 0..12 {
                let filled = canvas.pixel(x, y) == Some(Color::WHITE);
                assert_eq!(rect.contains(Point::new(x, y)), filled, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_centered_in() {
        assert_eq!(Rect::centered_in(100, 80, 40, 20), Rect::new(30, 30, 40, 20));
        // Larger than the area: the origin goes negative rather than clamping.
        assert_eq!(Rect::centered_in(10, 10, 20, 20), Rect::new(-5, -5, 20, 20));
    }

    #[test]
    fn test_set_pixel_ignores_out_of_bounds() {
        let mut data = frame(4, 4);
        let mut canvas = Canvas::new(&mut data, 4, 4);
        canvas.set_pixel(-1, 0, Color::WHITE);
        canvas.set_pixel(4, 0, Color::WHITE);
        canvas.set_pixel(0, 4, Color::WHITE);
        canvas.set_pixel(3, 3, Color::WHITE);
        assert_eq!(canvas.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 3), None);
        assert_eq!(data.iter().filter(|&&b| b == 0xff).count(), 4);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut data = frame(8, 8);
        let mut canvas = Canvas::new(&mut data, 8, 8);
        canvas.fill_rect(Rect::new(-4, 6, 6, 10), Color::new(1, 2, 3));
        assert_eq!(canvas.pixel(0, 6), Some(Color::new(1, 2, 3)));
        assert_eq!(canvas.pixel(1, 7), Some(Color::new(1, 2, 3)));
        assert_eq!(canvas.pixel(2, 7), Some(Color::BLACK));
        assert_eq!(canvas.pixel(0, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_stroke_rect_leaves_inside() {
        let mut data = frame(6, 6);
        let mut canvas = Canvas::new(&mut data, 6, 6);
        canvas.stroke_rect(Rect::new(1, 1, 4, 4), Color::WHITE);
        assert_eq!(canvas.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(Color::BLACK));
        assert_eq!(canvas.pixel(5, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_blit_skips_out_of_wheel_pixels() {
        let buffer = WheelBuffer::render(4);
        let mut data = frame(10, 10);
        let mut canvas = Canvas::new(&mut data, 10, 10);
        let panel = Color::new(160, 160, 160);
        canvas.clear(panel);
        canvas.blit(&buffer, Point::new(1, 1));

        // Corner of the buffer is outside the circle and keeps the panel.
        assert_eq!(canvas.pixel(1, 1), Some(panel));
        // Center of the wheel.
        assert_eq!(canvas.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(canvas.pixel(1, 5), Some(Color::new(0, 255, 255)));
    }

    #[test]
    fn test_blend_pixel() {
        let mut data = frame(1, 1);
        let mut canvas = Canvas::new(&mut data, 1, 1);
        canvas.blend_pixel(0, 0, Color::new(200, 100, 0), 0.5);
        assert_eq!(canvas.pixel(0, 0), Some(Color::new(100, 50, 0)));
        canvas.blend_pixel(0, 0, Color::WHITE, 1.0);
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_short_frame_panics() {
        let mut data = vec![0; 3];
        let _ = Canvas::new(&mut data, 1, 1);
    }
}
