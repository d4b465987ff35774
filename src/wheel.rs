//! Pre-rendered HSV wheel buffers and the per-radius cache that owns them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::color::{Color, PolarSample};

/// A square `2r × 2r` grid holding the wheel's colors.
///
/// Pixels farther than `radius` from the center are `None` and must not be
/// drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelBuffer {
    radius: u32,
    pixels: Vec<Option<Color>>,
}

impl WheelBuffer {
    /// Renders the wheel for `radius`.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is zero.
    pub fn render(radius: u32) -> Self {
        assert!(radius > 0, "wheel radius must be positive");

        let side = radius as usize * 2;
        let r = f64::from(radius);
        let mut pixels = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                let dx = x as f64 - r;
                let dy = y as f64 - r;
                if dx.hypot(dy) > r {
                    pixels.push(None);
                } else {
                    pixels.push(Some(PolarSample::from_offset(dx, dy, r).to_color()));
                }
            }
        }

        Self { radius, pixels }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length in pixels, always twice the radius.
    pub fn side(&self) -> usize {
        self.radius as usize * 2
    }

    /// Color at `(x, y)`, or `None` outside the circle or outside the grid.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        let side = self.side();
        if x >= side || y >= side {
            return None;
        }
        self.pixels[y * side + x]
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Color>]> {
        self.pixels.chunks_exact(self.side())
    }
}

/// Render-once cache of wheel buffers keyed by radius.
///
/// Entries are immutable and never evicted. The check-then-insert happens
/// under one lock, so two widgets asking for the same radius concurrently
/// never render it twice.
#[derive(Debug, Default)]
pub struct WheelCache {
    buffers: Mutex<HashMap<u32, Arc<WheelBuffer>>>,
}

impl WheelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffer for `radius`, rendering it on first use.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is zero.
    pub fn get_or_render(&self, radius: u32) -> Arc<WheelBuffer> {
        // Buffers are never mutated after insertion, so a poisoned map is
        // still consistent.
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(buffer) = buffers.get(&radius) {
            log::trace!("colour wheel cache hit for radius {radius}");
            return Arc::clone(buffer);
        }

        log::debug!("rendering colour wheel for radius {radius}");
        let buffer = Arc::new(WheelBuffer::render(radius));
        buffers.insert(radius, Arc::clone(&buffer));
        buffer
    }

    pub fn contains(&self, radius: u32) -> bool {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&radius)
    }

    pub fn len(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
