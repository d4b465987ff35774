//! Layout and theme configuration for the picker dialog.

use bon::Builder;
use rusttype::Font;
use thiserror::Error;

use crate::canvas::Rect;
use crate::color::Color;

/// Colors used to paint the dialog chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub foreground: Color,
    pub background: Color,
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::new(0x00, 0x00, 0x00),
            background: Color::new(0xa0, 0xa0, 0xa0),
            highlight: Color::new(0xd0, 0xd0, 0xe0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("wheel radius must be positive")]
    ZeroRadius,
    #[error("wheel radius {radius} is too large to lay out")]
    RadiusTooLarge { radius: u32 },
    #[error("{name} must not be negative, got {value}")]
    NegativeMetric { name: &'static str, value: i32 },
    #[error("font data could not be parsed")]
    InvalidFont,
    #[error("dialog needs {needed_w}x{needed_h} pixels but the surface is {width}x{height}")]
    DialogTooLarge {
        needed_w: i32,
        needed_h: i32,
        width: usize,
        height: usize,
    },
}

/// Dialog geometry and labels.
///
/// ```
/// use colorwheel::LayoutConfig;
///
/// let config = LayoutConfig::builder().radius(64).build();
/// assert_eq!(config.dialog_size(), (144, 172));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct LayoutConfig {
    #[builder(default = 88)]
    pub radius: u32,
    /// Gap between the dialog border and its contents.
    #[builder(default = 8)]
    pub margin: i32,
    #[builder(default = 12)]
    pub title_height: i32,
    /// Vertical space between the wheel and the button row.
    #[builder(default = 4)]
    pub button_gap: i32,
    #[builder(default = 60)]
    pub button_width: i32,
    #[builder(default = 12)]
    pub button_height: i32,

    #[builder(default = "Colour Wheel".to_string())]
    pub title: String,
    #[builder(default = "OK".to_string())]
    pub confirm_label: String,
    #[builder(default = "Cancel".to_string())]
    pub cancel_label: String,

    /// TrueType/OpenType data for the title and button labels. Labels are
    /// skipped when absent.
    pub font_data: Option<Vec<u8>>,
    #[builder(default = 11.0)]
    pub font_size: f32,

    #[builder(default)]
    pub theme: Theme,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LayoutConfig {
    /// Checks the configuration on its own, independent of any surface.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a zero radius, a negative metric, a
    /// dialog whose size does not fit in `i32`, or font data that does not
    /// parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        let metrics = [
            ("margin", self.margin),
            ("title_height", self.title_height),
            ("button_gap", self.button_gap),
            ("button_width", self.button_width),
            ("button_height", self.button_height),
        ];
        if let Some(&(name, value)) = metrics.iter().find(|(_, value)| *value < 0) {
            return Err(ConfigError::NegativeMetric { name, value });
        }
        if self.checked_dialog_size().is_none() {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.radius,
            });
        }
        if self.font_data.is_some() && self.font().is_none() {
            return Err(ConfigError::InvalidFont);
        }
        Ok(())
    }

    /// [`validate`](Self::validate), then checks that the dialog fits on a
    /// `width × height` surface.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DialogTooLarge`] when it does not fit, or any
    /// error from `validate`.
    pub fn validate_for_surface(&self, width: usize, height: usize) -> Result<(), ConfigError> {
        self.validate()?;
        let (needed_w, needed_h) = self.dialog_size();
        if needed_w as usize > width || needed_h as usize > height {
            return Err(ConfigError::DialogTooLarge {
                needed_w,
                needed_h,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Parses [`font_data`](Self::font_data), if any.
    pub fn font(&self) -> Option<Font<'_>> {
        self.font_data
            .as_deref()
            .and_then(Font::try_from_bytes)
    }

    /// Side of the wheel's square.
    ///
    /// # Panics
    ///
    /// Panics if `2 × radius` does not fit in `i32`; [`validate`](Self::validate)
    /// rejects such configurations.
    pub fn wheel_size(&self) -> i32 {
        self.checked_wheel_size()
            .unwrap_or_else(|| panic!("wheel radius {} is too large", self.radius))
    }

    /// Width and height of the whole dialog, chrome included.
    ///
    /// # Panics
    ///
    /// Panics if either dimension does not fit in `i32`;
    /// [`validate`](Self::validate) rejects such configurations.
    pub fn dialog_size(&self) -> (i32, i32) {
        self.checked_dialog_size()
            .unwrap_or_else(|| panic!("dialog for wheel radius {} is too large", self.radius))
    }

    fn checked_wheel_size(&self) -> Option<i32> {
        i32::try_from(self.radius).ok()?.checked_mul(2)
    }

    fn checked_dialog_size(&self) -> Option<(i32, i32)> {
        let wheel = self.checked_wheel_size()?;
        let w = wheel.checked_add(self.margin.checked_mul(2)?)?;
        let h = [
            self.title_height,
            wheel,
            self.button_gap,
            self.button_height,
            self.margin,
        ]
        .into_iter()
        .try_fold(self.margin, i32::checked_add)?;
        Some((w, h))
    }

    /// The title strip, relative to the dialog's top-left corner.
    pub fn title_rect(&self) -> Rect {
        let (w, _) = self.dialog_size();
        Rect::new(0, 0, w, self.margin + self.title_height)
    }

    /// The wheel's square, relative to the dialog's top-left corner.
    pub fn wheel_rect(&self) -> Rect {
        let size = self.wheel_size();
        Rect::new(self.margin, self.margin + self.title_height, size, size)
    }

    /// Confirm sits under the left quarter of the dialog.
    pub fn confirm_rect(&self) -> Rect {
        self.button_rect(1)
    }

    /// Cancel sits under the right quarter of the dialog.
    pub fn cancel_rect(&self) -> Rect {
        self.button_rect(3)
    }

    fn button_rect(&self, quarter: i32) -> Rect {
        let (w, _) = self.dialog_size();
        let y = self.wheel_rect().bottom() + self.button_gap;
        let x = (i64::from(quarter) * i64::from(w) / 4) as i32 - self.button_width / 2;
        Rect::new(x, y, self.button_width, self.button_height)
    }
}
