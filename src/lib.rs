//! An HSV color wheel picker drawn into a plain RGBA frame.
//!
//! The wheel is rendered once per radius into a [`WheelBuffer`] and kept in a
//! [`WheelCache`]. [`open_picker`] shows it in a modal dialog on top of
//! whatever the [`Host`] draws, and blocks until the user clicks a color,
//! confirms or cancels.
//!
//! ```no_run
//! use colorwheel::{open_picker, Host, LayoutConfig, WheelCache};
//!
//! fn pick(host: &mut impl Host, cache: &WheelCache) {
//!     let config = LayoutConfig::builder().radius(64).build();
//!     match open_picker(host, cache, &config, None) {
//!         Some(color) => println!("picked {color}"),
//!         None => println!("cancelled"),
//!     }
//! }
//! ```

pub mod canvas;
pub mod color;
pub mod config;
pub mod session;
pub mod wheel;
pub mod widget;

pub use canvas::{Canvas, Point, Rect, Surface};
pub use color::{Color, ParseColorError, PolarSample};
pub use config::{ConfigError, LayoutConfig, Theme};
pub use session::{open_picker, Host, Outcome, ReservedRegion, SelectionSession};
pub use wheel::{WheelBuffer, WheelCache};
pub use widget::{InputEvent, Key, PointerButton};
