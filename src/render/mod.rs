//! Presentation: number and label formatting, colours and DOT output.

mod dot;
pub mod format;
mod palette;

pub use dot::{port_id, to_dot, Dot};
pub use palette::{scale_color, Palette};
