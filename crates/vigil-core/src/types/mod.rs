//! Core types for vigil.

mod activity;
mod result;
mod window;

pub use activity::*;
pub use result::*;
pub use window::ActivityWindow;
