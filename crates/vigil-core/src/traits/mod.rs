//! Core traits for vigil collaborators.

mod history_source;

pub use history_source::*;
