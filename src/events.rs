mod observers;
mod pointer;

pub use observers::{wire_reduced_motion, wire_theme_observer, wire_visibility};
pub use pointer::wire_pointer;
