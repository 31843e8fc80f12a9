pub mod capture;
pub mod config;
pub mod constants;
pub mod driver;
pub mod effect;
pub mod envmap;
pub mod field;
pub mod gate;
pub mod noise;
pub mod palette;
pub mod profiler;
pub mod raymarch;
pub mod state;

pub use capture::*;
pub use config::*;
pub use driver::*;
pub use effect::*;
pub use envmap::*;
pub use gate::*;
pub use palette::*;
pub use profiler::*;
pub use state::*;
