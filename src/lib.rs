//! cde2d - continuous-time 2D collision detection engine
//!
//! Core modules:
//! - `sim`: Impact-time search and impulse resolution for segments and balls
//! - `settings`: Engine configuration (JSON-loadable)
//! - `error`: Engine error type

pub mod error;
pub mod settings;
pub mod sim;

pub use error::EngineError;
pub use settings::EngineSettings;
pub use sim::{Body, BodyHandle, Engine, FrameReport};

use glam::DVec2;

/// Engine configuration constants
pub mod consts {
    /// Bracket width (seconds) at which every time search stops
    pub const DEFAULT_EPSILON: f64 = 0.000_001;
    /// Golden ratio used to narrow the minimum-distance bracket
    pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;
    /// Upper bound on impacts resolved within one `advance` call
    pub const DEFAULT_MAX_IMPACTS: usize = 4096;
    /// Frame interval of the demo scene (20 Hz)
    pub const DEMO_FRAME_TIME: f64 = 1.0 / 20.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
