//! Application services
//!
//! Each service encapsulates business logic for a specific domain area.

pub mod session_driver;
pub mod weights;

pub use session_driver::{SessionDriver, SessionOptions};
pub use weights::{WeightFormat, WeightService};
