#![forbid(unsafe_code)]

pub mod adaptive;
pub mod assessment;
pub mod compare;
pub mod error;
pub mod fraction;
pub mod generator;
pub mod instruction;
pub mod metrics;
pub mod model;
pub mod phase;
pub mod settings;
pub mod time;

pub use error::Error;
pub use time::Clock;
