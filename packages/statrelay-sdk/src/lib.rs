pub mod client;
pub mod error;

pub use client::{ClientConfig, StatsClient};
pub use error::{SdkError, SdkResult};
pub use statrelay_core::*;
