//! Configuration for cloudx
//!
//! Global configuration lives at `~/.config/cloudx/config.toml` and tells the
//! client where the container backend is and how eagerly to refresh it.

mod error;
mod global;

pub use error::*;
pub use global::*;
