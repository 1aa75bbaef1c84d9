//! Container control logic for cloudx
//!
//! This crate provides:
//! - Inventory loading with ordered loading/empty/table display states
//! - Row views: a pure mapping from records to status icons, age labels and buttons
//! - Lifecycle dispatch (stop/restart/delete) with busy triggers and delayed refresh
//! - The log viewer state machine with clipboard copy and file export
//! - HTML rendering of row views

mod clipboard;
mod dispatch;
mod error;
pub mod html;
mod inventory;
mod logs;
mod notify;
mod row;

pub use clipboard::*;
pub use dispatch::*;
pub use error::*;
pub use inventory::*;
pub use logs::*;
pub use notify::*;
pub use row::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
