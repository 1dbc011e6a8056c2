//! pagepaste library
//!
//! Background-triggered batch clipboard automation for rendered document
//! pages: a global hotkey snapshots the scratch directory and drains it
//! through the system clipboard into whatever application holds focus.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod interface;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Setting;
pub use error::{AppError, Result};
pub use infrastructure::assets::AssetStore;
pub use models::{Asset, BatchReport};
pub use services::{AutoPasteService, HotkeyEvent, HotkeyWatcher};
