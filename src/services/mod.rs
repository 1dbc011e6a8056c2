pub mod auto_paste;
pub mod hotkey;

pub use auto_paste::AutoPasteService;
pub use hotkey::{HotkeyEvent, HotkeyWatcher};
