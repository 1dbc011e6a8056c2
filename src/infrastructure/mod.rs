pub mod assets;
pub mod automation;
pub mod clipboard;
pub mod keyboard;
