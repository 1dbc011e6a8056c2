mod paste;

pub use paste::OsPasteInjector;
