mod writer;

pub use writer::SystemClipboardWriter;
