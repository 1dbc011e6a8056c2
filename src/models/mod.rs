pub mod asset;
pub mod batch;
pub mod page_range;

pub use asset::Asset;
pub use batch::BatchReport;
pub use page_range::parse_page_range;
