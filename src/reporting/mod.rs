pub mod json;
pub mod summary;
pub mod text;

pub use summary::RunSummary;
