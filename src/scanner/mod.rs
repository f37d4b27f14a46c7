pub mod crawler;
pub mod markup;
pub mod params;
pub mod sitemap;

pub use crawler::{CrawlOutcome, CrawlStats, Crawler};
pub use params::{ExtractStats, ParamExtractor};
