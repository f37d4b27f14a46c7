pub mod client;
pub mod response;

pub use client::{ClientOptions, HttpClient};
pub use response::HttpResponse;
