pub mod lines;

pub use lines::LineStore;
