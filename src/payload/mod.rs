pub mod injector;
pub mod iterator;
pub mod loader;

pub use injector::{Combination, Modifier};
pub use iterator::Combinations;
pub use loader::{load_payloads, PayloadSet};
