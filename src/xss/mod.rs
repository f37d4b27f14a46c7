//! XSS payload injection: combination dispatch and resume bookkeeping

pub mod driver;
pub mod processed;

pub use driver::{DriverOptions, InjectionDriver, InjectionStats};
pub use processed::ProcessedSet;
