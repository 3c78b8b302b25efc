pub mod driver;
pub mod error;
pub mod eval;
#[cfg(feature = "cli")]
pub mod logger;
pub mod movegen;
pub mod piece;
pub mod position;
pub mod search;
pub mod square;
pub mod tables;
pub mod tt;

pub use driver::Engine;
pub use error::EngineError;
