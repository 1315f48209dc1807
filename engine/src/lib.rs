pub mod logger;
pub mod config;
pub mod games;

mod error;

pub use error::GameError;
