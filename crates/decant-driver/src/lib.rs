#![warn(clippy::pedantic)]

pub mod driver;
pub mod error;
pub mod source;

pub use driver::DecodeDriver;
pub use error::DriverError;
pub use source::ChunkSource;
