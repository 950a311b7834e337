#![warn(clippy::pedantic)]

pub mod buffer;

pub use buffer::GrowableBuffer;
