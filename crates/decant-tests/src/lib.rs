//! Shared fixtures for the decant integration tests and benchmarks.
//!
//! Everything here builds on the production `encode` path so the test
//! streams stay canonical: a fixture is a [`Value`] tree plus its exact
//! wire bytes.

use std::io::Cursor;

use decant_codec::{Value, encode};
use decant_driver::ChunkSource;

/// A value tree touching every element kind, including nesting.
#[must_use]
pub fn sample_value() -> Value {
    Value::Sequence(vec![
        Value::Integer(42),
        Value::Text("telemetry".to_owned()),
        Value::Bytes(vec![0x00, 0xFF, 0x7F]),
        Value::Null,
        Value::Sequence(vec![Value::Integer(-1), Value::Integer(1_000_000)]),
    ])
}

/// The canonical wire encoding of [`sample_value`].
#[must_use]
pub fn sample_stream() -> Vec<u8> {
    encode(&sample_value())
}

/// A flat sequence of `items` integers, sized for benchmarks and for
/// forcing the accumulation buffer through growth.
#[must_use]
pub fn large_stream(items: i64) -> Vec<u8> {
    let values = (0..items).map(Value::Integer).collect();
    encode(&Value::Sequence(values))
}

/// An in-memory [`ChunkSource`].
#[must_use]
pub fn mem_source(name: &str, bytes: &[u8]) -> ChunkSource {
    ChunkSource::from_reader(name, Cursor::new(bytes.to_vec()))
}
