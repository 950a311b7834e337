#![warn(clippy::pedantic)]

//! Structured-value codecs for the decant converter.
//!
//! This crate defines the pluggable decoder capability the decode driver
//! calls into, plus the reference codecs that implement it:
//!
//! ```text
//!   ┌──────────────┬───────────────────────────────────────────────────┐
//!   │ Module       │ Responsibility                                    │
//!   ├──────────────┼───────────────────────────────────────────────────┤
//!   │ decoder      │ StreamDecoder trait, DecodeOutcome, CodecConfig   │
//!   │ value        │ The decoded structure: Value tree                 │
//!   │ varint       │ LEB128 length encoding shared by the TLV wire     │
//!   │ tlv          │ Incremental binary TLV decoder                    │
//!   │ hex          │ Hex-text front-end over the TLV decoder           │
//!   │ encode       │ One-shot Value → TLV bytes encoder                │
//!   │ render       │ Indented text dump of a Value tree                │
//!   │ error        │ CodecError                                        │
//!   └──────────────┴───────────────────────────────────────────────────┘
//! ```
//!
//! # The TLV wire format
//!
//! Every element is `tag (1 byte) + length (LEB128 varint) + payload`:
//!
//! ```text
//!   0x01 INTEGER   big-endian two's complement, 0–8 payload bytes
//!   0x02 BYTES     raw octets
//!   0x03 TEXT      UTF-8
//!   0x05 NULL      empty payload
//!   0x30 SEQUENCE  concatenated child elements, exactly `length` bytes
//! ```
//!
//! The format is self-delimiting, so a decoder fed an arbitrary prefix can
//! always tell "need more bytes" apart from "malformed".

pub mod decoder;
pub mod encode;
pub mod error;
pub mod hex;
pub mod render;
pub mod tlv;
pub mod value;
pub mod varint;

pub use decoder::{CodecConfig, DEFAULT_MAX_DEPTH, DecodeOutcome, StreamDecoder};
pub use encode::encode;
pub use error::CodecError;
pub use render::render_text;
pub use hex::HexDecoder;
pub use tlv::TlvDecoder;
pub use value::Value;
