/// A decoded structured value.
///
/// This is the in-memory form every input codec decodes into and every
/// output path (text dump, binary re-encode) consumes. Ownership follows
/// the driver contract: the decoder builds the tree incrementally inside
/// its own state, and the completed tree transfers to the driver's caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A signed integer, decoded from 0–8 big-endian payload bytes.
    Integer(i64),
    /// An opaque octet string.
    Bytes(Vec<u8>),
    /// A UTF-8 string.
    Text(String),
    /// The null element; carries no payload.
    Null,
    /// An ordered sequence of child values.
    Sequence(Vec<Value>),
}
