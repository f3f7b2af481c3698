//! Metric name alphabet.
//!
//! Names are restricted to `[A-Za-z0-9_]+`. Together with the hex varints
//! and the record tags this keeps every frame free of quotes, backslashes
//! and control characters.

/// Whether `b` may appear in a metric name.
#[inline]
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte index of the first character not allowed in a metric name.
pub fn first_illegal_index(name: &str) -> Option<usize> {
    name.bytes().position(|b| !is_name_byte(b))
}

/// Whether `name` is a non-empty, legal metric name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && first_illegal_index(name).is_none()
}
