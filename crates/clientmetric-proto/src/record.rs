//! Delta frame records and the frame writer.
//!
//! A frame is a concatenation of records with no terminator or count:
//!
//! - name: `'N' + hex(varint(len(name))) + name`, binding `name` to the
//!   wire ID of the record that immediately follows
//! - set: `'S' + hex(varint(wire_id)) + hex(varint(value))`
//! - increment: `'I' + hex(varint(wire_id)) + hex(varint(delta))`, a
//!   decrement when `delta` is negative

use serde::Serialize;

use crate::varint::push_hex_varint;

/// Tag byte of a name record.
pub const NAME_TAG: u8 = b'N';

/// Tag byte of a set (absolute value) record.
pub const SET_TAG: u8 = b'S';

/// Tag byte of an increment record.
pub const INCREMENT_TAG: u8 = b'I';

/// One record of a delta frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record<'a> {
    /// Names the wire ID of the next record.
    Name { name: &'a str },
    /// Sets a metric to an absolute value.
    Set { wire_id: i64, value: i64 },
    /// Adds a signed delta to a metric.
    Increment { wire_id: i64, delta: i64 },
}

impl Record<'_> {
    /// The record's tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Record::Name { .. } => NAME_TAG,
            Record::Set { .. } => SET_TAG,
            Record::Increment { .. } => INCREMENT_TAG,
        }
    }
}

/// Appends records to a frame buffer.
///
/// The buffer can be cleared and reused across frames.
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buf: String,
    records: usize,
}

impl RecordWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            records: 0,
        }
    }

    /// Write a name record.
    ///
    /// The caller is responsible for `name` being a legal metric name.
    pub fn write_name(&mut self, name: &str) {
        self.buf.push(char::from(NAME_TAG));
        push_hex_varint(&mut self.buf, name.len() as i64);
        self.buf.push_str(name);
        self.records += 1;
    }

    /// Write a set record: the metric with `wire_id` now has value `value`.
    pub fn write_value(&mut self, wire_id: i64, value: i64) {
        self.buf.push(char::from(SET_TAG));
        push_hex_varint(&mut self.buf, wire_id);
        push_hex_varint(&mut self.buf, value);
        self.records += 1;
    }

    /// Write an increment record: the metric with `wire_id` moved by `delta`.
    pub fn write_delta(&mut self, wire_id: i64, delta: i64) {
        self.buf.push(char::from(INCREMENT_TAG));
        push_hex_varint(&mut self.buf, wire_id);
        push_hex_varint(&mut self.buf, delta);
        self.records += 1;
    }

    /// Write any record.
    pub fn write_record(&mut self, record: &Record<'_>) {
        match *record {
            Record::Name { name } => self.write_name(name),
            Record::Set { wire_id, value } => self.write_value(wire_id, value),
            Record::Increment { wire_id, delta } => self.write_delta(wire_id, delta),
        }
    }

    /// Discard all written records, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.records = 0;
    }

    /// Number of records written since the last clear.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The encoded frame.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Take the encoded frame, consuming the writer.
    pub fn into_string(self) -> String {
        self.buf
    }
}
