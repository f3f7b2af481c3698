//! Client metrics delta protocol.
//!
//! This crate defines the compact text encoding used to ship changes in
//! client metrics to a remote log sink, along with a reader and a replay
//! state for consumers of that stream.
//!
//! # Modules
//!
//! - [`varint`] - Zigzag varints rendered as lowercase hex
//! - [`record`] - Record types and the frame writer
//! - [`reader`] - Sequential record parsing
//! - [`replay`] - Reconstructing metric values from frames
//! - [`name`] - The metric name alphabet
//! - [`error`] - Protocol error types
//!
//! # Encoding
//!
//! Frames use only `N`, `S`, `I`, lowercase hex digits and metric name
//! characters (`[A-Za-z0-9_]`), so they can be embedded in a JSON string
//! literal without escaping:
//!
//! ```
//! use clientmetric_proto::{ReplayState, RecordWriter};
//!
//! let mut writer = RecordWriter::new();
//! writer.write_name("foo_total");
//! writer.write_value(1, 10);
//! assert_eq!(writer.as_str(), "N12foo_totalS0214");
//!
//! let mut state = ReplayState::new();
//! state.apply_frame(writer.as_str()).unwrap();
//! assert_eq!(state.value("foo_total"), Some(10));
//! ```

pub mod error;
pub mod name;
pub mod reader;
pub mod record;
pub mod replay;
pub mod varint;

pub use error::Error;

// Re-export commonly used types at crate root
pub use name::{first_illegal_index, is_valid_name};
pub use reader::{read_records, RecordReader};
pub use record::{Record, RecordWriter};
pub use replay::ReplayState;
