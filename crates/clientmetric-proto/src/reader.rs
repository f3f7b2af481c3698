//! Sequential record reader.

use crate::name::is_valid_name;
use crate::record::{Record, INCREMENT_TAG, NAME_TAG, SET_TAG};
use crate::varint::read_hex_varint;
use crate::Error;

/// Iterates over the records of one delta frame.
///
/// Records are parsed in order until the input is exhausted. After the first
/// error the reader yields nothing further.
#[derive(Debug, Clone)]
pub struct RecordReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Create a reader over `frame`.
    pub fn new(frame: &'a str) -> Self {
        Self {
            input: frame,
            pos: 0,
        }
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_record(&mut self) -> Result<Record<'a>, Error> {
        let bytes = self.input.as_bytes();
        let offset = self.pos;
        let tag = bytes[offset];
        self.pos += 1;

        match tag {
            NAME_TAG => {
                let len = read_hex_varint(bytes, &mut self.pos)?;
                let len = usize::try_from(len).map_err(|_| Error::NegativeLength(len))?;
                let start = self.pos;
                let end = start
                    .checked_add(len)
                    .filter(|&end| end <= bytes.len())
                    .ok_or(Error::UnexpectedEof {
                        offset: bytes.len(),
                    })?;
                let name = self
                    .input
                    .get(start..end)
                    .filter(|name| is_valid_name(name))
                    .ok_or_else(|| {
                        Error::InvalidName(String::from_utf8_lossy(&bytes[start..end]).into_owned())
                    })?;
                self.pos = end;
                Ok(Record::Name { name })
            }
            SET_TAG => {
                let wire_id = read_hex_varint(bytes, &mut self.pos)?;
                let value = read_hex_varint(bytes, &mut self.pos)?;
                Ok(Record::Set { wire_id, value })
            }
            INCREMENT_TAG => {
                let wire_id = read_hex_varint(bytes, &mut self.pos)?;
                let delta = read_hex_varint(bytes, &mut self.pos)?;
                Ok(Record::Increment { wire_id, delta })
            }
            tag => Err(Error::UnknownRecord { tag, offset }),
        }
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<Record<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let record = self.read_record();
        if record.is_err() {
            self.pos = self.input.len();
        }
        Some(record)
    }
}

/// Parse every record of `frame`.
pub fn read_records(frame: &str) -> Result<Vec<Record<'_>>, Error> {
    RecordReader::new(frame).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordWriter;

    #[test]
    fn test_read_empty() {
        assert_eq!(read_records("").unwrap(), vec![]);
    }

    #[test]
    fn test_read_name_value_increment() {
        let records = read_records("N12foo_totalS0214I0207").unwrap();
        assert_eq!(
            records,
            vec![
                Record::Name { name: "foo_total" },
                Record::Set {
                    wire_id: 1,
                    value: 10
                },
                Record::Increment {
                    wire_id: 1,
                    delta: -4
                },
            ]
        );
    }

    #[test]
    fn test_read_writer_output() {
        let mut w = RecordWriter::new();
        w.write_name("a_b");
        w.write_value(7, i64::MIN);
        w.write_delta(7, i64::MAX);
        w.write_delta(300, -1);

        let records = read_records(w.as_str()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1], Record::Set { wire_id: 7, value: i64::MIN });
        assert_eq!(
            records[2],
            Record::Increment {
                wire_id: 7,
                delta: i64::MAX
            }
        );
        assert_eq!(
            records[3],
            Record::Increment {
                wire_id: 300,
                delta: -1
            }
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = read_records("S0214X").unwrap_err();
        assert_eq!(err, Error::UnknownRecord { tag: b'X', offset: 5 });
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let err = read_records("S0A14").unwrap_err();
        assert_eq!(err, Error::InvalidHex { offset: 1 });
        assert!(read_records("S0a14").is_ok());
    }

    #[test]
    fn test_truncated_name() {
        let err = read_records("N12foo").unwrap_err();
        assert_eq!(err, Error::UnexpectedEof { offset: 6 });
    }

    #[test]
    fn test_truncated_value() {
        let err = read_records("S02").unwrap_err();
        assert_eq!(err, Error::UnexpectedEof { offset: 3 });
    }

    #[test]
    fn test_negative_name_length() {
        let err = read_records("N01").unwrap_err();
        assert_eq!(err, Error::NegativeLength(-1));
    }

    #[test]
    fn test_illegal_name_bytes() {
        let err = read_records("N06a-b").unwrap_err();
        assert_eq!(err, Error::InvalidName("a-b".to_string()));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = RecordReader::new("Q0214S0214");
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
