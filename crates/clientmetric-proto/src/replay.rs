//! Consumer-side reconstruction of metric values from delta frames.
//!
//! A consumer reads frames in the order they were produced and applies each
//! one. To recover a metric's name it must have seen a name record for the
//! metric's wire ID; producers repeat those records periodically, so a
//! consumer starting mid-stream only needs a bounded window of history.

use std::collections::{BTreeMap, HashMap};

use crate::reader::RecordReader;
use crate::record::Record;
use crate::Error;

/// Metric values reconstructed from a stream of delta frames.
#[derive(Debug, Default, Clone)]
pub struct ReplayState {
    names: HashMap<i64, String>,
    ids: HashMap<String, i64>,
    values: BTreeMap<i64, i64>,
    frames: usize,
}

impl ReplayState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every record of `frame`, returning how many were applied.
    ///
    /// Records before a malformed one stay applied.
    pub fn apply_frame(&mut self, frame: &str) -> Result<usize, Error> {
        let mut pending: Option<&str> = None;
        let mut applied = 0;

        for record in RecordReader::new(frame) {
            match record? {
                Record::Name { name } => {
                    if let Some(previous) = pending {
                        return Err(Error::DanglingName(previous.to_string()));
                    }
                    pending = Some(name);
                }
                Record::Set { wire_id, value } => {
                    if let Some(name) = pending.take() {
                        self.bind(wire_id, name);
                    }
                    self.values.insert(wire_id, value);
                }
                Record::Increment { wire_id, delta } => {
                    if let Some(name) = pending.take() {
                        self.bind(wire_id, name);
                    }
                    let value = self.values.entry(wire_id).or_insert(0);
                    *value = value.wrapping_add(delta);
                }
            }
            applied += 1;
        }

        if let Some(name) = pending {
            return Err(Error::DanglingName(name.to_string()));
        }
        if applied > 0 {
            self.frames += 1;
        }
        Ok(applied)
    }

    fn bind(&mut self, wire_id: i64, name: &str) {
        if let Some(old) = self.names.insert(wire_id, name.to_string()) {
            if old != name {
                self.ids.remove(&old);
            }
        }
        if let Some(old_id) = self.ids.insert(name.to_string(), wire_id) {
            if old_id != wire_id {
                self.names.remove(&old_id);
            }
        }
    }

    /// Current value of the metric called `name`.
    pub fn value(&self, name: &str) -> Option<i64> {
        let wire_id = self.ids.get(name)?;
        self.values.get(wire_id).copied()
    }

    /// Current value stored under `wire_id`, named or not.
    pub fn value_by_wire_id(&self, wire_id: i64) -> Option<i64> {
        self.values.get(&wire_id).copied()
    }

    /// Name bound to `wire_id`, if a name record for it has been seen.
    pub fn name_of(&self, wire_id: i64) -> Option<&str> {
        self.names.get(&wire_id).map(String::as_str)
    }

    /// Wire ID currently bound to `name`.
    pub fn wire_id_of(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    /// Named metrics and their values, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.values
            .iter()
            .filter_map(|(id, value)| self.names.get(id).map(|name| (name.clone(), *value)))
            .collect()
    }

    /// Wire IDs that carry values but have never been named.
    pub fn unnamed(&self) -> BTreeMap<i64, i64> {
        self.values
            .iter()
            .filter(|(id, _)| !self.names.contains_key(id))
            .map(|(id, value)| (*id, *value))
            .collect()
    }

    /// Number of non-empty frames applied.
    pub fn frames(&self) -> usize {
        self.frames
    }
}
