//! Field-merge policy for partial extractions
//!
//! The first detail-page pass is authoritative over list-page values. Every later pass
//! only fills fields that are still unknown, so the first source that finds a value
//! keeps it.

use super::{FieldName, Record};

/// How incoming values are applied to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Overwrite any field whenever the incoming value is known
    Authoritative,

    /// Only write fields that are currently unknown in the target
    GapFill,
}

impl Record {
    /// Merges known values from `incoming` into this record
    ///
    /// Unknown incoming values are always ignored, so merging never clears a field.
    ///
    /// # Returns
    ///
    /// The number of fields whose value actually changed
    pub fn merge(&mut self, incoming: &Record, mode: MergeMode) -> usize {
        let mut changed = 0;

        for field in FieldName::ALL {
            let Some(value) = incoming.get(field) else {
                continue;
            };

            let slot = &mut self.values[field.index()];
            let write = match mode {
                MergeMode::Authoritative => slot.as_deref() != Some(value),
                MergeMode::GapFill => slot.is_none(),
            };

            if write {
                *slot = Some(value.to_string());
                changed += 1;
            }
        }

        changed
    }
}
