//! Hierarchical renumbering of a set-ID style field.
//!
//! Each counted segment type keeps its own counter. A counter is written to
//! the configured field of every segment of its type and then incremented;
//! it returns to the start index whenever one of its boundary types is seen.
//! With `OBX: [ORC]`, observations are numbered 1, 2, ... within each order.

use std::collections::BTreeMap;

use log::debug;

use crate::address::{Address, Index, SegmentType};
use crate::collection::SegmentList;
use crate::error::{invalid_param, invalid_param_because, Hl7Result};
use crate::segment::check_write_address;

/// Counted segment types and the types that reset their counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetRules {
    rules: BTreeMap<SegmentType, Vec<SegmentType>>,
}

impl ResetRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `counted` segments, resetting on any of `boundaries`
    pub fn with_rule(mut self, counted: &str, boundaries: &[&str]) -> Hl7Result<Self> {
        self.insert(counted, boundaries)?;
        Ok(self)
    }

    /// Add or replace the rule for `counted`
    pub fn insert(&mut self, counted: &str, boundaries: &[&str]) -> Hl7Result<()> {
        let counted = SegmentType::new(counted).or_else(|_| {
            invalid_param_because("rules", counted, "Invalid counted segment type.")
        })?;
        let boundaries = boundaries
            .iter()
            .map(|code| {
                SegmentType::new(code).or_else(|_| {
                    invalid_param_because(
                        "rules",
                        code,
                        format!("Invalid boundary type for [{counted}]."),
                    )
                })
            })
            .collect::<Hl7Result<Vec<_>>>()?;
        self.rules.insert(counted, boundaries);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn boundaries(&self, counted: &SegmentType) -> Option<&[SegmentType]> {
        self.rules.get(counted).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentType, &[SegmentType])> {
        self.rules.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

/// Where counting starts and which field receives the number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexOptions {
    /// First number written after every reset. Must be at least 1.
    pub start_index: usize,
    /// `f` or `f.c`, relative to each counted segment
    pub field: String,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            start_index: 1,
            field: "1.1".to_string(),
        }
    }
}

/// Renumber `segments` in one ordered pass.
///
/// All arguments are checked before the first write, so a rejected call
/// leaves every segment untouched.
pub fn reindex(
    segments: &mut SegmentList,
    rules: &ResetRules,
    options: &ReindexOptions,
) -> Hl7Result<()> {
    if options.start_index == 0 {
        return invalid_param("start_index", options.start_index);
    }

    let mut counters: BTreeMap<&SegmentType, (Address, usize)> = BTreeMap::new();
    for (counted, _) in rules.iter() {
        let address = Address::with_field_path(counted, &options.field)?;
        check_write_address(&address)?;
        counters.insert(counted, (address, options.start_index));
    }

    // No counter can pass start_index + the number of counted segments
    let counted = segments
        .iter()
        .filter(|(_, s)| counters.contains_key(s.segment_type()))
        .count();
    if options.start_index.checked_add(counted).is_none() {
        return invalid_param_because(
            "start_index",
            options.start_index,
            format!("Numbering {counted} segments from it overflows."),
        );
    }

    let mut written = 0usize;
    for id in segments.ids() {
        let segment = segments.segment_mut(id)?;
        let segment_type = segment.segment_type().clone();

        if let Some((address, counter)) = counters.get_mut(&segment_type) {
            segment.write(address, &counter.to_string(), Index::At(0), Index::At(0))?;
            *counter += 1;
            written += 1;
        }

        for (counted, boundaries) in rules.iter() {
            if boundaries.contains(&segment_type) {
                if let Some((_, counter)) = counters.get_mut(counted) {
                    *counter = options.start_index;
                }
            }
        }
    }

    debug!(
        "reindexed {written} segments across {} counted types",
        counters.len()
    );
    Ok(())
}
