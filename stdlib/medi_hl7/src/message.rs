use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::collection::SegmentList;
use crate::error::{Hl7Error, Hl7Result};
use crate::options::ParseOptions;
use crate::reindex::{reindex, ReindexOptions, ResetRules};
use crate::tokenizer::{build, parse_message};

/// A parsed HL7 message: the raw input, its options and the editable segments.
///
/// The raw text is parsed once, on construction. [`Message::build`] always
/// serializes the current segments, never the raw input.
#[derive(Debug, Clone)]
pub struct Message {
    raw: String,
    options: ParseOptions,
    segments: SegmentList,
}

impl Message {
    /// Parse with the default delimiters and terminators
    pub fn new(raw: impl Into<String>) -> Hl7Result<Self> {
        Self::with_options(raw, ParseOptions::default())
    }

    pub fn with_options(raw: impl Into<String>, options: ParseOptions) -> Hl7Result<Self> {
        options.validate()?;
        let raw = raw.into();
        let segments = parse_message(&raw, &options)?;
        debug!("message ready with {} segments", segments.len());

        Ok(Self {
            segments: SegmentList::from_segments(options.delimiters, segments),
            raw,
            options,
        })
    }

    /// The text this message was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut SegmentList {
        &mut self.segments
    }

    /// Serialize the current segments with the configured line ending
    pub fn build(&self) -> String {
        build(self.segments.iter().map(|(_, s)| s), self.options.line_ending)
    }

    /// Renumber counted segment types; see [`crate::reindex::reindex`]
    pub fn reindex(&mut self, rules: &ResetRules, options: &ReindexOptions) -> Hl7Result<()> {
        reindex(&mut self.segments, rules, options)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl FromStr for Message {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::new(s)
    }
}
