//! Editable HL7 v2 messages for the Medi standard library
//!
//! Raw pipe-delimited text is parsed into an ordered list of segments. Each
//! segment holds a field → repetition → component → sub-component tree that
//! is read and written through dotted addresses such as `PID.5.1`. Segments
//! are referenced by stable [`SegmentId`] handles, so they can be inserted,
//! moved and deleted while other handles stay valid. `build` turns the
//! current state back into wire text.
//!
//! ```
//! use medi_hl7::{Message, ResetRules, ReindexOptions};
//!
//! let mut message = Message::new("MSH|^~\\&|APP\rORC|NW\rOBX|9\rOBX|9").unwrap();
//! let rules = ResetRules::new().with_rule("OBX", &["ORC"]).unwrap();
//! message.reindex(&rules, &ReindexOptions::default()).unwrap();
//! assert_eq!(message.build(), "MSH|^~\\&|APP\r\nORC|NW\r\nOBX|1\r\nOBX|2");
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod address;
pub mod collection;
pub mod error;
pub mod message;
pub mod options;
pub mod reindex;
pub mod segment;
pub mod tokenizer;

// Re-export the main types for convenience
pub use address::{Address, Index, SegmentType, HEADER_SEGMENT_TYPE, KNOWN_SEGMENT_TYPES};
pub use collection::{SegmentId, SegmentList};
pub use error::{Hl7Error, Hl7Result};
pub use message::Message;
pub use options::{Delimiters, LineEnding, ParseOptions, SegmentTerminator};
pub use reindex::{ReindexOptions, ResetRules};
pub use segment::{Segment, MAX_WRITE_POSITION};
