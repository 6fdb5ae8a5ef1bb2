//! Parse and build configuration for HL7 messages.
//!
//! A message is read with one [`ParseOptions`] value for its whole lifetime:
//! the four structural delimiters, the pattern used to split raw text into
//! segments, and the single line ending written back by `build`.

use crate::error::{invalid_param_because, Hl7Result};

/// Placeholder for the escape character echoed in the header's encoding field
pub const ESCAPE_PLACEHOLDER: char = '\\';

/// The four single-character separators of the nested field structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Delimiters {
    /// Separates fields within a segment
    pub field: char,
    /// Separates repetitions of one field
    pub repetition: char,
    /// Separates components of one repetition
    pub component: char,
    /// Separates sub-components of one component
    pub sub_component: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            repetition: '~',
            component: '^',
            sub_component: '&',
        }
    }
}

impl Delimiters {
    /// The header's encoding-characters value: component, repetition,
    /// escape placeholder, sub-component.
    pub fn encoding_characters(&self) -> String {
        [
            self.component,
            self.repetition,
            ESCAPE_PLACEHOLDER,
            self.sub_component,
        ]
        .iter()
        .collect()
    }
}

/// How raw text is split into segment lines on read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentTerminator {
    /// CR, LF or CRLF
    #[default]
    Any,
    /// Only CRLF
    CrLf,
    /// Only LF
    Lf,
    /// Only CR
    Cr,
}

/// The terminator written between segments on build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
        }
    }
}

/// Full configuration for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    pub delimiters: Delimiters,
    pub terminator: SegmentTerminator,
    pub line_ending: LineEnding,
}

impl ParseOptions {
    pub fn with_field_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.field = delimiter;
        self
    }

    pub fn with_repetition_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.repetition = delimiter;
        self
    }

    pub fn with_component_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.component = delimiter;
        self
    }

    pub fn with_sub_component_delimiter(mut self, delimiter: char) -> Self {
        self.delimiters.sub_component = delimiter;
        self
    }

    pub fn with_terminator(mut self, terminator: SegmentTerminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Reject delimiter sets that cannot round-trip.
    ///
    /// The four delimiters must be distinct, must not be a line break and must
    /// not collide with the escape placeholder of the header's encoding field.
    pub fn validate(&self) -> Hl7Result<()> {
        let d = &self.delimiters;
        let named = [
            ("delimiters.field", d.field),
            ("delimiters.repetition", d.repetition),
            ("delimiters.component", d.component),
            ("delimiters.sub_component", d.sub_component),
        ];

        for (i, (name, ch)) in named.iter().enumerate() {
            if matches!(ch, '\r' | '\n') {
                return invalid_param_because(
                    name,
                    ch.escape_default(),
                    "Line breaks cannot be delimiters.",
                );
            }
            if *ch == ESCAPE_PLACEHOLDER {
                return invalid_param_because(
                    name,
                    ch.escape_default(),
                    "Reserved for the escape character.",
                );
            }
            if let Some((other, _)) = named[i + 1..].iter().find(|(_, c)| c == ch) {
                return invalid_param_because(name, ch, format!("Already used by '{other}'."));
            }
        }

        Ok(())
    }
}
