//! Splits raw text into segments and nested field tokens, and joins them back.
//!
//! The split is a strict four level nesting on single characters:
//! field, repetition, component, sub-component. Delimiter characters inside
//! values are not escaped in either direction.

use log::debug;

use crate::address::{SegmentType, HEADER_SEGMENT_TYPE};
use crate::error::{Hl7Error, Hl7Result};
use crate::options::{Delimiters, LineEnding, ParseOptions, SegmentTerminator};
use crate::segment::{Component, Field, Repetition, Segment};

/// Split raw text into candidate segment lines
pub fn split_segments(raw: &str, terminator: SegmentTerminator) -> Vec<&str> {
    match terminator {
        SegmentTerminator::CrLf => raw.split("\r\n").collect(),
        SegmentTerminator::Lf => raw.split('\n').collect(),
        SegmentTerminator::Cr => raw.split('\r').collect(),
        SegmentTerminator::Any => {
            let bytes = raw.as_bytes();
            let mut lines = Vec::new();
            let mut start = 0;
            let mut i = 0;

            while i < bytes.len() {
                match bytes[i] {
                    b'\r' => {
                        lines.push(&raw[start..i]);
                        if bytes.get(i + 1) == Some(&b'\n') {
                            i += 1;
                        }
                        start = i + 1;
                    }
                    b'\n' => {
                        lines.push(&raw[start..i]);
                        start = i + 1;
                    }
                    _ => {}
                }
                i += 1;
            }

            lines.push(&raw[start..]);
            lines
        }
    }
}

/// Whether a line starts with a segment code followed by the field delimiter
pub fn is_segment_line(line: &str, field_delimiter: char) -> bool {
    let bytes = line.as_bytes();
    bytes.len() > 3
        && bytes[..3]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && line[3..].starts_with(field_delimiter)
}

/// Split one field token into repetitions, components and sub-components
pub fn parse_field(token: &str, delimiters: &Delimiters) -> Field {
    token
        .split(delimiters.repetition)
        .map(|rep| {
            rep.split(delimiters.component)
                .map(|comp| {
                    comp.split(delimiters.sub_component)
                        .map(|s| s.to_string())
                        .collect::<Component>()
                })
                .collect::<Repetition>()
        })
        .collect::<Field>()
}

/// Parse one segment line. The line must satisfy [`is_segment_line`].
pub fn parse_segment(line: &str, delimiters: &Delimiters) -> Hl7Result<Segment> {
    if !is_segment_line(line, delimiters.field) {
        return Err(Hl7Error::MalformedMessage(format!("Not a segment line: [{line}]")));
    }

    let segment_type = SegmentType::new(&line[..3])?;
    let body = &line[3 + delimiters.field.len_utf8()..];
    let mut fields: Vec<Field> = body
        .split(delimiters.field)
        .map(|token| parse_field(token, delimiters))
        .collect();

    // The header's encoding field always echoes the configured delimiters
    if segment_type.is_header() {
        if let Some(encoding) = fields.first_mut() {
            *encoding = vec![vec![vec![delimiters.encoding_characters()]]];
        }
    }

    Ok(Segment::from_fields(segment_type, *delimiters, fields))
}

/// Parse a whole message into its ordered segments
pub fn parse_message(raw: &str, options: &ParseOptions) -> Hl7Result<Vec<Segment>> {
    if !raw.starts_with(HEADER_SEGMENT_TYPE) {
        return Err(Hl7Error::MalformedMessage(format!(
            "Message does not start with {HEADER_SEGMENT_TYPE} segment."
        )));
    }

    let delimiters = &options.delimiters;
    let mut segments = Vec::new();
    let mut discarded = 0usize;

    for line in split_segments(raw, options.terminator) {
        if !is_segment_line(line, delimiters.field) {
            discarded += 1;
            continue;
        }
        segments.push(parse_segment(line, delimiters)?);
    }

    debug!(
        "parsed {} segments, discarded {} lines",
        segments.len(),
        discarded
    );

    Ok(segments)
}

fn write_joined<T>(
    out: &mut String,
    items: &[T],
    separator: char,
    mut write: impl FnMut(&mut String, &T),
) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        write(out, item);
    }
}

pub(crate) fn write_component(out: &mut String, component: &[String], delimiters: &Delimiters) {
    write_joined(out, component, delimiters.sub_component, |out, s| out.push_str(s));
}

pub(crate) fn write_repetition(
    out: &mut String,
    repetition: &[Component],
    delimiters: &Delimiters,
) {
    write_joined(out, repetition, delimiters.component, |out, c| {
        write_component(out, c, delimiters)
    });
}

pub(crate) fn write_field(out: &mut String, field: &[Repetition], delimiters: &Delimiters) {
    write_joined(out, field, delimiters.repetition, |out, r| {
        write_repetition(out, r, delimiters)
    });
}

/// Write one segment: its type, then every field in stored order
pub(crate) fn write_segment(out: &mut String, segment: &Segment) {
    let delimiters = segment.delimiters();
    out.push_str(segment.segment_type().as_str());
    for field in segment.fields() {
        out.push(delimiters.field);
        write_field(out, field, delimiters);
    }
}

/// Join segments with the output line ending
pub fn build<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
    line_ending: LineEnding,
) -> String {
    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push_str(line_ending.as_str());
        }
        write_segment(&mut out, segment);
    }
    out
}
