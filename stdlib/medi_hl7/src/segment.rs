//! One typed record of a message and its address-based read/write API.
//!
//! Data is held as nested vectors: field → repetition → component →
//! sub-component. The first stored field is field 1, or field 2 for the
//! header segment (its field 1 is the field separator itself). Every stored
//! level is non-empty, so a present field always has a first repetition
//! with a first component holding at least one string.

use std::fmt;

use log::trace;

use crate::address::{Address, Index, SegmentType};
use crate::error::{invalid_param, invalid_param_because, Hl7Result};
use crate::options::Delimiters;
use crate::tokenizer::{write_component, write_field, write_repetition, write_segment};

pub(crate) type Component = Vec<String>;
pub(crate) type Repetition = Vec<Component>;
pub(crate) type Field = Vec<Repetition>;

/// Highest field, component, repetition or sub-component count a write may create
pub const MAX_WRITE_POSITION: usize = u16::MAX as usize;

fn empty_repetition() -> Repetition {
    vec![vec![String::new()]]
}

/// Check that `address` names a slot a write may create or overwrite
pub(crate) fn check_write_address(address: &Address) -> Hl7Result<()> {
    let Some(field) = address.field() else {
        return invalid_param("field", address);
    };
    if field < address.segment_type().first_field() {
        return invalid_param_because(
            "field",
            address,
            "Field 1 of the header is the field separator and cannot be set.",
        );
    }
    if field > MAX_WRITE_POSITION || address.component().unwrap_or(1) > MAX_WRITE_POSITION {
        return invalid_param_because(
            "field",
            address,
            format!("Positions above {MAX_WRITE_POSITION} cannot be written."),
        );
    }
    Ok(())
}

fn check_write_index(name: &str, index: usize) -> Hl7Result<()> {
    if index >= MAX_WRITE_POSITION {
        return invalid_param_because(
            name,
            index,
            format!("At most {MAX_WRITE_POSITION} entries can be stored."),
        );
    }
    Ok(())
}

/// A typed segment such as `PID` or `OBX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    segment_type: SegmentType,
    delimiters: Delimiters,
    fields: Vec<Field>,
}

impl Segment {
    /// An empty segment using the default delimiters
    pub fn new(segment_type: SegmentType) -> Self {
        Self::with_delimiters(segment_type, Delimiters::default())
    }

    pub fn with_delimiters(segment_type: SegmentType, delimiters: Delimiters) -> Self {
        Self {
            segment_type,
            delimiters,
            fields: Vec::new(),
        }
    }

    pub(crate) fn from_fields(
        segment_type: SegmentType,
        delimiters: Delimiters,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            segment_type,
            delimiters,
            fields,
        }
    }

    pub fn segment_type(&self) -> &SegmentType {
        &self.segment_type
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// True until the first value is written
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of the last populated field, or 0 when empty
    pub fn field_count(&self) -> usize {
        if self.fields.is_empty() {
            0
        } else {
            self.fields.len() + self.segment_type.first_field() - 1
        }
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn field(&self, number: usize) -> Option<&Field> {
        number
            .checked_sub(self.segment_type.first_field())
            .and_then(|i| self.fields.get(i))
    }

    fn check_owner(&self, address: &Address, verb: &str) -> Hl7Result<()> {
        if address.segment_type() != &self.segment_type {
            let preposition = if verb == "get" { "from" } else { "on" };
            return invalid_param_because(
                "field",
                address,
                format!(
                    "Cannot {verb} [{address}] {preposition} [{}] segment.",
                    self.segment_type
                ),
            );
        }
        Ok(())
    }

    /// Read the first repetition / first sub-component at `address`
    pub fn get(&self, address: &str) -> Hl7Result<Option<String>> {
        self.get_at(address, Index::At(0), Index::At(0))
    }

    /// Read the value at `address`.
    ///
    /// * `TTT.f.c` returns one sub-component, or all of them joined when
    ///   `sub_component` is [`Index::All`].
    /// * `TTT.f` returns one repetition with its components joined, or every
    ///   repetition joined when `repetition` is [`Index::All`].
    /// * `TTT` returns the whole segment in wire form.
    ///
    /// Returns `None` when nothing is stored there. Never creates data.
    pub fn get_at(
        &self,
        address: &str,
        repetition: Index,
        sub_component: Index,
    ) -> Hl7Result<Option<String>> {
        let parsed = Address::parse_read(address)?;
        self.check_owner(&parsed, "get")?;

        if parsed.component().is_some() && repetition == Index::All {
            return invalid_param_because(
                "repetition",
                -1,
                format!("Cannot read component [{address}] across all repetitions."),
            );
        }

        if self.fields.is_empty() {
            return Ok(None);
        }

        let d = &self.delimiters;
        let value = match (parsed.field(), parsed.component()) {
            (Some(field), Some(component)) => {
                let Index::At(rep) = repetition else {
                    return Ok(None);
                };
                let slot = self
                    .field(field)
                    .and_then(|f| f.get(rep))
                    .and_then(|r| r.get(component - 1));

                match sub_component {
                    Index::At(sub) => slot.and_then(|c| c.get(sub)).cloned(),
                    Index::All => slot.map(|c| {
                        let mut out = String::new();
                        write_component(&mut out, c, d);
                        out
                    }),
                }
            }
            (Some(field), None) => {
                let Some(stored) = self.field(field) else {
                    return Ok(None);
                };
                let mut out = String::new();
                match repetition {
                    Index::At(rep) => match stored.get(rep) {
                        Some(r) => write_repetition(&mut out, r, d),
                        None => return Ok(None),
                    },
                    Index::All => write_field(&mut out, stored, d),
                }
                Some(out)
            }
            _ => Some(self.to_string()),
        };

        Ok(value)
    }

    /// Write `value` to the first repetition / first sub-component at `address`
    pub fn set(&mut self, address: &str, value: &str) -> Hl7Result<()> {
        self.set_at(address, value, Index::At(0), Index::At(0))
    }

    /// Write `value` at `address`, creating every missing level on the way.
    ///
    /// Fields up to the target field, repetitions up to `repetition`, and
    /// (for a component address) components up to the target component and
    /// sub-components up to `sub_component` are filled with empty strings.
    ///
    /// Writing a field address without a component replaces that whole
    /// repetition with the single value, dropping any components it had.
    pub fn set_at(
        &mut self,
        address: &str,
        value: &str,
        repetition: Index,
        sub_component: Index,
    ) -> Hl7Result<()> {
        let parsed = Address::parse_write(address)?;
        self.write(&parsed, value, repetition, sub_component)
    }

    /// Write through an already parsed address
    pub(crate) fn write(
        &mut self,
        address: &Address,
        value: &str,
        repetition: Index,
        sub_component: Index,
    ) -> Hl7Result<()> {
        self.check_owner(address, "set")?;
        check_write_address(address)?;
        let rep = repetition.position("repetition")?;
        let sub = sub_component.position("sub_component")?;
        check_write_index("repetition", rep)?;
        check_write_index("sub_component", sub)?;

        let first = self.segment_type.first_field();
        let Some(field) = address.field() else {
            return invalid_param("field", address);
        };

        let field_index = field - first;
        if self.fields.len() <= field_index {
            trace!(
                "{}: creating fields {}..={}",
                self.segment_type,
                self.fields.len() + first,
                field
            );
            self.fields.resize_with(field_index + 1, || vec![empty_repetition()]);
        }

        let repetitions = &mut self.fields[field_index];
        if repetitions.len() <= rep {
            repetitions.resize_with(rep + 1, empty_repetition);
        }

        match address.component() {
            Some(component) => {
                let components = &mut repetitions[rep];
                if components.len() < component {
                    components.resize_with(component, || vec![String::new()]);
                }
                let subs = &mut components[component - 1];
                if subs.len() <= sub {
                    subs.resize_with(sub + 1, String::new);
                }
                subs[sub] = value.to_string();
            }
            None => {
                repetitions[rep] = vec![vec![value.to_string()]];
            }
        }

        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_segment(&mut out, self);
        f.write_str(&out)
    }
}
