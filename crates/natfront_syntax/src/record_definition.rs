//! Record definitions (DDMs) and their listing parser.
//!
//! A DDM describes the fields of a stored record. Views in `DEFINE DATA` select a subset of those fields, and the
//! parser checks every view member against the DDM.
//!
//! The listing format is the classic column table:
//!
//! ```text
//! T L DB Name                             F Leng  S D Remark
//! - - -- -------------------------------- - ----  - - ------------------------
//!   1 AA PERSON-ID                        A    8  N D
//! G 1 AB FULL-NAME
//!   2 AC FIRST-NAME                       A   20  N
//! M 1 AD CITY                             A   20  N
//! P 1 AE INCOME
//!   2 AF SALARY                           P  9.2  N
//! ```
//!
//! ## Notes
//! - Columns are located from the dash line under the header, so differing column widths parse the same.
//! - Lines starting with `*` inside the table (super-descriptor source fields) are skipped.

use natfront_core::types::{DataFormat, DataType};

/// Reasons a DDM listing can't be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefinitionError {
    #[error("no field table header (`T L DB Name F Leng`) found")]
    MissingHeader,
    #[error("line {line}: invalid level `{text}`")]
    InvalidLevel { line: usize, text: String },
    #[error("line {line}: invalid length `{text}`")]
    InvalidLength { line: usize, text: String },
    #[error("line {line}: unknown format `{text}`")]
    UnknownFormat { line: usize, text: String },
}

/// What a DDM row declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Field,
    /// `M`: multiple-value field, repeats up to 191 times.
    Multiple,
    /// `P`: periodic group, its members repeat together.
    Periodic,
    /// `G`: plain group.
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    None,
    Descriptor,
    Superdescriptor,
    Unique,
}

/// One DDM row.
#[derive(Debug, Clone, PartialEq)]
pub struct DdmField {
    pub kind: FieldKind,
    pub level: u32,
    /// Two-letter database name.
    pub short_name: String,
    /// Uppercased long name.
    pub name: String,
    pub format: Option<DataFormat>,
    pub length: u32,
    pub decimals: u8,
    pub descriptor: DescriptorType,
    /// Index of the enclosing group row.
    pub parent: Option<usize>,
}

impl DdmField {
    /// The Natural type of the field, `None` for groups.
    pub fn data_type(&self) -> Option<DataType> {
        let format = self.format?;
        if self.length == 0 && format.can_be_dynamic() {
            return Some(DataType::dynamic(format));
        }
        Some(DataType::numeric(format, self.length, self.decimals))
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::Group | FieldKind::Periodic)
    }
}

/// A parsed DDM.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDefinition {
    /// Uppercased name.
    pub name: String,
    pub fields: Vec<DdmField>,
}

impl RecordDefinition {
    /// Parse a DDM listing.
    pub fn parse(name: &str, source: &str) -> Result<RecordDefinition, RecordDefinitionError> {
        let lines: Vec<&str> = source.lines().collect();
        let header = lines
            .iter()
            .position(|line| is_table_header(line))
            .ok_or(RecordDefinitionError::MissingHeader)?;
        let columns = lines
            .get(header + 1)
            .map(|dashes| Columns::from_dash_line(dashes))
            .ok_or(RecordDefinitionError::MissingHeader)?;

        let mut fields: Vec<DdmField> = Vec::new();
        let mut groups: Vec<usize> = Vec::new();
        for (index, line) in lines.iter().enumerate().skip(header + 2) {
            let line_number = index + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('*') {
                continue;
            }

            let field = columns.read_row(line, line_number)?;
            while groups.last().is_some_and(|&group| fields[group].level >= field.level) {
                groups.pop();
            }
            let field = DdmField {
                parent: groups.last().copied(),
                ..field
            };
            if field.is_group() {
                groups.push(fields.len());
            }
            fields.push(field);
        }

        Ok(RecordDefinition {
            name: name.to_ascii_uppercase(),
            fields,
        })
    }

    /// Find a field by long name (case-insensitive).
    pub fn find_field(&self, name: &str) -> Option<&DdmField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Return `true` if the field repeats: it is a multiple-value field, or lives inside a periodic group.
    pub fn is_repeating(&self, field: &DdmField) -> bool {
        if field.kind == FieldKind::Multiple {
            return true;
        }
        let mut parent = field.parent;
        while let Some(index) = parent {
            let Some(group) = self.fields.get(index) else {
                break;
            };
            if group.kind == FieldKind::Periodic {
                return true;
            }
            parent = group.parent;
        }
        false
    }
}

fn is_table_header(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    words.starts_with(&["T", "L", "DB", "Name"])
}

/// Byte ranges of the table columns.
#[derive(Debug)]
struct Columns {
    ranges: Vec<(usize, usize)>,
}

impl Columns {
    fn from_dash_line(line: &str) -> Columns {
        let mut ranges = Vec::new();
        let mut start = None;
        for (index, c) in line.char_indices() {
            match (c == '-', start) {
                (true, None) => start = Some(index),
                (false, Some(begin)) => {
                    ranges.push((begin, index));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(begin) = start {
            ranges.push((begin, line.len()));
        }
        Columns { ranges }
    }

    /// Text of column `index`; the last column runs to the end of the line.
    fn column<'a>(&self, line: &'a str, index: usize) -> &'a str {
        let Some(&(start, end)) = self.ranges.get(index) else {
            return "";
        };
        let end = if index + 1 == self.ranges.len() { line.len() } else { end };
        let start = start.min(line.len());
        let end = end.min(line.len()).max(start);
        line.get(start..end).unwrap_or("").trim()
    }

    fn read_row(&self, line: &str, line_number: usize) -> Result<DdmField, RecordDefinitionError> {
        let kind = match self.column(line, 0) {
            "M" => FieldKind::Multiple,
            "P" => FieldKind::Periodic,
            "G" => FieldKind::Group,
            _ => FieldKind::Field,
        };

        let level_text = self.column(line, 1);
        let level = level_text.parse().map_err(|_| RecordDefinitionError::InvalidLevel {
            line: line_number,
            text: level_text.to_string(),
        })?;

        let format_text = self.column(line, 4);
        let format = match format_text.chars().next() {
            None => None,
            Some(c) => Some(DataFormat::from_char(c).ok_or_else(|| RecordDefinitionError::UnknownFormat {
                line: line_number,
                text: format_text.to_string(),
            })?),
        };

        let length_text = self.column(line, 5);
        let (length, decimals) = parse_length(length_text).ok_or_else(|| RecordDefinitionError::InvalidLength {
            line: line_number,
            text: length_text.to_string(),
        })?;

        let descriptor = match self.column(line, 7) {
            "D" => DescriptorType::Descriptor,
            "S" => DescriptorType::Superdescriptor,
            "U" => DescriptorType::Unique,
            _ => DescriptorType::None,
        };

        Ok(DdmField {
            kind,
            level,
            short_name: self.column(line, 2).to_string(),
            name: self.column(line, 3).to_ascii_uppercase(),
            format,
            length,
            decimals,
            descriptor,
            parent: None,
        })
    }
}

fn parse_length(text: &str) -> Option<(u32, u8)> {
    if text.is_empty() {
        return Some((0, 0));
    }
    match text.split_once(['.', ',']) {
        Some((length, decimals)) => Some((length.parse().ok()?, decimals.parse().ok()?)),
        None => Some((text.parse().ok()?, 0)),
    }
}
