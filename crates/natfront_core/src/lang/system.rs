//! System variables and system functions (`*DATX`, `*OCC`, `*LINE-COUNT`, ...).
//!
//! Every entry records its spelling (without the leading `*`), whether it is a variable, a function or both, the
//! data type it evaluates to, and whether user code may assign to it.
//!
//! ## Notes
//! - The lexer recognizes these names with [`longest_match`], gated by [`could_start`] so ordinary `*` operators
//!   and comments don't pay for a registry scan.
//! - Functions with a variable result type (e.g. `*TRIM`, `*MAXVAL`) report a dynamic or untyped result.
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::system::{self, SystemId};
//!
//! assert_eq!(system::longest_match("OCC(#ARR)"), Some((SystemId::Occ, 3)));
//! assert_eq!(system::longest_match("LINE-COUNT"), Some((SystemId::LineCount, 10)));
//! assert!(system::info_for(SystemId::ErrorNr).modifiable);
//! ```

use crate::types::{DataFormat, DataType};

/// Stable identifier for every system variable or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemId {
    Occurrence,
    Occ,
    Data,
    Level,
    Linex,
    LineCount,
    Linesize,
    Pagesize,
    Trim,
    ErrorNr,
    ErrorLine,
    Line,
    Timx,
    Timd,
    Timn,
    Dat4e,
    Date,
    Datx,
    Datn,
    Datd,
    Dat4d,
    Dat4i,
    Dati,
    Datg,
    Dat4j,
    Datj,
    Dat4u,
    Datu,
    Datvs,
    Datv,
    Language,
    LibraryId,
    Isn,
    Program,
    CpuTime,
    Etid,
    InitProgram,
    Lbound,
    Ubound,
    User,
    Number,
    CurrentUnit,
    CursCol,
    CursLine,
    CursField,
    ErrorTa,
    InitUser,
    InitId,
    Counter,
    Com,
    PfKey,
    Maxval,
    Minval,
    Device,
    Opsys,
    Tpsys,
    Timestmp,
    ApplicId,
    Startup,
    Steplib,
    PageNumber,
    WindowPs,
    Translate,
    MachineClass,
}

/// Whether a name denotes a variable, a function, or can be used as either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKind {
    Variable,
    Function,
    /// Used bare (`*LINE-COUNT`) or with a report/label argument (`*LINE-COUNT(1)`).
    Both,
}

/// Metadata for a system variable or function.
#[derive(Debug, Clone, Copy)]
pub struct SystemInfo {
    pub id: SystemId,
    /// Spelling without the leading `*`.
    pub name: &'static str,
    pub kind: SystemKind,
    pub ty: DataType,
    pub modifiable: bool,
}

impl SystemInfo {
    /// Return `true` if the name may be followed by a parenthesized argument list.
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SystemKind::Function | SystemKind::Both)
    }
}

use DataFormat as F;
use SystemId as S;
use SystemKind::{Both, Function, Variable};

/// Registry of all system variables and functions, in [`SystemId`] order.
pub const SYSTEM_NAMES: &[SystemInfo] = &[
    entry(S::Occurrence, "OCCURRENCE", Function, DataType::fixed(F::Integer, 4), false),
    entry(S::Occ, "OCC", Function, DataType::fixed(F::Integer, 4), false),
    entry(S::Data, "DATA", Variable, DataType::fixed(F::Numeric, 3), false),
    entry(S::Level, "LEVEL", Variable, DataType::fixed(F::Numeric, 2), false),
    entry(S::Linex, "LINEX", Variable, DataType::fixed(F::Alphanumeric, 100), false),
    entry(S::LineCount, "LINE-COUNT", Both, DataType::fixed(F::Packed, 5), false),
    entry(S::Linesize, "LINESIZE", Variable, DataType::fixed(F::Packed, 3), false),
    entry(S::Pagesize, "PAGESIZE", Variable, DataType::fixed(F::Packed, 3), false),
    entry(S::Trim, "TRIM", Function, DataType::dynamic(F::Alphanumeric), false),
    entry(S::ErrorNr, "ERROR-NR", Variable, DataType::fixed(F::Numeric, 7), true),
    entry(S::ErrorLine, "ERROR-LINE", Variable, DataType::fixed(F::Numeric, 4), false),
    entry(S::Line, "LINE", Variable, DataType::fixed(F::Integer, 4), false),
    entry(S::Timx, "TIMX", Variable, DataType::fixed(F::Time, 0), false),
    entry(S::Timd, "TIMD", Function, DataType::fixed(F::Numeric, 7), false),
    entry(S::Timn, "TIMN", Variable, DataType::fixed(F::Numeric, 7), false),
    entry(S::Dat4e, "DAT4E", Variable, DataType::fixed(F::Alphanumeric, 10), false),
    entry(S::Date, "DATE", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Datx, "DATX", Variable, DataType::fixed(F::Date, 0), false),
    entry(S::Datn, "DATN", Variable, DataType::fixed(F::Numeric, 8), false),
    entry(S::Datd, "DATD", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Dat4d, "DAT4D", Variable, DataType::fixed(F::Alphanumeric, 10), false),
    entry(S::Dat4i, "DAT4I", Variable, DataType::fixed(F::Alphanumeric, 10), false),
    entry(S::Dati, "DATI", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Datg, "DATG", Variable, DataType::fixed(F::Alphanumeric, 15), false),
    entry(S::Dat4j, "DAT4J", Variable, DataType::fixed(F::Alphanumeric, 7), false),
    entry(S::Datj, "DATJ", Variable, DataType::fixed(F::Alphanumeric, 5), false),
    entry(S::Dat4u, "DAT4U", Variable, DataType::fixed(F::Alphanumeric, 10), false),
    entry(S::Datu, "DATU", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Datvs, "DATVS", Variable, DataType::fixed(F::Alphanumeric, 9), false),
    entry(S::Datv, "DATV", Variable, DataType::fixed(F::Alphanumeric, 11), false),
    entry(S::Language, "LANGUAGE", Variable, DataType::fixed(F::Integer, 1), true),
    entry(S::LibraryId, "LIBRARY-ID", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Isn, "ISN", Both, DataType::fixed(F::Packed, 10), true),
    entry(S::Program, "PROGRAM", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::CpuTime, "CPU-TIME", Variable, DataType::fixed(F::Integer, 4), false),
    entry(S::Etid, "ETID", Variable, DataType::fixed(F::Alphanumeric, 8), true),
    entry(S::InitProgram, "INIT-PROGRAM", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Lbound, "LBOUND", Function, DataType::fixed(F::Integer, 4), false),
    entry(S::Ubound, "UBOUND", Function, DataType::fixed(F::Integer, 4), false),
    entry(S::User, "USER", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Number, "NUMBER", Both, DataType::fixed(F::Packed, 10), true),
    entry(S::CurrentUnit, "CURRENT-UNIT", Variable, DataType::fixed(F::Alphanumeric, 32), false),
    entry(S::CursCol, "CURS-COL", Variable, DataType::fixed(F::Packed, 3), true),
    entry(S::CursLine, "CURS-LINE", Variable, DataType::fixed(F::Packed, 3), true),
    entry(S::CursField, "CURS-FIELD", Variable, DataType::fixed(F::Integer, 4), false),
    entry(S::ErrorTa, "ERROR-TA", Variable, DataType::fixed(F::Alphanumeric, 8), true),
    entry(S::InitUser, "INIT-USER", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::InitId, "INIT-ID", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Counter, "COUNTER", Function, DataType::fixed(F::Packed, 10), false),
    entry(S::Com, "COM", Variable, DataType::fixed(F::Alphanumeric, 128), true),
    entry(S::PfKey, "PF-KEY", Variable, DataType::fixed(F::Alphanumeric, 4), false),
    entry(S::Maxval, "MAXVAL", Function, DataType::UNTYPED, false),
    entry(S::Minval, "MINVAL", Function, DataType::UNTYPED, false),
    entry(S::Device, "DEVICE", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Opsys, "OPSYS", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Tpsys, "TPSYS", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Timestmp, "TIMESTMP", Variable, DataType::fixed(F::Binary, 8), false),
    entry(S::ApplicId, "APPLIC-ID", Variable, DataType::fixed(F::Alphanumeric, 8), false),
    entry(S::Startup, "STARTUP", Variable, DataType::fixed(F::Alphanumeric, 8), true),
    entry(S::Steplib, "STEPLIB", Variable, DataType::fixed(F::Alphanumeric, 8), true),
    entry(S::PageNumber, "PAGE-NUMBER", Both, DataType::fixed(F::Packed, 5), true),
    entry(S::WindowPs, "WINDOW-PS", Variable, DataType::fixed(F::Packed, 3), false),
    entry(S::Translate, "TRANSLATE", Function, DataType::dynamic(F::Alphanumeric), false),
    entry(S::MachineClass, "MACHINE-CLASS", Variable, DataType::fixed(F::Alphanumeric, 16), false),
];

/// Spelling without the leading `*`.
pub fn as_str(id: SystemId) -> &'static str {
    info_for(id).name
}

/// Full metadata.
pub fn info_for(id: SystemId) -> &'static SystemInfo {
    &SYSTEM_NAMES[id as usize]
}

/// Exact lookup of a name without the leading `*` (case-insensitive).
pub fn from_str(name: &str) -> Option<SystemId> {
    SYSTEM_NAMES
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map(|s| s.id)
}

/// Return `true` if a system name can start with `c`.
///
/// The lexer uses this as a cheap filter before calling [`longest_match`].
pub fn could_start(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'A' | 'C' | 'D' | 'E' | 'I' | 'L' | 'M' | 'N' | 'O' | 'P' | 'S' | 'T' | 'U' | 'W'
    )
}

/// Find the longest system name that `text` starts with and that ends at a name boundary.
///
/// ## Parameters
/// - `text`: source text directly after the `*`.
///
/// ## Returns
/// - The id and the byte length of the matched name, or `None`.
///
/// ## Notes
/// - A boundary is any character that can't continue a name (letters, digits and `-`), so `*OCCX` does not match
///   `OCC`.
pub fn longest_match(text: &str) -> Option<(SystemId, usize)> {
    SYSTEM_NAMES
        .iter()
        .filter(|s| {
            text.len() >= s.name.len()
                && text.is_char_boundary(s.name.len())
                && text[..s.name.len()].eq_ignore_ascii_case(s.name)
                && !text[s.name.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        .max_by_key(|s| s.name.len())
        .map(|s| (s.id, s.name.len()))
}

const fn entry(id: SystemId, name: &'static str, kind: SystemKind, ty: DataType, modifiable: bool) -> SystemInfo {
    SystemInfo {
        id,
        name,
        kind,
        ty,
        modifiable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_prefers_the_longer_name() {
        assert_eq!(longest_match("OCCURRENCE(#A)"), Some((SystemId::Occurrence, 10)));
        assert_eq!(longest_match("DAT4E "), Some((SystemId::Dat4e, 5)));
        assert_eq!(longest_match("DATX"), Some((SystemId::Datx, 4)));
    }

    #[test]
    fn longest_match_requires_a_name_boundary() {
        assert_eq!(longest_match("OCCX"), None);
        assert_eq!(longest_match("LINE-COUNTER"), None);
        assert_eq!(longest_match("LINE "), Some((SystemId::Line, 4)));
    }

    #[test]
    fn every_name_passes_the_first_letter_filter() {
        for info in SYSTEM_NAMES {
            let first = info.name.chars().next().unwrap();
            assert!(could_start(first), "{} is filtered out", info.name);
        }
    }
}
