//! Natural object types and the file extensions they are stored under.
//!
//! ## Notes
//! - The file type decides which sections a module may contain: data areas have no statement body, maps and
//!   DDMs are not parsed by the statement parser at all.
//! - Data areas restrict the scope they can declare (a local data area only `LOCAL`, and so on).
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::file_types::FileType;
//!
//! assert_eq!(FileType::from_extension("nsn"), Some(FileType::Subprogram));
//! assert!(FileType::Subprogram.can_have_body());
//! assert!(!FileType::Lda.can_have_body());
//! ```

use super::keywords::KeywordId;

/// The type of a Natural object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Program,
    Subprogram,
    Subroutine,
    Copycode,
    Function,
    Helproutine,
    Map,
    Lda,
    Pda,
    Gda,
    Ddm,
}

impl FileType {
    pub const ALL: [FileType; 11] = [
        FileType::Program,
        FileType::Subprogram,
        FileType::Subroutine,
        FileType::Copycode,
        FileType::Function,
        FileType::Helproutine,
        FileType::Map,
        FileType::Lda,
        FileType::Pda,
        FileType::Gda,
        FileType::Ddm,
    ];

    /// Resolve a file extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<FileType> {
        FileType::ALL
            .into_iter()
            .find(|t| t.extension().eq_ignore_ascii_case(ext))
    }

    /// The extension used by the Natural tooling, e.g. `NSP`.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Program => "NSP",
            FileType::Subprogram => "NSN",
            FileType::Subroutine => "NSS",
            FileType::Copycode => "NSC",
            FileType::Function => "NS7",
            FileType::Helproutine => "NSH",
            FileType::Map => "NSM",
            FileType::Lda => "NSL",
            FileType::Pda => "NSA",
            FileType::Gda => "NSG",
            FileType::Ddm => "NSD",
        }
    }

    /// Return `true` if modules of this type contain executable statements.
    pub fn can_have_body(self) -> bool {
        matches!(
            self,
            FileType::Program
                | FileType::Subprogram
                | FileType::Subroutine
                | FileType::Copycode
                | FileType::Function
                | FileType::Helproutine
        )
    }

    /// Return `true` if modules of this type start with a `DEFINE DATA` block.
    pub fn can_have_define_data(self) -> bool {
        !matches!(self, FileType::Copycode | FileType::Ddm)
    }

    /// Return `true` if the body must be terminated by an `END` statement.
    pub fn requires_end_statement(self) -> bool {
        matches!(
            self,
            FileType::Program | FileType::Subprogram | FileType::Subroutine | FileType::Function | FileType::Helproutine
        )
    }

    /// The only scope a data area may declare, if restricted.
    pub fn restricted_scope(self) -> Option<KeywordId> {
        match self {
            FileType::Lda => Some(KeywordId::Local),
            FileType::Pda => Some(KeywordId::Parameter),
            FileType::Gda => Some(KeywordId::Global),
            _ => None,
        }
    }

    /// Return `true` if the type is a data area (LDA/PDA/GDA) that other modules import with `USING`.
    pub fn is_data_area(self) -> bool {
        matches!(self, FileType::Lda | FileType::Pda | FileType::Gda)
    }

    /// Return `true` if the module is invoked by `CALLNAT`, `FETCH`, `PERFORM` or a function call.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            FileType::Program | FileType::Subprogram | FileType::Subroutine | FileType::Function | FileType::Helproutine
        )
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileType::Program => "program",
            FileType::Subprogram => "subprogram",
            FileType::Subroutine => "external subroutine",
            FileType::Copycode => "copycode",
            FileType::Function => "function",
            FileType::Helproutine => "helproutine",
            FileType::Map => "map",
            FileType::Lda => "local data area",
            FileType::Pda => "parameter data area",
            FileType::Gda => "global data area",
            FileType::Ddm => "data definition module",
        };
        f.write_str(name)
    }
}
