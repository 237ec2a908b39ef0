//! Define the keyword vocabulary for the Natural language.
//!
//! This module is the single source of truth for keywords: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, categories and whether a keyword may double as
//! an identifier.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-insensitive**. Natural sources are conventionally uppercase, but the
//!   compiler accepts any casing.
//! - Most Natural keywords are *soft*: a database field called `NUMBER` or a variable called `VALUE` is legal. Only
//!   statement starters, block terminators and operator words are reserved (see [`is_reserved`]).
//! - [`KEYWORDS`] is ordered exactly like [`KeywordId`], so metadata lookup is an index operation.
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("end-define"), Some(KeywordId::EndDefine));
//! assert_eq!(keywords::as_str(KeywordId::Callnat), "CALLNAT");
//! assert!(keywords::can_be_identifier(KeywordId::Value));
//! ```

/// Stable identifier for every keyword.
///
/// ## Notes
/// - Variant order is significant: it must match the order of [`KEYWORDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordId {
    // Data definition
    Define,
    Data,
    EndDefine,
    Local,
    Global,
    Parameter,
    Independent,
    Using,
    View,
    Redefine,
    Filler,
    Init,
    Const,
    Dynamic,
    Optional,
    Result,
    Function,
    Returns,
    EndFunction,
    Subroutine,
    EndSubroutine,
    Window,
    Work,
    Printer,
    File,

    // Statements
    Accept,
    Add,
    Assign,
    At,
    Backout,
    Before,
    Call,
    Callnat,
    Close,
    Commit,
    Compress,
    Compute,
    Decide,
    Delete,
    Display,
    Divide,
    Eject,
    End,
    Escape,
    Examine,
    Expand,
    Fetch,
    Find,
    For,
    Format,
    Get,
    Histogram,
    If,
    Ignore,
    Include,
    Input,
    Limit,
    Move,
    Multiply,
    Newpage,
    Obtain,
    Perform,
    Print,
    Process,
    Read,
    Reduce,
    Reinput,
    Reject,
    Release,
    Repeat,
    Reset,
    Resize,
    Retry,
    Run,
    Set,
    Skip,
    Sort,
    Stack,
    Stop,
    Store,
    Subtract,
    Terminate,
    Update,
    Write,

    // Clauses
    All,
    Any,
    Array,
    Ascending,
    Bottom,
    By,
    Command,
    Condition,
    Descending,
    Ending,
    Every,
    First,
    From,
    Found,
    Full,
    Giving,
    Help,
    Initial,
    Into,
    Isn,
    Key,
    Leaving,
    Length,
    Logical,
    Named,
    No,
    None,
    Notitle,
    Number,
    Of,
    Off,
    On,
    Physical,
    Records,
    Remainder,
    Return,
    Rounded,
    Routine,
    Starting,
    Step,
    Then,
    Else,
    Thru,
    To,
    Top,
    Unique,
    Until,
    Value,
    Variable,
    When,
    Where,
    While,
    With,

    // Operator words
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Equal,
    Mask,
    Scan,

    // Literals
    True,
    False,

    // Intrinsic functions
    Val,
    Abs,
    Pos,

    // Block terminators
    EndIf,
    EndFor,
    EndNorec,
    EndFind,
    EndRead,
    EndHistogram,
    EndRepeat,
    EndDecide,
    EndAll,
    EndBefore,
    EndBreak,
    EndBrowse,
    EndEnddata,
    EndEndfile,
    EndEndpage,
    EndError,
    EndFile,
    EndParse,
    EndSelect,
    EndSort,
    EndToppage,
    EndWork,
}

/// High-level grouping for documentation and tooling.
///
/// ## Notes
/// - Categories are metadata only; they do not enforce parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    DataDefinition,
    Statement,
    Clause,
    Operator,
    Literal,
    Intrinsic,
    Terminator,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `canonical` is the uppercase spelling used in diagnostics.
/// - `reserved` keywords can never be used as identifiers; all others are accepted where an identifier is expected.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub reserved: bool,
}

use KeywordCategory as C;
use KeywordId as K;

/// Registry of all keywords, in [`KeywordId`] order.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Data definition
    reserved(K::Define, "DEFINE", C::DataDefinition),
    soft(K::Data, "DATA", C::DataDefinition),
    reserved(K::EndDefine, "END-DEFINE", C::DataDefinition),
    soft(K::Local, "LOCAL", C::DataDefinition),
    soft(K::Global, "GLOBAL", C::DataDefinition),
    soft(K::Parameter, "PARAMETER", C::DataDefinition),
    soft(K::Independent, "INDEPENDENT", C::DataDefinition),
    soft(K::Using, "USING", C::DataDefinition),
    soft(K::View, "VIEW", C::DataDefinition),
    reserved(K::Redefine, "REDEFINE", C::DataDefinition),
    soft(K::Filler, "FILLER", C::DataDefinition),
    soft(K::Init, "INIT", C::DataDefinition),
    soft(K::Const, "CONST", C::DataDefinition),
    soft(K::Dynamic, "DYNAMIC", C::DataDefinition),
    soft(K::Optional, "OPTIONAL", C::DataDefinition),
    soft(K::Result, "RESULT", C::DataDefinition),
    soft(K::Function, "FUNCTION", C::DataDefinition),
    soft(K::Returns, "RETURNS", C::DataDefinition),
    reserved(K::EndFunction, "END-FUNCTION", C::Terminator),
    soft(K::Subroutine, "SUBROUTINE", C::DataDefinition),
    reserved(K::EndSubroutine, "END-SUBROUTINE", C::Terminator),
    soft(K::Window, "WINDOW", C::DataDefinition),
    soft(K::Work, "WORK", C::DataDefinition),
    soft(K::Printer, "PRINTER", C::DataDefinition),
    soft(K::File, "FILE", C::DataDefinition),
    // Statements
    reserved(K::Accept, "ACCEPT", C::Statement),
    reserved(K::Add, "ADD", C::Statement),
    reserved(K::Assign, "ASSIGN", C::Statement),
    reserved(K::At, "AT", C::Statement),
    reserved(K::Backout, "BACKOUT", C::Statement),
    reserved(K::Before, "BEFORE", C::Statement),
    reserved(K::Call, "CALL", C::Statement),
    reserved(K::Callnat, "CALLNAT", C::Statement),
    reserved(K::Close, "CLOSE", C::Statement),
    reserved(K::Commit, "COMMIT", C::Statement),
    reserved(K::Compress, "COMPRESS", C::Statement),
    reserved(K::Compute, "COMPUTE", C::Statement),
    reserved(K::Decide, "DECIDE", C::Statement),
    reserved(K::Delete, "DELETE", C::Statement),
    reserved(K::Display, "DISPLAY", C::Statement),
    reserved(K::Divide, "DIVIDE", C::Statement),
    reserved(K::Eject, "EJECT", C::Statement),
    reserved(K::End, "END", C::Statement),
    reserved(K::Escape, "ESCAPE", C::Statement),
    reserved(K::Examine, "EXAMINE", C::Statement),
    reserved(K::Expand, "EXPAND", C::Statement),
    reserved(K::Fetch, "FETCH", C::Statement),
    reserved(K::Find, "FIND", C::Statement),
    reserved(K::For, "FOR", C::Statement),
    reserved(K::Format, "FORMAT", C::Statement),
    reserved(K::Get, "GET", C::Statement),
    reserved(K::Histogram, "HISTOGRAM", C::Statement),
    reserved(K::If, "IF", C::Statement),
    reserved(K::Ignore, "IGNORE", C::Statement),
    reserved(K::Include, "INCLUDE", C::Statement),
    reserved(K::Input, "INPUT", C::Statement),
    reserved(K::Limit, "LIMIT", C::Statement),
    reserved(K::Move, "MOVE", C::Statement),
    reserved(K::Multiply, "MULTIPLY", C::Statement),
    reserved(K::Newpage, "NEWPAGE", C::Statement),
    reserved(K::Obtain, "OBTAIN", C::Statement),
    reserved(K::Perform, "PERFORM", C::Statement),
    reserved(K::Print, "PRINT", C::Statement),
    reserved(K::Process, "PROCESS", C::Statement),
    reserved(K::Read, "READ", C::Statement),
    reserved(K::Reduce, "REDUCE", C::Statement),
    reserved(K::Reinput, "REINPUT", C::Statement),
    reserved(K::Reject, "REJECT", C::Statement),
    reserved(K::Release, "RELEASE", C::Statement),
    reserved(K::Repeat, "REPEAT", C::Statement),
    reserved(K::Reset, "RESET", C::Statement),
    reserved(K::Resize, "RESIZE", C::Statement),
    reserved(K::Retry, "RETRY", C::Statement),
    reserved(K::Run, "RUN", C::Statement),
    reserved(K::Set, "SET", C::Statement),
    reserved(K::Skip, "SKIP", C::Statement),
    reserved(K::Sort, "SORT", C::Statement),
    reserved(K::Stack, "STACK", C::Statement),
    reserved(K::Stop, "STOP", C::Statement),
    reserved(K::Store, "STORE", C::Statement),
    reserved(K::Subtract, "SUBTRACT", C::Statement),
    reserved(K::Terminate, "TERMINATE", C::Statement),
    reserved(K::Update, "UPDATE", C::Statement),
    reserved(K::Write, "WRITE", C::Statement),
    // Clauses
    soft(K::All, "ALL", C::Clause),
    soft(K::Any, "ANY", C::Clause),
    soft(K::Array, "ARRAY", C::Clause),
    soft(K::Ascending, "ASCENDING", C::Clause),
    soft(K::Bottom, "BOTTOM", C::Clause),
    soft(K::By, "BY", C::Clause),
    soft(K::Command, "COMMAND", C::Clause),
    soft(K::Condition, "CONDITION", C::Clause),
    soft(K::Descending, "DESCENDING", C::Clause),
    soft(K::Ending, "ENDING", C::Clause),
    soft(K::Every, "EVERY", C::Clause),
    soft(K::First, "FIRST", C::Clause),
    soft(K::From, "FROM", C::Clause),
    soft(K::Found, "FOUND", C::Clause),
    soft(K::Full, "FULL", C::Clause),
    soft(K::Giving, "GIVING", C::Clause),
    soft(K::Help, "HELP", C::Clause),
    soft(K::Initial, "INITIAL", C::Clause),
    soft(K::Into, "INTO", C::Clause),
    soft(K::Isn, "ISN", C::Clause),
    soft(K::Key, "KEY", C::Clause),
    soft(K::Leaving, "LEAVING", C::Clause),
    soft(K::Length, "LENGTH", C::Clause),
    soft(K::Logical, "LOGICAL", C::Clause),
    soft(K::Named, "NAMED", C::Clause),
    soft(K::No, "NO", C::Clause),
    soft(K::None, "NONE", C::Clause),
    soft(K::Notitle, "NOTITLE", C::Clause),
    soft(K::Number, "NUMBER", C::Clause),
    soft(K::Of, "OF", C::Clause),
    soft(K::Off, "OFF", C::Clause),
    soft(K::On, "ON", C::Clause),
    soft(K::Physical, "PHYSICAL", C::Clause),
    soft(K::Records, "RECORDS", C::Clause),
    soft(K::Remainder, "REMAINDER", C::Clause),
    soft(K::Return, "RETURN", C::Clause),
    soft(K::Rounded, "ROUNDED", C::Clause),
    soft(K::Routine, "ROUTINE", C::Clause),
    soft(K::Starting, "STARTING", C::Clause),
    soft(K::Step, "STEP", C::Clause),
    reserved(K::Then, "THEN", C::Clause),
    reserved(K::Else, "ELSE", C::Clause),
    soft(K::Thru, "THRU", C::Clause),
    soft(K::To, "TO", C::Clause),
    soft(K::Top, "TOP", C::Clause),
    soft(K::Unique, "UNIQUE", C::Clause),
    soft(K::Until, "UNTIL", C::Clause),
    soft(K::Value, "VALUE", C::Clause),
    soft(K::Variable, "VARIABLE", C::Clause),
    soft(K::When, "WHEN", C::Clause),
    soft(K::Where, "WHERE", C::Clause),
    soft(K::While, "WHILE", C::Clause),
    soft(K::With, "WITH", C::Clause),
    // Operator words
    reserved(K::And, "AND", C::Operator),
    reserved(K::Or, "OR", C::Operator),
    reserved(K::Not, "NOT", C::Operator),
    reserved(K::Eq, "EQ", C::Operator),
    reserved(K::Ne, "NE", C::Operator),
    reserved(K::Lt, "LT", C::Operator),
    reserved(K::Le, "LE", C::Operator),
    reserved(K::Gt, "GT", C::Operator),
    reserved(K::Ge, "GE", C::Operator),
    reserved(K::Equal, "EQUAL", C::Operator),
    reserved(K::Mask, "MASK", C::Operator),
    reserved(K::Scan, "SCAN", C::Operator),
    // Literals
    reserved(K::True, "TRUE", C::Literal),
    reserved(K::False, "FALSE", C::Literal),
    // Intrinsic functions
    soft(K::Val, "VAL", C::Intrinsic),
    soft(K::Abs, "ABS", C::Intrinsic),
    soft(K::Pos, "POS", C::Intrinsic),
    // Block terminators
    reserved(K::EndIf, "END-IF", C::Terminator),
    reserved(K::EndFor, "END-FOR", C::Terminator),
    reserved(K::EndNorec, "END-NOREC", C::Terminator),
    reserved(K::EndFind, "END-FIND", C::Terminator),
    reserved(K::EndRead, "END-READ", C::Terminator),
    reserved(K::EndHistogram, "END-HISTOGRAM", C::Terminator),
    reserved(K::EndRepeat, "END-REPEAT", C::Terminator),
    reserved(K::EndDecide, "END-DECIDE", C::Terminator),
    reserved(K::EndAll, "END-ALL", C::Terminator),
    reserved(K::EndBefore, "END-BEFORE", C::Terminator),
    reserved(K::EndBreak, "END-BREAK", C::Terminator),
    reserved(K::EndBrowse, "END-BROWSE", C::Terminator),
    reserved(K::EndEnddata, "END-ENDDATA", C::Terminator),
    reserved(K::EndEndfile, "END-ENDFILE", C::Terminator),
    reserved(K::EndEndpage, "END-ENDPAGE", C::Terminator),
    reserved(K::EndError, "END-ERROR", C::Terminator),
    reserved(K::EndFile, "END-FILE", C::Terminator),
    reserved(K::EndParse, "END-PARSE", C::Terminator),
    reserved(K::EndSelect, "END-SELECT", C::Terminator),
    reserved(K::EndSort, "END-SORT", C::Terminator),
    reserved(K::EndToppage, "END-TOPPAGE", C::Terminator),
    reserved(K::EndWork, "END-WORK", C::Terminator),
];

/// Canonical (uppercase) spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Return `true` if the keyword can never be used as an identifier.
pub fn is_reserved(id: KeywordId) -> bool {
    info_for(id).reserved
}

/// Return `true` if the keyword is accepted where an identifier is expected.
pub fn can_be_identifier(id: KeywordId) -> bool {
    !info_for(id).reserved
}

/// Full metadata.
///
/// ## Notes
/// - [`KEYWORDS`] mirrors the declaration order of [`KeywordId`]; the guardrail tests keep them in sync.
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    &KEYWORDS[id as usize]
}

/// Lookup by spelling.
///
/// ## Parameters
/// - `s`: Candidate keyword spelling, in any casing.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling is a keyword, `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical.eq_ignore_ascii_case(s)).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn reserved(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        reserved: true,
    }
}

const fn soft(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        reserved: false,
    }
}
