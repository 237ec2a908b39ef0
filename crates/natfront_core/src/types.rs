//! Natural data formats and the implicit-conversion lattice between them.
//!
//! A [`DataType`] is a format letter plus a literal length, e.g. `(A10)`, `(N7.2)` or `(A) DYNAMIC`. Derived
//! properties (byte size, digit count, family membership) differ per format and are computed here so the parser,
//! resolver and type checker agree on them.
//!
//! ## Notes
//! - [`DataType::fits_into`] is **asymmetric**: `(N5)` fits into `(A10)` through implicit conversion, but not the
//!   other way around.
//! - Byte sizes follow the runtime layout: packed numbers take `ceil((digits + 1) / 2)` bytes, dynamic
//!   alphanumerics report a 1 GiB capacity.
//!
//! ## Examples
//! ```rust
//! use natfront_core::types::{DataFormat, DataType};
//!
//! let packed = DataType::numeric(DataFormat::Packed, 7, 2);
//! assert_eq!(packed.byte_size(), 5);
//! assert!(packed.fits_into(&DataType::fixed(DataFormat::Alphanumeric, 10)));
//! assert_eq!(DataType::parse("N7,2"), Ok(DataType::numeric(DataFormat::Numeric, 7, 2)));
//! ```

use std::fmt;

/// Capacity reported for dynamic alphanumeric, binary and unicode variables.
pub const ONE_GIGABYTE: u32 = 1_073_741_824;

/// Data format letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Alphanumeric,
    Numeric,
    Packed,
    Integer,
    Float,
    Logic,
    Date,
    Time,
    Binary,
    Unicode,
    Control,
    None,
}

impl DataFormat {
    /// Resolve a format letter (case-insensitive).
    pub fn from_char(c: char) -> Option<DataFormat> {
        match c.to_ascii_uppercase() {
            'A' => Some(DataFormat::Alphanumeric),
            'N' => Some(DataFormat::Numeric),
            'P' => Some(DataFormat::Packed),
            'I' => Some(DataFormat::Integer),
            'F' => Some(DataFormat::Float),
            'L' => Some(DataFormat::Logic),
            'D' => Some(DataFormat::Date),
            'T' => Some(DataFormat::Time),
            'B' => Some(DataFormat::Binary),
            'U' => Some(DataFormat::Unicode),
            'C' => Some(DataFormat::Control),
            _ => None,
        }
    }

    /// The single-letter spelling used in declarations.
    pub fn identifier(self) -> &'static str {
        match self {
            DataFormat::Alphanumeric => "A",
            DataFormat::Numeric => "N",
            DataFormat::Packed => "P",
            DataFormat::Integer => "I",
            DataFormat::Float => "F",
            DataFormat::Logic => "L",
            DataFormat::Date => "D",
            DataFormat::Time => "T",
            DataFormat::Binary => "B",
            DataFormat::Unicode => "U",
            DataFormat::Control => "C",
            DataFormat::None => "",
        }
    }

    /// Return `true` if declarations of this format carry an explicit length.
    pub fn can_have_user_defined_length(self) -> bool {
        !matches!(
            self,
            DataFormat::Control | DataFormat::Date | DataFormat::Logic | DataFormat::Time | DataFormat::None
        )
    }

    /// Return `true` if the format supports `DYNAMIC`.
    pub fn can_be_dynamic(self) -> bool {
        matches!(self, DataFormat::Alphanumeric | DataFormat::Binary | DataFormat::Unicode)
    }

    /// Return `true` for N, P, I and F.
    pub fn is_numeric_family(self) -> bool {
        matches!(
            self,
            DataFormat::Numeric | DataFormat::Packed | DataFormat::Integer | DataFormat::Float
        )
    }

    /// Return `true` for A, U and B.
    pub fn is_alphanumeric_family(self) -> bool {
        matches!(self, DataFormat::Alphanumeric | DataFormat::Unicode | DataFormat::Binary)
    }
}

/// Reasons a type specification like `N7.2` can't be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTypeParseError {
    /// The text doesn't start with a known format letter.
    UnknownFormat(String),
    /// The length part is not a number.
    InvalidLength(String),
}

impl fmt::Display for DataTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeParseError::UnknownFormat(s) => write!(f, "unknown data format '{s}'"),
            DataTypeParseError::InvalidLength(s) => write!(f, "invalid length '{s}'"),
        }
    }
}

impl std::error::Error for DataTypeParseError {}

/// A data format with its literal length.
///
/// `length` holds the digits before the decimal point (or the plain length for non-numeric formats), `decimals` the
/// digits after it. A length of `0` means "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    pub format: DataFormat,
    pub length: u32,
    pub decimals: u8,
    pub dynamic: bool,
}

impl DataType {
    /// The type of untyped nodes (groups, unknown references).
    pub const UNTYPED: DataType = DataType {
        format: DataFormat::None,
        length: 0,
        decimals: 0,
        dynamic: false,
    };

    /// A type with a plain length, e.g. `(A10)`.
    pub const fn fixed(format: DataFormat, length: u32) -> Self {
        DataType {
            format,
            length,
            decimals: 0,
            dynamic: false,
        }
    }

    /// A numeric type with decimals, e.g. `(N7.2)`.
    pub const fn numeric(format: DataFormat, length: u32, decimals: u8) -> Self {
        DataType {
            format,
            length,
            decimals,
            dynamic: false,
        }
    }

    /// A dynamic type, e.g. `(A) DYNAMIC`.
    pub const fn dynamic(format: DataFormat) -> Self {
        DataType {
            format,
            length: 0,
            decimals: 0,
            dynamic: true,
        }
    }

    /// Parse the inside of a type declaration: `A10`, `N7.2`, `N7,2`, `L`, `A`.
    ///
    /// ## Errors
    /// - [`DataTypeParseError::UnknownFormat`] if the first character is not a format letter.
    /// - [`DataTypeParseError::InvalidLength`] if the remainder is not `digits[(.|,)digits]`.
    ///
    /// ## Notes
    /// - Length *validity* (e.g. `I3`) is not checked here; that is a diagnostic concern of the parser.
    pub fn parse(text: &str) -> Result<Self, DataTypeParseError> {
        let mut chars = text.chars();
        let format = chars
            .next()
            .and_then(DataFormat::from_char)
            .ok_or_else(|| DataTypeParseError::UnknownFormat(text.to_string()))?;
        let rest = chars.as_str();
        if rest.is_empty() {
            return Ok(DataType::fixed(format, 0));
        }

        let invalid = || DataTypeParseError::InvalidLength(rest.to_string());
        let (before, after) = match rest.split_once(['.', ',']) {
            Some((before, after)) => (before, Some(after)),
            None => (rest, None),
        };
        if before.is_empty() || !before.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let length = before.parse::<u32>().map_err(|_| invalid())?;
        let decimals = match after {
            Some(after) if !after.is_empty() && after.bytes().all(|b| b.is_ascii_digit()) => {
                after.parse::<u8>().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
            None => 0,
        };
        Ok(DataType::numeric(format, length, decimals))
    }

    /// The literal length as written, e.g. `7.2` for `N7.2`.
    pub fn literal_length(&self) -> f64 {
        if self.decimals == 0 {
            return f64::from(self.length);
        }
        let digits = self.decimals.to_string().len() as i32;
        f64::from(self.length) + f64::from(self.decimals) / 10f64.powi(digits)
    }

    /// Sum of all digits, e.g. `9` for `N7.2`. Never below 1.
    pub fn digit_count(&self) -> u32 {
        (self.length + u32::from(self.decimals)).max(1)
    }

    /// The size in bytes this type occupies.
    pub fn byte_size(&self) -> u32 {
        match self.format {
            DataFormat::Alphanumeric | DataFormat::Binary => {
                if self.dynamic {
                    ONE_GIGABYTE
                } else {
                    self.length
                }
            }
            DataFormat::Float | DataFormat::Integer => self.length,
            DataFormat::Control => 2,
            DataFormat::Date => 4,
            DataFormat::Logic => 1,
            DataFormat::Numeric => self.digit_count(),
            DataFormat::Packed => (self.digit_count() + 2) / 2,
            DataFormat::Time => 7,
            DataFormat::Unicode => {
                if self.dynamic {
                    ONE_GIGABYTE
                } else {
                    self.length.max(2)
                }
            }
            DataFormat::None => 0,
        }
    }

    /// Return `true` for floats and for N/P with decimals.
    pub fn is_floating(&self) -> bool {
        match self.format {
            DataFormat::Float => true,
            DataFormat::Numeric | DataFormat::Packed => self.decimals > 0,
            _ => false,
        }
    }

    /// Return `true` if both types belong to the same family, e.g. N, I and P are all numeric.
    pub fn has_same_family(&self, target: &DataType) -> bool {
        let theirs = target.format;
        self.format == theirs
            || match self.format {
                DataFormat::Packed
                | DataFormat::Float
                | DataFormat::Integer
                | DataFormat::Numeric
                | DataFormat::Time => theirs.is_numeric_family() || theirs == DataFormat::Time,
                DataFormat::Alphanumeric | DataFormat::Unicode => theirs.is_alphanumeric_family(),
                _ => false,
            }
    }

    /// Return `true` if a value of this type implicitly converts to `target`'s format.
    pub fn has_compatible_format(&self, target: &DataType) -> bool {
        use DataFormat as F;
        let theirs = target.format;
        self.has_same_family(target)
            || match self.format {
                F::Packed | F::Float | F::Integer | F::Numeric => {
                    matches!(theirs, F::Alphanumeric | F::Unicode) || target.is_short_binary()
                }
                F::Time | F::Date => {
                    matches!(
                        theirs,
                        F::Numeric | F::Packed | F::Alphanumeric | F::Unicode | F::Integer | F::Date | F::Time | F::Float
                    ) || target.is_short_binary()
                }
                F::Logic => matches!(theirs, F::Alphanumeric | F::Unicode),
                F::Binary => {
                    (self.is_long_binary() && matches!(theirs, F::Alphanumeric | F::Unicode))
                        || (self.is_short_binary()
                            && matches!(
                                theirs,
                                F::Numeric | F::Packed | F::Alphanumeric | F::Unicode | F::Integer | F::Time | F::Float
                            ))
                }
                _ => false,
            }
    }

    /// Return `true` if a value of this type can be stored in `target` without loss.
    ///
    /// ## Notes
    /// - This takes implicit conversion into account (see [`DataType::has_compatible_format`]).
    /// - A floating value only fits into a floating target with at least the same literal length.
    pub fn fits_into(&self, target: &DataType) -> bool {
        let ours = if self.dynamic { ONE_GIGABYTE } else { self.byte_size() };
        let theirs = if target.dynamic {
            ONE_GIGABYTE
        } else {
            target.byte_size()
        };
        let byte_size_fits = ours <= theirs;

        let mut precision_matches = true;
        if target.is_floating() {
            precision_matches = byte_size_fits && self.literal_length() <= target.literal_length();
        }
        if self.is_floating() {
            precision_matches = target.is_floating() && self.literal_length() <= target.literal_length();
        }

        byte_size_fits && self.has_compatible_format(target) && precision_matches
    }

    fn is_short_binary(&self) -> bool {
        self.format == DataFormat::Binary && self.length < 5
    }

    fn is_long_binary(&self) -> bool {
        self.format == DataFormat::Binary && self.length > 4
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.format.identifier())?;
        if self.length > 0 && !self.dynamic && self.format.can_have_user_defined_length() {
            write!(f, "{}", self.length)?;
            if self.decimals > 0 {
                write!(f, ",{}", self.decimals)?;
            }
        }
        write!(f, ")")?;
        if self.dynamic {
            write!(f, " DYNAMIC")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataFormat::*;

    fn t(text: &str) -> DataType {
        DataType::parse(text).unwrap()
    }

    #[test]
    fn byte_sizes_follow_the_runtime_layout() {
        assert_eq!(t("A10").byte_size(), 10);
        assert_eq!(DataType::dynamic(Alphanumeric).byte_size(), ONE_GIGABYTE);
        assert_eq!(t("N10").byte_size(), 10);
        assert_eq!(t("N7.2").byte_size(), 9);
        assert_eq!(t("P20").byte_size(), 11);
        assert_eq!(t("P21").byte_size(), 11);
        assert_eq!(t("P7.2").byte_size(), 5);
        assert_eq!(t("I4").byte_size(), 4);
        assert_eq!(t("U1").byte_size(), 2);
        assert_eq!(t("L").byte_size(), 1);
        assert_eq!(t("D").byte_size(), 4);
        assert_eq!(t("T").byte_size(), 7);
        assert_eq!(t("C").byte_size(), 2);
    }

    #[test]
    fn parse_accepts_both_decimal_separators() {
        assert_eq!(t("N7,2"), t("N7.2"));
        assert_eq!(t("n7.2").decimals, 2);
        assert!(DataType::parse("X5").is_err());
        assert!(DataType::parse("A1x").is_err());
        assert!(DataType::parse("N7.").is_err());
    }

    #[test]
    fn numeric_types_fit_into_large_enough_alphanumerics() {
        assert!(t("N5").fits_into(&t("A10")));
        assert!(t("I4").fits_into(&t("A4")));
        assert!(!t("A10").fits_into(&t("N12")));
        assert!(!t("N12").fits_into(&t("A10")));
    }

    #[test]
    fn floating_values_need_a_floating_target() {
        assert!(!t("N7.2").fits_into(&t("N10")));
        assert!(t("N7.2").fits_into(&t("N7.3")));
        assert!(!t("N7.3").fits_into(&t("N7.2")));
        assert!(t("N5").fits_into(&t("N7.2")));
    }

    #[test]
    fn binary_compatibility_depends_on_length() {
        assert!(t("B4").fits_into(&t("N8")));
        assert!(!t("B8").has_compatible_format(&t("N8")));
        assert!(t("B8").has_compatible_format(&t("A8")));
        assert!(t("N2").has_compatible_format(&t("B4")));
        assert!(!t("N2").has_compatible_format(&t("B8")));
    }

    #[test]
    fn dates_and_times_convert_to_numbers() {
        assert!(t("D").has_compatible_format(&t("N8")));
        assert!(t("T").has_same_family(&t("P12")));
        assert!(!t("D").has_same_family(&t("N8")));
        assert!(t("L").has_compatible_format(&t("A1")));
        assert!(!t("L").has_compatible_format(&t("N1")));
    }

    #[test]
    fn display_renders_the_declaration_form() {
        assert_eq!(t("A10").to_string(), "(A10)");
        assert_eq!(t("N7.2").to_string(), "(N7,2)");
        assert_eq!(t("L").to_string(), "(L)");
        assert_eq!(DataType::dynamic(Alphanumeric).to_string(), "(A) DYNAMIC");
    }
}
