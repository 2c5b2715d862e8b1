//! Archive column names and types

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::DomainError;

/// Columns every archive table carries. They are never renamed or dropped.
pub const REQUIRED_COLUMNS: [&str; 3] = ["dateTime", "usUnits", "interval"];

/// Storage type of an observation column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColumnType {
    #[default]
    Real,
    Integer,
}

impl ColumnType {
    /// SQL type keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
        }
    }
}

impl FromStr for ColumnType {
    type Err = DomainError;

    /// Case-insensitive; `INT` is accepted as shorthand for `INTEGER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REAL" => Ok(ColumnType::Real),
            "INTEGER" | "INT" => Ok(ColumnType::Integer),
            _ => Err(DomainError::InvalidColumnType(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Name and type of one archive column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Check that `name` is a plain SQL identifier.
pub fn validate_column_name(name: &str) -> Result<(), DomainError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(DomainError::InvalidColumnName(name.to_string()))
    }
}

/// SQLite column names compare case-insensitively.
pub fn same_column(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn is_required_column(name: &str) -> bool {
    REQUIRED_COLUMNS.iter().any(|c| same_column(c, name))
}

/// Reject changes to the columns the archive depends on.
pub fn ensure_mutable_column(name: &str) -> Result<(), DomainError> {
    if is_required_column(name) {
        Err(DomainError::RequiredColumn(name.to_string()))
    } else {
        Ok(())
    }
}

/// Quote an identifier for use in SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("REAL", ColumnType::Real)]
    #[case("real", ColumnType::Real)]
    #[case("Real", ColumnType::Real)]
    #[case("INTEGER", ColumnType::Integer)]
    #[case("integer", ColumnType::Integer)]
    #[case("INT", ColumnType::Integer)]
    #[case("int", ColumnType::Integer)]
    fn given_type_spelling_when_parsing_then_normalizes(
        #[case] input: &str,
        #[case] expected: ColumnType,
    ) {
        assert_eq!(input.parse::<ColumnType>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_type_when_parsing_then_fails() {
        let err = "TEXT".parse::<ColumnType>().unwrap_err();
        assert_eq!(err, DomainError::InvalidColumnType("TEXT".into()));
    }

    #[test]
    fn given_column_type_when_displayed_then_uses_sql_keyword() {
        assert_eq!(ColumnType::Integer.to_string(), "INTEGER");
        assert_eq!(ColumnType::default().to_string(), "REAL");
    }

    #[rstest]
    #[case("soilTemp1", true)]
    #[case("_hidden", true)]
    #[case("leaf_wet_2", true)]
    #[case("1stColumn", false)]
    #[case("bad-name", false)]
    #[case("x; DROP TABLE archive", false)]
    #[case("", false)]
    fn given_name_when_validating_then_accepts_only_identifiers(
        #[case] name: &str,
        #[case] valid: bool,
    ) {
        assert_eq!(validate_column_name(name).is_ok(), valid);
    }

    #[test]
    fn given_required_column_in_any_case_when_checked_then_is_protected() {
        assert!(is_required_column("dateTime"));
        assert!(is_required_column("DATETIME"));
        assert!(is_required_column("interval"));
        assert!(!is_required_column("outTemp"));
        assert_eq!(
            ensure_mutable_column("usUnits"),
            Err(DomainError::RequiredColumn("usUnits".into()))
        );
    }

    #[test]
    fn given_identifier_with_quote_when_quoting_then_doubles_quote() {
        assert_eq!(quote_ident("interval"), "\"interval\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
