//! Run configuration shared by the converter and its callers.

use std::{fmt, ops::Deref};

use thiserror::Error;

use crate::store::{IdBounds, StorageKind};

/// Default identifier bound for points and edges.
pub const DEFAULT_MAX_ID: u64 = 35_000_000;

/// Default output table.
pub const DEFAULT_TABLE_NAME: &str = "planet_osm";

/// Error returned when a table name is not a plain SQL identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("table name {0:?} must start with a letter or underscore and contain only ASCII letters, digits and underscores")]
pub struct InvalidTableName(String);

/// Validated name of the output table.
///
/// # Examples
/// ```
/// use pgplanet_core::options::TableName;
///
/// let table = TableName::new("planet_osm")?;
/// assert_eq!(table.as_ref(), "planet_osm");
/// assert!(TableName::new("planet; drop").is_err());
/// # Ok::<(), pgplanet_core::options::InvalidTableName>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap `value`.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidTableName> {
        let value = value.into();
        let mut chars = value.chars();
        let valid_head = chars
            .next()
            .is_some_and(|head| head.is_ascii_alphabetic() || head == '_');
        let valid_tail = chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if valid_head && valid_tail && value.len() <= 63 {
            Ok(Self(value))
        } else {
            Err(InvalidTableName(value))
        }
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_owned())
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options controlling one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Identifier bounds enforced by the entity store.
    pub bounds: IdBounds,
    /// Enable the three canonicalization schemes. Roughly doubles peak memory.
    pub suppress_duplicates: bool,
    /// Entity store layout.
    pub storage: StorageKind,
    /// Output table name.
    pub table_name: TableName,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            bounds: IdBounds {
                max_point: DEFAULT_MAX_ID,
                max_edge: DEFAULT_MAX_ID,
            },
            suppress_duplicates: false,
            storage: StorageKind::default(),
            table_name: TableName::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("planet_osm", true)]
    #[case("_staging2", true)]
    #[case("2planet", false)]
    #[case("", false)]
    #[case("planet osm", false)]
    #[case("planet\"osm", false)]
    fn validates_table_names(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(TableName::new(raw).is_ok(), valid, "TableName::new({raw:?})");
    }

    #[rstest]
    fn rejects_names_longer_than_postgres_allows() {
        assert!(TableName::new("t".repeat(64)).is_err());
        assert!(TableName::new("t".repeat(63)).is_ok());
    }

    #[rstest]
    fn defaults_match_the_planet_import() {
        let options = ConversionOptions::default();
        assert_eq!(options.bounds.max_point, DEFAULT_MAX_ID);
        assert!(!options.suppress_duplicates);
        assert_eq!(options.table_name.as_ref(), "planet_osm");
    }
}
