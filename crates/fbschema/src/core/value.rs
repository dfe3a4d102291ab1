//! Catalog row representation.
//!
//! Catalog queries return small rows of integers and text. Drivers convert
//! their native column values into [`CatalogValue`]; the catalog reader
//! decodes them through the typed accessors on [`CatalogRow`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// A single catalog column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogValue {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for CatalogValue {
    fn from(v: i64) -> Self {
        CatalogValue::Int(v)
    }
}

impl From<i32> for CatalogValue {
    fn from(v: i32) -> Self {
        CatalogValue::Int(v as i64)
    }
}

impl From<&str> for CatalogValue {
    fn from(v: &str) -> Self {
        CatalogValue::Text(v.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(v: String) -> Self {
        CatalogValue::Text(v)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CatalogValue::Null)
    }
}

/// One row returned by a catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    values: Vec<CatalogValue>,
}

impl CatalogRow {
    pub fn new(values: Vec<CatalogValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn value(&self, idx: usize) -> Result<&CatalogValue> {
        self.values.get(idx).ok_or_else(|| {
            SchemaError::catalog_read(
                "row decode",
                format!("column {} out of range (row has {})", idx, self.values.len()),
            )
        })
    }

    /// Required text column; catalog CHAR padding is trimmed.
    pub fn text(&self, idx: usize) -> Result<String> {
        self.opt_text(idx)?.ok_or_else(|| {
            SchemaError::catalog_read("row decode", format!("column {} is NULL", idx))
        })
    }

    /// Optional text column, trimmed. Empty text reads as `None`.
    pub fn opt_text(&self, idx: usize) -> Result<Option<String>> {
        match self.value(idx)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(s) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            CatalogValue::Int(v) => Err(SchemaError::catalog_read(
                "row decode",
                format!("column {} expected text, got integer {}", idx, v),
            )),
        }
    }

    /// Optional text column without trimming (procedure bodies, sources).
    pub fn raw_text(&self, idx: usize) -> Result<Option<String>> {
        match self.value(idx)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(s) => Ok(Some(s.clone())),
            CatalogValue::Int(v) => Err(SchemaError::catalog_read(
                "row decode",
                format!("column {} expected text, got integer {}", idx, v),
            )),
        }
    }

    /// Optional integer column.
    pub fn opt_int(&self, idx: usize) -> Result<Option<i32>> {
        match self.value(idx)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(v) => i32::try_from(*v).map(Some).map_err(|_| {
                SchemaError::catalog_read(
                    "row decode",
                    format!("column {} value {} out of range", idx, v),
                )
            }),
            // Some drivers surface SMALLINT catalog columns as text.
            CatalogValue::Text(s) => s.trim().parse::<i32>().map(Some).map_err(|_| {
                SchemaError::catalog_read(
                    "row decode",
                    format!("column {} expected integer, got '{}'", idx, s),
                )
            }),
        }
    }

    /// Required integer column.
    pub fn int(&self, idx: usize) -> Result<i32> {
        self.opt_int(idx)?.ok_or_else(|| {
            SchemaError::catalog_read("row decode", format!("column {} is NULL", idx))
        })
    }

    /// Catalog flag column: `1` is set, NULL or anything else is unset.
    pub fn flag(&self, idx: usize) -> Result<bool> {
        Ok(self.opt_int(idx)? == Some(1))
    }
}

/// Build a [`CatalogRow`] from heterogeneous values.
///
/// ```
/// use fbschema::catalog_row;
/// let row = catalog_row!["EMP", 8, None::<i32>];
/// assert_eq!(row.len(), 3);
/// ```
#[macro_export]
macro_rules! catalog_row {
    ($($v:expr),* $(,)?) => {
        $crate::core::value::CatalogRow::new(vec![$($crate::core::value::CatalogValue::from($v)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let row = catalog_row!["EMP                            "];
        assert_eq!(row.text(0).unwrap(), "EMP");
    }

    #[test]
    fn test_blank_text_reads_as_none() {
        let row = catalog_row!["   ", None::<&str>];
        assert_eq!(row.opt_text(0).unwrap(), None);
        assert_eq!(row.opt_text(1).unwrap(), None);
        assert!(row.text(1).is_err());
    }

    #[test]
    fn test_raw_text_keeps_whitespace() {
        let row = catalog_row!["\nBEGIN\n  SUSPEND;\nEND\n"];
        assert_eq!(row.raw_text(0).unwrap().unwrap(), "\nBEGIN\n  SUSPEND;\nEND\n");
    }

    #[test]
    fn test_int_accessors() {
        let row = catalog_row![37, None::<i32>, "14", "x"];
        assert_eq!(row.int(0).unwrap(), 37);
        assert_eq!(row.opt_int(1).unwrap(), None);
        assert_eq!(row.opt_int(2).unwrap(), Some(14));
        assert!(row.opt_int(3).is_err());
    }

    #[test]
    fn test_flag() {
        let row = catalog_row![1, 0, None::<i32>];
        assert!(row.flag(0).unwrap());
        assert!(!row.flag(1).unwrap());
        assert!(!row.flag(2).unwrap());
    }

    #[test]
    fn test_out_of_range_column_is_catalog_error() {
        let row = catalog_row!["A"];
        match row.text(3) {
            Err(SchemaError::CatalogRead { .. }) => {}
            other => panic!("expected CatalogRead, got {:?}", other),
        }
    }
}
