use std::fmt;

use crate::error::{Result, StoreError};

/// Name of the table (key prefix) records are written to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(StoreError::InvalidTableName {
                name,
                message: "must not be empty",
            });
        }

        if name.contains('/') {
            return Err(StoreError::InvalidTableName {
                name,
                message: "must not contain '/'",
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_name() {
        let table = TableName::new("uploads").unwrap();
        assert_eq!(table.as_str(), "uploads");
        assert_eq!(table.to_string(), "uploads");
    }

    #[test]
    fn test_invalid_table_names() {
        assert!(matches!(
            TableName::new(""),
            Err(StoreError::InvalidTableName { .. })
        ));
        assert!(matches!(
            TableName::new("a/b"),
            Err(StoreError::InvalidTableName { .. })
        ));
    }
}
