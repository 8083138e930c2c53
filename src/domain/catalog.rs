//! Database catalog types returned by provisioning operations

use serde::Serialize;
use std::fmt;

/// Outcome of ensuring the target database exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatabaseStatus {
    AlreadyExists,
    Created,
}

impl DatabaseStatus {
    /// Message shown to the user for `database`
    pub fn message(&self, database: &str) -> String {
        match self {
            DatabaseStatus::AlreadyExists => format!("Database '{database}' already exists"),
            DatabaseStatus::Created => format!("Database '{database}' created"),
        }
    }
}

/// Column metadata from the information schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    /// Maximum character length, `None` for non-character types
    pub max_length: Option<i32>,
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_length {
            Some(-1) => write!(f, "{} {}(max)", self.name, self.data_type),
            Some(len) => write!(f, "{} {}({len})", self.name, self.data_type),
            None => write!(f, "{} {}", self.name, self.data_type),
        }
    }
}

/// Summary of one data table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
    /// Latest non-null `lastUpdate` value, rendered by the server
    pub last_update: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_status_message() {
        assert_eq!(
            DatabaseStatus::Created.message("FundDB"),
            "Database 'FundDB' created"
        );
        assert_eq!(
            DatabaseStatus::AlreadyExists.message("FundDB"),
            "Database 'FundDB' already exists"
        );
    }

    #[test]
    fn test_column_display() {
        let column = ColumnInfo {
            name: "symbol".to_string(),
            data_type: "nvarchar".to_string(),
            max_length: Some(32),
        };
        assert_eq!(column.to_string(), "symbol nvarchar(32)");

        let column = ColumnInfo {
            name: "shortName".to_string(),
            data_type: "nvarchar".to_string(),
            max_length: Some(-1),
        };
        assert_eq!(column.to_string(), "shortName nvarchar(max)");

        let column = ColumnInfo {
            name: "beta".to_string(),
            data_type: "float".to_string(),
            max_length: None,
        };
        assert_eq!(column.to_string(), "beta float");
    }
}
