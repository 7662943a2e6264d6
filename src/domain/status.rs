// src/domain/status.rs

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a door (or business) visit. Flat: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Unvisited,
    Donated,
    NotInterested,
    Callback,
    NotHome,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 5] = [
        VisitStatus::Unvisited,
        VisitStatus::Donated,
        VisitStatus::NotInterested,
        VisitStatus::Callback,
        VisitStatus::NotHome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Unvisited => "unvisited",
            VisitStatus::Donated => "donated",
            VisitStatus::NotInterested => "not_interested",
            VisitStatus::Callback => "callback",
            VisitStatus::NotHome => "not_home",
        }
    }

    /// Label for residential pages.
    pub fn label(self) -> &'static str {
        match self {
            VisitStatus::Unvisited => "Unvisited",
            VisitStatus::Donated => "Donated",
            VisitStatus::NotInterested => "Not interested",
            VisitStatus::Callback => "Callback",
            VisitStatus::NotHome => "Not home",
        }
    }

    /// Label for corporate pages, where a donation is a pledge of supports.
    pub fn corporate_label(self) -> &'static str {
        match self {
            VisitStatus::Donated => "Supporter",
            VisitStatus::NotHome => "Unavailable",
            other => other.label(),
        }
    }

    pub fn is_visited(self) -> bool {
        self != VisitStatus::Unvisited
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

impl ToSql for VisitStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for VisitStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}
