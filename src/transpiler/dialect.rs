use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, QuarryResult};
use crate::transpiler::sql::mysql::MysqlGenerator;
use crate::transpiler::sql::postgres::PostgresGenerator;
use crate::transpiler::sql::sqlite::SqliteGenerator;
use crate::transpiler::traits::SqlGenerator;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySQL,
    SQLite,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Postgres, Dialect::MySQL, Dialect::SQLite];

    pub fn generator(&self) -> Box<dyn SqlGenerator> {
        match self {
            Dialect::Postgres => Box::new(PostgresGenerator::new()),
            Dialect::MySQL => Box::new(MysqlGenerator::new()),
            Dialect::SQLite => Box::new(SqliteGenerator::new()),
        }
    }

    /// Generator whose identifier grammar is replaced by `pattern`.
    pub fn generator_with_pattern(&self, pattern: &str) -> QuarryResult<Box<dyn SqlGenerator>> {
        Ok(match self {
            Dialect::Postgres => Box::new(PostgresGenerator::with_identifier_pattern(pattern)?),
            Dialect::MySQL => Box::new(MysqlGenerator::with_identifier_pattern(pattern)?),
            Dialect::SQLite => Box::new(SqliteGenerator::with_identifier_pattern(pattern)?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            other => Err(QuarryError::Config(format!("unknown dialect '{}'", other))),
        }
    }
}
