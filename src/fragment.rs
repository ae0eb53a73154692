//! Parameter-tracking SQL fragments.
//!
//! A [`Sql`] fragment is an ordered list of raw-text chunks and parameter
//! chunks. Values never touch the text: placeholders are only produced when a
//! fragment is rendered, numbered left to right, so nesting one fragment in
//! another automatically continues the outer numbering.
//!
//! ```
//! use quarry::fragment::{PlaceholderStyle, Sql};
//! use quarry::sql;
//!
//! let filter = sql!("\"age\" > ", Sql::param(18));
//! let query = sql!("SELECT * FROM \"users\" WHERE ", filter, " AND \"name\" = ", Sql::param("Ann"));
//! let compiled = query.render(PlaceholderStyle::Dollar);
//! assert_eq!(compiled.text, "SELECT * FROM \"users\" WHERE \"age\" > $1 AND \"name\" = $2");
//! assert_eq!(compiled.parameters.len(), 2);
//! ```

use serde::Serialize;

use crate::ast::Value;

/// How positional placeholders are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `$1, $2, …` (PostgreSQL)
    #[default]
    Dollar,
    /// `?, ?, …` (MySQL)
    Question,
    /// `?1, ?2, …` (SQLite)
    NumberedQuestion,
}

impl PlaceholderStyle {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            PlaceholderStyle::Dollar => format!("${}", index),
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::NumberedQuestion => format!("?{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Chunk {
    Raw(String),
    Param(Value),
}

/// A composable piece of parameterized SQL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sql {
    chunks: Vec<Chunk>,
}

/// Rendered statement: SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSql {
    pub text: String,
    pub parameters: Vec<Value>,
}

impl Sql {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trusted SQL syntax: keywords, operators, already-escaped identifiers.
    /// Never pass user data here.
    pub fn raw(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            chunks: vec![Chunk::Raw(text)],
        }
    }

    /// A single placeholder bound to `value`.
    pub fn param(value: impl Into<Value>) -> Self {
        Self {
            chunks: vec![Chunk::Param(value.into())],
        }
    }

    /// Append a fragment (or a static string, as raw text).
    pub fn push(&mut self, piece: impl Into<Sql>) {
        for chunk in piece.into().chunks {
            match chunk {
                Chunk::Raw(text) => self.push_raw(&text),
                param => self.chunks.push(param),
            }
        }
    }

    pub fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Chunk::Raw(last)) = self.chunks.last_mut() {
            last.push_str(text);
        } else {
            self.chunks.push(Chunk::Raw(text.to_string()));
        }
    }

    pub fn push_param(&mut self, value: impl Into<Value>) {
        self.chunks.push(Chunk::Param(value.into()));
    }

    /// Concatenate fragments with a raw separator between them.
    pub fn join(fragments: impl IntoIterator<Item = Sql>, separator: &str) -> Sql {
        let mut out = Sql::empty();
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                out.push_raw(separator);
            }
            out.push(fragment);
        }
        out
    }

    /// `(a, b), (c, d), …` for multi-row VALUES lists.
    pub fn bulk(rows: impl IntoIterator<Item = Vec<Sql>>) -> Sql {
        Sql::join(rows.into_iter().map(|row| Sql::join(row, ", ").parenthesized()), ", ")
    }

    /// Wrap in parentheses.
    pub fn parenthesized(self) -> Sql {
        let mut out = Sql::raw("(");
        out.push(self);
        out.push_raw(")");
        out
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn param_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c, Chunk::Param(_)))
            .count()
    }

    /// Parameters in placeholder order.
    pub fn parameters(&self) -> impl Iterator<Item = &Value> {
        self.chunks.iter().filter_map(|c| match c {
            Chunk::Param(v) => Some(v),
            Chunk::Raw(_) => None,
        })
    }

    /// Render text with `style` placeholders and collect the parameters.
    pub fn render(&self, style: PlaceholderStyle) -> CompiledSql {
        self.clone().into_compiled(style)
    }

    /// Like [`Sql::render`], consuming the fragment.
    pub fn into_compiled(self, style: PlaceholderStyle) -> CompiledSql {
        let mut text = String::new();
        let mut parameters = Vec::new();
        for chunk in self.chunks {
            match chunk {
                Chunk::Raw(raw) => text.push_str(&raw),
                Chunk::Param(value) => {
                    parameters.push(value);
                    text.push_str(&style.placeholder(parameters.len()));
                }
            }
        }
        CompiledSql { text, parameters }
    }
}

impl From<&'static str> for Sql {
    fn from(text: &'static str) -> Self {
        Sql::raw(text)
    }
}

impl std::fmt::Display for Sql {
    /// Renders with `$n` placeholders.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut index = 0;
        for chunk in &self.chunks {
            match chunk {
                Chunk::Raw(raw) => f.write_str(raw)?,
                Chunk::Param(_) => {
                    index += 1;
                    write!(f, "${}", index)?;
                }
            }
        }
        Ok(())
    }
}

/// Build a [`Sql`] fragment from pieces.
///
/// Each piece is anything `Into<Sql>`: static strings become raw text,
/// fragments (including [`Sql::param`]) are embedded with their parameters
/// renumbered to follow the pieces before them.
#[macro_export]
macro_rules! sql {
    ($($piece:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fragment = $crate::fragment::Sql::empty();
        $( fragment.push($piece); )*
        fragment
    }};
}
