//! Identifier validation and quoting.
//!
//! Identifiers cannot be bound as parameters, so they are the one place where
//! caller-provided names reach SQL text. Anything outside the grammar is
//! rejected; nothing is silently rewritten.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{QuarryError, QuarryResult};

/// Grammar accepted unless a dialect or the config overrides it.
pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static DEFAULT_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_IDENTIFIER_PATTERN).unwrap());

/// Type names for casts: `int`, `varchar(255)`, `numeric(10, 2)`, `text[]`,
/// `double precision`.
static TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_ ]*(\(\d+(\s*,\s*\d+)?\))?(\[\])*$").unwrap()
});

/// Validates identifiers against a grammar and quotes them for one dialect.
#[derive(Debug, Clone)]
pub struct IdentifierEscaper {
    quote: char,
    pattern: Regex,
}

impl IdentifierEscaper {
    /// Escaper using the default grammar.
    pub fn new(quote: char) -> Self {
        Self {
            quote,
            pattern: DEFAULT_IDENTIFIER.clone(),
        }
    }

    /// Escaper with a custom grammar. Anchors are added if missing so a
    /// pattern can never match a substring of a hostile name.
    pub fn with_pattern(quote: char, pattern: &str) -> QuarryResult<Self> {
        let anchored = format!(
            "^(?:{})$",
            pattern.trim_start_matches('^').trim_end_matches('$')
        );
        let pattern = Regex::new(&anchored).map_err(|e| {
            QuarryError::Config(format!("invalid identifier pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { quote, pattern })
    }

    pub fn quote_char(&self) -> char {
        self.quote
    }

    /// Check `ident` against the grammar without quoting it.
    pub fn validate<'a>(&self, ident: &'a str) -> QuarryResult<&'a str> {
        if self.pattern.is_match(ident) {
            Ok(ident)
        } else {
            tracing::trace!(identifier = ident, "rejected identifier");
            Err(QuarryError::InvalidIdentifier(ident.to_string()))
        }
    }

    /// Validate and quote, doubling any embedded quote character.
    pub fn escape(&self, ident: &str) -> QuarryResult<String> {
        let ident = self.validate(ident)?;
        let q = self.quote;
        let doubled: String = [q, q].iter().collect();
        Ok(format!("{q}{}{q}", ident.replace(q, &doubled)))
    }

    /// Escape `qualifier.name`, each part separately.
    pub fn escape_qualified(&self, qualifier: Option<&str>, name: &str) -> QuarryResult<String> {
        match qualifier {
            Some(q) => Ok(format!("{}.{}", self.escape(q)?, self.escape(name)?)),
            None => self.escape(name),
        }
    }
}

/// Check a cast target type name. Type names are emitted unquoted.
pub fn validate_type_name(name: &str) -> QuarryResult<&str> {
    let trimmed = name.trim();
    if !trimmed.is_empty() && TYPE_NAME.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(QuarryError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_valid_identifiers() {
        let pg = IdentifierEscaper::new('"');
        assert_eq!(pg.escape("users").unwrap(), "\"users\"");
        assert_eq!(pg.escape("_private1").unwrap(), "\"_private1\"");

        let my = IdentifierEscaper::new('`');
        assert_eq!(my.escape("Order_Items").unwrap(), "`Order_Items`");
    }

    #[test]
    fn test_escape_rejects_outside_grammar() {
        let pg = IdentifierEscaper::new('"');
        for bad in ["user-name", "user name", "1abc", "a\"b", "", "users; DROP TABLE x"] {
            match pg.escape(bad) {
                Err(QuarryError::InvalidIdentifier(id)) => assert_eq!(id, bad),
                other => panic!("expected rejection of {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_custom_pattern_doubles_quotes() {
        let pg = IdentifierEscaper::with_pattern('"', r#"[A-Za-z_"][A-Za-z0-9_"]*"#).unwrap();
        assert_eq!(pg.escape("we\"ird").unwrap(), "\"we\"\"ird\"");
        assert!(pg.escape("no-dash").is_err());
    }

    #[test]
    fn test_custom_pattern_is_anchored() {
        let loose = IdentifierEscaper::with_pattern('"', "[a-z]+").unwrap();
        assert!(loose.escape("abc").is_ok());
        assert!(loose.escape("abc; --").is_err());
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        assert!(matches!(
            IdentifierEscaper::with_pattern('"', "[unclosed"),
            Err(QuarryError::Config(_))
        ));
    }

    #[test]
    fn test_type_names() {
        for ok in ["int", "varchar(255)", "numeric(10, 2)", "text[]", "double precision"] {
            assert_eq!(validate_type_name(ok).unwrap(), ok);
        }
        for bad in ["int); DROP TABLE x; --", "text'", "(int)"] {
            assert!(validate_type_name(bad).is_err(), "{} should be rejected", bad);
        }
    }
}
