//! Free-form library queries.
//!
//! A query is a list of terms, all of which must match:
//!
//! - `field:value` matches entries whose `field` contains `value`;
//! - a bare `value` matches entries where any default search field contains it.
//!
//! Matching is a case-insensitive substring test, executed by SQLite `LIKE`.
//! An empty query matches everything.

use anyhow::{bail, Result};
use std::fmt;

/// One query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Restricts the match to one field; `None` searches the default fields.
    pub field: Option<String>,
    pub pattern: String,
}

/// A parsed query, ready to be turned into a SQL `WHERE` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

/// SQL predicate plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<String>,
}

impl Query {
    /// Parse command-line style terms. Never fails: field names are checked
    /// in [`Query::to_sql`], once we know which entity is queried.
    #[must_use]
    pub fn parse<S: AsRef<str>>(terms: &[S]) -> Self {
        let terms = terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|term| !term.is_empty())
            .map(parse_term)
            .collect();
        Self { terms }
    }

    /// Query matching every entry.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Build the `WHERE` clause for an entity with the given `fields`.
    ///
    /// Bare terms are matched against `default_fields`. Column names only ever
    /// come from these whitelists, never from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if a term names a field outside `fields`.
    pub fn to_sql(
        &self,
        entity: &str,
        fields: &[&str],
        default_fields: &[&str],
    ) -> Result<SqlFilter> {
        if self.terms.is_empty() {
            return Ok(SqlFilter {
                clause: "1".to_string(),
                params: Vec::new(),
            });
        }

        let mut clauses = Vec::with_capacity(self.terms.len());
        let mut params = Vec::new();

        for term in &self.terms {
            let like = format!("%{}%", escape_like(&term.pattern));
            match &term.field {
                Some(name) => {
                    let Some(column) = fields.iter().find(|f| **f == name.as_str()) else {
                        bail!(
                            "unknown field '{name}' for {entity} (available: {})",
                            fields.join(", ")
                        );
                    };
                    params.push(like);
                    clauses.push(format!("{column} LIKE ?{} ESCAPE '\\'", params.len()));
                }
                None => {
                    let alternatives: Vec<String> = default_fields
                        .iter()
                        .map(|column| {
                            params.push(like.clone());
                            format!("{column} LIKE ?{} ESCAPE '\\'", params.len())
                        })
                        .collect();
                    clauses.push(format!("({})", alternatives.join(" OR ")));
                }
            }
        }

        Ok(SqlFilter {
            clause: clauses.join(" AND "),
            params,
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .terms
            .iter()
            .map(|term| match &term.field {
                Some(field) => format!("{field}:{}", term.pattern),
                None => term.pattern.clone(),
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// `artist:Foo` → field term; `Foo`, `:Foo` and `10:30` style terms stay bare.
fn parse_term(raw: &str) -> Term {
    match raw.split_once(':') {
        Some((field, pattern))
            if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            Term {
                field: Some(field.to_ascii_lowercase()),
                pattern: pattern.to_string(),
            }
        }
        _ => Term {
            field: None,
            pattern: raw.to_string(),
        },
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
