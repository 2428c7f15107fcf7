//! Textual model filters, for callers that cannot pass a closure (CLI flags, config).
//!
//! Grammar: comma-separated clauses, all of which must match.
//!
//! | clause            | matches when                         |
//! |-------------------|--------------------------------------|
//! | `provider=<name>` | `spec.provider == name`              |
//! | `model=<name>`    | `spec.model == name`                 |
//! | `model~<text>`    | `spec.model` contains `text`         |
//! | `index=<n>`       | the model sits at position `n`       |
//!
//! The empty string accepts every model.

use std::fmt;
use std::str::FromStr;

use asak_core::ModelSpec;

use crate::error::RouterError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Clause {
    Provider(String),
    Model(String),
    ModelContains(String),
    Index(usize),
}

impl Clause {
    fn matches(&self, index: usize, spec: &ModelSpec) -> bool {
        match self {
            Clause::Provider(name) => spec.provider == *name,
            Clause::Model(name) => spec.model == *name,
            Clause::ModelContains(text) => spec.model.contains(text.as_str()),
            Clause::Index(n) => index == *n,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Provider(name) => write!(f, "provider={name}"),
            Clause::Model(name) => write!(f, "model={name}"),
            Clause::ModelContains(text) => write!(f, "model~{text}"),
            Clause::Index(n) => write!(f, "index={n}"),
        }
    }
}

/// A parsed filter expression. See the module docs for the grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelFilter {
    clauses: Vec<Clause>,
}

impl ModelFilter {
    /// The filter that accepts every model.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, index: usize, spec: &ModelSpec) -> bool {
        self.clauses.iter().all(|c| c.matches(index, spec))
    }
}

impl FromStr for ModelFilter {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut clauses = Vec::new();

        for raw in s.split(',').map(str::trim) {
            if raw.is_empty() {
                if s.trim().is_empty() {
                    continue;
                }
                return Err(RouterError::InvalidFilter(format!("empty clause in '{s}'")));
            }

            let Some(split) = raw.find(['=', '~']) else {
                return Err(RouterError::InvalidFilter(format!(
                    "clause '{raw}' has no '=' or '~'"
                )));
            };
            let (key, rest) = raw.split_at(split);
            let (op, value) = rest.split_at(1);
            let (key, value) = (key.trim(), value.trim());

            if value.is_empty() {
                return Err(RouterError::InvalidFilter(format!(
                    "clause '{raw}' has no value"
                )));
            }

            let clause = match (key, op) {
                ("provider", "=") => Clause::Provider(value.to_string()),
                ("model", "=") => Clause::Model(value.to_string()),
                ("model", "~") => Clause::ModelContains(value.to_string()),
                ("index", "=") => Clause::Index(value.parse().map_err(|_| {
                    RouterError::InvalidFilter(format!("index '{value}' is not a number"))
                })?),
                _ => {
                    return Err(RouterError::InvalidFilter(format!(
                        "unsupported clause '{raw}'"
                    )))
                }
            };
            clauses.push(clause);
        }

        Ok(Self { clauses })
    }
}

impl fmt::Display for ModelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}
