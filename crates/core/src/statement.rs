use std::fmt;

use crate::DbValue;

/// Final SQL text for one submission.
///
/// Identifiers are inlined as given. `literals` lists the escaped value
/// literals embedded in the text; `params` holds values bound positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStatement {
    sql: String,
    literals: Vec<String>,
    params: Vec<DbValue>,
}

impl RenderedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            literals: Vec::new(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_literals(mut self, literals: impl IntoIterator<Item = String>) -> Self {
        self.literals.extend(literals);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = DbValue>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn params(&self) -> &[DbValue] {
        &self.params
    }
}

impl fmt::Display for RenderedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
