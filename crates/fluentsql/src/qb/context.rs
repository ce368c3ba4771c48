//! SQL text + parameter accumulator used by the dialect compilers.

use crate::value::Value;
use std::fmt;

/// Positional placeholder style of a dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`
    Question,
    /// `$1, $2, ...`
    Dollar,
}

/// Append-only SQL buffer with its ordered parameter list.
///
/// Placeholders are only ever written by [`BuildContext::push_param`], so the
/// n-th placeholder in the text always corresponds to the n-th parameter.
#[derive(Debug)]
pub struct BuildContext {
    sql: String,
    params: Vec<Value>,
    placeholder: Placeholder,
}

impl BuildContext {
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            sql: String::with_capacity(128),
            params: Vec::new(),
            placeholder,
        }
    }

    /// Append raw SQL text.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append formatted SQL text.
    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        use std::fmt::Write;
        let _ = self.sql.write_fmt(args);
        self
    }

    /// Append a placeholder and bind `value` to it.
    pub fn push_param(&mut self, value: Value) -> &mut Self {
        self.params.push(value);
        match self.placeholder {
            Placeholder::Question => self.sql.push('?'),
            Placeholder::Dollar => {
                let idx = self.params.len();
                self.push_fmt(format_args!("${idx}"));
            }
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Consume the context into the finished query.
    pub fn finish(self) -> BuiltQuery {
        BuiltQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Compiled SQL text and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl fmt::Display for BuiltQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- [", self.sql)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match p.to_literal() {
                Some(lit) => f.write_str(&lit)?,
                None => write!(f, "{p}")?,
            }
        }
        f.write_str("]")
    }
}
