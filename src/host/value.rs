//! Host values
//!
//! The subset of the scripting runtime's value model that crosses into the
//! cache classes. Only `Text` is accepted for keys and values; the other
//! variants exist so that type errors can be reported with the host's names.

use std::fmt;

// == Value ==
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nothin,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Text(String),
}

impl Value {
    /// Returns the host's name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothin => "NOTHIN",
            Value::Bool(_) => "BOOL",
            Value::Integer(_) => "INTEGR",
            Value::Double(_) => "DUBBLE",
            Value::Text(_) => "STRIN",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_nothin(&self) -> bool {
        matches!(self, Value::Nothin)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothin => write!(f, "NOTHIN"),
            Value::Bool(true) => write!(f, "YEZ"),
            Value::Bool(false) => write!(f, "NO"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Double(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Option<String>> for Value {
    fn from(opt: Option<String>) -> Self {
        opt.map(Value::Text).unwrap_or(Value::Nothin)
    }
}
