use std::path::PathBuf;

/// A typed parameter value, produced by a `Format` conversion.
#[derive(Debug, Clone)]
pub enum Value {
    /// A boolean, produced by the `Flag` format.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A plain string (also produced by `Choice`).
    Str(String),
    /// A filesystem path with a verified access mode.
    Path(PathBuf),
    /// A compiled regular expression.
    Pattern(regex::Regex),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            // Regex carries no structural equality; the pattern source is the identity.
            (Value::Pattern(a), Value::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Value {
    /// The plain text rendering of this value.
    pub fn plain(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Path(p) => p.display().to_string(),
            Value::Pattern(r) => r.as_str().to_string(),
        }
    }
}

/// Render a value for display.
///
/// Values whose plain rendering contains whitespace are debug-quoted, so a
/// settings report never shows an ambiguous `a b` where `"a b"` was meant.
pub fn present(value: &Value) -> String {
    let plain = value.plain();

    if plain.chars().any(|c| c.is_whitespace()) {
        format!("{plain:?}")
    } else {
        plain
    }
}

/// The resolution product for one declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A single typed value.
    Single(Value),
    /// An ordered sequence of typed values (recurring parameters).
    Sequence(Vec<Value>),
    /// No value was supplied and no default exists.
    /// Only legal for optional or recurring parameters.
    Unset,
}

impl Binding {
    pub fn is_set(&self) -> bool {
        !matches!(self, Binding::Unset)
    }
}

/// Which source supplied a parameter's final value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    CommandLine,
    ConfigFile { path: PathBuf, section: String },
    Default,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::CommandLine => write!(f, "command line"),
            Provenance::ConfigFile { path, section } => {
                write!(f, "{} [{}]", path.display(), section)
            }
            Provenance::Default => write!(f, "builtin default"),
        }
    }
}
