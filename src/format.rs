use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{present, Value};

/// A raw string was rejected by a [`Format`].
///
/// The resolution engine attaches the parameter name when reporting;
/// a format only knows the offending raw string and the reason.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{raw}' is not acceptable ({reason})")]
pub struct FormatError {
    pub raw: String,
    pub reason: String,
}

impl FormatError {
    pub(crate) fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// A self-validating value type: converts a raw string into a typed [`Value`].
///
/// Conversion must be pure and deterministic, and must accept its own
/// rendering (`convert(render(v))` yields a value equal to `v`).
/// User-defined formats implement this same trait.
pub trait Format {
    /// The user-facing format name (ex: `Int[0,100]`).
    fn name(&self) -> String;

    /// Validate and convert a raw string.
    fn convert(&self, raw: &str) -> Result<Value, FormatError>;

    /// Render a converted value back to text for display.
    fn render(&self, value: &Value) -> String {
        present(value)
    }

    /// Whether this format consumes an argument on the command line.
    /// Only [`Flag`] answers `false`: its mere presence sets `true`.
    fn takes_value(&self) -> bool {
        true
    }
}

/// An integer number, with optional inclusive bounds.
#[derive(Debug, Default)]
pub struct Int {
    lower: Option<i64>,
    upper: Option<i64>,
}

impl Int {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn at_least(lower: i64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn at_most(upper: i64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    pub fn bounded(lower: i64, upper: i64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

impl Format for Int {
    fn name(&self) -> String {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => format!("Int[{l},{u}]"),
            (Some(l), None) => format!("Int>={l}"),
            (None, Some(u)) => format!("Int<={u}"),
            (None, None) => "Int".to_string(),
        }
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        let value: i64 = raw
            .parse()
            .map_err(|_| FormatError::new(raw, "not an integer"))?;

        if let Some(lower) = self.lower {
            if value < lower {
                return Err(FormatError::new(
                    raw,
                    format!("must not be less than {lower}"),
                ));
            }
        }

        if let Some(upper) = self.upper {
            if value > upper {
                return Err(FormatError::new(
                    raw,
                    format!("must not be greater than {upper}"),
                ));
            }
        }

        Ok(Value::Int(value))
    }
}

/// A decimal number, with optional inclusive bounds.
#[derive(Debug, Default)]
pub struct Float {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl Float {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

impl Format for Float {
    fn name(&self) -> String {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => format!("Float[{l},{u}]"),
            (Some(l), None) => format!("Float>={l}"),
            (None, Some(u)) => format!("Float<={u}"),
            (None, None) => "Float".to_string(),
        }
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        let value: f64 = raw
            .parse()
            .map_err(|_| FormatError::new(raw, "not a number"))?;

        if let Some(lower) = self.lower {
            if value < lower {
                return Err(FormatError::new(
                    raw,
                    format!("must not be less than {lower}"),
                ));
            }
        }

        if let Some(upper) = self.upper {
            if value > upper {
                return Err(FormatError::new(
                    raw,
                    format!("must not be greater than {upper}"),
                ));
            }
        }

        Ok(Value::Float(value))
    }
}

/// A plain string of characters.
#[derive(Debug, Default)]
pub struct Text;

impl Format for Text {
    fn name(&self) -> String {
        "Text".to_string()
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        Ok(Value::Str(raw.to_string()))
    }
}

const FLAG_TRUE: [&str; 4] = ["1", "yes", "true", "on"];
const FLAG_FALSE: [&str; 4] = ["0", "no", "false", "off"];

/// A boolean flag.
///
/// On the command line its mere presence sets `true` (no argument).
/// In config files the tokens `1/yes/true/on` and `0/no/false/off`
/// (case-insensitive) map to `true` and `false` respectively.
#[derive(Debug, Default)]
pub struct Flag;

impl Format for Flag {
    fn name(&self) -> String {
        "Flag".to_string()
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        let lower = raw.to_lowercase();

        if FLAG_TRUE.contains(&lower.as_str()) {
            Ok(Value::Bool(true))
        } else if FLAG_FALSE.contains(&lower.as_str()) {
            Ok(Value::Bool(false))
        } else {
            Err(FormatError::new(
                raw,
                format!(
                    "allowed values are {}, {}",
                    FLAG_TRUE.join(", "),
                    FLAG_FALSE.join(", ")
                ),
            ))
        }
    }

    fn takes_value(&self) -> bool {
        false
    }
}

/// Choose among a closed set of allowed values (case-insensitive lookup,
/// canonical spelling in the converted value).
#[derive(Debug)]
pub struct Choice {
    choices: Vec<String>,
}

impl Choice {
    /// Create a choice format.
    ///
    /// Panics when `choices` is empty: a choice among nothing is a
    /// programming error, not a runtime condition.
    pub fn new<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        assert!(!choices.is_empty(), "need at least one choice");
        Self { choices }
    }
}

impl Format for Choice {
    fn name(&self) -> String {
        format!("{{{}}}", self.choices.join(", "))
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        for choice in &self.choices {
            if choice.eq_ignore_ascii_case(raw) {
                return Ok(Value::Str(choice.clone()));
            }
        }

        Err(FormatError::new(
            raw,
            format!("not among the legal choices: {}", self.choices.join(", ")),
        ))
    }
}

/// The filesystem access a [`PathArg`] must verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// An existing file, readable.
    ReadFile,
    /// A file writable in append mode; created when possible.
    WriteFile,
    /// An existing directory, readable.
    ReadDir,
    /// A writable directory; created when possible.
    WriteDir,
}

/// A filesystem path verified against an [`AccessMode`].
#[derive(Debug)]
pub struct PathArg {
    mode: AccessMode,
}

impl PathArg {
    pub fn readable_file() -> Self {
        Self {
            mode: AccessMode::ReadFile,
        }
    }

    pub fn writable_file() -> Self {
        Self {
            mode: AccessMode::WriteFile,
        }
    }

    pub fn readable_dir() -> Self {
        Self {
            mode: AccessMode::ReadDir,
        }
    }

    pub fn writable_dir() -> Self {
        Self {
            mode: AccessMode::WriteDir,
        }
    }
}

impl Format for PathArg {
    fn name(&self) -> String {
        match self.mode {
            AccessMode::ReadFile => "ReadableFile".to_string(),
            AccessMode::WriteFile => "WritableFile".to_string(),
            AccessMode::ReadDir => "ReadableDir".to_string(),
            AccessMode::WriteDir => "WritableDir".to_string(),
        }
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        let path = PathBuf::from(raw);

        match self.mode {
            AccessMode::ReadFile => {
                File::open(&path).map_err(|e| FormatError::new(raw, e.to_string()))?;
            }
            AccessMode::WriteFile => {
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&path)
                    .map_err(|e| FormatError::new(raw, e.to_string()))?;
            }
            AccessMode::ReadDir => {
                if !path.is_dir() {
                    return Err(FormatError::new(raw, "not a readable directory"));
                }

                std::fs::read_dir(&path).map_err(|e| FormatError::new(raw, e.to_string()))?;
            }
            AccessMode::WriteDir => {
                if !path.is_dir() {
                    std::fs::create_dir(&path).map_err(|_| {
                        FormatError::new(raw, "does not exist and cannot be created")
                    })?;
                } else {
                    let metadata = std::fs::metadata(&path)
                        .map_err(|e| FormatError::new(raw, e.to_string()))?;

                    if metadata.permissions().readonly() {
                        return Err(FormatError::new(raw, "not a writable directory"));
                    }
                }
            }
        }

        Ok(Value::Path(path))
    }
}

/// A regular expression, compiled at conversion time.
#[derive(Debug, Default)]
pub struct Pattern;

impl Format for Pattern {
    fn name(&self) -> String {
        "Pattern".to_string()
    }

    fn convert(&self, raw: &str) -> Result<Value, FormatError> {
        let compiled =
            regex::Regex::new(raw).map_err(|e| FormatError::new(raw, e.to_string()))?;
        Ok(Value::Pattern(compiled))
    }
}
