use thiserror::Error;

use crate::format::{Format, FormatError};

/// A parameter declaration that cannot stand.
/// These are programmer errors, caught when the set is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("invalid parameter name '{0}'")]
    InvalidName(String),

    #[error("duplicate parameter '{0}'")]
    Duplicate(String),

    #[error("invalid option alias '{0}'")]
    InvalidAlias(char),

    #[error("duplicate option alias '{0}'")]
    DuplicateAlias(char),

    #[error("positional argument '{0}' declared after a recurring one")]
    AfterRecurring(String),

    #[error("required positional argument '{0}' declared after an optional one")]
    RequiredAfterOptional(String),

    #[error("default for option '{name}': {error}")]
    InvalidDefault { name: String, error: FormatError },

    #[error("documentation for unknown parameter '{0}'")]
    UnknownDocumentation(String),
}

/// Declare an option: a named parameter resolvable from every source.
/// Without a default, some source must supply a value (unless recurring).
///
/// ```
/// use optini::{Int, OptionDecl};
///
/// OptionDecl::new("noise", Int::at_least(0))
///     .alias('v')
///     .default("10")
///     .help("The noise level.");
/// ```
pub struct OptionDecl {
    pub(crate) name: String,
    pub(crate) alias: Option<char>,
    pub(crate) format: Box<dyn Format>,
    pub(crate) default: Option<String>,
    pub(crate) recurring: bool,
    pub(crate) reserved: bool,
    pub(crate) help: Option<String>,
}

impl OptionDecl {
    pub fn new(name: impl Into<String>, format: impl Format + 'static) -> Self {
        Self {
            name: name.into(),
            alias: None,
            format: Box::new(format),
            default: None,
            recurring: false,
            reserved: false,
            help: None,
        }
    }

    /// Single-character abbreviation, stackable in blocks such as `-qv42`.
    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// The builtin default, as a raw string the format must accept.
    pub fn default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    /// Allow the option to occur multiple times, collecting a sequence.
    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    /// Restrict the option to the command line.
    /// A configuration file that sets a reserved option is in error.
    pub fn reserved(mut self) -> Self {
        self.reserved = true;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }
}

/// Declare a positional argument, consumed in declaration order.
pub struct PosArgDecl {
    pub(crate) name: String,
    pub(crate) format: Box<dyn Format>,
    pub(crate) optional: bool,
    pub(crate) recurring: bool,
    pub(crate) help: Option<String>,
}

impl PosArgDecl {
    pub fn new(name: impl Into<String>, format: impl Format + 'static) -> Self {
        Self {
            name: name.into(),
            format: Box::new(format),
            optional: false,
            recurring: false,
            help: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Consume every remaining positional token.
    /// A recurring argument must be the final positional declaration.
    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }
}

fn check_name(name: &str) -> Result<(), DeclarationError> {
    if name.is_empty()
        || name.starts_with('-')
        || name.contains(|c: char| c.is_whitespace() || c == '=')
    {
        Err(DeclarationError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Check the whole declaration set for consistency.
pub(crate) fn validate(
    options: &[OptionDecl],
    positionals: &[PosArgDecl],
) -> Result<(), DeclarationError> {
    let mut names: Vec<&str> = Vec::default();
    let mut aliases: Vec<char> = Vec::default();

    for option in options {
        check_name(&option.name)?;

        if names.contains(&option.name.as_str()) {
            return Err(DeclarationError::Duplicate(option.name.clone()));
        }

        names.push(&option.name);

        if let Some(alias) = option.alias {
            if alias == '-' || !alias.is_ascii_alphanumeric() {
                return Err(DeclarationError::InvalidAlias(alias));
            }

            if aliases.contains(&alias) {
                return Err(DeclarationError::DuplicateAlias(alias));
            }

            aliases.push(alias);
        }

        if let Some(default) = &option.default {
            option
                .format
                .convert(default)
                .map_err(|error| DeclarationError::InvalidDefault {
                    name: option.name.clone(),
                    error,
                })?;
        }
    }

    let mut saw_optional = false;
    let mut saw_recurring = false;

    for positional in positionals {
        check_name(&positional.name)?;

        if names.contains(&positional.name.as_str()) {
            return Err(DeclarationError::Duplicate(positional.name.clone()));
        }

        names.push(&positional.name);

        if saw_recurring {
            return Err(DeclarationError::AfterRecurring(positional.name.clone()));
        }

        if saw_optional && !positional.optional {
            return Err(DeclarationError::RequiredAfterOptional(
                positional.name.clone(),
            ));
        }

        saw_optional |= positional.optional;
        saw_recurring |= positional.recurring;
    }

    Ok(())
}
