use thiserror::Error;

/// The slice of a declaration the tokenizer needs: how an option is spelled
/// and whether it consumes an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionSpec {
    pub(crate) name: String,
    pub(crate) alias: Option<char>,
    pub(crate) takes_value: bool,
}

/// One token of the command line, after option/positional separation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An option occurrence under its canonical name.
    /// `value` is `None` exactly when the option is a bare flag.
    Option { name: String, value: Option<String> },
    Positional(String),
}

/// A command line that cannot be split into tokens.
/// Always fatal: token alignment cannot be trusted afterwards.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenError {
    #[error("unknown option '--{0}'")]
    UnknownOption(String),

    #[error("unknown option abbreviation '{flag}' in '-{block}'")]
    UnknownAbbreviation { flag: char, block: String },

    #[error("option '--{0}' requires a value")]
    MissingValue(String),

    #[error("option '--{0}' does not take a value")]
    UnexpectedValue(String),
}

fn by_name<'a>(specs: &'a [OptionSpec], name: &str) -> Option<&'a OptionSpec> {
    specs.iter().find(|spec| spec.name == name)
}

fn by_alias<'a>(specs: &'a [OptionSpec], alias: char) -> Option<&'a OptionSpec> {
    specs.iter().find(|spec| spec.alias == Some(alias))
}

/// Split `argv` into option occurrences and positional tokens.
///
/// Options may only precede the positional arguments: the option region ends
/// at the first positional token, at `--`, or at a standalone `-` (which is
/// itself a positional token, conventionally stdin/stdout).
pub(crate) fn tokenize(argv: &[&str], specs: &[OptionSpec]) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::with_capacity(argv.len());
    let mut cursor = argv.iter();
    let mut options_open = true;

    while let Some(item) = cursor.next() {
        if !options_open {
            tokens.push(Token::Positional(item.to_string()));
            continue;
        }

        if *item == "--" {
            options_open = false;
            continue;
        }

        if let Some(long) = item.strip_prefix("--") {
            let (name, attached) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (long, None),
            };
            let spec =
                by_name(specs, name).ok_or_else(|| TokenError::UnknownOption(name.to_string()))?;

            let value = if spec.takes_value {
                match attached {
                    Some(value) => Some(value),
                    None => Some(
                        cursor
                            .next()
                            .ok_or_else(|| TokenError::MissingValue(spec.name.clone()))?
                            .to_string(),
                    ),
                }
            } else if attached.is_some() {
                return Err(TokenError::UnexpectedValue(spec.name.clone()));
            } else {
                None
            };

            tokens.push(Token::Option {
                name: spec.name.clone(),
                value,
            });
            continue;
        }

        match item.strip_prefix('-') {
            Some(block) if !block.is_empty() => {
                let mut chars = block.char_indices();

                while let Some((at, flag)) = chars.next() {
                    let spec = by_alias(specs, flag).ok_or(TokenError::UnknownAbbreviation {
                        flag,
                        block: block.to_string(),
                    })?;

                    if !spec.takes_value {
                        tokens.push(Token::Option {
                            name: spec.name.clone(),
                            value: None,
                        });
                        continue;
                    }

                    // A value-taking option swallows the rest of the block,
                    // falling back to the next token when nothing remains.
                    let remainder = &block[at + flag.len_utf8()..];
                    let value = if remainder.is_empty() {
                        cursor
                            .next()
                            .ok_or_else(|| TokenError::MissingValue(spec.name.clone()))?
                            .to_string()
                    } else {
                        remainder.to_string()
                    };

                    tokens.push(Token::Option {
                        name: spec.name.clone(),
                        value: Some(value),
                    });
                    break;
                }
            }
            _ => {
                // Positional (including standalone '-'); options are over.
                options_open = false;
                tokens.push(Token::Positional(item.to_string()));
            }
        }
    }

    Ok(tokens)
}
