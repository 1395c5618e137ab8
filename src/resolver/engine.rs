use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::config::{ConfigSource, ConfigSyntaxError, MergedSection};
use crate::format::{Format, FormatError};
use crate::model::{Binding, Provenance, Value};
use crate::tokens::{tokenize, OptionSpec, Token, TokenError};

/// The resolver-level shape of a declared option.
/// Assumed valid; `ParameterSet::build_parser` performs the declaration checks.
pub(crate) struct OptionConfig {
    pub(crate) name: String,
    pub(crate) alias: Option<char>,
    pub(crate) format: Box<dyn Format>,
    pub(crate) default: Option<String>,
    pub(crate) recurring: bool,
    pub(crate) reserved: bool,
}

/// The resolver-level shape of a declared positional argument.
pub(crate) struct PositionalConfig {
    pub(crate) name: String,
    pub(crate) format: Box<dyn Format>,
    pub(crate) optional: bool,
    pub(crate) recurring: bool,
}

/// One collected per-parameter failure.
/// These accumulate across the whole pass so the user sees every problem at once.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ParameterError {
    #[error("parameter '{parameter}' from {provenance}: {error}")]
    Format {
        parameter: String,
        provenance: Provenance,
        error: FormatError,
    },

    #[error("parameter '{0}' is required")]
    Missing(String),

    #[error("positional argument '{parameter}' is required ({required} required, {supplied} supplied)")]
    MissingArgument {
        parameter: String,
        required: usize,
        supplied: usize,
    },

    #[error("option '{0}' occurs more than once")]
    Recurrence(String),

    #[error("parameter '{parameter}': {reason}")]
    Invalid { parameter: String, reason: String },
}

/// A failed resolution pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ResolveError {
    #[error(transparent)]
    Tokens(#[from] TokenError),

    #[error(transparent)]
    ConfigSyntax(#[from] ConfigSyntaxError),

    #[error("option '{name}' is reserved for the command line (found in {provenance})")]
    ReservedOption { name: String, provenance: Provenance },

    #[error("unknown setting '{key}' in {provenance}")]
    UndeclaredKey { key: String, provenance: Provenance },

    #[error("unexpected extra arguments: {}", .0.join(" "))]
    ExtraArguments(Vec<String>),

    #[error("unable to resolve {n} parameter(s):{}", .0.iter().map(|e| format!("\n  {e}")).collect::<String>(), n = .0.len())]
    Aggregate(Vec<ParameterError>),
}

/// The fully resolved product for one declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) name: String,
    pub(crate) format_name: String,
    pub(crate) binding: Binding,
    pub(crate) provenance: Option<Provenance>,
    /// Format-rendered text, for the settings report.
    pub(crate) rendered: String,
}

pub(crate) struct ResolutionEngine {
    options: Vec<OptionConfig>,
    positionals: Vec<PositionalConfig>,
    sections: Vec<String>,
    ignore: Vec<String>,
}

// A raw string paired with where it came from, pre-conversion.
struct Sourced {
    raw: Option<String>,
    provenance: Provenance,
}

impl ResolutionEngine {
    pub(crate) fn new(
        options: Vec<OptionConfig>,
        positionals: Vec<PositionalConfig>,
        sections: Vec<String>,
        ignore: Vec<String>,
    ) -> Self {
        Self {
            options,
            positionals,
            sections,
            ignore,
        }
    }

    /// The tokenizer-facing view of the declared options.
    pub(crate) fn option_specs(&self) -> Vec<OptionSpec> {
        self.options
            .iter()
            .map(|option| OptionSpec {
                name: option.name.clone(),
                alias: option.alias,
                takes_value: option.format.takes_value(),
            })
            .collect()
    }

    /// Resolve every declared parameter against the command line tokens and
    /// the configuration sources (supplied in discovery order; the
    /// last-discovered source carries the highest precedence).
    pub(crate) fn resolve(
        &self,
        tokens: &[&str],
        configs: &[ConfigSource],
    ) -> Result<Vec<Resolution>, ResolveError> {
        let specs = self.option_specs();

        let mut occurrences: Vec<Vec<Option<String>>> = vec![Vec::default(); self.options.len()];
        let mut positional_tokens: Vec<String> = Vec::default();

        for token in tokenize(tokens, &specs)? {
            match token {
                Token::Option { name, value } => {
                    let index = self
                        .options
                        .iter()
                        .position(|option| option.name == name)
                        .expect("internal error - tokenizer returned an undeclared option");
                    occurrences[index].push(value);
                }
                Token::Positional(value) => positional_tokens.push(value),
            }
        }

        let views = self.merge_configs(configs)?;
        let mut errors: Vec<ParameterError> = Vec::default();
        let mut resolutions = Vec::with_capacity(self.options.len() + self.positionals.len());

        for (option, supplied) in self.options.iter().zip(occurrences) {
            resolutions.push(self.resolve_option(option, supplied, &views, &mut errors));
        }

        self.resolve_positionals(positional_tokens, &mut resolutions, &mut errors)?;

        if errors.is_empty() {
            Ok(resolutions)
        } else {
            Err(ResolveError::Aggregate(errors))
        }
    }

    /// Produce the merged (DEFAULT underlay + section, interpolated) views,
    /// ordered from highest to lowest precedence, verifying every key.
    fn merge_configs(
        &self,
        configs: &[ConfigSource],
    ) -> Result<Vec<(Provenance, MergedSection)>, ResolveError> {
        let mut views = Vec::default();

        for config in configs.iter().rev() {
            for section in self.sections.iter().rev() {
                // A source that never mentions the consulted section has
                // nothing to say; its DEFAULT entries supply fallbacks
                // within a file, not a cross-file override lane.
                if !config.has_section(section) {
                    continue;
                }

                let merged = config.merged(section)?;
                let provenance = Provenance::ConfigFile {
                    path: config.path().to_path_buf(),
                    section: section.clone(),
                };

                for (key, _) in &merged.entries {
                    match self.options.iter().find(|option| &option.name == key) {
                        Some(option) => {
                            if option.reserved {
                                return Err(ResolveError::ReservedOption {
                                    name: key.clone(),
                                    provenance,
                                });
                            }
                        }
                        None => {
                            // Interpolation fodder and explicitly ignored keys
                            // are fine; anything else is likely a misspelling.
                            if !merged.interpolation_keys.contains(key)
                                && !self.ignore.contains(key)
                            {
                                return Err(ResolveError::UndeclaredKey {
                                    key: key.clone(),
                                    provenance,
                                });
                            }
                        }
                    }
                }

                views.push((provenance, merged));
            }
        }

        Ok(views)
    }

    fn resolve_option(
        &self,
        option: &OptionConfig,
        supplied: Vec<Option<String>>,
        views: &[(Provenance, MergedSection)],
        errors: &mut Vec<ParameterError>,
    ) -> Resolution {
        if !option.recurring && supplied.len() > 1 {
            errors.push(ParameterError::Recurrence(option.name.clone()));
        }

        // Every candidate in precedence order: command line first, then the
        // config views (already highest to lowest), then the builtin default.
        let mut candidates: Vec<Sourced> = supplied
            .into_iter()
            .map(|raw| Sourced {
                raw,
                provenance: Provenance::CommandLine,
            })
            .collect();

        for (provenance, merged) in views {
            if let Some(raw) = merged.get(&option.name) {
                candidates.push(Sourced {
                    raw: Some(raw.to_string()),
                    provenance: provenance.clone(),
                });
            }
        }

        if let Some(default) = &option.default {
            candidates.push(Sourced {
                raw: Some(default.clone()),
                provenance: Provenance::Default,
            });
        }

        // A recurring option may legitimately collect nothing; a plain one
        // with no source at all has no value to stand on.
        if candidates.is_empty() && !option.recurring {
            errors.push(ParameterError::Missing(option.name.clone()));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Resolving option '{}' from {} candidate(s).",
                option.name,
                candidates.len()
            );
        }

        if option.recurring {
            self.resolve_recurring(&option.name, option.format.as_ref(), candidates, errors)
        } else {
            self.resolve_single(&option.name, option.format.as_ref(), candidates, errors)
        }
    }

    fn resolve_single(
        &self,
        name: &str,
        format: &dyn Format,
        candidates: Vec<Sourced>,
        errors: &mut Vec<ParameterError>,
    ) -> Resolution {
        match candidates.into_iter().next() {
            Some(candidate) => match self.convert(name, format, candidate, errors) {
                Some((value, provenance)) => {
                    let rendered = format.render(&value);
                    Resolution {
                        name: name.to_string(),
                        format_name: format.name(),
                        binding: Binding::Single(value),
                        provenance: Some(provenance),
                        rendered,
                    }
                }
                None => self.unset(name, format),
            },
            None => self.unset(name, format),
        }
    }

    /// A recurring parameter collects from every source: the declared default
    /// first, then the command line in supply order, then the config views
    /// from highest to lowest precedence.
    fn resolve_recurring(
        &self,
        name: &str,
        format: &dyn Format,
        candidates: Vec<Sourced>,
        errors: &mut Vec<ParameterError>,
    ) -> Resolution {
        let (defaults, supplied): (Vec<Sourced>, Vec<Sourced>) = candidates
            .into_iter()
            .partition(|candidate| candidate.provenance == Provenance::Default);
        let provenance = supplied
            .first()
            .or(defaults.first())
            .map(|candidate| candidate.provenance.clone());
        let mut values = Vec::default();

        for candidate in defaults.into_iter().chain(supplied) {
            if let Some((value, _)) = self.convert(name, format, candidate, errors) {
                values.push(value);
            }
        }

        if values.is_empty() {
            self.unset(name, format)
        } else {
            let rendered = format!(
                "[{}]",
                values
                    .iter()
                    .map(|value| format.render(value))
                    .collect::<Vec<String>>()
                    .join(", ")
            );
            Resolution {
                name: name.to_string(),
                format_name: format.name(),
                binding: Binding::Sequence(values),
                provenance,
                rendered,
            }
        }
    }

    fn convert(
        &self,
        name: &str,
        format: &dyn Format,
        candidate: Sourced,
        errors: &mut Vec<ParameterError>,
    ) -> Option<(Value, Provenance)> {
        match candidate.raw {
            // Bare presence on the command line.
            None => Some((Value::Bool(true), candidate.provenance)),
            Some(raw) => match format.convert(&raw) {
                Ok(value) => Some((value, candidate.provenance)),
                Err(error) => {
                    errors.push(ParameterError::Format {
                        parameter: name.to_string(),
                        provenance: candidate.provenance,
                        error,
                    });
                    None
                }
            },
        }
    }

    fn unset(&self, name: &str, format: &dyn Format) -> Resolution {
        Resolution {
            name: name.to_string(),
            format_name: format.name(),
            binding: Binding::Unset,
            provenance: None,
            rendered: "unset".to_string(),
        }
    }

    /// Assign the positional tokens greedily: each required argument takes
    /// one, each optional argument takes one while tokens remain, and a
    /// recurring (always last) argument takes the rest.
    fn resolve_positionals(
        &self,
        tokens: Vec<String>,
        resolutions: &mut Vec<Resolution>,
        errors: &mut Vec<ParameterError>,
    ) -> Result<(), ResolveError> {
        let supplied = tokens.len();
        let required = self
            .positionals
            .iter()
            .filter(|positional| !positional.optional)
            .count();
        let mut remaining = tokens.into_iter().peekable();

        for positional in &self.positionals {
            let format = positional.format.as_ref();

            if positional.recurring {
                let candidates: Vec<Sourced> = remaining
                    .by_ref()
                    .map(|raw| Sourced {
                        raw: Some(raw),
                        provenance: Provenance::CommandLine,
                    })
                    .collect();

                if candidates.is_empty() && !positional.optional {
                    errors.push(ParameterError::MissingArgument {
                        parameter: positional.name.clone(),
                        required,
                        supplied,
                    });
                }

                resolutions.push(self.resolve_recurring(
                    &positional.name,
                    format,
                    candidates,
                    errors,
                ));
            } else {
                match remaining.next() {
                    Some(raw) => {
                        let candidate = Sourced {
                            raw: Some(raw),
                            provenance: Provenance::CommandLine,
                        };
                        resolutions.push(self.resolve_single(
                            &positional.name,
                            format,
                            vec![candidate],
                            errors,
                        ));
                    }
                    None => {
                        if !positional.optional {
                            errors.push(ParameterError::MissingArgument {
                                parameter: positional.name.clone(),
                                required,
                                supplied,
                            });
                        }

                        resolutions.push(self.unset(&positional.name, format));
                    }
                }
            }
        }

        let extra: Vec<String> = remaining.collect();

        if extra.is_empty() {
            Ok(())
        } else {
            Err(ResolveError::ExtraArguments(extra))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Flag, Int, Text};
    use crate::test::assert_contains;
    use rstest::rstest;
    use std::path::PathBuf;

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(
            vec![
                OptionConfig {
                    name: "quiet".to_string(),
                    alias: Some('q'),
                    format: Box::new(Flag),
                    default: Some("no".to_string()),
                    recurring: false,
                    reserved: false,
                },
                OptionConfig {
                    name: "noise".to_string(),
                    alias: Some('v'),
                    format: Box::new(Int::at_least(0)),
                    default: Some("10".to_string()),
                    recurring: false,
                    reserved: false,
                },
                OptionConfig {
                    name: "tag".to_string(),
                    alias: Some('t'),
                    format: Box::new(Text),
                    default: None,
                    recurring: true,
                    reserved: false,
                },
                OptionConfig {
                    name: "settings".to_string(),
                    alias: Some('S'),
                    format: Box::new(Flag),
                    default: Some("no".to_string()),
                    recurring: false,
                    reserved: true,
                },
            ],
            Vec::default(),
            vec!["myprog".to_string()],
            vec!["scratch".to_string()],
        )
    }

    fn config(path: &str, text: &str) -> ConfigSource {
        ConfigSource::parse(path, text).unwrap()
    }

    fn lookup<'a>(resolutions: &'a [Resolution], name: &str) -> &'a Resolution {
        resolutions
            .iter()
            .find(|resolution| resolution.name == name)
            .unwrap()
    }

    #[test]
    fn resolve_defaults() {
        // Setup
        let engine = engine();

        // Execute
        let resolutions = engine.resolve(&[], &[]).unwrap();

        // Verify
        let noise = lookup(&resolutions, "noise");
        assert_eq!(noise.binding, Binding::Single(Value::Int(10)));
        assert_eq!(noise.provenance, Some(Provenance::Default));

        let tag = lookup(&resolutions, "tag");
        assert_eq!(tag.binding, Binding::Unset);
        assert_eq!(tag.provenance, None);
        assert_eq!(tag.rendered, "unset");
    }

    #[test]
    fn resolve_command_line_over_config() {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", "[myprog]\nnoise = 3\n")];

        // Execute
        let resolutions = engine.resolve(&["--noise", "14"], &configs).unwrap();

        // Verify
        let noise = lookup(&resolutions, "noise");
        assert_eq!(noise.binding, Binding::Single(Value::Int(14)));
        assert_eq!(noise.provenance, Some(Provenance::CommandLine));
        assert_eq!(noise.rendered, "14");
    }

    #[test]
    fn resolve_config_precedence() {
        // Setup
        let engine = engine();
        // Discovery order: a.conf first, b.conf last; b.conf wins.
        let configs = vec![
            config("a.conf", "[myprog]\nnoise = 3\n"),
            config("b.conf", "[myprog]\nnoise = 7\n"),
        ];

        // Execute
        let resolutions = engine.resolve(&[], &configs).unwrap();

        // Verify
        let noise = lookup(&resolutions, "noise");
        assert_eq!(noise.binding, Binding::Single(Value::Int(7)));
        assert_eq!(
            noise.provenance,
            Some(Provenance::ConfigFile {
                path: PathBuf::from("b.conf"),
                section: "myprog".to_string(),
            })
        );
    }

    #[test]
    fn resolve_default_only_file_is_skipped() {
        // Setup: the later file never mentions [myprog]; its DEFAULT
        // entries must not outrank the earlier file's explicit setting.
        let engine = engine();
        let configs = vec![
            config("a.conf", "[myprog]\nnoise = 3\n"),
            config("b.conf", "[DEFAULT]\nnoise = 9\n"),
        ];

        // Execute
        let resolutions = engine.resolve(&[], &configs).unwrap();

        // Verify
        let noise = lookup(&resolutions, "noise");
        assert_eq!(noise.binding, Binding::Single(Value::Int(3)));
        assert_eq!(
            noise.provenance,
            Some(Provenance::ConfigFile {
                path: PathBuf::from("a.conf"),
                section: "myprog".to_string(),
            })
        );
    }

    #[test]
    fn resolve_flag_bare_presence() {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", "[myprog]\nquiet = no\n")];

        // Execute
        let resolutions = engine.resolve(&["-q"], &configs).unwrap();

        // Verify
        let quiet = lookup(&resolutions, "quiet");
        assert_eq!(quiet.binding, Binding::Single(Value::Bool(true)));
        assert_eq!(quiet.provenance, Some(Provenance::CommandLine));
    }

    #[test]
    fn resolve_flag_from_config() {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", "[myprog]\nquiet = yes\n")];

        // Execute
        let resolutions = engine.resolve(&[], &configs).unwrap();

        // Verify
        let quiet = lookup(&resolutions, "quiet");
        assert_eq!(quiet.binding, Binding::Single(Value::Bool(true)));
        assert_matches!(quiet.provenance, Some(Provenance::ConfigFile { .. }));
    }

    #[test]
    fn resolve_recurring_order() {
        // Setup: no default on 'tag'; command line before configs, configs
        // from highest to lowest precedence.
        let engine = engine();
        let configs = vec![
            config("far.conf", "[myprog]\ntag = far\n"),
            config("near.conf", "[myprog]\ntag = near\n"),
        ];

        // Execute
        let resolutions = engine
            .resolve(&["--tag", "one", "-t", "two"], &configs)
            .unwrap();

        // Verify
        let tag = lookup(&resolutions, "tag");
        assert_eq!(
            tag.binding,
            Binding::Sequence(vec![
                Value::Str("one".to_string()),
                Value::Str("two".to_string()),
                Value::Str("near".to_string()),
                Value::Str("far".to_string()),
            ])
        );
        assert_eq!(tag.provenance, Some(Provenance::CommandLine));
        assert_eq!(tag.rendered, "[one, two, near, far]");
    }

    #[test]
    fn resolve_recurrence_error() {
        // Setup
        let engine = engine();

        // Execute
        let error = engine
            .resolve(&["--noise", "1", "--noise", "2"], &[])
            .unwrap_err();

        // Verify
        assert_eq!(
            error,
            ResolveError::Aggregate(vec![ParameterError::Recurrence("noise".to_string())])
        );
    }

    #[test]
    fn resolve_missing_required_option() {
        // Setup: no default, not recurring, nothing supplied.
        let engine = ResolutionEngine::new(
            vec![OptionConfig {
                name: "token".to_string(),
                alias: None,
                format: Box::new(Text),
                default: None,
                recurring: false,
                reserved: false,
            }],
            Vec::default(),
            Vec::default(),
            Vec::default(),
        );

        // Execute
        let error = engine.resolve(&[], &[]).unwrap_err();

        // Verify
        assert_eq!(
            error,
            ResolveError::Aggregate(vec![ParameterError::Missing("token".to_string())])
        );
    }

    #[test]
    fn resolve_aggregates_errors() {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", "[myprog]\nquiet = maybe\n")];

        // Execute
        let error = engine.resolve(&["--noise", "-5"], &configs).unwrap_err();

        // Verify: both failures reported in one pass.
        assert_matches!(
            &error,
            ResolveError::Aggregate(errors) if errors.len() == 2
        );
        let report = error.to_string();
        assert!(report.contains("unable to resolve 2 parameter(s):"), "{report}");
        assert!(report.contains("'quiet'"), "{report}");
        assert!(report.contains("'noise'"), "{report}");
    }

    #[test]
    fn resolve_reserved_option_in_config() {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", "[myprog]\nsettings = yes\n")];

        // Execute
        let error = engine.resolve(&[], &configs).unwrap_err();

        // Verify
        assert_matches!(error, ResolveError::ReservedOption { name, .. } if name == "settings");
    }

    #[rstest]
    #[case("[myprog]\nnois = 3\n", "nois")]
    #[case("[DEFAULT]\nmystery = 3\n[myprog]\nnoise = 1\n", "mystery")]
    fn resolve_undeclared_key(#[case] text: &str, #[case] key: &str) {
        // Setup
        let engine = engine();
        let configs = vec![config("a.conf", text)];

        // Execute
        let error = engine.resolve(&[], &configs).unwrap_err();

        // Verify
        assert_matches!(error, ResolveError::UndeclaredKey { key: k, .. } if k == key);
    }

    #[test]
    fn resolve_interpolation_fodder_allowed() {
        // Setup
        let engine = engine();
        let configs = vec![config(
            "a.conf",
            "[DEFAULT]\nserver = liu.se\n[myprog]\ntag = %(server)s/index.html\nscratch = ignored\n",
        )];

        // Execute
        let resolutions = engine.resolve(&[], &configs).unwrap();

        // Verify
        let tag = lookup(&resolutions, "tag");
        assert_eq!(
            tag.binding,
            Binding::Sequence(vec![Value::Str("liu.se/index.html".to_string())])
        );
    }

    #[test]
    fn resolve_positionals() {
        // Setup
        let engine = ResolutionEngine::new(
            Vec::default(),
            vec![
                PositionalConfig {
                    name: "source".to_string(),
                    format: Box::new(Text),
                    optional: false,
                    recurring: false,
                },
                PositionalConfig {
                    name: "destination".to_string(),
                    format: Box::new(Text),
                    optional: true,
                    recurring: false,
                },
                PositionalConfig {
                    name: "extras".to_string(),
                    format: Box::new(Int::any()),
                    optional: true,
                    recurring: true,
                },
            ],
            Vec::default(),
            Vec::default(),
        );

        // Execute
        let resolutions = engine.resolve(&["in", "out", "1", "2"], &[]).unwrap();

        // Verify
        assert_eq!(
            lookup(&resolutions, "source").binding,
            Binding::Single(Value::Str("in".to_string()))
        );
        assert_eq!(
            lookup(&resolutions, "destination").binding,
            Binding::Single(Value::Str("out".to_string()))
        );
        assert_eq!(
            lookup(&resolutions, "extras").binding,
            Binding::Sequence(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn resolve_positionals_missing() {
        // Setup
        let engine = ResolutionEngine::new(
            Vec::default(),
            vec![
                PositionalConfig {
                    name: "source".to_string(),
                    format: Box::new(Text),
                    optional: false,
                    recurring: false,
                },
                PositionalConfig {
                    name: "destination".to_string(),
                    format: Box::new(Text),
                    optional: false,
                    recurring: false,
                },
            ],
            Vec::default(),
            Vec::default(),
        );

        // Execute
        let error = engine.resolve(&["in"], &[]).unwrap_err();

        // Verify: the report carries the required vs supplied counts.
        assert_eq!(
            error,
            ResolveError::Aggregate(vec![ParameterError::MissingArgument {
                parameter: "destination".to_string(),
                required: 2,
                supplied: 1,
            }])
        );
        assert_contains!(error.to_string(), "2 required, 1 supplied");
    }

    #[test]
    fn resolve_positionals_extra() {
        // Setup
        let engine = ResolutionEngine::new(
            Vec::default(),
            vec![PositionalConfig {
                name: "source".to_string(),
                format: Box::new(Text),
                optional: false,
                recurring: false,
            }],
            Vec::default(),
            Vec::default(),
        );

        // Execute
        let error = engine.resolve(&["in", "oops", "again"], &[]).unwrap_err();

        // Verify
        assert_eq!(
            error,
            ResolveError::ExtraArguments(vec!["oops".to_string(), "again".to_string()])
        );
    }

    #[test]
    fn resolve_standalone_dash_positional() {
        // Setup
        let engine = ResolutionEngine::new(
            Vec::default(),
            vec![PositionalConfig {
                name: "source".to_string(),
                format: Box::new(Text),
                optional: false,
                recurring: false,
            }],
            Vec::default(),
            Vec::default(),
        );

        // Execute
        let resolutions = engine.resolve(&["-"], &[]).unwrap();

        // Verify
        assert_eq!(
            lookup(&resolutions, "source").binding,
            Binding::Single(Value::Str("-".to_string()))
        );
    }
}
