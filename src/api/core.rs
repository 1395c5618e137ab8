use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::api::parameter::{validate, DeclarationError, OptionDecl, PosArgDecl};
use crate::config::ConfigSource;
use crate::format::Flag;
use crate::model::{Binding, Provenance, Value};
use crate::resolver::{
    ConsoleInterface, OptionConfig, OptionHelp, ParameterError, PositionalConfig, PositionalHelp,
    Printer, ResolutionEngine, ResolveError, Resolution, UserInterface,
};
use crate::tokens::OptionSpec;

pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const VERBOSE_HELP_NAME: &str = "HELP";
pub(crate) const VERBOSE_HELP_SHORT: char = 'H';
pub(crate) const VERSION_NAME: &str = "version";
pub(crate) const VERSION_SHORT: char = 'V';
pub(crate) const SETTINGS_NAME: &str = "settings";
pub(crate) const SETTINGS_SHORT: char = 'S';

/// The entry point for declaring a program's parameters.
///
/// ```no_run
/// use optini::{Flag, Int, OptionDecl, ParameterSet, PosArgDecl, Text};
///
/// let settings = ParameterSet::new("myprog", "1.0.0")
///     .option(OptionDecl::new("quiet", Flag).alias('q').default("no"))
///     .option(OptionDecl::new("noise", Int::at_least(0)).alias('v').default("10"))
///     .positional(PosArgDecl::new("source", Text))
///     .config_files(["/etc/myprog.conf"])
///     .build()
///     .resolve();
///
/// if settings.flag("quiet") {
///     // ...
/// }
/// ```
pub struct ParameterSet {
    program: String,
    version: String,
    about: Option<String>,
    options: Vec<OptionDecl>,
    positionals: Vec<PosArgDecl>,
    config_paths: Vec<PathBuf>,
    sections: Vec<String>,
    ignore: Vec<String>,
    docs: HashMap<String, String>,
    reactive: bool,
    user_interface: Box<dyn UserInterface>,
}

impl ParameterSet {
    /// Create a parameter set with the reactive options pre-declared:
    /// `--help`/`-h`, `--HELP`/`-H` (verbose help), `--version`/`-V`, and
    /// `--settings`/`-S`. All four are reserved to the command line.
    pub fn new(program: impl Into<String>, version: impl Into<String>) -> Self {
        let mut this = Self::bare(program, version);
        this.reactive = true;
        this.options = vec![
            OptionDecl::new(HELP_NAME, Flag)
                .alias(HELP_SHORT)
                .default("no")
                .reserved()
                .help("Show this help message and exit."),
            OptionDecl::new(VERBOSE_HELP_NAME, Flag)
                .alias(VERBOSE_HELP_SHORT)
                .default("no")
                .reserved()
                .help("Show this help message with configuration file details, and exit."),
            OptionDecl::new(VERSION_NAME, Flag)
                .alias(VERSION_SHORT)
                .default("no")
                .reserved()
                .help("Show the program version and exit."),
            OptionDecl::new(SETTINGS_NAME, Flag)
                .alias(SETTINGS_SHORT)
                .default("no")
                .reserved()
                .help("Show the resolved settings and exit."),
        ];
        this
    }

    /// Create a parameter set without any pre-declared option.
    pub fn bare(program: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
            about: None,
            options: Vec::default(),
            positionals: Vec::default(),
            config_paths: Vec::default(),
            sections: Vec::default(),
            ignore: Vec::default(),
            docs: HashMap::default(),
            reactive: false,
            user_interface: Box::new(ConsoleInterface::default()),
        }
    }

    /// A one-paragraph program description for the help message.
    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.about = Some(text.into());
        self
    }

    pub fn option(mut self, declaration: OptionDecl) -> Self {
        self.options.push(declaration);
        self
    }

    pub fn positional(mut self, declaration: PosArgDecl) -> Self {
        self.positionals.push(declaration);
        self
    }

    /// The configuration files to consult, in discovery order.
    /// The last path carries the highest precedence; absent files are skipped.
    pub fn config_files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.config_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// The section names to read from each configuration file.
    /// Defaults to the program name alone.
    pub fn sections<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.sections.extend(names.into_iter().map(Into::into));
        self
    }

    /// Configuration keys to tolerate without a matching declaration.
    pub fn ignore<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.ignore.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Attach externally maintained help paragraphs, keyed by parameter name.
    /// A key naming no declared parameter (and not in `ignore`) is an error.
    pub fn apply_docs<S: Into<String>, T: Into<String>>(
        mut self,
        docs: impl IntoIterator<Item = (S, T)>,
    ) -> Self {
        self.docs
            .extend(docs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[cfg(test)]
    pub(crate) fn interface(mut self, user_interface: Box<dyn UserInterface>) -> Self {
        self.user_interface = user_interface;
        self
    }

    /// Finalize the declarations into a resolver.
    pub fn build_parser(self) -> Result<GeneralResolver, DeclarationError> {
        let ParameterSet {
            program,
            version,
            about,
            mut options,
            mut positionals,
            config_paths,
            mut sections,
            ignore,
            docs,
            reactive,
            user_interface,
        } = self;

        validate(&options, &positionals)?;

        for (name, paragraph) in docs {
            let option = options.iter_mut().find(|option| option.name == name);

            match option {
                Some(option) => option.help = Some(paragraph),
                None => match positionals
                    .iter_mut()
                    .find(|positional| positional.name == name)
                {
                    Some(positional) => positional.help = Some(paragraph),
                    None => {
                        if !ignore.contains(&name) {
                            return Err(DeclarationError::UnknownDocumentation(name));
                        }
                    }
                },
            }
        }

        if sections.is_empty() {
            sections.push(program.clone());
        }

        let mut option_configs = Vec::with_capacity(options.len());
        let mut option_helps = Vec::with_capacity(options.len());

        for option in options {
            option_helps.push(OptionHelp {
                name: option.name.clone(),
                alias: option.alias,
                takes_value: option.format.takes_value(),
                recurring: option.recurring,
                help: option.help,
            });
            option_configs.push(OptionConfig {
                name: option.name,
                alias: option.alias,
                format: option.format,
                default: option.default,
                recurring: option.recurring,
                reserved: option.reserved,
            });
        }

        let mut positional_configs = Vec::with_capacity(positionals.len());
        let mut positional_helps = Vec::with_capacity(positionals.len());

        for positional in positionals {
            positional_helps.push(PositionalHelp {
                name: positional.name.clone(),
                optional: positional.optional,
                recurring: positional.recurring,
                help: positional.help,
            });
            positional_configs.push(PositionalConfig {
                name: positional.name,
                format: positional.format,
                optional: positional.optional,
                recurring: positional.recurring,
            });
        }

        let printer = Printer::terminal(
            program,
            version,
            about,
            option_helps,
            positional_helps,
            config_paths.clone(),
            sections.clone(),
        );
        let engine = ResolutionEngine::new(option_configs, positional_configs, sections, ignore);

        Ok(GeneralResolver {
            engine,
            printer,
            config_paths,
            reactive,
            user_interface,
        })
    }

    /// Finalize the declarations into a resolver, exiting with code `2` on a
    /// declaration error (a programmer mistake, not user input).
    pub fn build(self) -> GeneralResolver {
        match self.build_parser() {
            Ok(resolver) => resolver,
            Err(error) => {
                eprintln!("{error}");
                std::process::exit(2);
            }
        }
    }
}

enum HelpMode {
    Concise,
    Verbose,
}

/// Look for the help flags directly in the tokens, so help still works when
/// the command line is otherwise unresolvable.
///
/// The scan covers the option region only and follows the declared specs so
/// that option values (attached block remainders, following tokens) are
/// never mistaken for abbreviation characters. An unknown spelling ends the
/// scan: token alignment cannot be trusted past it.
fn detect_help(tokens: &[&str], specs: &[OptionSpec]) -> Option<HelpMode> {
    let mut concise = false;
    let mut verbose = false;
    let mut cursor = tokens.iter();

    'scan: while let Some(token) = cursor.next() {
        if *token == "--" || *token == "-" || !token.starts_with('-') {
            break;
        }

        match token.strip_prefix("--") {
            Some(long) => {
                let (name, attached) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (long, None),
                };
                let spec = match specs.iter().find(|spec| spec.name == name) {
                    Some(spec) => spec,
                    None => break,
                };

                if spec.name == HELP_NAME {
                    concise = true;
                } else if spec.name == VERBOSE_HELP_NAME {
                    verbose = true;
                }

                if spec.takes_value && attached.is_none() {
                    cursor.next();
                }
            }
            None => {
                let block = &token[1..];
                let mut flags = block.chars();

                while let Some(flag) = flags.next() {
                    let spec = match specs.iter().find(|spec| spec.alias == Some(flag)) {
                        Some(spec) => spec,
                        None => break 'scan,
                    };

                    if spec.name == HELP_NAME {
                        concise = true;
                    } else if spec.name == VERBOSE_HELP_NAME {
                        verbose = true;
                    }

                    if spec.takes_value {
                        // The rest of the block is its value; an empty rest
                        // means the next token is.
                        if flags.next().is_none() {
                            cursor.next();
                        }

                        break;
                    }
                }
            }
        }
    }

    if concise {
        Some(HelpMode::Concise)
    } else if verbose {
        Some(HelpMode::Verbose)
    } else {
        None
    }
}

/// The configured resolver, built via [`ParameterSet::build`].
pub struct GeneralResolver {
    engine: ResolutionEngine,
    printer: Printer,
    config_paths: Vec<PathBuf>,
    reactive: bool,
    user_interface: Box<dyn UserInterface>,
}

impl std::fmt::Debug for GeneralResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralResolver")
            .field("config_paths", &self.config_paths)
            .field("reactive", &self.reactive)
            .finish_non_exhaustive()
    }
}

impl GeneralResolver {
    /// Resolve the given command line tokens against the declarations and
    /// the configuration files.
    ///
    /// `Err` carries the intended exit code: `0` for the reactive
    /// short-circuits (help, verbose help, version, settings report) and `1`
    /// for user-input errors. Help is honored even when resolution fails;
    /// the version and settings reports require a fully successful pass.
    pub fn resolve_tokens(self, tokens: &[&str]) -> Result<Settings, i32> {
        let GeneralResolver {
            engine,
            printer,
            config_paths,
            reactive,
            user_interface,
        } = self;

        if reactive {
            match detect_help(tokens, &engine.option_specs()) {
                Some(HelpMode::Concise) => {
                    printer.print_help(&*user_interface);
                    return Err(0);
                }
                Some(HelpMode::Verbose) => {
                    printer.print_verbose_help(&*user_interface);
                    return Err(0);
                }
                None => {}
            }
        }

        let mut configs = Vec::with_capacity(config_paths.len());

        for path in &config_paths {
            // Absent candidates are fine; present-but-broken ones are not.
            if path.exists() {
                match ConfigSource::read(path) {
                    Ok(source) => configs.push(source),
                    Err(error) => {
                        printer.print_usage(&*user_interface);
                        user_interface.print_error(error.into());
                        return Err(1);
                    }
                }
            }
        }

        match engine.resolve(tokens, &configs) {
            Ok(resolutions) => {
                let settings = Settings {
                    resolutions,
                    printer,
                    user_interface,
                };

                if reactive {
                    if settings.flag(VERSION_NAME) {
                        settings.printer.print_version(&*settings.user_interface);
                        return Err(0);
                    }

                    if settings.flag(SETTINGS_NAME) {
                        settings
                            .printer
                            .print_settings(&settings.resolutions, &*settings.user_interface);
                        return Err(0);
                    }
                }

                Ok(settings)
            }
            Err(error) => {
                printer.print_usage(&*user_interface);
                user_interface.print_error(error);
                Err(1)
            }
        }
    }

    /// Resolve against the command line [`env::args`], exiting the process
    /// on errors and reactive short-circuits.
    pub fn resolve(self) -> Settings {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.resolve_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(settings) => settings,
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        }
    }
}

/// The resolved parameter values, looked up by declared name.
///
/// The typed accessors panic on an unknown name or a mismatched type:
/// both are programmer errors, caught by any invocation at all.
pub struct Settings {
    resolutions: Vec<Resolution>,
    printer: Printer,
    user_interface: Box<dyn UserInterface>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("resolutions", &self.resolutions)
            .finish_non_exhaustive()
    }
}

impl Settings {
    fn get(&self, name: &str) -> &Resolution {
        self.resolutions
            .iter()
            .find(|resolution| resolution.name == name)
            .unwrap_or_else(|| panic!("unknown parameter '{name}'"))
    }

    /// Whether any source supplied a value for `name`.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).binding.is_set()
    }

    /// The typed value for a single-valued parameter; `None` when unset.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match &self.get(name).binding {
            Binding::Single(value) => Some(value),
            Binding::Unset => None,
            Binding::Sequence(_) => panic!("parameter '{name}' is recurring; use sequence()"),
        }
    }

    /// The values of a recurring parameter, in resolution order.
    pub fn sequence(&self, name: &str) -> &[Value] {
        match &self.get(name).binding {
            Binding::Sequence(values) => values,
            Binding::Unset => &[],
            Binding::Single(_) => panic!("parameter '{name}' is not recurring; use value()"),
        }
    }

    /// A flag's state; an unset flag reads as `false`.
    pub fn flag(&self, name: &str) -> bool {
        match self.value(name) {
            Some(Value::Bool(value)) => *value,
            None => false,
            Some(_) => panic!("parameter '{name}' is not a flag"),
        }
    }

    pub fn int(&self, name: &str) -> i64 {
        match self.value(name) {
            Some(Value::Int(value)) => *value,
            _ => panic!("parameter '{name}' is not a set integer"),
        }
    }

    pub fn float(&self, name: &str) -> f64 {
        match self.value(name) {
            Some(Value::Float(value)) => *value,
            _ => panic!("parameter '{name}' is not a set float"),
        }
    }

    pub fn text(&self, name: &str) -> &str {
        match self.value(name) {
            Some(Value::Str(value)) => value,
            _ => panic!("parameter '{name}' is not a set string"),
        }
    }

    pub fn path(&self, name: &str) -> &Path {
        match self.value(name) {
            Some(Value::Path(value)) => value,
            _ => panic!("parameter '{name}' is not a set path"),
        }
    }

    pub fn pattern(&self, name: &str) -> &regex::Regex {
        match self.value(name) {
            Some(Value::Pattern(value)) => value,
            _ => panic!("parameter '{name}' is not a set pattern"),
        }
    }

    /// Which source supplied the final value; `None` when unset.
    pub fn provenance(&self, name: &str) -> Option<&Provenance> {
        self.get(name).provenance.as_ref()
    }

    fn rejection(&self, name: &str, reason: impl Into<String>) -> ResolveError {
        // Touch the resolution so an unknown name panics here, loudly.
        let resolution = self.get(name);
        ResolveError::Aggregate(vec![ParameterError::Invalid {
            parameter: resolution.name.clone(),
            reason: reason.into(),
        }])
    }

    /// Reject a resolved value on grounds the formats cannot check (ex:
    /// cross-parameter constraints), reporting it with the same formatting
    /// and exit convention as the resolver's own errors.
    pub fn reject(&self, name: &str, reason: impl Into<String>) -> ! {
        let error = self.rejection(name, reason);
        self.printer.print_usage(&*self.user_interface);
        self.user_interface.print_error(error);
        std::process::exit(1);
    }
}
