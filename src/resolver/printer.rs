use std::path::PathBuf;

use terminal_size::{terminal_size, Width};

use crate::resolver::engine::Resolution;
use crate::resolver::interface::UserInterface;

/// Help-rendering view of a declared option.
pub(crate) struct OptionHelp {
    pub(crate) name: String,
    pub(crate) alias: Option<char>,
    pub(crate) takes_value: bool,
    pub(crate) recurring: bool,
    pub(crate) help: Option<String>,
}

/// Help-rendering view of a declared positional argument.
pub(crate) struct PositionalHelp {
    pub(crate) name: String,
    pub(crate) optional: bool,
    pub(crate) recurring: bool,
    pub(crate) help: Option<String>,
}

pub(crate) struct Printer {
    program: String,
    version: String,
    about: Option<String>,
    options: Vec<OptionHelp>,
    positionals: Vec<PositionalHelp>,
    config_paths: Vec<PathBuf>,
    sections: Vec<String>,
    terminal_width: Option<usize>,
}

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
const MINIMUM_HELP_WIDTH: usize = 17;
const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

// Target 95% of the terminal width, so the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

impl Printer {
    pub(crate) fn terminal(
        program: impl Into<String>,
        version: impl Into<String>,
        about: Option<String>,
        options: Vec<OptionHelp>,
        positionals: Vec<PositionalHelp>,
        config_paths: Vec<PathBuf>,
        sections: Vec<String>,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(
            program,
            version,
            about,
            options,
            positionals,
            config_paths,
            sections,
            terminal_width,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        program: impl Into<String>,
        version: impl Into<String>,
        about: Option<String>,
        mut options: Vec<OptionHelp>,
        positionals: Vec<PositionalHelp>,
        config_paths: Vec<PathBuf>,
        sections: Vec<String>,
        terminal_width: Option<usize>,
    ) -> Self {
        options.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            program: program.into(),
            version: version.into(),
            about,
            options,
            positionals,
            config_paths,
            sections,
            terminal_width,
        }
    }

    fn usage_line(&self) -> String {
        let mut summary = Vec::with_capacity(self.options.len() + self.positionals.len());

        for option in &self.options {
            let spelling = match option.alias {
                Some(alias) => format!("-{alias}"),
                None => format!("--{name}", name = option.name),
            };
            let grammar = option_grammar(option);
            summary.push(format!("[{spelling}{grammar}]"));
        }

        for positional in &self.positionals {
            summary.push(positional_grammar(positional));
        }

        format!(
            "usage: {program} {summary}",
            program = self.program,
            summary = summary.join(" ")
        )
    }

    pub(crate) fn print_usage(&self, user_interface: &(impl UserInterface + ?Sized)) {
        user_interface.print(self.usage_line());
    }

    /// The concise help message: usage grammar plus the parameter columns.
    pub(crate) fn print_help(&self, user_interface: &(impl UserInterface + ?Sized)) {
        user_interface.print(self.usage_line());

        if let Some(about) = &self.about {
            user_interface.print("".to_string());
            user_interface.print(about.clone());
        }

        let mut rows: Vec<(String, String)> = Vec::default();
        let mut argument_rows: Vec<(String, String)> = Vec::default();

        for positional in &self.positionals {
            argument_rows.push((
                positional_grammar(positional),
                positional.help.clone().unwrap_or_default(),
            ));
        }

        for option in &self.options {
            let grammar = option_grammar(option);
            let left = match option.alias {
                Some(alias) => format!("-{alias}, --{name}{grammar}", name = option.name),
                None => format!("--{name}{grammar}", name = option.name),
            };
            rows.push((left, option.help.clone().unwrap_or_default()));
        }

        let left_width = argument_rows
            .iter()
            .chain(rows.iter())
            .map(|(left, _)| left.len())
            .max()
            .unwrap_or(0);
        let help_width = self.help_width(left_width);

        if !argument_rows.is_empty() {
            user_interface.print("".to_string());
            user_interface.print("positional arguments:".to_string());
            self.print_rows(&argument_rows, left_width, help_width, user_interface);
        }

        if !rows.is_empty() {
            user_interface.print("".to_string());
            user_interface.print("options:".to_string());
            self.print_rows(&rows, left_width, help_width, user_interface);
        }
    }

    /// The verbose help message: concise help plus the configuration file
    /// search paths, section names, and a syntax primer.
    pub(crate) fn print_verbose_help(&self, user_interface: &(impl UserInterface + ?Sized)) {
        self.print_help(user_interface);
        user_interface.print("".to_string());
        user_interface.print("configuration files:".to_string());

        if self.config_paths.is_empty() {
            user_interface.print(format!("{:MAIN_INDENT$}(none)", ""));
        }

        for path in &self.config_paths {
            user_interface.print(format!("{:MAIN_INDENT$}{}", "", path.display()));
        }

        if !self.sections.is_empty() {
            let sections: Vec<String> = self
                .sections
                .iter()
                .map(|section| format!("[{section}]"))
                .collect();
            user_interface.print(format!(
                "{:MAIN_INDENT$}sections: {}",
                "",
                sections.join(", ")
            ));
        }

        user_interface.print("".to_string());
        user_interface.print("configuration file syntax:".to_string());

        for line in [
            "Settings are written 'name = value' or 'name: value' under a",
            "section header. Later files override earlier ones, and the",
            "command line overrides them all. A [DEFAULT] section supplies",
            "fallback values to every other section. Values may reference",
            "other settings as %(name)s; use %% for a literal percent.",
            "Lines starting with '#' or ';' are comments.",
        ] {
            user_interface.print(format!("{:MAIN_INDENT$}{line}", ""));
        }
    }

    /// The settings report: one row per parameter, with its format, final
    /// value, and the source that supplied it.
    pub(crate) fn print_settings(
        &self,
        resolutions: &[Resolution],
        user_interface: &(impl UserInterface + ?Sized),
    ) {
        user_interface.print("settings:".to_string());

        for resolution in resolutions {
            let row = match &resolution.provenance {
                Some(provenance) => format!(
                    "{:MAIN_INDENT$}{name}: {format}({value}): {provenance}",
                    "",
                    name = resolution.name,
                    format = resolution.format_name,
                    value = resolution.rendered,
                ),
                None => format!(
                    "{:MAIN_INDENT$}{name}: {format}(unset)",
                    "",
                    name = resolution.name,
                    format = resolution.format_name,
                ),
            };
            user_interface.print(row);
        }
    }

    pub(crate) fn print_version(&self, user_interface: &(impl UserInterface + ?Sized)) {
        user_interface.print(format!(
            "{program} {version}",
            program = self.program,
            version = self.version
        ));
    }

    fn help_width(&self, left_width: usize) -> usize {
        match self.terminal_width {
            Some(total) => {
                let target = (total as f64 * TARGET_TOTAL_FACTOR) as usize;
                let non_help = MAIN_INDENT + left_width + PADDING_WIDTH;
                std::cmp::max(target.saturating_sub(non_help), MINIMUM_HELP_WIDTH)
            }
            None => MINIMUM_HELP_WIDTH,
        }
    }

    fn print_rows(
        &self,
        rows: &[(String, String)],
        left_width: usize,
        help_width: usize,
        user_interface: &(impl UserInterface + ?Sized),
    ) {
        for (left, help) in rows {
            let chunks = wrap(help, help_width);

            if chunks.is_empty() {
                user_interface.print(format!("{:MAIN_INDENT$}{left}", ""));
                continue;
            }

            for (i, chunk) in chunks.iter().enumerate() {
                if i == 0 {
                    user_interface.print(format!(
                        "{:MAIN_INDENT$}{left:left_width$}{:PADDING_WIDTH$}{chunk}",
                        "", ""
                    ));
                } else {
                    user_interface.print(format!(
                        "{:MAIN_INDENT$}{:left_width$}{:PADDING_WIDTH$}{chunk}",
                        "", "", ""
                    ));
                }
            }
        }
    }
}

fn option_grammar(option: &OptionHelp) -> String {
    if !option.takes_value {
        return "".to_string();
    }

    let placeholder = placeholder(&option.name);

    if option.recurring {
        format!(" {placeholder} ...")
    } else {
        format!(" {placeholder}")
    }
}

fn positional_grammar(positional: &PositionalHelp) -> String {
    let placeholder = placeholder(&positional.name);

    match (positional.optional, positional.recurring) {
        (false, false) => placeholder,
        (false, true) => format!("{placeholder} ..."),
        (true, false) => format!("[{placeholder}]"),
        (true, true) => format!("[{placeholder} ...]"),
    }
}

fn placeholder(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

/// Word-wrap a paragraph to `width`, hyphenating words that overflow a
/// whole line on their own.
fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.len() + word.len() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = String::default();
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let mut left = 0;
    let mut right = increment;

    while right + 1 < word.len() {
        lines.push(format!("{}-", &word[left..right]));
        left += increment;
        right += increment;
    }

    current.push_str(&word[left..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Binding, Provenance, Value};
    use crate::resolver::util::InMemoryInterface;
    use crate::test::assert_contains;

    fn help_option() -> OptionHelp {
        OptionHelp {
            name: "help".to_string(),
            alias: Some('h'),
            takes_value: false,
            recurring: false,
            help: Some("Show this help message and exit.".to_string()),
        }
    }

    #[test]
    fn print_help_minimal() {
        // Setup
        let printer = Printer::new(
            "p",
            "1.0.0",
            None,
            vec![help_option()],
            Vec::default(),
            Vec::default(),
            Vec::default(),
            None,
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: p [-h]

options:
 -h, --help   Show this help
              message and exit."#
        );
    }

    #[test]
    fn print_help_full() {
        // Setup
        let printer = Printer::new(
            "myprog",
            "1.0.0",
            Some("Fetch pages from a server.".to_string()),
            vec![
                help_option(),
                OptionHelp {
                    name: "noise".to_string(),
                    alias: Some('v'),
                    takes_value: true,
                    recurring: false,
                    help: Some("The noise level.".to_string()),
                },
                OptionHelp {
                    name: "tag".to_string(),
                    alias: None,
                    takes_value: true,
                    recurring: true,
                    help: None,
                },
            ],
            vec![
                PositionalHelp {
                    name: "source".to_string(),
                    optional: false,
                    recurring: false,
                    help: Some("The input file.".to_string()),
                },
                PositionalHelp {
                    name: "extras".to_string(),
                    optional: true,
                    recurring: true,
                    help: None,
                },
            ],
            Vec::default(),
            Vec::default(),
            Some(120),
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_contains!(
            message,
            "usage: myprog [-h] [-v NOISE] [--tag TAG ...] SOURCE [EXTRAS ...]"
        );
        assert_contains!(message, "Fetch pages from a server.");
        assert_contains!(message, "positional arguments:");
        assert_contains!(message, " SOURCE");
        assert_contains!(message, "The input file.");
        assert_contains!(message, " [EXTRAS ...]");
        assert_contains!(message, "options:");
        assert_contains!(message, "-v, --noise NOISE");
        assert_contains!(message, "The noise level.");
        assert_contains!(message, "--tag TAG ...");
    }

    #[test]
    fn print_verbose_help() {
        // Setup
        let printer = Printer::new(
            "myprog",
            "1.0.0",
            None,
            vec![help_option()],
            Vec::default(),
            vec![
                PathBuf::from("/etc/myprog.conf"),
                PathBuf::from("/home/user/.myprog.conf"),
            ],
            vec!["myprog".to_string(), "common".to_string()],
            Some(120),
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_verbose_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_contains!(message, "usage: myprog [-h]");
        assert_contains!(message, "configuration files:");
        assert_contains!(message, " /etc/myprog.conf");
        assert_contains!(message, " /home/user/.myprog.conf");
        assert_contains!(message, "sections: [myprog], [common]");
        assert_contains!(message, "configuration file syntax:");
        assert_contains!(message, "%(name)s");
    }

    #[test]
    fn print_settings() {
        // Setup
        let printer = Printer::new(
            "myprog",
            "1.0.0",
            None,
            Vec::default(),
            Vec::default(),
            Vec::default(),
            Vec::default(),
            None,
        );
        let interface = InMemoryInterface::default();
        let resolutions = vec![
            Resolution {
                name: "noise".to_string(),
                format_name: "Int>=0".to_string(),
                binding: Binding::Single(Value::Int(14)),
                provenance: Some(Provenance::CommandLine),
                rendered: "14".to_string(),
            },
            Resolution {
                name: "tag".to_string(),
                format_name: "Text".to_string(),
                binding: Binding::Unset,
                provenance: None,
                rendered: "unset".to_string(),
            },
        ];

        // Execute
        printer.print_settings(&resolutions, &interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"settings:
 noise: Int>=0(14): command line
 tag: Text(unset)"#
        );
    }

    #[test]
    fn print_version() {
        // Setup
        let printer = Printer::new(
            "myprog",
            "2.3.4",
            None,
            Vec::default(),
            Vec::default(),
            Vec::default(),
            Vec::default(),
            None,
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_version(&interface);

        // Verify
        assert_eq!(interface.consume_message(), "myprog 2.3.4");
    }

    #[test]
    fn wrap_paragraph() {
        assert_eq!(wrap("", 10), Vec::<String>::new());
        assert_eq!(wrap("a b c", 10), vec!["a b c".to_string()]);
        assert_eq!(
            wrap("something pieces full more stuff", 17),
            vec!["something pieces".to_string(), "full more stuff".to_string()]
        );
        assert_eq!(
            wrap("abcdefghijklm", 8),
            vec!["abcdefg-".to_string(), "hijklm".to_string()]
        );
    }
}
