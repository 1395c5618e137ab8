//! `optini` resolves program parameters from the command line, from
//! configuration files, and from builtin defaults, into typed values with
//! per-parameter provenance.
//!
//! Declare the parameters once; `optini` then:
//! * parses the command line (long options, stackable single-character
//! abbreviations, positional arguments),
//! * reads INI-style configuration files (case-sensitive sections, a
//! `[DEFAULT]` underlay, `%(name)s` interpolation),
//! * merges the sources by precedence: command line over the
//! last-discovered configuration file, over earlier files, over the
//! builtin default,
//! * converts every raw string through its declared [`Format`], collecting
//! all conversion failures into a single report,
//! * and answers the reactive options `--help`/`-h`, `--HELP`/`-H`,
//! `--version`/`-V`, and `--settings`/`-S` on its own.
//!
//! ```no_run
//! use optini::{Flag, Int, OptionDecl, ParameterSet, PosArgDecl, Text};
//!
//! let settings = ParameterSet::new("myprog", "1.0.0")
//!     .option(OptionDecl::new("quiet", Flag).alias('q').default("no"))
//!     .option(
//!         OptionDecl::new("noise", Int::at_least(0))
//!             .alias('v')
//!             .default("10")
//!             .help("The noise level."),
//!     )
//!     .positional(PosArgDecl::new("source", Text))
//!     .config_files(["/etc/myprog.conf", "/home/user/.myprog.conf"])
//!     .build()
//!     .resolve();
//!
//! if !settings.flag("quiet") {
//!     println!("noise level: {}", settings.int("noise"));
//! }
//! ```
//!
//! With `myprog -qv42 input.txt`, `quiet` resolves to `true` and `noise`
//! to `42`, both attributed to the command line; with an empty command
//! line they fall back to the configuration files and then the builtin
//! defaults, and `--settings` reports which source won for each.
mod api;
mod config;
mod format;
mod model;
mod resolver;
mod tokens;

pub use api::*;
pub use config::{ConfigSource, ConfigSyntaxError};
pub use format::{
    AccessMode, Choice, Flag, Float, Format, FormatError, Int, PathArg, Pattern, Text,
};
pub use model::{present, Binding, Provenance, Value};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
