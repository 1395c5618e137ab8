mod engine;
mod interface;
mod printer;

pub(crate) use engine::{
    OptionConfig, ParameterError, PositionalConfig, ResolutionEngine, Resolution, ResolveError,
};
pub(crate) use interface::{ConsoleInterface, UserInterface};
pub(crate) use printer::{OptionHelp, PositionalHelp, Printer};

#[cfg(test)]
pub(crate) use interface::util;
