mod core;
mod parameter;

pub use crate::api::core::{GeneralResolver, ParameterSet, Settings};
pub use parameter::{DeclarationError, OptionDecl, PosArgDecl};
