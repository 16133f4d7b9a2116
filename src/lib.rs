//! scspell: an interactive, conservative spell-checker for source code.
//!
//! Identifiers are split into subtokens (`someVariable` -> `some`,
//! `variable`) and each subtoken is checked against a layered set of
//! dictionaries. Unknown subtokens are either reported in batch or offered
//! to the user for correction.

pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;

pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Result, ScspellError};

/// Subtokens of this many characters or fewer are treated as abbreviations
/// and never checked.
pub const LEN_THRESHOLD: usize = 3;

/// Default number of surrounding lines shown for the context action.
pub const CONTEXT_SIZE: usize = 4;
