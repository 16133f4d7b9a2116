pub mod output;
pub mod prompt;

pub use prompt::{Console, Key, ScriptedConsole, TerminalConsole};
