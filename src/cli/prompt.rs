use console::Term;
use dialoguer::Input;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

const CTRL_C: char = '\x03';
const CTRL_D: char = '\x04';
const CTRL_Z: char = '\x1a';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    /// Ctrl-C, Ctrl-D, Ctrl-Z or end of input.
    Abort,
}

/// Everything the correction session says to, or asks of, the user.
pub trait Console {
    /// Prompts, unmatched-token displays and context.
    fn say(&mut self, text: &str);
    /// Batch report lines and per-file errors.
    fn report(&mut self, text: &str);
    /// A single keypress.
    fn read_key(&mut self) -> io::Result<Key>;
    /// A line of text; an empty string means the user cancelled.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads keys straight from the terminal. When stdin is not a terminal
/// (piped input), each line supplies one key.
pub struct TerminalConsole {
    term: Term,
    attended: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        let term = Term::stdout();
        let attended = term.is_term() && console::user_attended();
        Self { term, attended }
    }

    fn read_stdin_line(&self) -> io::Result<Option<String>> {
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, text: &str) {
        println!("{}", text);
    }

    fn report(&mut self, text: &str) {
        eprintln!("{}", text);
    }

    fn read_key(&mut self) -> io::Result<Key> {
        if !self.attended {
            return Ok(match self.read_stdin_line()? {
                None => Key::Abort,
                Some(line) => match line.chars().next() {
                    None => Key::Enter,
                    Some(c) => char_key(c),
                },
            });
        }
        loop {
            match self.term.read_key() {
                Ok(console::Key::Char(c)) => return Ok(char_key(c)),
                Ok(console::Key::Enter) => return Ok(Key::Enter),
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Key::Abort),
                Err(e) => return Err(e),
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        if !self.attended {
            print!("{}: ", prompt);
            io::stdout().flush()?;
            return Ok(self.read_stdin_line()?.unwrap_or_default());
        }
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

fn char_key(c: char) -> Key {
    match c {
        CTRL_C | CTRL_D | CTRL_Z => Key::Abort,
        '\r' | '\n' => Key::Enter,
        c => Key::Char(c),
    }
}

/// A console fed from a script, recording everything it is told.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    keys: VecDeque<Key>,
    lines: VecDeque<String>,
    pub transcript: Vec<String>,
    pub reports: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue keypresses; `\n` is Enter.
    pub fn keys(mut self, keys: &str) -> Self {
        self.keys.extend(keys.chars().map(char_key));
        self
    }

    /// Queue one line of text input.
    pub fn line(mut self, text: &str) -> Self {
        self.lines.push_back(text.to_string());
        self
    }

    pub fn said(&self, needle: &str) -> bool {
        self.transcript.iter().any(|t| t.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn report(&mut self, text: &str) {
        self.reports.push(text.to_string());
    }

    fn read_key(&mut self) -> io::Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Abort))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(format!("{}: ", prompt));
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}
