use super::matcher::{Matcher, TokenContext};
use super::subtoken::Subtoken;
use super::tokenizer::Token;
use crate::cli::output;
use crate::cli::{Console, Key};
use crate::dict::{fileid, DictStore};
use crate::error::{Result, ScspellError};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Decisions that last for one run and are never persisted.
#[derive(Debug, Default, Clone)]
pub struct CorrectionState {
    /// Exact token texts to skip. Chosen replacement texts land here too.
    pub ignore_all: HashSet<String>,
    /// Exact token text -> replacement, applied without prompting.
    pub replace_all: HashMap<String, String>,
}

impl CorrectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replacement_for(&self, token: &str) -> Option<&str> {
        self.replace_all.get(token).map(String::as_str)
    }
}

/// What the file being corrected looks like to the prompt loop.
#[derive(Debug)]
pub struct FileContext<'a> {
    pub path: &'a Path,
    /// Lines as scanned, line endings included.
    pub lines: &'a [&'a str],
    /// Lowercased extension with its dot, or `""`.
    pub extension: &'a str,
    pub file_id: Option<String>,
    /// The file lies under the relative root and may be given a new id.
    pub can_mint_id: bool,
}

impl FileContext<'_> {
    fn token_context<'t>(&'t self, token: &'t Token) -> TokenContext<'t> {
        TokenContext {
            token: &token.text,
            extension: self.extension,
            file_id: self.file_id.as_deref(),
        }
    }
}

/// How the user settled one unmatched token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ignore,
    Replace(String),
}

#[derive(Debug)]
enum Step {
    Prompt,
    Context,
    Replace { all: bool },
    /// Subtokens still waiting for an add decision; the top is next.
    Add { pending: Vec<Subtoken> },
    /// Re-run the match engine after the dictionaries may have changed.
    Recheck,
    Done(Resolution),
}

/// Drives the interactive menus for unmatched tokens. Dictionary changes go
/// straight into the store; file changes are returned as [`Resolution`]s.
pub struct Session<'s, C: Console> {
    store: &'s mut DictStore,
    state: &'s mut CorrectionState,
    console: &'s mut C,
    context_lines: usize,
    colored: bool,
}

impl<'s, C: Console> Session<'s, C> {
    pub fn new(
        store: &'s mut DictStore,
        state: &'s mut CorrectionState,
        console: &'s mut C,
        context_lines: usize,
        colored: bool,
    ) -> Self {
        Self {
            store,
            state,
            console,
            context_lines,
            colored,
        }
    }

    /// Prompt until the user settles `token`. `unmatched` is what the match
    /// engine found. Returns `Err(Aborted)` when the user aborts.
    pub fn resolve(
        &mut self,
        file: &mut FileContext<'_>,
        token: &Token,
        unmatched: Vec<Subtoken>,
    ) -> Result<Resolution> {
        let mut unmatched = unmatched;
        let mut step = Step::Prompt;
        loop {
            step = match step {
                Step::Prompt => {
                    let header = output::format_unmatched(
                        file.path,
                        token.line,
                        &token.text,
                        &unmatched,
                        self.colored,
                    );
                    self.console.say(&header);
                    self.console.say(output::token_prompt());
                    match self.console.read_key()? {
                        Key::Enter | Key::Char('i') => Step::Done(Resolution::Ignore),
                        Key::Char('I') => {
                            self.state.ignore_all.insert(token.text.clone());
                            Step::Done(Resolution::Ignore)
                        }
                        Key::Char('r') => Step::Replace { all: false },
                        Key::Char('R') => Step::Replace { all: true },
                        Key::Char('a') => Step::Add {
                            pending: unmatched.iter().rev().cloned().collect(),
                        },
                        Key::Char('c') => Step::Context,
                        Key::Abort => return Err(ScspellError::Aborted),
                        Key::Char(_) => Step::Prompt,
                    }
                }
                Step::Context => {
                    self.show_context(file, token.line);
                    Step::Prompt
                }
                Step::Replace { all } => {
                    let prompt = format!("      Replacement text for '{}'", token.text);
                    let text = self.console.read_line(&prompt)?;
                    let text = text.trim();
                    if text.is_empty() {
                        self.console.say(output::cancelled());
                        Step::Prompt
                    } else {
                        if all {
                            self.state
                                .replace_all
                                .insert(token.text.clone(), text.to_string());
                        }
                        self.state.ignore_all.insert(text.to_string());
                        Step::Done(Resolution::Replace(text.to_string()))
                    }
                }
                Step::Add { mut pending } => match pending.pop() {
                    Some(subtoken) => self.add_menu(file, subtoken, pending)?,
                    None => Step::Recheck,
                },
                Step::Recheck => {
                    let matcher = Matcher::new(self.store, &self.state.ignore_all);
                    unmatched = matcher.unmatched(&file.token_context(token));
                    if unmatched.is_empty() {
                        Step::Done(Resolution::Ignore)
                    } else {
                        Step::Prompt
                    }
                }
                Step::Done(resolution) => return Ok(resolution),
            }
        }
    }

    fn add_menu(
        &mut self,
        file: &mut FileContext<'_>,
        subtoken: Subtoken,
        mut pending: Vec<Subtoken>,
    ) -> Result<Step> {
        let offer_p = !file.extension.is_empty();
        let offer_f = file.file_id.is_some();
        let offer_new = !offer_f && file.can_mint_id;
        self.console
            .say(&output::add_prompt(&subtoken.text, offer_p, offer_f, offer_new));

        let added = match self.console.read_key()? {
            Key::Char('b') => return Ok(Step::Recheck),
            Key::Enter | Key::Char('i') => return Ok(Step::Add { pending }),
            Key::Char('n') => self.store.active_mut().add_natural(&subtoken.text).map(|_| true),
            Key::Char('p') if offer_p => self.add_to_language(&subtoken.text, file.extension),
            Key::Char('f') if offer_f => match file.file_id.as_deref() {
                Some(id) => self
                    .store
                    .active_mut()
                    .add_by_file_id(&subtoken.text, id)
                    .map(|_| true),
                None => Ok(false),
            },
            Key::Char('N') if offer_new => self.add_to_new_file_id(&subtoken.text, file),
            Key::Abort => return Err(ScspellError::Aborted),
            Key::Char(_) => Ok(false),
        };

        match added {
            Ok(true) => {}
            Ok(false) => pending.push(subtoken),
            Err(e) => {
                self.console.say(&format!("      Error: {}", e));
                pending.push(subtoken);
            }
        }
        Ok(Step::Add { pending })
    }

    /// `Ok(false)` when the user backs out of choosing a language.
    fn add_to_language(&mut self, word: &str, ext: &str) -> Result<bool> {
        if self.store.add_keyword(word, ext)? {
            return Ok(true);
        }

        let names: Vec<String> = self
            .store
            .active()
            .filetypes()
            .iter()
            .map(|ft| ft.name.clone())
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        for line in output::language_menu(ext, &refs) {
            self.console.say(&line);
        }
        let choice = self.console.read_line("            Enter number")?;
        let choice = choice.trim();
        if choice.is_empty() {
            self.console.say(output::cancelled());
            return Ok(false);
        }
        match choice.parse::<usize>() {
            Ok(i) if i < names.len() => {
                self.store.active_mut().register_extension(ext, &names[i])?;
            }
            Ok(i) if i == names.len() => {
                let name = self.console.read_line("            Name of new language")?;
                let name = name.trim();
                if name.is_empty() {
                    self.console.say(output::cancelled());
                    return Ok(false);
                }
                self.store
                    .active_mut()
                    .new_filetype(name, &[ext.to_string()])?;
            }
            _ => {
                self.console.say("            Invalid choice.");
                return Ok(false);
            }
        }
        self.store.add_keyword(word, ext)
    }

    fn add_to_new_file_id(&mut self, word: &str, file: &mut FileContext<'_>) -> Result<bool> {
        let id = fileid::mint_new_id();
        self.store.resolver_mut().register(file.path, &id)?;
        log::debug!("registered new file id {} for {}", id, file.path.display());
        self.store.active_mut().add_by_file_id(word, &id)?;
        file.file_id = Some(id);
        Ok(true)
    }

    fn show_context(&mut self, file: &FileContext<'_>, line: usize) {
        let half = self.context_lines / 2;
        let first = line.saturating_sub(half).max(1);
        let last = (line + half).min(file.lines.len());
        let lines = (first..=last).map(|num| (num, file.lines[num - 1]));
        for text in output::format_context(lines) {
            self.console.say(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::subtoken::split;
    use crate::checker::tokenizer::tokenize;
    use crate::cli::ScriptedConsole;
    use crate::dict::{Corpora, FileIdResolver};

    fn store(text: &str) -> DictStore {
        let active = Corpora::parse(Path::new("dict"), text).unwrap();
        DictStore::from_parts(active, Vec::new(), FileIdResolver::without_root())
    }

    fn first_token(line: &str) -> Token {
        tokenize(line, 1, true).next().unwrap()
    }

    fn run(
        store: &mut DictStore,
        state: &mut CorrectionState,
        console: &mut ScriptedConsole,
        ext: &str,
        line: &str,
    ) -> Result<Resolution> {
        let lines = [line];
        let mut file = FileContext {
            path: Path::new("src.c"),
            lines: &lines,
            extension: ext,
            file_id: None,
            can_mint_id: false,
        };
        let token = first_token(line);
        let unmatched = {
            let matcher = Matcher::new(store, &state.ignore_all);
            matcher.unmatched(&file.token_context(&token))
        };
        Session::new(store, state, console, 4, false).resolve(&mut file, &token, unmatched)
    }

    #[test]
    fn test_ignore_and_ignore_all() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("\nI");
        let got = run(&mut store, &mut state, &mut console, ".c", "someMispeld").unwrap();
        assert_eq!(got, Resolution::Ignore);
        assert!(state.ignore_all.is_empty());
        let got = run(&mut store, &mut state, &mut console, ".c", "someMispeld").unwrap();
        assert_eq!(got, Resolution::Ignore);
        assert!(state.ignore_all.contains("someMispeld"));
        assert!(console.said("Unmatched 'someMispeld' -> {mispeld}"));
    }

    #[test]
    fn test_replace_cancel_then_replace_all() {
        let mut store = store("NATURAL:\nword\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("rR").line("").line("word");
        let got = run(&mut store, &mut state, &mut console, ".c", "wrod here").unwrap();
        assert_eq!(got, Resolution::Replace("word".to_string()));
        assert!(console.said("(Canceled.)"));
        assert_eq!(state.replacement_for("wrod"), Some("word"));
        assert!(state.ignore_all.contains("word"));
    }

    #[test]
    fn test_add_natural_settles_token() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("ann");
        let got = run(&mut store, &mut state, &mut console, ".c", "someMispeldVaraible").unwrap();
        assert_eq!(got, Resolution::Ignore);
        assert!(store.matches_natural("mispeld"));
        assert!(store.matches_natural("varaible"));
    }

    #[test]
    fn test_add_partial_returns_to_prompt() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        // add mispeld, ignore varaible, then ignore the token
        let mut console = ScriptedConsole::new().keys("ani\n");
        let got = run(&mut store, &mut state, &mut console, ".c", "someMispeldVaraible").unwrap();
        assert_eq!(got, Resolution::Ignore);
        assert!(console.said("Unmatched 'someMispeldVaraible' -> {varaible}"));
    }

    #[test]
    fn test_back_after_partial_add_shows_remaining() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        // add mispeld, back out at varaible, then ignore the token
        let mut console = ScriptedConsole::new().keys("anb\n");
        let got = run(&mut store, &mut state, &mut console, ".c", "someMispeldVaraible").unwrap();
        assert_eq!(got, Resolution::Ignore);
        assert!(store.matches_natural("mispeld"));
        assert!(console.said("Unmatched 'someMispeldVaraible' -> {varaible}"));
    }

    #[test]
    fn test_back_leaves_dictionaries_alone() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("ab\n");
        run(&mut store, &mut state, &mut console, ".c", "blabbb").unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_no_file_options_without_identity() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        // `f` and `N` are not offered, so they do nothing
        let mut console = ScriptedConsole::new().keys("afNb\n");
        run(&mut store, &mut state, &mut console, ".c", "blabbb").unwrap();
        assert!(!console.said("(f)ile-specific"));
        assert!(!console.said("(N)ew"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_programming_language_new_filetype() {
        let mut store = store("FILETYPE: C; .c\nstruct\n\nNATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("ap").line("1").line("Zig");
        run(&mut store, &mut state, &mut console, ".zig", "comptime").unwrap();
        assert!(console.said("Extension \".zig\" is not registered"));
        assert!(store.matches_keyword("comptime", ".zig"));
        assert_eq!(store.language_for(".zig"), Some("Zig"));
    }

    #[test]
    fn test_programming_language_existing() {
        let mut store = store("FILETYPE: C; .c\nstruct\n\nNATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("ap").line("0");
        run(&mut store, &mut state, &mut console, ".h", "typedef").unwrap();
        assert!(store.matches_keyword("typedef", ".c"));
        assert_eq!(store.language_for(".h"), Some("C"));
    }

    #[test]
    fn test_context_window() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("c\n");
        let lines = ["one\n", "two\n", "blabbb\n", "four\n", "five\n", "six\n"];
        let mut file = FileContext {
            path: Path::new("src.c"),
            lines: &lines,
            extension: ".c",
            file_id: None,
            can_mint_id: false,
        };
        let token = tokenize(lines[2], 3, true).next().unwrap();
        let unmatched = split("blabbb");
        Session::new(&mut store, &mut state, &mut console, 4, false)
            .resolve(&mut file, &token, unmatched)
            .unwrap();
        assert!(console.said("   1: one"));
        assert!(console.said("   5: five"));
        assert!(!console.said("   6: six"));
    }

    #[test]
    fn test_abort() {
        let mut store = store("NATURAL:\nsome\n");
        let mut state = CorrectionState::new();
        let mut console = ScriptedConsole::new().keys("a\x04");
        let err = run(&mut store, &mut state, &mut console, ".c", "blabbb").unwrap_err();
        assert!(matches!(err, ScspellError::Aborted));
    }
}
