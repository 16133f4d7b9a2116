pub mod matcher;
pub mod rewriter;
pub mod session;
pub mod subtoken;
pub mod tokenizer;

use crate::cli::output;
use crate::cli::Console;
use crate::dict::{DictStore, FileIdentity};
use crate::error::{Result, ScspellError};
use matcher::{Matcher, TokenContext};
use rewriter::Replacement;
use session::{CorrectionState, FileContext, Resolution, Session};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokenizer::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Record every unmatched token; never prompt or rewrite.
    ReportOnly,
    Interactive,
}

/// One unmatched token found in report-only mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRecord {
    pub path: PathBuf,
    pub line: usize,
    pub token: String,
    pub subtokens: Vec<String>,
}

/// What a run found and did.
#[derive(Debug, Default, Clone)]
pub struct Report {
    pub records: Vec<UnmatchedRecord>,
    /// Distinct unmatched subtokens across all files.
    pub unknown_words: BTreeSet<String>,
    /// Expected misspellings that did turn up.
    pub found_known_words: BTreeSet<String>,
    pub failed_files: usize,
    pub corrections: usize,
    pub files_changed: usize,
}

impl Report {
    pub fn has_unmatched(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Owns the dictionaries and session state for one run over many files.
///
/// Dictionary changes stay in memory until [`SpellChecker::finish`].
pub struct SpellChecker<C: Console> {
    store: DictStore,
    state: CorrectionState,
    console: C,
    mode: Mode,
    escapes: bool,
    context_lines: usize,
    colored: bool,
    known_words: HashSet<String>,
    report: Report,
}

impl<C: Console> SpellChecker<C> {
    pub fn new(store: DictStore, console: C, mode: Mode) -> Self {
        Self {
            store,
            state: CorrectionState::new(),
            console,
            mode,
            escapes: true,
            context_lines: crate::CONTEXT_SIZE,
            colored: false,
            known_words: HashSet::new(),
            report: Report::default(),
        }
    }

    pub fn with_escapes(mut self, escapes: bool) -> Self {
        self.escapes = escapes;
        self
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Words that report-only mode expects to be misspelled. They are
    /// collected in [`Report::found_known_words`] instead of being reported.
    pub fn with_known_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_words = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    pub fn store(&self) -> &DictStore {
        &self.store
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Check `paths` in order, then flush. A user abort still flushes the
    /// dictionaries before `Aborted` is returned; any other fatal error
    /// discards pending dictionary changes.
    pub fn run<P: AsRef<Path>>(mut self, paths: &[P]) -> Result<Report> {
        for path in paths {
            match self.check_file(path.as_ref()) {
                Ok(()) => {}
                Err(ScspellError::Aborted) => {
                    self.store.flush()?;
                    return Err(ScspellError::Aborted);
                }
                Err(e) => return Err(e),
            }
        }
        self.finish()
    }

    /// Persist dictionary changes and hand back the report.
    pub fn finish(mut self) -> Result<Report> {
        self.store.flush()?;
        Ok(self.report)
    }

    /// Check one file. Unreadable and unwritable files are reported and
    /// skipped; only aborts and dictionary invariant violations are errors.
    pub fn check_file(&mut self, path: &Path) -> Result<()> {
        let content = match read_source(path) {
            Ok(content) => content,
            Err(e) => {
                self.file_failed(path, &e);
                return Ok(());
            }
        };

        let identity = match self.store.resolver().resolve(path, &content) {
            Ok(identity) => identity,
            Err(e) => {
                log::warn!("no file id for {}: {}", path.display(), e);
                None
            }
        };
        let marker = match &identity {
            Some(FileIdentity::Embedded { line, span, .. }) => Some((*line, span.clone())),
            _ => None,
        };
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let can_mint_id = self.store.resolver().relative_path(path).is_ok();

        let mut file = FileContext {
            path,
            lines: &lines,
            extension: &extension,
            file_id: identity.as_ref().map(|id| id.id().to_string()),
            can_mint_id,
        };
        let mut plan: Vec<Replacement> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let line_number = idx + 1;
            for token in tokenize(line, line_number, self.escapes) {
                if let Some((marker_line, span)) = &marker {
                    if *marker_line == line_number && span.contains(&token.start) {
                        continue;
                    }
                }

                let unmatched = {
                    let ctx = TokenContext {
                        token: &token.text,
                        extension: file.extension,
                        file_id: file.file_id.as_deref(),
                    };
                    Matcher::new(&self.store, &self.state.ignore_all).unmatched(&ctx)
                };
                if unmatched.is_empty() {
                    continue;
                }

                match self.mode {
                    Mode::ReportOnly => {
                        let (known, unmatched): (Vec<_>, Vec<_>) = unmatched
                            .into_iter()
                            .partition(|st| self.known_words.contains(&st.text.to_lowercase()));
                        self.report
                            .found_known_words
                            .extend(known.into_iter().map(|st| st.text));
                        if unmatched.is_empty() {
                            continue;
                        }
                        self.console.report(&output::format_report_line(
                            path,
                            line_number,
                            &token.text,
                            &unmatched,
                        ));
                        let subtokens: Vec<String> =
                            unmatched.into_iter().map(|st| st.text).collect();
                        self.report.unknown_words.extend(subtokens.iter().cloned());
                        self.report.records.push(UnmatchedRecord {
                            path: path.to_path_buf(),
                            line: line_number,
                            token: token.text.clone(),
                            subtokens,
                        });
                    }
                    Mode::Interactive => {
                        let resolution = match self.state.replacement_for(&token.text) {
                            Some(text) => Resolution::Replace(text.to_string()),
                            None => Session::new(
                                &mut self.store,
                                &mut self.state,
                                &mut self.console,
                                self.context_lines,
                                self.colored,
                            )
                            .resolve(&mut file, &token, unmatched)?,
                        };
                        if let Resolution::Replace(text) = resolution {
                            plan.push(Replacement {
                                line: token.line,
                                start: token.start,
                                end: token.end,
                                text,
                            });
                        }
                    }
                }
            }
        }

        match rewriter::rewrite_file(path, &content, &plan) {
            Ok(true) => {
                log::debug!("applied {} replacements to {}", plan.len(), path.display());
                self.report.corrections += plan.len();
                self.report.files_changed += 1;
            }
            Ok(false) => {}
            Err(ScspellError::SourceFile { source, .. }) => self.file_failed(path, &source),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn file_failed(&mut self, path: &Path, reason: &dyn std::fmt::Display) {
        self.console.report(&output::format_file_error(path, reason));
        self.report.failed_files += 1;
    }
}

fn read_source(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
