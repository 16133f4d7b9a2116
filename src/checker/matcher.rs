use super::subtoken::{split, Subtoken};
use crate::dict::DictStore;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // Hex literals look word-like but are numbers.
    static ref HEX_LITERAL: Regex = Regex::new(r"^0x[0-9a-fA-F]+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    Unmatched,
}

/// What the match engine needs to know about the token being checked.
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    /// Full text of the parent token.
    pub token: &'a str,
    /// Lowercased file extension including the dot, or `""`.
    pub extension: &'a str,
    pub file_id: Option<&'a str>,
}

/// Checks subtokens against every dictionary layer plus the session's
/// ignore set. The result is a pure union over the layers; cheap lookups
/// run first.
pub struct Matcher<'a> {
    store: &'a DictStore,
    ignored: &'a HashSet<String>,
}

impl<'a> Matcher<'a> {
    pub fn new(store: &'a DictStore, ignored: &'a HashSet<String>) -> Self {
        Self { store, ignored }
    }

    pub fn check(&self, subtoken: &Subtoken, ctx: &TokenContext<'_>) -> Verdict {
        if !subtoken.is_checkable() {
            return Verdict::Matched;
        }
        let word = subtoken.text.as_str();
        let matched = self.ignored.contains(ctx.token)
            || self.store.matches_keyword(word, ctx.extension)
            || ctx
                .file_id
                .is_some_and(|id| self.store.matches_file_id(word, id))
            || self.store.matches_natural(word)
            || self.store.matches_base(word, ctx.extension, ctx.file_id);
        if matched {
            Verdict::Matched
        } else {
            Verdict::Unmatched
        }
    }

    /// The distinct unmatched subtokens of a token, in discovery order.
    /// Empty means the token is correctly spelled.
    pub fn unmatched(&self, ctx: &TokenContext<'_>) -> Vec<Subtoken> {
        if self.ignored.contains(ctx.token) || HEX_LITERAL.is_match(ctx.token) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        split(ctx.token)
            .into_iter()
            .filter(|st| self.check(st, ctx) == Verdict::Unmatched)
            .filter(|st| seen.insert(st.text.clone()))
            .collect()
    }
}
