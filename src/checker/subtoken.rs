use crate::LEN_THRESHOLD;

/// A piece of a token. `text` is lowercased for matching; `original` keeps
/// the casing found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtoken {
    pub text: String,
    pub original: String,
}

impl Subtoken {
    fn new(original: String) -> Self {
        Self {
            text: original.to_lowercase(),
            original,
        }
    }

    /// Short subtokens are abbreviations and always pass.
    pub fn is_checkable(&self) -> bool {
        self.text.chars().count() > LEN_THRESHOLD
    }
}

/// Split a token at underscores, digit runs and camelCase boundaries.
///
/// Underscores and digits separate subtokens and are dropped. A capital
/// starts a new subtoken after a lowercase letter; a run of capitals stays
/// together unless its last capital is followed by a lowercase letter, which
/// then starts the next subtoken: `HTTPServer` -> `HTTP`, `Server`.
pub fn split(token: &str) -> Vec<Subtoken> {
    let chars: Vec<char> = token.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch.is_ascii_digit() {
            if !current.is_empty() {
                parts.push(Subtoken::new(std::mem::take(&mut current)));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev_lower || next_lower {
                parts.push(Subtoken::new(std::mem::take(&mut current)));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(Subtoken::new(current));
    }
    parts
}
