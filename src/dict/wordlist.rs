use crate::error::{Result, ScspellError};
use fst::{Automaton, IntoStreamer, Set, Streamer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A case-insensitive word list.
///
/// Words keep the spelling they were added with, but every lookup is done on
/// the lowercased form. A frozen dictionary carries an FST index for prefix
/// searches and refuses all writes.
#[derive(Default)]
pub struct Dictionary {
    name: String,
    words: BTreeMap<String, String>,
    index: Option<Set<Vec<u8>>>,
    dirty: bool,
}

impl Dictionary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a dictionary from an iterator of words; blank entries are skipped.
    pub fn from_words<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new(name);
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                dict.words
                    .entry(word.to_lowercase())
                    .or_insert_with(|| word.to_string());
            }
        }
        dict
    }

    /// Load a newline-separated word list.
    ///
    /// A missing file yields an empty dictionary so that a first run can
    /// bootstrap one; any other I/O failure is a `DictionaryLoad` error.
    pub fn load(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(content) => {
                let dict = Self::from_words(name, content.lines());
                log::debug!("loaded {} words from {}", dict.len(), path.display());
                Ok(dict)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("dictionary {} not found; starting empty", path.display());
                Ok(Self::new(name))
            }
            Err(source) => Err(ScspellError::DictionaryLoad {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write every entry, one per line, in sorted order.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let mut out = String::new();
        self.write_words(&mut out);
        fs::write(path, out).map_err(|source| ScspellError::DictionaryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }

    pub fn write_words(&self, out: &mut String) {
        for word in self.words.values() {
            out.push_str(word);
            out.push('\n');
        }
    }

    pub fn contains_exact(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// True if some entry starts with `word`.
    pub fn contains_prefix(&self, word: &str) -> bool {
        let prefix = word.to_lowercase();
        if let Some(index) = &self.index {
            let mut stream = index
                .search(fst::automaton::Str::new(&prefix).starts_with())
                .into_stream();
            return stream.next().is_some();
        }
        self.words
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    /// Insert a word. Returns `Ok(false)` when it was already present.
    pub fn add(&mut self, word: &str) -> Result<bool> {
        self.check_writable()?;
        let key = word.to_lowercase();
        if self.words.contains_key(&key) {
            return Ok(false);
        }
        self.words.insert(key, word.to_string());
        self.dirty = true;
        Ok(true)
    }

    /// Drop every entry that `other` also holds. Returns how many went.
    pub fn remove_subset(&mut self, other: &Dictionary) -> Result<usize> {
        self.check_writable()?;
        let before = self.words.len();
        self.words.retain(|key, _| !other.contains_exact(key));
        let removed = before - self.words.len();
        self.dirty |= removed > 0;
        Ok(removed)
    }

    /// Copy all of `other`'s entries into this dictionary.
    pub fn extend_from(&mut self, other: &Dictionary) -> Result<usize> {
        let mut added = 0;
        for word in other.words() {
            if self.add(word)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Make the dictionary read-only and index it for prefix lookups.
    pub fn freeze(mut self) -> fst::Result<Self> {
        let index = Set::from_iter(self.words.keys())?;
        self.index = Some(index);
        self.dirty = false;
        Ok(self)
    }

    pub fn is_read_only(&self) -> bool {
        self.index.is_some()
    }

    fn check_writable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(ScspellError::ReadOnlyDictionary(self.name.clone()));
        }
        Ok(())
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.values().map(String::as_str)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("name", &self.name)
            .field("words", &self.words.len())
            .field("read_only", &self.is_read_only())
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prefix_matching() {
        let dict = Dictionary::from_words("natural", ["dictionary", "hello"]);
        assert!(dict.contains_prefix("dict"));
        assert!(dict.contains_prefix("dictionary"));
        assert!(!dict.contains_prefix("dicty"));
        assert!(!dict.contains_prefix("dictionaryx"));
        assert!(!dict.contains_exact("dict"));
    }

    #[test]
    fn test_frozen_prefix_matches_unfrozen() {
        let dict = Dictionary::from_words("base", ["dictionary", "hello"])
            .freeze()
            .unwrap();
        assert!(dict.contains_prefix("DICT"));
        assert!(!dict.contains_prefix("dicty"));
        assert!(dict.contains_exact("Hello"));
    }

    #[test]
    fn test_case_insensitive_dedup() {
        let mut dict = Dictionary::new("test");
        assert!(dict.add("Hello").unwrap());
        assert!(!dict.add("hello").unwrap());
        assert!(!dict.add("HELLO").unwrap());
        assert_eq!(dict.len(), 1);
        assert!(dict.contains_exact("hElLo"));
        assert_eq!(dict.words().collect::<Vec<_>>(), vec!["Hello"]);
    }

    #[test]
    fn test_frozen_rejects_writes() {
        let mut dict = Dictionary::from_words("base", ["word"]).freeze().unwrap();
        assert!(matches!(
            dict.add("other"),
            Err(ScspellError::ReadOnlyDictionary(_))
        ));
        assert!(!dict.contains_exact("other"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let dict = Dictionary::load(&dir.path().join("absent.txt")).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn test_unreadable_path_fails() {
        let dir = tempdir().unwrap();
        // A directory exists but cannot be read as a word list.
        let err = Dictionary::load(dir.path()).unwrap_err();
        assert!(matches!(err, ScspellError::DictionaryLoad { .. }));
    }

    #[test]
    fn test_save_is_sorted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let mut dict = Dictionary::from_words("test", ["zebra", "", "Apple", "mango"]);
        dict.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Apple\nmango\nzebra\n");

        let reloaded = Dictionary::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains_exact("apple"));
    }

    #[test]
    fn test_remove_subset() {
        let mut dict = Dictionary::from_words("mine", ["foo", "bar", "baz"]);
        let base = Dictionary::from_words("base", ["BAR", "qux"]);
        assert_eq!(dict.remove_subset(&base).unwrap(), 1);
        assert!(!dict.contains_exact("bar"));
        assert!(dict.is_dirty());
        assert_eq!(dict.len(), 2);
    }
}
