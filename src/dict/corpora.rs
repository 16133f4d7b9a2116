use super::wordlist::Dictionary;
use crate::error::{Result, ScspellError};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const HEADER_NATURAL: &str = "NATURAL";
const HEADER_FILETYPE: &str = "FILETYPE";
const HEADER_FILEID: &str = "FILEID";

lazy_static! {
    static ref FILE_ID: Regex = Regex::new(r"^[a-zA-Z0-9_\-]+$").unwrap();
}

pub fn is_valid_file_id(id: &str) -> bool {
    FILE_ID.is_match(id)
}

/// Keyword dictionary for one programming language.
#[derive(Debug)]
pub struct FileType {
    pub name: String,
    pub extensions: Vec<String>,
    pub words: Dictionary,
}

/// One dictionary file: the natural-language list, the per-language keyword
/// lists and the file-specific lists.
#[derive(Debug)]
pub struct Corpora {
    path: PathBuf,
    natural: Dictionary,
    filetypes: Vec<FileType>,
    file_ids: BTreeMap<String, Dictionary>,
    read_only: bool,
    structure_dirty: bool,
}

enum Header {
    Natural,
    FileType(String, Vec<String>),
    FileId(String),
}

impl Corpora {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            natural: Dictionary::new(HEADER_NATURAL),
            filetypes: Vec::new(),
            file_ids: BTreeMap::new(),
            read_only: false,
            structure_dirty: false,
        }
    }

    /// Load the active (writable) dictionary file. A missing file is empty.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "dictionary file {} not found; continuing with an empty dictionary",
                    path.display()
                );
                Ok(Self::empty(path))
            }
            Err(source) => Err(ScspellError::DictionaryLoad {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load a base dictionary file. Base files must exist and never change.
    pub fn load_base(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ScspellError::DictionaryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)?.into_read_only()
    }

    pub fn from_text_read_only(path: &Path, text: &str) -> Result<Self> {
        Self::parse(path, text)?.into_read_only()
    }

    fn into_read_only(self) -> Result<Self> {
        let path = self.path.clone();
        let freeze = |dict: Dictionary| {
            dict.freeze().map_err(|e| ScspellError::DictionaryParse {
                path: path.clone(),
                line: 0,
                message: e.to_string(),
            })
        };

        let natural = freeze(self.natural)?;
        let mut filetypes = Vec::with_capacity(self.filetypes.len());
        for ft in self.filetypes {
            filetypes.push(FileType {
                name: ft.name,
                extensions: ft.extensions,
                words: freeze(ft.words)?,
            });
        }
        let mut file_ids = BTreeMap::new();
        for (id, dict) in self.file_ids {
            file_ids.insert(id, freeze(dict)?);
        }

        Ok(Self {
            path: self.path,
            natural,
            filetypes,
            file_ids,
            read_only: true,
            structure_dirty: false,
        })
    }

    /// Parse the sectioned format. A file that does not start with a header
    /// is read as a plain word list for the natural-language dictionary.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut corpora = Self::empty(path);
        let lines: Vec<&str> = text.lines().map(|l| l.trim_matches(|c| c == ' ' || c == '\r')).collect();

        let first = lines.iter().find(|l| !l.is_empty());
        if first.map_or(true, |l| !l.contains(':')) {
            corpora.natural = Dictionary::from_words(HEADER_NATURAL, lines);
            return Ok(corpora);
        }

        let mut seen_natural = false;
        let mut offset = 0;
        while offset < lines.len() {
            if lines[offset].is_empty() {
                offset += 1;
                continue;
            }
            let header = corpora.parse_header(lines[offset], offset + 1, seen_natural)?;
            let start = offset + 1;
            let mut end = start;
            while end < lines.len() && !lines[end].contains(':') {
                end += 1;
            }
            let words = &lines[start..end];
            offset = end;

            match header {
                Header::Natural => {
                    seen_natural = true;
                    corpora.natural = Dictionary::from_words(HEADER_NATURAL, words);
                    log::debug!(
                        "loaded natural language dictionary with {} words",
                        corpora.natural.len()
                    );
                }
                Header::FileType(name, extensions) => {
                    let words = Dictionary::from_words(name.clone(), words);
                    log::debug!("loaded file-type dictionary {:?} with {} words", name, words.len());
                    corpora.filetypes.push(FileType {
                        name,
                        extensions,
                        words,
                    });
                }
                Header::FileId(id) => {
                    let words = Dictionary::from_words(id.clone(), words);
                    log::debug!("loaded file-id dictionary {:?} with {} words", id, words.len());
                    corpora.file_ids.insert(id, words);
                }
            }
        }

        Ok(corpora)
    }

    fn parse_header(&self, line: &str, line_num: usize, seen_natural: bool) -> Result<Header> {
        let err = |message: String| ScspellError::DictionaryParse {
            path: self.path.clone(),
            line: line_num,
            message,
        };

        let (raw_type, raw_meta) = match line.split_once(':') {
            Some((t, m)) if !m.contains(':') => (t.trim(), m.trim()),
            _ => return Err(err("syntax error in header".to_string())),
        };

        match raw_type {
            HEADER_NATURAL => {
                if !raw_meta.is_empty() {
                    return Err(err(format!("{} header has nonempty metadata", HEADER_NATURAL)));
                }
                if seen_natural {
                    return Err(err(format!("duplicate dictionary type {}", HEADER_NATURAL)));
                }
                Ok(Header::Natural)
            }
            HEADER_FILETYPE => {
                let (descr, raw_exts) = raw_meta
                    .split_once(';')
                    .ok_or_else(|| err(format!("syntax error in {} header", HEADER_FILETYPE)))?;
                let descr = descr.trim();
                if descr.is_empty() {
                    return Err(err("file-type description is empty".to_string()));
                }
                if self.filetypes.iter().any(|ft| ft.name == descr) {
                    return Err(err(format!("duplicate file-type description {:?}", descr)));
                }
                let extensions: Vec<String> = raw_exts
                    .split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect();
                if extensions.is_empty() {
                    return Err(err(format!("missing extensions list in {} header", HEADER_FILETYPE)));
                }
                for ext in &extensions {
                    if !ext.starts_with('.') {
                        return Err(err(format!("extension {:?} does not begin with a period", ext)));
                    }
                    if self.filetype_index(ext).is_some() {
                        return Err(err(format!("duplicate extension {:?}", ext)));
                    }
                }
                Ok(Header::FileType(descr.to_string(), extensions))
            }
            HEADER_FILEID => {
                if !is_valid_file_id(raw_meta) {
                    return Err(err(format!("{:?} is not a valid file ID", raw_meta)));
                }
                if self.file_ids.contains_key(raw_meta) {
                    return Err(err(format!("duplicate file ID {:?}", raw_meta)));
                }
                Ok(Header::FileId(raw_meta.to_string()))
            }
            other => Err(err(format!("unrecognized dictionary type {:?}", other))),
        }
    }

    /// Serialize: keyword sections, file-id sections, natural list last.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for ft in &self.filetypes {
            out.push_str(&format!(
                "{}: {}; {}\n",
                HEADER_FILETYPE,
                ft.name,
                ft.extensions.join(", ")
            ));
            ft.words.write_words(&mut out);
            out.push('\n');
        }
        for (id, dict) in &self.file_ids {
            out.push_str(&format!("{}: {}\n", HEADER_FILEID, id));
            dict.write_words(&mut out);
            out.push('\n');
        }
        out.push_str(&format!("{}:\n", HEADER_NATURAL));
        self.natural.write_words(&mut out);
        out.push('\n');
        out
    }

    pub fn is_dirty(&self) -> bool {
        self.structure_dirty
            || self.natural.is_dirty()
            || self.filetypes.iter().any(|ft| ft.words.is_dirty())
            || self.file_ids.values().any(Dictionary::is_dirty)
    }

    /// Write the file if anything changed. Returns whether it was written.
    pub fn save(&mut self) -> Result<bool> {
        if self.read_only {
            if self.is_dirty() {
                return Err(ScspellError::ReadOnlyDictionary(self.path.display().to_string()));
            }
            return Ok(false);
        }
        if !self.is_dirty() {
            return Ok(false);
        }
        fs::write(&self.path, self.to_text()).map_err(|source| ScspellError::DictionaryLoad {
            path: self.path.clone(),
            source,
        })?;
        self.natural.mark_clean();
        for ft in &mut self.filetypes {
            ft.words.mark_clean();
        }
        for dict in self.file_ids.values_mut() {
            dict.mark_clean();
        }
        self.structure_dirty = false;
        Ok(true)
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(ScspellError::ReadOnlyDictionary(self.path.display().to_string()));
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn natural(&self) -> &Dictionary {
        &self.natural
    }

    pub fn add_natural(&mut self, word: &str) -> Result<bool> {
        self.natural.add(word)
    }

    pub fn filetypes(&self) -> &[FileType] {
        &self.filetypes
    }

    fn filetype_index(&self, ext: &str) -> Option<usize> {
        let ext = ext.to_lowercase();
        self.filetypes
            .iter()
            .position(|ft| ft.extensions.iter().any(|e| *e == ext))
    }

    pub fn filetype_by_extension(&self, ext: &str) -> Option<&FileType> {
        self.filetype_index(ext).map(|i| &self.filetypes[i])
    }

    pub fn filetype_by_name(&self, name: &str) -> Option<&FileType> {
        self.filetypes.iter().find(|ft| ft.name == name)
    }

    pub fn filetype_by_name_mut(&mut self, name: &str) -> Option<&mut FileType> {
        self.filetypes.iter_mut().find(|ft| ft.name == name)
    }

    /// Create a keyword dictionary for a new language.
    pub fn new_filetype(&mut self, name: &str, extensions: &[String]) -> Result<()> {
        self.check_writable()?;
        let name = name.trim();
        if name.is_empty() || name.contains(':') || name.contains(';') {
            return Err(ScspellError::UnknownFileType(format!(
                "illegal characters in language name {:?}",
                name
            )));
        }
        if self.filetype_by_name(name).is_some() {
            return Err(ScspellError::UnknownFileType(format!(
                "language name {:?} is already in use",
                name
            )));
        }
        let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();
        if let Some(ext) = extensions.iter().find(|e| self.filetype_index(e).is_some()) {
            return Err(ScspellError::UnknownFileType(format!(
                "extension {:?} is already registered",
                ext
            )));
        }
        self.filetypes.push(FileType {
            name: name.to_string(),
            extensions,
            words: Dictionary::new(name),
        });
        self.structure_dirty = true;
        Ok(())
    }

    /// Associate an extension with an existing language.
    pub fn register_extension(&mut self, ext: &str, name: &str) -> Result<()> {
        self.check_writable()?;
        let ext = ext.to_lowercase();
        if self.filetype_index(&ext).is_some() {
            return Err(ScspellError::UnknownFileType(format!(
                "extension {:?} is already registered",
                ext
            )));
        }
        let ft = self
            .filetype_by_name_mut(name)
            .ok_or_else(|| ScspellError::UnknownFileType(format!("no language named {:?}", name)))?;
        ft.extensions.push(ext);
        self.structure_dirty = true;
        Ok(())
    }

    /// Add to the keyword dictionary for `ext`. `Ok(false)` when no language
    /// is registered for that extension.
    pub fn add_by_extension(&mut self, word: &str, ext: &str) -> Result<bool> {
        match self.filetype_index(ext) {
            Some(i) => {
                log::debug!("adding {:?} to file-type {:?}", word, self.filetypes[i].name);
                self.filetypes[i].words.add(word)?;
                Ok(true)
            }
            None => {
                log::debug!("no file-type for extension {:?}", ext);
                Ok(false)
            }
        }
    }

    pub fn file_id_dict(&self, id: &str) -> Option<&Dictionary> {
        self.file_ids.get(id)
    }

    pub fn file_ids(&self) -> impl Iterator<Item = (&str, &Dictionary)> {
        self.file_ids.iter().map(|(id, dict)| (id.as_str(), dict))
    }

    /// Add to the file-specific dictionary, creating it if needed.
    pub fn add_by_file_id(&mut self, word: &str, id: &str) -> Result<bool> {
        self.check_writable()?;
        if !is_valid_file_id(id) {
            return Err(ScspellError::InvalidFileId(id.to_string()));
        }
        if !self.file_ids.contains_key(id) {
            log::debug!("no file-id dictionary {:?}; creating", id);
            self.file_ids.insert(id.to_string(), Dictionary::new(id));
            self.structure_dirty = true;
        }
        match self.file_ids.get_mut(id) {
            Some(dict) => dict.add(word),
            None => Ok(false),
        }
    }

    pub fn remove_file_id(&mut self, id: &str) -> Result<Option<Dictionary>> {
        self.check_writable()?;
        let removed = self.file_ids.remove(id);
        self.structure_dirty |= removed.is_some();
        Ok(removed)
    }

    /// Union `from`'s words into `to` and drop `from`.
    pub fn merge_file_ids(&mut self, from: &str, to: &str) -> Result<()> {
        self.check_writable()?;
        if from == to {
            return Ok(());
        }
        let source = self
            .file_ids
            .remove(from)
            .unwrap_or_else(|| Dictionary::new(from));
        self.structure_dirty = true;
        let target = self
            .file_ids
            .entry(to.to_string())
            .or_insert_with(|| Dictionary::new(to));
        target.extend_from(&source)?;
        Ok(())
    }

    /// Remove words that a base file already supplies at the same or a more
    /// general level: natural words against base natural lists, keyword
    /// words against base natural lists and the base keyword list for the
    /// same extension.
    pub fn filter_out(&mut self, base: &Corpora) -> Result<usize> {
        self.check_writable()?;
        let mut removed = self.natural.remove_subset(&base.natural)?;
        for ft in &mut self.filetypes {
            removed += ft.words.remove_subset(&base.natural)?;
            for ext in &ft.extensions {
                if let Some(base_ft) = base.filetype_by_extension(ext) {
                    removed += ft.words.remove_subset(&base_ft.words)?;
                }
            }
        }
        Ok(removed)
    }
}
