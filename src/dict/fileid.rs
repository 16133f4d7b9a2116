use super::corpora::is_valid_file_id;
use crate::error::{Result, ScspellError};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

lazy_static! {
    static ref EMBEDDED_ID: Regex = Regex::new(r"scspell-id:[ \t]*([a-zA-Z0-9_\-]+)").unwrap();
}

/// Where a file's identity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileIdentity {
    /// `scspell-id: <id>` found in the file itself.
    Embedded { id: String, line: usize, span: Range<usize> },
    /// Entry in the path -> id mapping table.
    Mapped(String),
}

impl FileIdentity {
    pub fn id(&self) -> &str {
        match self {
            FileIdentity::Embedded { id, .. } => id,
            FileIdentity::Mapped(id) => id,
        }
    }
}

/// Find the first embedded marker. `line` is 1-based, `span` covers the
/// marker within that line.
pub fn find_embedded_id(content: &str) -> Option<FileIdentity> {
    for (idx, line) in content.split_inclusive('\n').enumerate() {
        if let Some(caps) = EMBEDDED_ID.captures(line) {
            let whole = caps.get(0)?;
            let id = caps.get(1)?.as_str().to_string();
            return Some(FileIdentity::Embedded {
                id,
                line: idx + 1,
                span: whole.range(),
            });
        }
    }
    None
}

/// Produce a fresh, globally unique file ID.
pub fn mint_new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolves files to file IDs and owns the persisted mapping table
/// (`<dictionary>.fileids.json`).
#[derive(Debug, Default)]
pub struct FileIdResolver {
    root: Option<PathBuf>,
    table_path: Option<PathBuf>,
    by_id: BTreeMap<String, BTreeSet<String>>,
    by_path: BTreeMap<String, String>,
    dirty: bool,
}

impl FileIdResolver {
    /// A resolver that only understands embedded markers.
    pub fn without_root() -> Self {
        Self::default()
    }

    /// Load the mapping table for `root`. A missing table is empty; a
    /// malformed one is reported and ignored.
    pub fn open(root: &Path, table_path: &Path) -> Result<Self> {
        let root = fs::canonicalize(root).unwrap_or_else(|_| normalize(root));
        let mut resolver = Self {
            root: Some(root),
            table_path: Some(table_path.to_path_buf()),
            ..Default::default()
        };

        match fs::read_to_string(table_path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, Vec<String>>>(&text) {
                Ok(table) => {
                    log::debug!("got file ID mapping with {} ids", table.len());
                    for (id, paths) in table {
                        for path in paths {
                            resolver.insert(&path, &id);
                        }
                    }
                }
                Err(e) => log::warn!(
                    "couldn't load file ID mapping from {}: {}",
                    table_path.display(),
                    e
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no file ID mapping file {}", table_path.display());
            }
            Err(source) => {
                return Err(ScspellError::MappingLoad {
                    path: table_path.to_path_buf(),
                    source,
                })
            }
        }
        resolver.dirty = false;
        Ok(resolver)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// Embedded marker first, mapping table second.
    pub fn resolve(&self, file_path: &Path, content: &str) -> Result<Option<FileIdentity>> {
        if let Some(identity) = find_embedded_id(content) {
            log::debug!("file contains id {:?}", identity.id());
            return Ok(Some(identity));
        }
        if self.root.is_none() {
            return Ok(None);
        }
        let rel = self.relative_path(file_path)?;
        Ok(self.by_path.get(&rel).cloned().map(FileIdentity::Mapped))
    }

    /// `file_path` relative to the root, with `/` separators.
    pub fn relative_path(&self, file_path: &Path) -> Result<String> {
        let root = self.root.as_ref().ok_or(ScspellError::NoRelativeRoot)?;
        let full = canonical_or_lexical(file_path);
        let not_under = || ScspellError::NotUnderRoot {
            path: full.clone(),
            root: root.clone(),
        };
        let rel = full.strip_prefix(root).map_err(|_| not_under())?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return Err(not_under());
        }
        Ok(parts.join("/"))
    }

    pub fn file_id_of(&self, file_path: &Path) -> Result<Option<String>> {
        let rel = self.relative_path(file_path)?;
        Ok(self.by_path.get(&rel).cloned())
    }

    pub fn id_exists(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn paths_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.by_id.get(id).into_iter().flatten().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    /// Map `file_path` to `id`, replacing any previous mapping.
    pub fn register(&mut self, file_path: &Path, id: &str) -> Result<()> {
        if !is_valid_file_id(id) {
            return Err(ScspellError::InvalidFileId(id.to_string()));
        }
        let rel = self.relative_path(file_path)?;
        self.remove_rel(&rel);
        self.insert(&rel, id);
        Ok(())
    }

    /// Accept either a literal file ID or a path whose mapping is used.
    pub fn resolve_id_or_path(&self, arg: &str) -> Result<String> {
        if self.id_exists(arg) {
            return Ok(arg.to_string());
        }
        if self.root.is_some() {
            if let Ok(Some(id)) = self.file_id_of(Path::new(arg)) {
                return Ok(id);
            }
        }
        Err(ScspellError::UnknownFileId(arg.to_string()))
    }

    /// Drop the mapping for `file_path`. Returns the id it pointed at and
    /// whether that id has no paths left.
    pub fn remove(&mut self, file_path: &Path) -> Result<Option<(String, bool)>> {
        let rel = self.relative_path(file_path)?;
        Ok(self.remove_rel(&rel))
    }

    /// Move `from`'s mapping to `to`. Returns the id, or `None` if `from`
    /// had no mapping. An existing mapping for `to` is dropped first and
    /// reported through the second value when that orphaned its id.
    pub fn rename(&mut self, from: &Path, to: &Path) -> Result<Option<(String, Option<String>)>> {
        let from_rel = self.relative_path(from)?;
        let to_rel = self.relative_path(to)?;
        let Some(id) = self.by_path.get(&from_rel).cloned() else {
            return Ok(None);
        };
        if from_rel == to_rel {
            return Ok(Some((id, None)));
        }
        let orphaned = match self.remove_rel(&to_rel) {
            Some((old, true)) => Some(old),
            _ => None,
        };
        self.remove_rel(&from_rel);
        self.insert(&to_rel, &id);
        Ok(Some((id, orphaned)))
    }

    /// Point every path of `from_id` at `to_id`.
    pub fn repoint(&mut self, from_id: &str, to_id: &str) {
        if from_id == to_id {
            return;
        }
        if let Some(paths) = self.by_id.remove(from_id) {
            for path in paths {
                self.insert(&path, to_id);
            }
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the table if it changed.
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(path) = self.table_path.clone() else {
            return Err(ScspellError::NoRelativeRoot);
        };
        let table: BTreeMap<&str, Vec<&str>> = self
            .by_id
            .iter()
            .map(|(id, paths)| (id.as_str(), paths.iter().map(String::as_str).collect()))
            .collect();
        let json = serde_json::to_string_pretty(&table)
            .map_err(|e| ScspellError::MappingLoad {
                path: path.clone(),
                source: e.into(),
            })?;
        fs::write(&path, json + "\n")
            .map_err(|source| ScspellError::MappingLoad { path, source })?;
        self.dirty = false;
        Ok(true)
    }

    fn insert(&mut self, rel: &str, id: &str) {
        if let Some(old) = self.by_path.insert(rel.to_string(), id.to_string()) {
            if old != id {
                self.detach(&old, rel);
            }
        }
        self.by_id
            .entry(id.to_string())
            .or_default()
            .insert(rel.to_string());
        self.dirty = true;
    }

    fn remove_rel(&mut self, rel: &str) -> Option<(String, bool)> {
        let id = self.by_path.remove(rel)?;
        let orphaned = self.detach(&id, rel);
        self.dirty = true;
        Some((id, orphaned))
    }

    fn detach(&mut self, id: &str, rel: &str) -> bool {
        let Some(paths) = self.by_id.get_mut(id) else {
            return false;
        };
        paths.remove(rel);
        if paths.is_empty() {
            self.by_id.remove(id);
            return true;
        }
        false
    }
}

/// Canonicalize when the file (or at least its parent) exists, so renamed
/// and deleted files still resolve.
fn canonical_or_lexical(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    let lexical = normalize(path);
    if let (Some(parent), Some(name)) = (lexical.parent(), lexical.file_name()) {
        if let Ok(parent) = fs::canonicalize(parent) {
            return parent.join(name);
        }
    }
    lexical
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
