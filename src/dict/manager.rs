//! `scspell dict <action>`: one-shot maintenance of the active dictionary
//! and the file ID mapping. Every action flushes before returning.

use super::{fileid, DictStore};
use crate::error::ScspellError;
use crate::Config;
use anyhow::{Context, Result};
use colored::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which list `dict add` writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Natural,
    Programming,
    File,
}

impl FromStr for WordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "natural" => Ok(WordKind::Natural),
            "programming" => Ok(WordKind::Programming),
            "file" => Ok(WordKind::File),
            _ => Err(format!("Unknown dictionary kind: {}", s)),
        }
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordKind::Natural => write!(f, "natural"),
            WordKind::Programming => write!(f, "programming"),
            WordKind::File => write!(f, "file"),
        }
    }
}

/// The line to paste into a source file.
pub fn gen_id() -> String {
    format!("scspell-id: {}", fileid::mint_new_id())
}

pub fn set_dictionary(dictionary: &Path) -> Result<()> {
    let config_path = Config::set_dictionary(dictionary)?;
    println!(
        "{} Dictionary set to {} in {}",
        "✓".green().bold(),
        dictionary.display().to_string().cyan(),
        config_path.display().to_string().dimmed()
    );
    Ok(())
}

pub fn export_dictionary(store: &DictStore, dest: &Path) -> Result<()> {
    if !store.bases().is_empty() {
        anyhow::bail!("Cannot export while base dictionaries are in use");
    }
    fs::write(dest, store.active().to_text())
        .with_context(|| format!("Failed to export dictionary to {}", dest.display()))?;
    println!(
        "{} Exported {} to {}",
        "✓".green().bold(),
        store.active().path().display(),
        dest.display().to_string().cyan()
    );
    Ok(())
}

pub fn filter_out_base_dicts(store: &mut DictStore) -> Result<usize> {
    if store.bases().is_empty() {
        println!("{}", "No base dictionaries configured.".yellow());
        return Ok(0);
    }
    let removed = store.filter_out_bases()?;
    store.flush()?;
    println!(
        "{} Removed {} {} already present in base dictionaries",
        "✓".green().bold(),
        removed.to_string().yellow(),
        if removed == 1 { "word" } else { "words" }
    );
    Ok(removed)
}

/// A literal id known to the dictionary or mapping, or a mapped path.
fn resolve_id(store: &DictStore, arg: &str) -> Result<String> {
    if store.active().file_id_dict(arg).is_some() {
        return Ok(arg.to_string());
    }
    Ok(store.resolver().resolve_id_or_path(arg)?)
}

fn require_root(store: &DictStore) -> Result<()> {
    if !store.resolver().has_root() {
        return Err(ScspellError::NoRelativeRoot.into());
    }
    Ok(())
}

/// Fold `from`'s file-specific words into `to` and repoint its paths.
pub fn merge(store: &mut DictStore, from: &str, to: &str) -> Result<()> {
    let from_id = resolve_id(store, from)?;
    let to_id = resolve_id(store, to)?;
    store.active_mut().merge_file_ids(&from_id, &to_id)?;
    store.resolver_mut().repoint(&from_id, &to_id);
    store.flush()?;
    println!(
        "{} Merged file ID {} into {}",
        "✓".green().bold(),
        from_id.yellow(),
        to_id.cyan()
    );
    Ok(())
}

/// Map `to` onto the id already used by `from`.
pub fn copy_file(store: &mut DictStore, from: &Path, to: &Path) -> Result<()> {
    require_root(store)?;
    let id = store
        .resolver()
        .file_id_of(from)?
        .ok_or_else(|| ScspellError::UnknownFileId(from.display().to_string()))?;
    store.resolver_mut().register(to, &id)?;
    store.flush()?;
    println!(
        "{} {} now shares file ID {} with {}",
        "✓".green().bold(),
        to.display().to_string().cyan(),
        id.yellow(),
        from.display()
    );
    Ok(())
}

pub fn rename_file(store: &mut DictStore, from: &Path, to: &Path) -> Result<()> {
    require_root(store)?;
    let (id, orphaned) = store
        .resolver_mut()
        .rename(from, to)?
        .ok_or_else(|| ScspellError::UnknownFileId(from.display().to_string()))?;
    if let Some(old) = orphaned {
        log::debug!("file ID {} lost its last path; dropping its dictionary", old);
        store.active_mut().remove_file_id(&old)?;
    }
    store.flush()?;
    println!(
        "{} Renamed {} to {} (file ID {})",
        "✓".green().bold(),
        from.display(),
        to.display().to_string().cyan(),
        id.yellow()
    );
    Ok(())
}

pub fn delete_files(store: &mut DictStore, files: &[PathBuf]) -> Result<()> {
    require_root(store)?;
    for file in files {
        match store.resolver_mut().remove(file)? {
            Some((id, orphaned)) => {
                if orphaned {
                    store.active_mut().remove_file_id(&id)?;
                }
                println!("{} Deleted {}", "✓".green().bold(), file.display());
            }
            None => println!(
                "{} {} has no file ID mapping",
                "✗".red().bold(),
                file.display().to_string().yellow()
            ),
        }
    }
    store.flush()?;
    Ok(())
}

pub fn add_to_dict(store: &mut DictStore, kind: WordKind, word: &str, file: Option<&Path>) -> Result<()> {
    let word = word.trim();
    if word.is_empty() {
        anyhow::bail!("Refusing to add an empty word");
    }

    let target = match kind {
        WordKind::Natural => {
            store.active_mut().add_natural(word)?;
            "natural language dictionary".to_string()
        }
        WordKind::Programming => {
            let file = file.context("A file is needed to pick the programming language")?;
            let ext = file
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                .context("File has no extension")?;
            if !store.add_keyword(word, &ext)? {
                anyhow::bail!("No programming language is registered for extension {}", ext);
            }
            let lang = store.language_for(&ext).unwrap_or_default();
            format!("{} dictionary", lang)
        }
        WordKind::File => {
            let file = file.context("A file is needed to pick the file-specific dictionary")?;
            let content = fs::read_to_string(file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let id = match store.resolver().resolve(file, &content)? {
                Some(identity) => identity.id().to_string(),
                None if store.resolver().has_root() => {
                    let id = fileid::mint_new_id();
                    store.resolver_mut().register(file, &id)?;
                    println!(
                        "{} New file ID {} for {}",
                        "✓".green().bold(),
                        id.yellow(),
                        file.display()
                    );
                    id
                }
                None => return Err(ScspellError::UnknownFileId(file.display().to_string()).into()),
            };
            store.active_mut().add_by_file_id(word, &id)?;
            format!("file-specific dictionary {}", id)
        }
    };
    store.flush()?;
    println!("{} Added {} to {}", "✓".green().bold(), word.cyan(), target);
    Ok(())
}

pub fn show_info(store: &DictStore) -> Result<()> {
    let active = store.active();
    println!("{}", "Dictionary:".bold());
    println!("  Path: {}", active.path().display());
    println!("  Natural language words: {}", active.natural().len());
    for ft in active.filetypes() {
        println!(
            "  {} ({}): {} words",
            ft.name.cyan(),
            ft.extensions.join(", ").dimmed(),
            ft.words.len()
        );
    }
    let file_ids = active.file_ids().count();
    println!("  File-specific dictionaries: {}", file_ids);

    for base in store.bases() {
        println!(
            "  Base: {} ({} natural words)",
            base.path().display().to_string().dimmed(),
            base.natural().len()
        );
    }

    let resolver = store.resolver();
    match resolver.root() {
        Some(root) => println!(
            "  File ID mapping: {} paths, {} ids (relative to {})",
            resolver.len(),
            resolver.id_count(),
            root.display()
        ),
        None => println!("  File ID mapping: {}", "not loaded (no --relative-to)".dimmed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{mapping_path, Corpora, FileIdResolver};
    use tempfile::{tempdir, TempDir};

    fn store_in(dir: &TempDir, text: &str, table: Option<&str>) -> DictStore {
        let dict = dir.path().join("dictionary.txt");
        fs::write(&dict, text).unwrap();
        if let Some(table) = table {
            fs::write(mapping_path(&dict), table).unwrap();
        }
        let resolver = FileIdResolver::open(dir.path(), &mapping_path(&dict)).unwrap();
        DictStore::from_parts(Corpora::load(&dict).unwrap(), Vec::new(), resolver)
    }

    #[test]
    fn test_word_kind_parse() {
        assert_eq!("Natural".parse::<WordKind>().unwrap(), WordKind::Natural);
        assert_eq!("file".parse::<WordKind>().unwrap(), WordKind::File);
        assert!("keyword".parse::<WordKind>().is_err());
    }

    #[test]
    fn test_gen_id_is_a_marker() {
        let line = gen_id();
        let identity = fileid::find_embedded_id(&line).unwrap();
        assert!(line.ends_with(identity.id()));
    }

    #[test]
    fn test_merge_unions_and_repoints() {
        let dir = tempdir().unwrap();
        let mut store = store_in(
            &dir,
            "FILEID: from-id\nfoo\nbar\n\nFILEID: to-id\nbar\nbaz\n\nNATURAL:\n",
            Some(r#"{"from-id": ["a.c", "b.c"], "to-id": ["c.c"]}"#),
        );
        merge(&mut store, "from-id", "to-id").unwrap();

        assert!(store.active().file_id_dict("from-id").is_none());
        let words: Vec<&str> = store
            .active()
            .file_id_dict("to-id")
            .unwrap()
            .words()
            .collect();
        assert_eq!(words, vec!["bar", "baz", "foo"]);
        let paths: Vec<&str> = store.resolver().paths_of("to-id").collect();
        assert_eq!(paths, vec!["a.c", "b.c", "c.c"]);
        assert!(!store.resolver().id_exists("from-id"));

        let saved = fs::read_to_string(dir.path().join("dictionary.txt")).unwrap();
        assert!(!saved.contains("from-id"));
    }

    #[test]
    fn test_merge_unknown_id() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, "NATURAL:\n", None);
        let err = merge(&mut store, "nope", "also-nope").unwrap_err();
        assert!(err.to_string().contains("can't find 'nope'"));
    }

    #[test]
    fn test_copy_rename_delete() {
        let dir = tempdir().unwrap();
        let mut store = store_in(
            &dir,
            "FILEID: one\nfrobnicate\n\nFILEID: two\nblorp\n\nNATURAL:\n",
            Some(r#"{"one": ["a.c"], "two": ["b.c"]}"#),
        );
        let a = dir.path().join("a.c");
        let b = dir.path().join("b.c");
        let c = dir.path().join("c.c");

        copy_file(&mut store, &a, &c).unwrap();
        assert_eq!(store.resolver().file_id_of(&c).unwrap().as_deref(), Some("one"));

        // renaming onto b.c orphans "two"
        rename_file(&mut store, &a, &b).unwrap();
        assert_eq!(store.resolver().file_id_of(&b).unwrap().as_deref(), Some("one"));
        assert!(store.active().file_id_dict("two").is_none());

        delete_files(&mut store, &[b.clone()]).unwrap();
        assert!(store.active().file_id_dict("one").is_some());
        delete_files(&mut store, &[c]).unwrap();
        assert!(store.active().file_id_dict("one").is_none());
        assert!(store.resolver().is_empty());
    }

    #[test]
    fn test_add_to_dict() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, "FILETYPE: C; .c\nint\n\nNATURAL:\nhello\n", None);
        let src = dir.path().join("a.c");
        fs::write(&src, "/* scspell-id: abc-123 */\n").unwrap();

        add_to_dict(&mut store, WordKind::Natural, "frobnicate", None).unwrap();
        add_to_dict(&mut store, WordKind::Programming, "typedef", Some(&src)).unwrap();
        add_to_dict(&mut store, WordKind::File, "blorp", Some(&src)).unwrap();
        assert!(add_to_dict(&mut store, WordKind::Programming, "x", Some(Path::new("a.zig"))).is_err());

        assert!(store.matches_natural("frobnicate"));
        assert!(store.matches_keyword("typedef", ".c"));
        assert!(store.matches_file_id("blorp", "abc-123"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_add_file_word_mints_id() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir, "NATURAL:\nhello\n", None);
        let src = dir.path().join("b.c");
        fs::write(&src, "int blorp;\n").unwrap();

        add_to_dict(&mut store, WordKind::File, "blorp", Some(&src)).unwrap();

        let id = store.resolver().file_id_of(&src).unwrap().unwrap();
        assert!(store.matches_file_id("blorp", &id));
        let table = fs::read_to_string(mapping_path(&dir.path().join("dictionary.txt"))).unwrap();
        assert!(table.contains(&id));
        assert!(table.contains("\"b.c\""));
    }

    #[test]
    fn test_add_file_word_without_root() {
        let dir = tempdir().unwrap();
        let dict = dir.path().join("dictionary.txt");
        fs::write(&dict, "NATURAL:\n").unwrap();
        let mut store = DictStore::from_parts(
            Corpora::load(&dict).unwrap(),
            Vec::new(),
            FileIdResolver::without_root(),
        );
        let src = dir.path().join("b.c");
        fs::write(&src, "int blorp;\n").unwrap();
        let err = add_to_dict(&mut store, WordKind::File, "blorp", Some(&src)).unwrap_err();
        assert!(err.to_string().contains("can't find"));
    }

    #[test]
    fn test_export_and_filter() {
        let dir = tempdir().unwrap();
        let dict = dir.path().join("dictionary.txt");
        fs::write(&dict, "NATURAL:\nhello\nfrobnicate\n").unwrap();
        let base = Corpora::from_text_read_only(Path::new("base"), "NATURAL:\nhello\n").unwrap();
        let mut store = DictStore::from_parts(
            Corpora::load(&dict).unwrap(),
            vec![base],
            FileIdResolver::without_root(),
        );

        assert!(export_dictionary(&store, &dir.path().join("out.txt")).is_err());
        assert_eq!(filter_out_base_dicts(&mut store).unwrap(), 1);
        assert_eq!(fs::read_to_string(&dict).unwrap(), "NATURAL:\nfrobnicate\n\n");
    }
}
