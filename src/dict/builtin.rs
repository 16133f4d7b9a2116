use super::corpora::Corpora;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::Path;

/// Default dictionary shipped inside the binary.
pub const BUILTIN_DICTIONARY: &str = include_str!("../../data/dictionary.txt");

pub const BUILTIN_NAME: &str = "<builtin>";

/// The builtin dictionary as a read-only base layer.
pub fn load_base() -> Result<Corpora> {
    Corpora::from_text_read_only(Path::new(BUILTIN_NAME), BUILTIN_DICTIONARY)
}

/// Seed a user dictionary at `path` from the builtin one.
pub fn install(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, BUILTIN_DICTIONARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_parses() {
        let base = load_base().unwrap();
        assert!(base.is_read_only());
        assert!(base.natural().contains_prefix("dict"));
        assert!(base.natural().contains_exact("variable"));
        let py = base.filetype_by_extension(".py").unwrap();
        assert!(py.words.contains_exact("lambda"));
        assert!(base.filetype_by_extension(".rs").is_some());
    }
}
