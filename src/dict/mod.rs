pub mod builtin;
pub mod corpora;
pub mod fileid;
pub mod manager;
pub mod wordlist;

pub use corpora::{Corpora, FileType};
pub use fileid::{FileIdResolver, FileIdentity};
pub use wordlist::Dictionary;

use crate::error::Result;
use crate::Config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path of the file ID mapping table that belongs to a dictionary file.
pub fn mapping_path(dictionary: &Path) -> PathBuf {
    let mut name = dictionary.as_os_str().to_owned();
    name.push(".fileids.json");
    PathBuf::from(name)
}

/// Every dictionary layer used during a run: the active (writable) file,
/// read-only base files, and the file ID resolver.
///
/// Changes stay in memory until [`DictStore::flush`].
#[derive(Debug)]
pub struct DictStore {
    active: Corpora,
    bases: Vec<Corpora>,
    resolver: FileIdResolver,
    extra_extensions: BTreeMap<String, String>,
}

impl DictStore {
    pub fn open(dictionary: &Path, config: &Config) -> Result<Self> {
        let active = Corpora::load(dictionary)?;

        let mut bases = Vec::new();
        if config.use_builtin_base_dict {
            bases.push(builtin::load_base()?);
        }
        for path in &config.base_dicts {
            bases.push(Corpora::load_base(path)?);
        }

        let resolver = match &config.relative_to {
            Some(root) => FileIdResolver::open(root, &mapping_path(dictionary))?,
            None => FileIdResolver::without_root(),
        };

        Ok(Self::from_parts(active, bases, resolver)
            .with_extra_extensions(config.extensions.clone()))
    }

    pub fn from_parts(active: Corpora, bases: Vec<Corpora>, resolver: FileIdResolver) -> Self {
        Self {
            active,
            bases,
            resolver,
            extra_extensions: BTreeMap::new(),
        }
    }

    /// Session-only extension -> language associations.
    pub fn with_extra_extensions(mut self, extensions: BTreeMap<String, String>) -> Self {
        self.extra_extensions = extensions
            .into_iter()
            .map(|(ext, lang)| (ext.to_lowercase(), lang))
            .collect();
        self
    }

    pub fn active(&self) -> &Corpora {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Corpora {
        &mut self.active
    }

    pub fn bases(&self) -> &[Corpora] {
        &self.bases
    }

    pub fn resolver(&self) -> &FileIdResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut FileIdResolver {
        &mut self.resolver
    }

    fn keyword_list<'a>(&self, corpora: &'a Corpora, ext: &str) -> Option<&'a Dictionary> {
        match self.extra_extensions.get(&ext.to_lowercase()) {
            Some(lang) => corpora.filetype_by_name(lang).map(|ft| &ft.words),
            None => corpora.filetype_by_extension(ext).map(|ft| &ft.words),
        }
    }

    /// Name of the language registered for `ext`, if any.
    pub fn language_for(&self, ext: &str) -> Option<&str> {
        if let Some(lang) = self.extra_extensions.get(&ext.to_lowercase()) {
            return Some(lang.as_str());
        }
        self.active
            .filetype_by_extension(ext)
            .map(|ft| ft.name.as_str())
    }

    pub fn matches_natural(&self, word: &str) -> bool {
        self.active.natural().contains_prefix(word)
    }

    pub fn matches_keyword(&self, word: &str, ext: &str) -> bool {
        self.keyword_list(&self.active, ext)
            .is_some_and(|dict| dict.contains_exact(word))
    }

    pub fn matches_file_id(&self, word: &str, id: &str) -> bool {
        self.active
            .file_id_dict(id)
            .is_some_and(|dict| dict.contains_exact(word))
    }

    /// Base layers: natural lists by prefix, keyword and file lists exactly.
    pub fn matches_base(&self, word: &str, ext: &str, file_id: Option<&str>) -> bool {
        self.bases.iter().any(|base| {
            base.natural().contains_prefix(word)
                || self
                    .keyword_list(base, ext)
                    .is_some_and(|dict| dict.contains_exact(word))
                || file_id
                    .and_then(|id| base.file_id_dict(id))
                    .is_some_and(|dict| dict.contains_exact(word))
        })
    }

    /// `Ok(false)` when no language is registered for `ext`.
    pub fn add_keyword(&mut self, word: &str, ext: &str) -> Result<bool> {
        match self.extra_extensions.get(&ext.to_lowercase()) {
            Some(lang) => match self.active.filetype_by_name_mut(lang) {
                Some(ft) => {
                    log::debug!("adding {:?} to file-type {:?}", word, ft.name);
                    ft.words.add(word)?;
                    Ok(true)
                }
                None => self.active.add_by_extension(word, ext),
            },
            None => self.active.add_by_extension(word, ext),
        }
    }

    /// Drop active entries that some base layer already supplies.
    pub fn filter_out_bases(&mut self) -> Result<usize> {
        let mut removed = 0;
        for base in &self.bases {
            removed += self.active.filter_out(base)?;
        }
        Ok(removed)
    }

    pub fn is_dirty(&self) -> bool {
        self.active.is_dirty() || self.resolver.is_dirty()
    }

    /// Persist the active dictionary and the mapping table if they changed.
    pub fn flush(&mut self) -> Result<()> {
        for base in &mut self.bases {
            base.save()?;
        }
        if self.active.save()? {
            log::debug!("wrote dictionary {}", self.active.path().display());
        }
        if self.resolver.save()? {
            log::debug!("wrote file ID mapping");
        }
        Ok(())
    }
}
