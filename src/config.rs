use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG: &str = ".scspell.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active dictionary file; the data directory default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_dicts: Vec<PathBuf>,

    #[serde(default)]
    pub use_builtin_base_dict: bool,

    /// Root for the file ID mapping table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<PathBuf>,

    /// Unset means enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_escapes: Option<bool>,

    /// Unset means [`crate::CONTEXT_SIZE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<usize>,

    /// Extra `".ext" = "Language"` associations for this session.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

/// Values given on the command line; `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dictionary: Option<PathBuf>,
    pub base_dicts: Vec<PathBuf>,
    pub use_builtin_base_dict: bool,
    pub relative_to: Option<PathBuf>,
    pub no_c_escapes: bool,
    pub context_lines: Option<usize>,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG);
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if let Some(dict) = overrides.dictionary {
            config.dictionary = Some(dict);
        }
        config.base_dicts.extend(overrides.base_dicts);
        config.use_builtin_base_dict |= overrides.use_builtin_base_dict;
        if let Some(root) = overrides.relative_to {
            config.relative_to = Some(root);
        }
        if overrides.no_c_escapes {
            config.c_escapes = Some(false);
        }
        if overrides.context_lines.is_some() {
            config.context_lines = overrides.context_lines;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        if other.dictionary.is_some() {
            self.dictionary = other.dictionary;
        }
        if !other.base_dicts.is_empty() {
            self.base_dicts = other.base_dicts;
        }
        self.use_builtin_base_dict |= other.use_builtin_base_dict;
        if other.relative_to.is_some() {
            self.relative_to = other.relative_to;
        }
        if other.c_escapes.is_some() {
            self.c_escapes = other.c_escapes;
        }
        if other.context_lines.is_some() {
            self.context_lines = other.context_lines;
        }
        self.extensions.extend(other.extensions);
        self
    }

    pub fn c_escapes(&self) -> bool {
        self.c_escapes.unwrap_or(true)
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines.unwrap_or(crate::CONTEXT_SIZE)
    }

    /// Where the active dictionary lives. The default location is seeded
    /// from the builtin dictionary on first use.
    pub fn dictionary_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.dictionary {
            return Ok(path.clone());
        }
        let path = Self::default_dictionary_path().context("Failed to get data directory")?;
        if !path.exists() {
            log::info!("creating new personal dictionary in {}", path.display());
            crate::dict::builtin::install(&path)
                .with_context(|| format!("Failed to create dictionary: {}", path.display()))?;
        }
        Ok(path)
    }

    /// Persist `dictionary` as the permanent dictionary location.
    pub fn set_dictionary(dictionary: &Path) -> Result<PathBuf> {
        let dictionary = fs::canonicalize(dictionary).unwrap_or_else(|_| dictionary.to_path_buf());
        if !dictionary.is_absolute() {
            anyhow::bail!("dictionary must be an absolute path: {}", dictionary.display());
        }

        let global_path = Self::global_config_path().context("Failed to get config directory")?;
        let mut config = if global_path.exists() {
            Self::from_file(&global_path)?
        } else {
            Self::default()
        };
        config.dictionary = Some(dictionary);

        if let Some(parent) = global_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        fs::write(&global_path, text)
            .with_context(|| format!("Failed to write config file: {}", global_path.display()))?;
        Ok(global_path)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scspell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_dictionary_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scspell").map(|dirs| dirs.data_dir().join("dictionary.txt"))
    }
}
