use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScspellError>;

#[derive(Debug, Error)]
pub enum ScspellError {
    /// The dictionary path exists but could not be read.
    #[error("unable to read dictionary file '{}': {source}", path.display())]
    DictionaryLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error while parsing dictionary file '{}': {message} (line {line})", path.display())]
    DictionaryParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("can't read file ID mapping '{}': {source}", path.display())]
    MappingLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't find '{0}' as file ID or file")]
    UnknownFileId(String),

    #[error("dictionary '{0}' is read-only")]
    ReadOnlyDictionary(String),

    #[error("'{0}' is not a valid file ID")]
    InvalidFileId(String),

    #[error("file '{}' is not within --relative-to '{}'", path.display(), root.display())]
    NotUnderRoot { path: PathBuf, root: PathBuf },

    #[error("--relative-to is required to use the file ID map")]
    NoRelativeRoot,

    #[error("{0}")]
    UnknownFileType(String),

    #[error("replacement at line {line}, columns {start}..{end} does not fit the buffer")]
    InvalidSpan {
        line: usize,
        start: usize,
        end: usize,
    },

    #[error("{}: {source}", path.display())]
    SourceFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to the terminal failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("user abort")]
    Aborted,
}
