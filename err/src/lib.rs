//! Error taxonomy shared by every crate in the os8fs workspace.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("format error: {0}")]
    Format(String),
    #[error("corrupt block {block}: word {word:#o} out of 12-bit range")]
    CorruptBlock { block: u32, word: u32 },
    #[error("invalid directory: {0}")]
    InvalidDirectory(String),
    #[error("directory full")]
    DirectoryFull,
    #[error("no empty entry satisfies the requested size")]
    AllocationFailed,
    #[error("illegal OS/8 file name: {0}")]
    NameSyntax(String),
    #[error("usage error: {0}")]
    Usage(String),
    #[error("file not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
