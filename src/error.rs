use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("entry already exists: {0}")]
    Exists(String),

    #[error("name too long: {0}")]
    NameTooLong(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("directory is full")]
    DirFull,

    #[error("no free blocks left")]
    DiskFull,

    #[error("no such entry: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotDirectory(String),

    #[error("is a directory: {0}")]
    IsDirectory(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("file size limit exceeded")]
    FileTooLarge,

    #[error("invalid block id {0}")]
    InvalidBlockId(u32),

    #[error("block {0} is not allocated")]
    BlockNotAllocated(u32),

    #[error("invalid superblock")]
    InvalidSuperBlock,

    #[error("corrupt block: {0}")]
    Corrupt(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, FsError>;
