use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures inside the shell process itself. Anything that goes wrong in a
/// pipeline child is reported by that child and only shows up here as its
/// exit status.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to wait for pipeline: {0}")]
    Wait(#[source] nix::Error),

    #[error("syntax error: {0}")]
    Syntax(#[from] crate::shell::syntax::ParseError),

    #[error("job was never started")]
    NotStarted,

    #[error("argument contains a NUL byte: {0:?}")]
    StringEncoding(String),

    #[error("cd: {}: {source}", .path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cd: cannot determine home directory")]
    NoHome,

    #[error("input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
