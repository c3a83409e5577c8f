use std::io;
use std::path::PathBuf;

use missdemeanor::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("invalid header {0:?}: expected `Name: value`")]
    InvalidHeader(String),
    #[error("failed to read body file {path}")]
    Body {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to load plugin {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("plugin does not export `{name}`")]
    Symbol {
        name: String,
        #[source]
        source: libloading::Error,
    },
    #[error(transparent)]
    Request(#[from] RequestError),
}
