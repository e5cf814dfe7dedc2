use crate::tree::css_tree::TreeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scan strategy {0:?}, expected \"safe\" or \"best\"")]
    InvalidScanStrategy(String),
    #[error("could not write usage report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Tree(#[from] TreeError),
}
