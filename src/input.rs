//! Reading pasted text blocks from files and stdin.

use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while collecting input blocks.
#[derive(Debug, Error)]
pub enum InputError {
    /// An input file could not be read or is not UTF-8.
    #[error("failed to read input file {}: {}", .path.display(), .source)]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stdin could not be read or is not UTF-8.
    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Where a block of text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            Source::Stdin
        } else {
            Source::File(path.to_path_buf())
        }
    }
}

/// One pasted block of text.
#[derive(Debug, Clone)]
pub struct InputBlock {
    pub source: Source,
    pub text: String,
}

impl AsRef<str> for InputBlock {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Read every input block named on the command line.
///
/// An empty list reads a single block from stdin.
pub fn read_blocks(paths: &[PathBuf]) -> Result<Vec<InputBlock>, InputError> {
    if paths.is_empty() {
        return Ok(vec![read_source(Source::Stdin, &mut std::io::stdin())?]);
    }

    paths
        .iter()
        .map(|path| read_source(Source::from_arg(path), &mut std::io::stdin()))
        .collect()
}

fn read_source(source: Source, stdin: &mut impl Read) -> Result<InputBlock, InputError> {
    let text = match &source {
        Source::Stdin => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).map_err(InputError::Stdin)?;
            buf
        }
        Source::File(path) => std::fs::read_to_string(path).map_err(|source| {
            InputError::ReadFile {
                path: path.to_path_buf(),
                source,
            }
        })?,
    };
    let text = strip_bom(text);

    debug!("Read {} bytes from {:?}", text.len(), source);
    Ok(InputBlock { source, text })
}

/// Read a block from a file.
pub fn read_file(path: &Path) -> Result<String, InputError> {
    read_source(Source::File(path.to_path_buf()), &mut std::io::empty()).map(|block| block.text)
}

/// Drop a leading UTF-8 byte order mark, which `trim` does not remove.
fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
