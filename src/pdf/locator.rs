//! Document locators: plain paths, `file://` URLs, percent-encoded paths and
//! remote `http(s)://` URLs.

use super::PdfError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A file on the local filesystem
    Path(PathBuf),
    /// A document fetched over HTTP
    Remote(Url),
}

impl Locator {
    /// Parse a user-supplied locator.
    ///
    /// Schemes other than `file`, `http` and `https` are not treated as URLs,
    /// so `C:\docs\a.pdf` or `notes:v2.pdf` stay relative or absolute paths.
    pub fn parse(raw: &str) -> Result<Self, PdfError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PdfError::LoadError("empty document locator".to_string()));
        }

        if let Ok(url) = Url::parse(raw) {
            match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| PdfError::LoadError(format!("invalid file URL: {}", raw)))?;
                    return Ok(Self::Path(path));
                }
                "http" | "https" => return Ok(Self::Remote(url)),
                _ => {}
            }
        }

        // Handle URL-encoded paths (e.g., spaces as %20)
        let direct = PathBuf::from(raw);
        if !direct.exists() {
            if let Ok(decoded) = urlencoding::decode(raw) {
                if decoded != raw && Path::new(decoded.as_ref()).exists() {
                    return Ok(Self::Path(PathBuf::from(decoded.into_owned())));
                }
            }
        }

        Ok(Self::Path(direct))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// The local path, if this locator names a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Remote(_) => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}
