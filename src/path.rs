//! A cake path addresses content relative to a root cake: the canonical
//! string form is `/<cake>/<segment>/<segment>` for an absolute path and
//! `<segment>/<segment>` for a relative one.
//!
//! Composition is the only algebra on paths: a relative path can be
//! anchored onto an absolute one, never onto another relative path.
use std::fmt;
use std::str::FromStr;

use crate::cake::{
    Cake,
    CakeError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CakePath {
    pub root: Option<Cake>,
    pub segments: Vec<String>,
}

impl FromStr for CakePath {
    type Err = CakeError;

    /// Runs of slashes collapse, a trailing slash is dropped. A leading
    /// slash makes the path absolute and demands a decodable root cake
    /// as the first component.
    fn from_str(s: &str) -> Result<CakePath, CakeError> {
        let mut parts = s.split('/').filter(|v| !v.is_empty());
        if s.starts_with('/') {
            let root_text = match parts.next() {
                Some(v) => {
                    v
                },
                None => {
                    return Err(CakeError::InvalidPathSyntax(s.to_string()));
                },
            };
            let root = Cake::from_str(root_text)?;
            Ok(CakePath {
                root: Some(root),
                segments: parts.map(String::from).collect(),
            })
        } else {
            Ok(CakePath {
                root: None,
                segments: parts.map(String::from).collect(),
            })
        }
    }
}

impl fmt::Display for CakePath {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => {
                write!(fmt, "/{}/{}", root, self.path_join())
            },
            None => {
                fmt.write_str(self.path_join().as_str())
            },
        }
    }
}

impl CakePath {
    pub fn new(root: Option<Cake>, segments: Vec<String>) -> CakePath {
        CakePath {
            root: root,
            segments: segments,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.root.is_none()
    }

    /// True for an absolute path with no segments left.
    pub fn is_root(&self) -> bool {
        !self.is_relative() && self.segments.is_empty()
    }

    /// Anchor a relative path onto an absolute base. Absolute paths pass
    /// through unchanged; two relative paths cannot compose.
    pub fn make_absolute(&self, base: &CakePath) -> Result<CakePath, CakeError> {
        if !self.is_relative() {
            return Ok(self.clone());
        }
        if base.is_relative() {
            return Err(CakeError::AmbiguousComposition);
        }
        let mut segments = base.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Ok(CakePath {
            root: base.root.clone(),
            segments: segments,
        })
    }

    pub fn child(&self, name: &str) -> CakePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        CakePath {
            root: self.root.clone(),
            segments: segments,
        }
    }

    pub fn parent(&self) -> Option<CakePath> {
        if self.is_relative() || self.segments.is_empty() {
            return None;
        }
        Some(CakePath {
            root: self.root.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn filename(&self) -> Option<&str> {
        self.segments.last().map(|v| v.as_str())
    }

    pub fn path_join(&self) -> String {
        self.segments.join("/")
    }
}
