//! Browser route parsing.
//!
//! A route string is one of exactly three shapes: the empty root, a
//! settings path introduced by the reserved `~` segment, or an alias path.
//! An alias path leads either with a plain alias name or, behind the
//! reserved `_` segment, with a cake decoded from the next component.
//!
//! Alias paths know how to enumerate their prefixes root-to-leaf, which
//! is what populates the breadcrumb bar.
use std::fmt;
use std::str::FromStr;

use crate::cake::{
    Cake,
    CakeError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasRoot {
    Alias(String),
    Cake(Cake),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasPath {
    pub root: AliasRoot,
    pub rest: Vec<String>,
    pub trailing_slash: bool,
}

/// The three mutually exclusive route shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Root,
    Settings(Vec<String>),
    Alias(AliasPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPath {
    pub resource: Resource,
    pub trailing_slash: bool,
}

impl FromStr for WebPath {
    type Err = CakeError;

    fn from_str(s: &str) -> Result<WebPath, CakeError> {
        let trailing_slash = s.ends_with('/');
        let parts: Vec<&str> = s.split('/').filter(|v| !v.is_empty()).collect();
        if parts.is_empty() {
            return Ok(WebPath {
                resource: Resource::Root,
                trailing_slash: trailing_slash,
            });
        }
        let resource = match parts[0] {
            "~" => {
                Resource::Settings(parts[1..].iter().map(|v| v.to_string()).collect())
            },
            "_" => {
                if parts.len() < 2 {
                    return Err(CakeError::InvalidPathSyntax(s.to_string()));
                }
                let cake = Cake::from_str(parts[1])?;
                Resource::Alias(AliasPath {
                    root: AliasRoot::Cake(cake),
                    rest: parts[2..].iter().map(|v| v.to_string()).collect(),
                    trailing_slash: trailing_slash,
                })
            },
            v => {
                Resource::Alias(AliasPath {
                    root: AliasRoot::Alias(v.to_string()),
                    rest: parts[1..].iter().map(|v| v.to_string()).collect(),
                    trailing_slash: trailing_slash,
                })
            },
        };
        Ok(WebPath {
            resource: resource,
            trailing_slash: trailing_slash,
        })
    }
}

impl fmt::Display for WebPath {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Resource::Root => {
                fmt.write_str("/")
            },
            Resource::Settings(segments) => {
                fmt.write_str("~")?;
                for v in segments.iter() {
                    write!(fmt, "/{}", v)?;
                }
                if self.trailing_slash && !segments.is_empty() {
                    fmt.write_str("/")?;
                }
                Ok(())
            },
            Resource::Alias(alias) => {
                write!(fmt, "{}", alias)
            },
        }
    }
}

impl WebPath {
    pub fn is_root(&self) -> bool {
        match self.resource {
            Resource::Root => true,
            _ => false,
        }
    }

    pub fn settings(&self) -> Option<&[String]> {
        match &self.resource {
            Resource::Settings(v) => Some(v),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&AliasPath> {
        match &self.resource {
            Resource::Alias(v) => Some(v),
            _ => None,
        }
    }

    /// Last non-empty segment of the route, `/` for the root.
    pub fn name(&self) -> String {
        match &self.resource {
            Resource::Root => {
                String::from("/")
            },
            Resource::Settings(segments) => {
                match segments.last() {
                    Some(v) => v.clone(),
                    None => String::from("~"),
                }
            },
            Resource::Alias(alias) => {
                alias.name()
            },
        }
    }

    /// Lowercased suffix after the last dot of the name. A directory
    /// route has no extension and reports the literal `/` instead.
    pub fn extension(&self) -> Option<String> {
        if self.trailing_slash {
            return Some(String::from("/"));
        }
        let name = self.name();
        match name.rfind('.') {
            Some(i) => {
                Some(name[i + 1..].to_lowercase())
            },
            None => None,
        }
    }

    /// Descend one level. Descending from the root starts a fresh alias
    /// path.
    pub fn child(&self, name: &str, trailing_slash: bool) -> WebPath {
        let resource = match &self.resource {
            Resource::Root => {
                Resource::Alias(AliasPath {
                    root: AliasRoot::Alias(name.to_string()),
                    rest: vec!(),
                    trailing_slash: trailing_slash,
                })
            },
            Resource::Settings(segments) => {
                let mut segments = segments.clone();
                segments.push(name.to_string());
                Resource::Settings(segments)
            },
            Resource::Alias(alias) => {
                Resource::Alias(alias.child(name, trailing_slash))
            },
        };
        WebPath {
            resource: resource,
            trailing_slash: trailing_slash,
        }
    }
}

impl fmt::Display for AliasPath {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            AliasRoot::Cake(c) => {
                write!(fmt, "_/{}", c)?;
            },
            AliasRoot::Alias(v) => {
                fmt.write_str(v.as_str())?;
            },
        }
        for v in self.rest.iter() {
            write!(fmt, "/{}", v)?;
        }
        if self.trailing_slash {
            fmt.write_str("/")?;
        }
        Ok(())
    }
}

impl AliasPath {
    pub fn is_cake_based(&self) -> bool {
        match self.root {
            AliasRoot::Cake(_) => true,
            _ => false,
        }
    }

    pub fn root_cake(&self) -> Option<&Cake> {
        match &self.root {
            AliasRoot::Cake(c) => Some(c),
            _ => None,
        }
    }

    /// Number of path elements including the leading one.
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Display name of the leaf: the shortened cake for a bare cake-based
    /// path, otherwise the last plain segment.
    pub fn name(&self) -> String {
        match self.rest.last() {
            Some(v) => {
                v.clone()
            },
            None => {
                match &self.root {
                    AliasRoot::Cake(c) => c.display_name(),
                    AliasRoot::Alias(v) => v.clone(),
                }
            },
        }
    }

    pub fn child(&self, name: &str, trailing_slash: bool) -> AliasPath {
        let mut rest = self.rest.clone();
        rest.push(name.to_string());
        AliasPath {
            root: self.root.clone(),
            rest: rest,
            trailing_slash: trailing_slash,
        }
    }

    /// Prefix of the first `i` elements, always slash-terminated since it
    /// denotes an intermediate directory. An alias path always keeps its
    /// leading element, so valid indices are `1..len`.
    pub fn subpath(&self, i: usize) -> Result<AliasPath, CakeError> {
        if i < 1 || i >= self.len() {
            return Err(CakeError::IndexOutOfRange(i, self.len()));
        }
        Ok(AliasPath {
            root: self.root.clone(),
            rest: self.rest[..i - 1].to_vec(),
            trailing_slash: true,
        })
    }

    /// Every proper prefix in increasing length, then the path itself.
    /// The order is significant: breadcrumbs render root to leaf.
    pub fn all_subpaths(&self) -> Vec<AliasPath> {
        let mut r: Vec<AliasPath> = vec!();
        for i in 1..self.len() {
            match self.subpath(i) {
                Ok(v) => {
                    r.push(v);
                },
                Err(_) => {},
            };
        }
        r.push(self.clone());
        r
    }
}
