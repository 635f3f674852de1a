//! Content records on disk.
//!
//! The store is a flat directory. Hashed content lives in a file named by
//! its cake text; inline cakes carry their content in the key and own no
//! file at all. An alias binding is a `<name>.alias` pointer file holding
//! a cake text, and a portal is a pointer file named by the portal cake
//! holding the cake it currently points to.
//!
//! Path resolution walks an alias path segment by segment: every
//! intermediate record must parse as a rack, and the next segment is
//! looked up by name in it.
use std::error::Error;
use std::fmt;
use std::fs::{
    read,
    write,
};
use std::fs::copy as fs_copy;
use std::io::{
    Write as IoWrite,
    Read,
};
use std::path::{
    PathBuf,
    Path,
};
use std::str::FromStr;

use mime::Mime;
use serde::Serialize;
use sha2::{Sha256, Digest};
use tempfile::NamedTempFile;

use log::{debug, info, error};

use crate::cake::{
    Cake,
    Role,
    INLINE_MAX_BYTES,
};
use crate::rack::CakeRack;
use crate::web::{
    AliasPath,
    AliasRoot,
};

// portal pointer files may chain, and nothing on disk stops a cycle
const MAX_PORTAL_HOPS: usize = 8;

#[derive(Debug, PartialEq)]
pub enum RequestResultType {
    Found,
    Changed,
    ReadError,
    WriteError,
    InputError,
    RecordError,
}

pub struct RequestResult {
    pub typ: RequestResultType,
    pub v: Option<String>,
    pub b: Option<Vec<u8>>,
    pub m: Option<Mime>,
}

impl RequestResult {
    pub fn plain(typ: RequestResultType, v: Option<String>) -> RequestResult {
        RequestResult {
            typ: typ,
            v: v,
            b: None,
            m: None,
        }
    }
}

impl fmt::Display for RequestResult {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.v {
            Some(v) => {
                fmt.write_str(v.as_str())
            },
            None => {
                write!(fmt, "{:?}", self.typ)
            },
        }
    }
}

impl fmt::Debug for RequestResult {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:?}", self.typ)
    }
}

impl Error for RequestResult {
}

/// Metadata served for a resolved path.
#[derive(Debug, Serialize)]
pub struct Meta {
    pub cake: String,
    pub size: u64,
    pub file_type: String,
}

pub struct Resolved {
    pub cake: Cake,
    pub content: Vec<u8>,
}

impl Resolved {
    pub fn meta(&self, extension: Option<String>) -> Meta {
        let file_type = match self.cake.role() {
            Role::Neuron => {
                String::from("DIR")
            },
            Role::Synapse => {
                match extension {
                    Some(v) => {
                        match v.as_str() {
                            "/" => String::new(),
                            _ => v,
                        }
                    },
                    None => String::new(),
                }
            },
        };
        Meta {
            cake: self.cake.text().to_string(),
            size: self.content.len() as u64,
            file_type: file_type,
        }
    }
}

fn alias_file(path: &Path, name: &str) -> PathBuf {
    path.join(format!("{}.alias", name))
}

/// Stream content into the store, returning its cake.
///
/// Content at or below the inline threshold is embedded in the key and
/// leaves nothing on disk; anything larger is staged through a temp file
/// and landed under its cake text.
pub fn put_immutable(path: &Path, mut f: impl Read, expected_size: usize, role: Role) -> Result<Cake, RequestResult> {
    let tempfile = match NamedTempFile::new() {
        Ok(v) => {
            v
        },
        Err(e) => {
            error!("cannot create staging file: {}", e);
            return Err(RequestResult::plain(RequestResultType::WriteError, None));
        },
    };
    debug!("writing to tempfile {:?} expected size {}", tempfile.path(), expected_size);

    let mut buf: [u8; 65535] = [0; 65535];
    let mut total_size: usize = 0;
    let mut inline_data: Vec<u8> = vec!();
    let mut h = Sha256::new();
    loop {
        match f.read(&mut buf[..]) {
            Ok(v) => {
                if v == 0 {
                    break;
                }
                total_size += v;
                let data = &buf[..v];
                h.update(data);
                if total_size <= INLINE_MAX_BYTES {
                    inline_data.extend_from_slice(data);
                }
                match tempfile.as_file().write_all(data) {
                    Ok(_) => {},
                    Err(e) => {
                        error!("cannot write to staging file: {}", e);
                        return Err(RequestResult::plain(RequestResultType::WriteError, None));
                    },
                };
            },
            Err(e) => {
                error!("cannot read from request body: {}", e);
                return Err(RequestResult::plain(RequestResultType::ReadError, None));
            },
        }
    }

    if expected_size > 0 && expected_size != total_size {
        return Err(RequestResult::plain(RequestResultType::ReadError, Some(format!("expected {} bytes, got {}", expected_size, total_size))));
    }

    let digest = h.finalize().to_vec();
    debug!("content digest {}", hex::encode(&digest));
    let inline_data = match total_size <= INLINE_MAX_BYTES {
        true => Some(inline_data),
        false => None,
    };
    let cake = Cake::from_digest_and_inline_data(digest, inline_data, role);
    info!("have cake {} for content", cake);

    if !cake.has_inline_data() {
        let final_path_buf = path.join(cake.text());
        match fs_copy(tempfile.path(), final_path_buf.as_path()) {
            Ok(_) => {},
            Err(e) => {
                error!("cannot land content at {:?}: {}", final_path_buf, e);
                return Err(RequestResult::plain(RequestResultType::WriteError, None));
            },
        };
    }
    Ok(cake)
}

/// Store content and bind an alias name to the resulting cake.
pub fn put_alias(path: &Path, alias: &str, f: impl Read, expected_size: usize, role: Role) -> Result<Cake, RequestResult> {
    let cake = put_immutable(path, f, expected_size, role)?;
    let fp = alias_file(path, alias);
    match write(&fp, cake.text()) {
        Ok(_) => {
            debug!("alias {} -> {}", alias, cake);
        },
        Err(e) => {
            error!("cannot write alias pointer {:?}: {}", fp, e);
            return Err(RequestResult::plain(RequestResultType::WriteError, None));
        },
    };
    Ok(cake)
}

/// Bind a portal cake to a target cake.
pub fn put_portal(path: &Path, portal: &Cake, target: &Cake) -> Result<(), RequestResult> {
    if !portal.is_link_structure() {
        return Err(RequestResult::plain(RequestResultType::InputError, Some(String::from("not a portal cake"))));
    }
    let fp = path.join(portal.text());
    match write(&fp, target.text()) {
        Ok(_) => {
            debug!("portal {} -> {}", portal, target);
            Ok(())
        },
        Err(e) => {
            error!("cannot write portal pointer {:?}: {}", fp, e);
            Err(RequestResult::plain(RequestResultType::WriteError, None))
        },
    }
}

pub fn resolve_alias(path: &Path, name: &str) -> Option<Cake> {
    let fp = alias_file(path, name);
    let v = read(fp).ok()?;
    let text = String::from_utf8(v).ok()?;
    Cake::from_str(text.trim()).ok()
}

fn read_pointer(path: &Path, cake: &Cake) -> Option<Cake> {
    let v = read(path.join(cake.text())).ok()?;
    let text = String::from_utf8(v).ok()?;
    Cake::from_str(text.trim()).ok()
}

/// Load the content a cake stands for, chasing portal pointers and
/// embedded paths.
pub fn get_content(path: &Path, cake: &Cake) -> Option<Vec<u8>> {
    let mut current = cake.clone();
    for _ in 0..MAX_PORTAL_HOPS {
        match current.inline_data() {
            Some(v) => {
                return Some(v.to_vec());
            },
            None => {},
        };
        if current.is_link_structure() {
            current = read_pointer(path, &current)?;
            continue;
        }
        if current.is_cake_path() {
            let p = current.resolve_cake_path();
            let root = p.root?;
            current = resolve_segments(path, root, &p.segments)?;
            continue;
        }
        // content addressed, read straight from disk
        return read(path.join(current.text())).ok();
    }
    debug!("portal chain exceeded {} hops from {}", MAX_PORTAL_HOPS, cake);
    None
}

fn resolve_segments(path: &Path, root: Cake, segments: &[String]) -> Option<Cake> {
    let mut current = root;
    for segment in segments.iter() {
        let content = get_content(path, &current)?;
        let text = String::from_utf8(content).ok()?;
        let rack = match CakeRack::from_str(text.as_str()) {
            Ok(v) => {
                v
            },
            Err(e) => {
                debug!("record {} is not a rack: {}", current, e);
                return None;
            },
        };
        current = rack.get(segment.as_str())?.clone();
    }
    Some(current)
}

/// Resolve an alias path to its final cake and content.
pub fn resolve(path: &Path, alias_path: &AliasPath) -> Option<Resolved> {
    let root = match &alias_path.root {
        AliasRoot::Cake(c) => {
            c.clone()
        },
        AliasRoot::Alias(name) => {
            resolve_alias(path, name)?
        },
    };
    let cake = resolve_segments(path, root, &alias_path.rest)?;
    let content = get_content(path, &cake)?;
    Some(Resolved {
        cake: cake,
        content: content,
    })
}

#[cfg(test)]
mod tests {
    use std::fs::read;
    use std::str::FromStr;
    use tempfile::tempdir;

    use super::{
        get_content,
        put_alias,
        put_immutable,
        put_portal,
        resolve,
        resolve_alias,
    };
    use crate::cake::{
        Cake,
        KeyStructure,
        Role,
    };
    use crate::rack::CakeRack;
    use crate::web::WebPath;

    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

    #[test]
    fn test_put_immutable_inline() {
        let d = tempdir().unwrap();
        let b = b"foo";
        let cake = put_immutable(d.path(), &b[..], 3, Role::Synapse).unwrap();
        assert!(cake.has_inline_data());
        assert_eq!(cake.inline_data().unwrap(), b);
        // inline content owns no file
        assert!(!d.path().join(cake.text()).exists());
        assert_eq!(get_content(d.path(), &cake).unwrap(), b.to_vec());
    }

    #[test]
    fn test_put_immutable_hashed() {
        let d = tempdir().unwrap();
        let cake = put_immutable(d.path(), &LOREM[..], LOREM.len(), Role::Synapse).unwrap();
        assert_eq!(cake.structure(), KeyStructure::Sha256);
        let fp = d.path().join(cake.text());
        assert!(fp.is_file());
        assert_eq!(read(fp).unwrap(), LOREM.to_vec());
        assert_eq!(get_content(d.path(), &cake).unwrap(), LOREM.to_vec());
    }

    #[test]
    fn test_put_immutable_size_mismatch() {
        let d = tempdir().unwrap();
        let b = b"foo";
        let r = put_immutable(d.path(), &b[..], 5, Role::Synapse);
        assert!(r.is_err());
    }

    #[test]
    fn test_alias() {
        let d = tempdir().unwrap();
        let b = b"foo";
        let cake = put_alias(d.path(), "acme", &b[..], 3, Role::Synapse).unwrap();
        let r = resolve_alias(d.path(), "acme").unwrap();
        assert_eq!(r, cake);
        assert!(resolve_alias(d.path(), "missing").is_none());
    }

    #[test]
    fn test_resolve_through_rack() {
        let d = tempdir().unwrap();

        let content_cake = put_immutable(d.path(), &LOREM[..], 0, Role::Synapse).unwrap();
        let mut rack = CakeRack::new();
        rack.insert("b.txt", content_cake.clone());
        let rack_content = rack.content();
        let rack_cake = put_alias(d.path(), "acme", rack_content.as_bytes(), 0, Role::Neuron).unwrap();
        assert_eq!(rack_cake, rack.cake());

        let p = WebPath::from_str("acme/b.txt").unwrap();
        let r = resolve(d.path(), p.alias().unwrap()).unwrap();
        assert_eq!(r.cake, content_cake);
        assert_eq!(r.content, LOREM.to_vec());

        let p = WebPath::from_str(format!("_/{}/b.txt", rack_cake).as_str()).unwrap();
        let r = resolve(d.path(), p.alias().unwrap()).unwrap();
        assert_eq!(r.content, LOREM.to_vec());

        // directory itself resolves to the rack content
        let p = WebPath::from_str("acme/").unwrap();
        let r = resolve(d.path(), p.alias().unwrap()).unwrap();
        assert_eq!(r.cake.role(), Role::Neuron);
        assert_eq!(r.content, rack_content.as_bytes().to_vec());
    }

    #[test]
    fn test_resolve_missing_entry() {
        let d = tempdir().unwrap();
        let mut rack = CakeRack::new();
        rack.insert("a", Cake::from_bytes(b"a", Role::Synapse));
        put_alias(d.path(), "acme", rack.content().as_bytes(), 0, Role::Neuron).unwrap();

        let p = WebPath::from_str("acme/nosuch").unwrap();
        assert!(resolve(d.path(), p.alias().unwrap()).is_none());
    }

    #[test]
    fn test_portal_pointer() {
        let d = tempdir().unwrap();
        let target = put_immutable(d.path(), &LOREM[..], 0, Role::Synapse).unwrap();
        let portal = Cake::new_portal(KeyStructure::Portal, Role::Synapse).unwrap();
        put_portal(d.path(), &portal, &target).unwrap();

        assert_eq!(get_content(d.path(), &portal).unwrap(), LOREM.to_vec());
    }

    #[test]
    fn test_portal_cycle_bounded() {
        let d = tempdir().unwrap();
        let a = Cake::new_portal(KeyStructure::Portal, Role::Synapse).unwrap();
        let b = Cake::new_portal(KeyStructure::Portal, Role::Synapse).unwrap();
        put_portal(d.path(), &a, &b).unwrap();
        put_portal(d.path(), &b, &a).unwrap();

        assert!(get_content(d.path(), &a).is_none());
    }

    #[test]
    fn test_cakepath_cake_content() {
        let d = tempdir().unwrap();
        let content_cake = put_immutable(d.path(), &LOREM[..], 0, Role::Synapse).unwrap();
        let mut rack = CakeRack::new();
        rack.insert("b.txt", content_cake);
        let rack_cake = put_immutable(d.path(), rack.content().as_bytes(), 0, Role::Neuron).unwrap();

        let path_str = format!("/{}/b.txt", rack_cake);
        let link_cake = Cake::new(KeyStructure::CakePath, Role::Synapse, path_str.as_bytes()).unwrap();
        assert_eq!(get_content(d.path(), &link_cake).unwrap(), LOREM.to_vec());
    }

    #[test]
    fn test_meta() {
        let d = tempdir().unwrap();
        let cake = put_immutable(d.path(), &LOREM[..], 0, Role::Synapse).unwrap();
        let p = WebPath::from_str(format!("_/{}", cake).as_str()).unwrap();
        let r = resolve(d.path(), p.alias().unwrap()).unwrap();
        let m = r.meta(WebPath::from_str("a/b.txt").unwrap().extension());
        assert_eq!(m.size, LOREM.len() as u64);
        assert_eq!(m.file_type, "txt");
        assert_eq!(m.cake, cake.text());

        let mut rack = CakeRack::new();
        rack.insert("b.txt", Cake::from_bytes(b"x", Role::Synapse));
        let rack_cake = put_immutable(d.path(), rack.content().as_bytes(), 0, Role::Neuron).unwrap();
        let p = WebPath::from_str(format!("_/{}/", rack_cake).as_str()).unwrap();
        let r = resolve(d.path(), p.alias().unwrap()).unwrap();
        let m = r.meta(p.extension());
        assert_eq!(m.file_type, "DIR");
    }
}
