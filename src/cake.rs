//! The cake is the content address key of the store: a base-62 string
//! encoding a single header byte followed by payload bytes.
//!
//! The header packs the key structure in the upper seven bits and the role
//! in the lowest bit: `header = (structure << 1) | role`.
//!
//! Content up to 32 bytes is carried inline in the key itself, anything
//! longer is addressed by its SHA256 digest. Portal structures reference
//! mutable storage, and a `CAKEPATH` cake embeds a whole serialized
//! [CakePath](crate::path::CakePath) as payload, so identifiers can nest
//! paths that contain further identifiers.
use std::error::Error;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use rand::RngCore;
use sha2::{Sha256, Digest};

use log::debug;

use crate::basex::BASE62;
use crate::path::CakePath;

/// Content at or below this size is embedded in the key instead of hashed.
pub const INLINE_MAX_BYTES: usize = 32;

const DIGEST_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStructure {
    Inline,
    Sha256,
    Portal,
    PortalVtree,
    PortalDmount,
    CakePath,
}

impl KeyStructure {
    pub fn from_ordinal(v: u8) -> Option<KeyStructure> {
        match v {
            0 => Some(KeyStructure::Inline),
            1 => Some(KeyStructure::Sha256),
            2 => Some(KeyStructure::Portal),
            3 => Some(KeyStructure::PortalVtree),
            4 => Some(KeyStructure::PortalDmount),
            5 => Some(KeyStructure::CakePath),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            KeyStructure::Inline => 0,
            KeyStructure::Sha256 => 1,
            KeyStructure::Portal => 2,
            KeyStructure::PortalVtree => 3,
            KeyStructure::PortalDmount => 4,
            KeyStructure::CakePath => 5,
        }
    }

    /// Single-character marker used when shortening a cake for display.
    pub fn prefix(&self) -> char {
        match self {
            KeyStructure::Inline => '=',
            KeyStructure::Sha256 => '#',
            KeyStructure::Portal => '$',
            KeyStructure::PortalVtree => '$',
            KeyStructure::PortalDmount => '$',
            KeyStructure::CakePath => '>',
        }
    }

    /// True for the structures that reference mutable storage.
    pub fn is_portal(&self) -> bool {
        match self {
            KeyStructure::Portal => true,
            KeyStructure::PortalVtree => true,
            KeyStructure::PortalDmount => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Synapse,
    Neuron,
}

impl Role {
    pub fn from_bit(v: u8) -> Role {
        match v & 1 {
            0 => Role::Synapse,
            _ => Role::Neuron,
        }
    }

    pub fn bit(&self) -> u8 {
        match self {
            Role::Synapse => 0,
            Role::Neuron => 1,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CakeError {
    MalformedIdentifier(String),
    InvalidPathSyntax(String),
    AmbiguousComposition,
    IndexOutOfRange(usize, usize),
    MalformedRack(String),
}

impl fmt::Display for CakeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CakeError::MalformedIdentifier(v) => {
                write!(fmt, "malformed identifier: {}", v)
            },
            CakeError::InvalidPathSyntax(v) => {
                write!(fmt, "invalid path syntax: {}", v)
            },
            CakeError::AmbiguousComposition => {
                fmt.write_str("cannot compose two relative paths")
            },
            CakeError::IndexOutOfRange(i, n) => {
                write!(fmt, "subpath index {} out of range for {} segments", i, n)
            },
            CakeError::MalformedRack(v) => {
                write!(fmt, "malformed rack bundle: {}", v)
            },
        }
    }
}

impl Error for CakeError {
}

/// A decoded cake identifier.
///
/// Immutable once constructed; the canonical text, the decoded header
/// fields and the payload always agree, and re-encoding reproduces the
/// text byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cake {
    text: String,
    structure: KeyStructure,
    role: Role,
    payload: Vec<u8>,
    embedded: Option<Box<CakePath>>,
}

impl FromStr for Cake {
    type Err = CakeError;

    fn from_str(s: &str) -> Result<Cake, CakeError> {
        let decoded = match BASE62.decode(s) {
            Ok(v) => {
                v
            },
            Err(_) => {
                return Err(CakeError::MalformedIdentifier(s.to_string()));
            },
        };
        if decoded.len() == 0 {
            return Err(CakeError::MalformedIdentifier(s.to_string()));
        }
        let header = decoded[0];
        let structure = match KeyStructure::from_ordinal(header >> 1) {
            Some(v) => {
                v
            },
            None => {
                return Err(CakeError::MalformedIdentifier(s.to_string()));
            },
        };
        let role = Role::from_bit(header);
        let payload = decoded[1..].to_vec();

        match structure {
            KeyStructure::Inline => {},
            KeyStructure::CakePath => {},
            _ => {
                if payload.len() != DIGEST_BYTES {
                    return Err(CakeError::MalformedIdentifier(s.to_string()));
                }
            },
        };

        // a CAKEPATH payload must itself hold a valid serialized path
        let embedded = match structure {
            KeyStructure::CakePath => {
                let path_str = match std::str::from_utf8(&payload) {
                    Ok(v) => {
                        v
                    },
                    Err(_) => {
                        return Err(CakeError::MalformedIdentifier(s.to_string()));
                    },
                };
                Some(Box::new(CakePath::from_str(path_str)?))
            },
            _ => None,
        };

        Ok(Cake {
            text: s.to_string(),
            structure: structure,
            role: role,
            payload: payload,
            embedded: embedded,
        })
    }
}

impl fmt::Display for Cake {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.text.as_str())
    }
}

impl Cake {
    // Encode without re-validating. Only for payloads already known to
    // satisfy the structure's length rule.
    fn from_parts(structure: KeyStructure, role: Role, payload: Vec<u8>) -> Cake {
        let mut b: Vec<u8> = Vec::with_capacity(payload.len() + 1);
        b.push((structure.ordinal() << 1) | role.bit());
        b.extend_from_slice(&payload);
        Cake {
            text: BASE62.encode(&b),
            structure: structure,
            role: role,
            payload: payload,
            embedded: None,
        }
    }

    /// Build a cake from its parts, validating as [from_str](Cake::from_str)
    /// would.
    pub fn new(structure: KeyStructure, role: Role, payload: &[u8]) -> Result<Cake, CakeError> {
        let mut b: Vec<u8> = Vec::with_capacity(payload.len() + 1);
        b.push((structure.ordinal() << 1) | role.bit());
        b.extend_from_slice(payload);
        Cake::from_str(BASE62.encode(&b).as_str())
    }

    /// Tolerant constructor: the sentinel inputs `None`, the empty string
    /// and the literals `"null"` and `"None"` yield no cake at all.
    pub fn ensure(v: Option<&str>) -> Result<Option<Cake>, CakeError> {
        match v {
            None => Ok(None),
            Some("") => Ok(None),
            Some("null") => Ok(None),
            Some("None") => Ok(None),
            Some(s) => {
                let c = Cake::from_str(s)?;
                Ok(Some(c))
            },
        }
    }

    /// Pick inline or hash addressing depending on whether the full
    /// content fit in the inline buffer.
    pub fn from_digest_and_inline_data(digest: Vec<u8>, inline_data: Option<Vec<u8>>, role: Role) -> Cake {
        match inline_data {
            Some(v) => {
                if v.len() <= INLINE_MAX_BYTES {
                    return Cake::from_parts(KeyStructure::Inline, role, v);
                }
                Cake::from_parts(KeyStructure::Sha256, role, digest)
            },
            None => {
                Cake::from_parts(KeyStructure::Sha256, role, digest)
            },
        }
    }

    /// Consume a reader, hashing the content and retaining an inline
    /// buffer while it is still small enough.
    pub fn from_stream(mut f: impl Read, role: Role) -> Result<Cake, std::io::Error> {
        let mut buf: [u8; 65535] = [0; 65535];
        let mut h = Sha256::new();
        let mut inline_data: Vec<u8> = vec!();
        let mut length: usize = 0;
        loop {
            let v = f.read(&mut buf[..])?;
            if v == 0 {
                break;
            }
            let data = &buf[..v];
            h.update(data);
            length += v;
            if length <= INLINE_MAX_BYTES {
                inline_data.extend_from_slice(data);
            }
        }
        let digest = h.finalize().to_vec();
        let inline_data = match length <= INLINE_MAX_BYTES {
            true => Some(inline_data),
            false => None,
        };
        Ok(Cake::from_digest_and_inline_data(digest, inline_data, role))
    }

    pub fn from_bytes(v: &[u8], role: Role) -> Cake {
        let digest = Sha256::digest(v).to_vec();
        let inline_data = match v.len() <= INLINE_MAX_BYTES {
            true => Some(v.to_vec()),
            false => None,
        };
        Cake::from_digest_and_inline_data(digest, inline_data, role)
    }

    /// Generate a fresh portal from 32 random bytes.
    pub fn new_portal(structure: KeyStructure, role: Role) -> Result<Cake, CakeError> {
        if !structure.is_portal() {
            return Err(CakeError::MalformedIdentifier(format!("not a portal structure: {:?}", structure)));
        }
        let mut b: [u8; DIGEST_BYTES] = [0; DIGEST_BYTES];
        rand::thread_rng().fill_bytes(&mut b);
        Ok(Cake::from_parts(structure, role, b.to_vec()))
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn structure(&self) -> KeyStructure {
        self.structure
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn has_inline_data(&self) -> bool {
        self.structure == KeyStructure::Inline
    }

    pub fn inline_data(&self) -> Option<&[u8]> {
        match self.has_inline_data() {
            true => Some(&self.payload),
            false => None,
        }
    }

    pub fn is_cake_path(&self) -> bool {
        self.structure == KeyStructure::CakePath
    }

    pub fn is_link_structure(&self) -> bool {
        self.structure.is_portal()
    }

    /// Digest identifying the content: the payload hash for inline cakes,
    /// the payload itself otherwise.
    pub fn digest(&self) -> Vec<u8> {
        match self.has_inline_data() {
            true => Sha256::digest(&self.payload).to_vec(),
            false => self.payload.clone(),
        }
    }

    /// Shortened human-facing form: structure prefix plus the trailing
    /// eight characters of the text. A `CAKEPATH` cake instead shows the
    /// embedded path, with its root shortened the same way.
    pub fn display_name(&self) -> String {
        match &self.embedded {
            Some(p) => {
                let mut parts: Vec<String> = vec!();
                match &p.root {
                    Some(c) => {
                        parts.push(c.display_name());
                    },
                    None => {},
                }
                for v in p.segments.iter() {
                    parts.push(v.clone());
                }
                format!("{}{}", self.structure.prefix(), parts.join("/"))
            },
            None => {
                let n = self.text.len();
                let tail = match n > 8 {
                    true => &self.text[n - 8..],
                    false => self.text.as_str(),
                };
                format!("{}{}", self.structure.prefix(), tail)
            },
        }
    }

    /// The path this cake stands for: the embedded path for a `CAKEPATH`
    /// cake, otherwise the trivial path rooted at the cake itself.
    pub fn resolve_cake_path(&self) -> CakePath {
        match &self.embedded {
            Some(p) => {
                (**p).clone()
            },
            None => {
                CakePath::new(Some(self.clone()), vec!())
            },
        }
    }

    /// Root-relative browser link to this cake.
    ///
    /// A relative embedded path is anchored on `context` first; without a
    /// context to anchor on there is nothing to link to.
    pub fn link(&self, context: Option<&CakePath>) -> Result<String, CakeError> {
        let mut p = self.resolve_cake_path();
        if p.is_relative() {
            match context {
                Some(base) => {
                    p = p.make_absolute(base)?;
                },
                None => {
                    debug!("no context to anchor relative path for {}", self.text);
                    return Err(CakeError::AmbiguousComposition);
                },
            }
        }
        Ok(format!("/_{}", p))
    }
}
