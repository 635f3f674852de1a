//! A rack is the directory record of the store: a sorted mapping of entry
//! names to cakes.
//!
//! The canonical serialized form is a JSON array pair
//! `[["a.txt", "b"], ["<cake>", "<cake>"]]` with names in ascending order
//! and a space after every comma, so the same set of entries always
//! produces the same bytes and therefore the same cake. The rack's own cake carries the NEURON role, which is
//! how the store recognizes directory content during path resolution.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sha2::{Sha256, Digest};

use crate::cake::{
    Cake,
    CakeError,
    Role,
    INLINE_MAX_BYTES,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CakeRack {
    store: BTreeMap<String, Cake>,
}

impl FromStr for CakeRack {
    type Err = CakeError;

    fn from_str(s: &str) -> Result<CakeRack, CakeError> {
        let (names, cakes): (Vec<String>, Vec<String>) = match serde_json::from_str(s) {
            Ok(v) => {
                v
            },
            Err(e) => {
                return Err(CakeError::MalformedRack(e.to_string()));
            },
        };
        if names.len() != cakes.len() {
            return Err(CakeError::MalformedRack(format!("{} names for {} cakes", names.len(), cakes.len())));
        }
        let mut rack = CakeRack::new();
        for (name, cake_text) in names.iter().zip(cakes.iter()) {
            let cake = Cake::from_str(cake_text)?;
            rack.store.insert(name.clone(), cake);
        }
        Ok(rack)
    }
}

impl fmt::Display for CakeRack {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.content().as_str())
    }
}

impl CakeRack {
    pub fn new() -> CakeRack {
        CakeRack {
            store: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, cake: Cake) {
        self.store.insert(name.to_string(), cake);
    }

    pub fn get(&self, name: &str) -> Option<&Cake> {
        self.store.get(name)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.store.keys().map(|v| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Canonical JSON form. Every comma is followed by a single space.
    pub fn content(&self) -> String {
        let names: Vec<String> = self.store.keys()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .collect();
        let cakes: Vec<String> = self.store.values()
            .map(|v| serde_json::to_string(v.text()).unwrap_or_default())
            .collect();
        format!("[[{}], [{}]]", names.join(", "), cakes.join(", "))
    }

    pub fn size(&self) -> usize {
        self.content().len()
    }

    /// The cake addressing this rack's canonical content, carrying the
    /// NEURON role.
    pub fn cake(&self) -> Cake {
        let content = self.content();
        let b = content.as_bytes();
        let digest = Sha256::digest(b).to_vec();
        let inline_data = match b.len() <= INLINE_MAX_BYTES {
            true => Some(b.to_vec()),
            false => None,
        };
        Cake::from_digest_and_inline_data(digest, inline_data, Role::Neuron)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::CakeRack;
    use crate::cake::{
        Cake,
        CakeError,
        KeyStructure,
        Role,
    };

    const RACK_CAKE: &str = "dCYNBHoPFLCwpVdQU5LhiF0i6U60KF";

    #[test]
    fn test_parse() {
        let rack = CakeRack::from_str("[[\"b.text\"], [\"06wO\"]]").unwrap();
        assert_eq!(rack.len(), 1);
        assert_eq!(rack.get("b.text").unwrap().text(), "06wO");
    }

    #[test]
    fn test_roundtrip() {
        let mut rack = CakeRack::new();
        rack.insert("short", Cake::from_bytes(b"The quick brown fox jumps over", Role::Synapse));
        rack.insert("longer", Cake::from_bytes(b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.", Role::Synapse));
        assert_eq!(rack.keys(), vec!("longer", "short"));

        let content = rack.content();
        let r = CakeRack::from_str(content.as_str()).unwrap();
        assert_eq!(r, rack);
        assert_eq!(r.content(), content);
        assert_eq!(rack.size(), content.len());
    }

    #[test]
    fn test_canonical_cake() {
        let mut rack = CakeRack::new();
        rack.insert("short", Cake::from_bytes(b"The quick brown fox jumps over", Role::Synapse));
        rack.insert("longer", Cake::from_bytes(b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.", Role::Synapse));
        assert_eq!(rack.content(), "[[\"longer\", \"short\"], [\"2xgkyws1ZbSlXUvZRCSIrjne73Pv1kmYArYvhOrTtqkX\", \"01aMUQDApalaaYbXFjBVMMvyCAMfSPcTojI0745igi\"]]");
        assert_eq!(rack.size(), 117);
        assert_eq!(rack.cake().text(), "3fqJUOtUYjGCs3cWuPum5CwXtyyeJPRRp3gJ3A9wg3uS");
    }

    #[test]
    fn test_cake_role() {
        let mut rack = CakeRack::new();
        rack.insert("a", Cake::from_bytes(b"a", Role::Synapse));
        let c = rack.cake();
        assert_eq!(c.role(), Role::Neuron);
        // a single short entry serializes under the inline threshold
        assert_eq!(c.structure(), KeyStructure::Inline);

        rack.insert("b", Cake::from_bytes(b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.", Role::Synapse));
        let c = rack.cake();
        assert_eq!(c.role(), Role::Neuron);
        assert_eq!(c.structure(), KeyStructure::Sha256);
    }

    #[test]
    fn test_inline_rack_content() {
        // the canonical rack cake from the store fixtures is inline and
        // parses back to its single entry
        let c = Cake::from_str(RACK_CAKE).unwrap();
        let content = String::from_utf8(c.payload().to_vec()).unwrap();
        let rack = CakeRack::from_str(content.as_str()).unwrap();
        assert_eq!(rack.len(), 1);
        assert!(rack.get("b.text").is_some());
        // re-serialization reproduces the stored bytes exactly
        assert_eq!(rack.content(), content);
    }

    #[test]
    fn test_malformed() {
        match CakeRack::from_str("{\"not\": \"a rack\"}") {
            Err(CakeError::MalformedRack(_)) => {},
            _ => panic!("expected malformed rack"),
        };
        match CakeRack::from_str("[[\"a\", \"b\"], [\"06wO\"]]") {
            Err(CakeError::MalformedRack(_)) => {},
            _ => panic!("expected malformed rack"),
        };
    }
}
