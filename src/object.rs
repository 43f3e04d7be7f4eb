//! The data model from the spec's §3: object identifiers and kinds.

use std::fmt;
use std::str::FromStr;

/// A 20-byte SHA-1 object identifier, the content address of an object's
/// canonical `"<kind> <size>\0<payload>"` serialization.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid([u8; 20]);

impl Oid {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_hasher(hasher: sha1::Sha1) -> Self {
        use sha1::Digest;
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The two-character shard directory this object lives under.
    pub fn shard(&self) -> String {
        hex_byte(self.0[0])
    }

    /// The remaining 38 hex characters of the object's filename.
    pub fn tail(&self) -> String {
        self.0[1..].iter().map(|b| hex_byte(*b)).collect()
    }

    /// The first 7 hex characters, used only for log readability (§10.5);
    /// never used to resolve an abbreviated OID back to a full one.
    pub fn short(&self) -> String {
        let full = self.to_string();
        full[..7].to_string()
    }
}

fn hex_byte(b: u8) -> String {
    format!("{:02x}", b)
}

#[derive(Debug)]
pub struct ParseOidError;

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid object id")
    }
}

impl std::error::Error for ParseOidError {}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 40 {
            return Err(ParseOidError);
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| ParseOidError)?;
            bytes[i] = u8::from_str_radix(hex, 16).map_err(|_| ParseOidError)?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

/// A full (non-delta) object kind, the four inhabitants the store recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    /// Map a bundle record's 3-bit type tag to a full object kind, if it is one.
    /// Types 6 (ofs-delta) and 7 (ref-delta) are wire-only and handled by the
    /// bundle decoder directly rather than through this mapping.
    pub fn from_type_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Commit),
            2 => Some(Self::Tree),
            3 => Some(Self::Blob),
            4 => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "blob" => Ok(Self::Blob),
            "tag" => Ok(Self::Tag),
            other => Err(other.to_owned()),
        }
    }
}

/// Compute the OID of an object from its kind and payload, per §3:
/// `SHA1("<kind> <|payload|>\0" || payload)`.
pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Oid {
    use sha1::Digest;
    let mut hasher = sha1::Sha1::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b" ");
    hasher.update(payload.len().to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(payload);
    Oid::from_hasher(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oid_round_trips_through_hex() {
        let oid = hash_object(ObjectKind::Blob, b"hello\n");
        let hex = oid.to_string();
        let parsed: Oid = hex.parse().unwrap();
        assert_eq!(oid, parsed);
        assert_eq!(hex.len(), 40);
    }

    #[test]
    fn shard_and_tail_split_the_hex_string() {
        let oid = hash_object(ObjectKind::Blob, b"hello\n");
        let hex = oid.to_string();
        assert_eq!(oid.shard(), hex[..2]);
        assert_eq!(oid.tail(), hex[2..]);
    }

    #[test]
    fn hash_object_matches_known_git_blob_hash() {
        // `git hash-object` on a file containing "hello\n" produces this OID.
        let oid = hash_object(ObjectKind::Blob, b"hello\n");
        assert_eq!(oid.to_string(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn type_tag_mapping_includes_tag_objects() {
        assert_eq!(ObjectKind::from_type_tag(4), Some(ObjectKind::Tag));
        assert_eq!(ObjectKind::from_type_tag(0), None);
        assert_eq!(ObjectKind::from_type_tag(5), None);
        assert_eq!(ObjectKind::from_type_tag(6), None);
    }
}
