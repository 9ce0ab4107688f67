//! Content identifiers
//!
//! Textual form is a CID as rendered by IPFS-style backends:
//! - CIDv0: 46 characters of base58btc starting with `Qm`
//! - CIDv1: any multibase prefix followed by the encoded `<version><codec><multihash>`
//!
//! Decoding is total: every string that does not encode exactly one CID is
//! rejected, including strings carrying trailing bytes after a valid CID.

use crate::{Error, Result};
use cid::Cid;
use cid::multihash::Multihash;
use cid::multibase::{self, Base};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multicodec for raw binary content
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code for BLAKE3-256
pub const BLAKE3_CODE: u64 = 0x1e;

/// Opaque, self-describing identifier of a stored object's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Decode a textual content identifier
    pub fn decode(text: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidIdentifier {
            text: text.to_string(),
            reason,
        };

        if text.is_empty() {
            return Err(invalid("empty identifier".to_string()));
        }

        let bytes = if is_v0(text) {
            Base::Base58Btc.decode(text).map_err(|e| invalid(e.to_string()))?
        } else {
            multibase::decode(text).map_err(|e| invalid(e.to_string()))?.1
        };

        let cid = Cid::try_from(bytes.as_slice()).map_err(|e| invalid(e.to_string()))?;

        // Cid::try_from stops after the first CID; anything left over is malformed.
        if cid.to_bytes() != bytes {
            return Err(invalid("trailing bytes after identifier".to_string()));
        }

        Ok(Self(cid))
    }

    /// Address of a single-entry object holding `content` under `file_name`.
    ///
    /// CIDv1, raw codec, BLAKE3 multihash over the length-prefixed name and the content.
    pub fn for_object(file_name: &str, content: &[u8]) -> Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(file_name.len() as u64).to_le_bytes());
        hasher.update(file_name.as_bytes());
        hasher.update(content);
        let digest = hasher.finalize();

        let hash = Multihash::<64>::wrap(BLAKE3_CODE, digest.as_bytes()).map_err(|e| Error::InvalidIdentifier {
            text: file_name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(Cid::new_v1(RAW_CODEC, hash)))
    }

    pub fn as_cid(&self) -> &Cid {
        &self.0
    }
}

fn is_v0(text: &str) -> bool {
    text.len() == 46 && text.starts_with("Qm")
}

impl From<Cid> for ContentId {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentId::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const V1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    #[test]
    fn test_decode_v0_and_v1() {
        let v0 = ContentId::decode(V0).unwrap();
        assert_eq!(v0.to_string(), V0);

        let v1 = ContentId::decode(V1).unwrap();
        assert_eq!(v1.to_string(), V1);
    }

    #[test]
    fn test_object_address_is_raw_blake3() {
        let id = ContentId::for_object("", b"").unwrap();
        assert_eq!(id.as_cid().version(), cid::Version::V1);
        assert_eq!(id.as_cid().codec(), RAW_CODEC);
        assert_eq!(id.as_cid().hash().code(), BLAKE3_CODE);
        assert_eq!(id.as_cid().hash().size(), 32);
    }

    #[test]
    fn test_rendering_roundtrip() {
        let id = ContentId::for_object("a.txt", b"hello").unwrap();
        let parsed = ContentId::decode(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_same_object_same_address() {
        assert_eq!(
            ContentId::for_object("a.txt", b"hello").unwrap(),
            ContentId::for_object("a.txt", b"hello").unwrap()
        );
        assert_ne!(
            ContentId::for_object("a.txt", b"hello").unwrap(),
            ContentId::for_object("b.txt", b"hello").unwrap()
        );
        assert_ne!(
            ContentId::for_object("ab", b"c").unwrap(),
            ContentId::for_object("a", b"bc").unwrap()
        );
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(ContentId::decode("").is_err());
        assert!(ContentId::decode("not a cid").is_err());
        assert!(ContentId::decode("storage_abi").is_err());
        assert!(ContentId::decode(&V1[..V1.len() - 4]).is_err()); // truncated
        assert!(ContentId::decode(&format!(" {}", V1)).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = ContentId::decode(V1).unwrap().as_cid().to_bytes();
        bytes.push(0);
        let text = multibase::encode(Base::Base32Lower, bytes);
        let err = ContentId::decode(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_serde_as_string() {
        let id = ContentId::decode(V1).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", V1));
        let back: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ContentId>("\"nope\"").is_err());
    }
}
