//! Object frame format and encoding.
//!
//! Every stored object is a single frame:
//!
//! ```text
//! <type-tag ascii> 0x00 <payload bytes>
//! ```
//!
//! where the tag is one of `blob`, `tree`, or `commit`. The object's digest
//! is the BLAKE3 hash of this exact byte sequence, so the frame is both the
//! on-disk representation and the hashing preimage.

use crate::error::{Error, Result};
use crate::hash::Digest;

/// Object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// A blob (file content).
    Blob,
    /// A tree (directory structure).
    Tree,
    /// A commit (snapshot metadata).
    Commit,
}

impl ObjectType {
    /// Get the string tag of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse an object type from its string tag.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(Error::invalid_object_type("blob, tree or commit", tag)),
        }
    }
}

/// Encode an object frame: `tag NUL payload`.
pub fn encode_frame(object_type: ObjectType, payload: &[u8]) -> Vec<u8> {
    let tag = object_type.as_str().as_bytes();
    let mut frame = Vec::with_capacity(tag.len() + 1 + payload.len());
    frame.extend_from_slice(tag);
    frame.push(0);
    frame.extend_from_slice(payload);
    frame
}

/// Decode an object frame into its type and payload.
///
/// The digest is used only for error context; callers that already verified
/// the frame against its digest still get a typed parse failure here if the
/// bytes lack the NUL separator or carry an unknown tag.
pub fn decode_frame(digest: &Digest, frame: &[u8]) -> Result<(ObjectType, Vec<u8>)> {
    let nul = frame.iter().position(|&b| b == 0).ok_or_else(|| {
        Error::corrupt_object(digest.to_hex(), "missing NUL separator after type tag")
    })?;

    let tag = std::str::from_utf8(&frame[..nul])
        .map_err(|_| Error::corrupt_object(digest.to_hex(), "type tag is not valid UTF-8"))?;

    let object_type = ObjectType::parse(tag)
        .map_err(|_| Error::corrupt_object(digest.to_hex(), format!("unknown type tag {:?}", tag)))?;

    Ok((object_type, frame[nul + 1..].to_vec()))
}
