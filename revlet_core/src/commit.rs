//! Commit objects and the HEAD reference.
//!
//! A commit payload is human-readable key-value text:
//!
//! ```text
//! author: <name>
//! timestamp: <unix seconds>
//! timezone: <+HHMM offset>
//! message: <free text>
//! tree: <digest-hex>
//! parent: <digest-hex>        (absent for the first commit)
//! ```
//!
//! HEAD is a plain-text file at `.revlet/HEAD` holding the digest of the
//! most recent commit; it is absent until the first commit and overwritten
//! by each one.

use crate::error::{Error, Result};
use crate::hash::Digest;
use crate::object::ObjectType;
use crate::store::Repository;
use chrono::Local;
use std::env;
use std::fs;

/// Author identity used when `REVLET_AUTHOR` is not set.
const DEFAULT_AUTHOR: &str = "revlet <revlet@localhost>";

/// A commit: snapshot metadata referencing one tree and at most one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Author identity.
    pub author: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Local timezone offset, e.g. `+0200`.
    pub timezone: String,
    /// Free-text message (single line).
    pub message: String,
    /// Digest of the referenced tree.
    pub tree: Digest,
    /// Digest of the parent commit, if any.
    pub parent: Option<Digest>,
}

impl Commit {
    /// Encode the commit to its text payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut text = format!(
            "author: {}\ntimestamp: {}\ntimezone: {}\nmessage: {}\ntree: {}\n",
            self.author, self.timestamp, self.timezone, self.message, self.tree
        );
        if let Some(parent) = &self.parent {
            text.push_str(&format!("parent: {}\n", parent));
        }
        text.into_bytes()
    }

    /// Decode a commit from its text payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::corrupt_commit("payload is not valid UTF-8"))?;

        let mut author = None;
        let mut timestamp = None;
        let mut timezone = None;
        let mut message = None;
        let mut tree = None;
        let mut parent = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once(": ") else {
                continue;
            };
            match key {
                "author" => author = Some(value.to_string()),
                "timestamp" => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        Error::corrupt_commit(format!("bad timestamp: {:?}", value))
                    })?);
                }
                "timezone" => timezone = Some(value.to_string()),
                "message" => message = Some(value.to_string()),
                "tree" => {
                    tree = Some(Digest::from_hex(value).map_err(|e| {
                        Error::corrupt_commit(format!("bad tree digest: {}", e))
                    })?);
                }
                "parent" => {
                    parent = Some(Digest::from_hex(value).map_err(|e| {
                        Error::corrupt_commit(format!("bad parent digest: {}", e))
                    })?);
                }
                _ => {}
            }
        }

        Ok(Self {
            author: author.ok_or_else(|| Error::corrupt_commit("missing author"))?,
            timestamp: timestamp.ok_or_else(|| Error::corrupt_commit("missing timestamp"))?,
            timezone: timezone.ok_or_else(|| Error::corrupt_commit("missing timezone"))?,
            message: message.ok_or_else(|| Error::corrupt_commit("missing message"))?,
            tree: tree.ok_or_else(|| Error::corrupt_commit("missing tree"))?,
            parent,
        })
    }
}

impl Repository {
    /// Read the current HEAD digest, or `None` if no commit exists yet.
    pub fn head(&self) -> Result<Option<Digest>> {
        let head_path = self.meta_dir().join("HEAD");

        if !head_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&head_path)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        Digest::from_hex(trimmed).map(Some)
    }

    /// Create a commit for a tree, advancing HEAD.
    ///
    /// The current HEAD (if any) becomes the new commit's parent. This is
    /// the only operation that mutates HEAD.
    ///
    /// The message must be a single line: the payload is line-oriented, so
    /// a line break in the message would read back as extra key-value lines.
    pub fn commit(&self, message: &str, tree: Digest) -> Result<Digest> {
        if message.contains('\n') || message.contains('\r') {
            return Err(Error::invalid_commit_message(
                "message must not contain line breaks",
            ));
        }

        let parent = self.head()?;

        let now = Local::now();
        let commit = Commit {
            author: env::var("REVLET_AUTHOR").unwrap_or_else(|_| DEFAULT_AUTHOR.to_string()),
            timestamp: now.timestamp(),
            timezone: now.format("%z").to_string(),
            message: message.to_string(),
            tree,
            parent,
        };

        let digest = self.put(ObjectType::Commit, &commit.encode())?;
        fs::write(
            self.meta_dir().join("HEAD"),
            format!("{}\n", digest.to_hex()),
        )?;

        Ok(digest)
    }

    /// Retrieve a commit by digest.
    ///
    /// Fails if the stored object is not a commit.
    pub fn get_commit(&self, digest: &Digest) -> Result<Commit> {
        let (object_type, payload) = self.get(digest)?;

        if object_type != ObjectType::Commit {
            return Err(Error::invalid_object_type(
                ObjectType::Commit.as_str(),
                object_type.as_str(),
            ));
        }

        Commit::decode(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        (temp_dir, repo)
    }

    fn sample_tree(repo: &Repository) -> Digest {
        repo.put(ObjectType::Tree, b"").unwrap()
    }

    #[test]
    fn test_commit_encode_decode_roundtrip() {
        let tree = Digest::hash_bytes(b"tree");
        let parent = Digest::hash_bytes(b"parent");

        let commit = Commit {
            author: "a dev <dev@example.com>".to_string(),
            timestamp: 1724_000_000,
            timezone: "+0200".to_string(),
            message: "initial import".to_string(),
            tree,
            parent: Some(parent),
        };

        let decoded = Commit::decode(&commit.encode()).unwrap();
        assert_eq!(decoded, commit);
    }

    #[test]
    fn test_commit_without_parent_has_no_parent_line() {
        let commit = Commit {
            author: "dev".to_string(),
            timestamp: 0,
            timezone: "+0000".to_string(),
            message: "init".to_string(),
            tree: Digest::hash_bytes(b"tree"),
            parent: None,
        };

        let payload = String::from_utf8(commit.encode()).unwrap();
        assert!(!payload.contains("parent:"));
        assert_eq!(Commit::decode(payload.as_bytes()).unwrap().parent, None);
    }

    #[test]
    fn test_decode_missing_fields() {
        assert!(Commit::decode(b"author: dev\n").is_err());
        assert!(Commit::decode(b"").is_err());
    }

    #[test]
    fn test_decode_bad_timestamp() {
        let text = "author: dev\ntimestamp: soon\ntimezone: +0000\nmessage: m\ntree: 00\n";
        assert!(Commit::decode(text.as_bytes()).is_err());
    }

    #[test]
    fn test_commit_rejects_multiline_message() {
        let (_temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        // A line break in the message would smuggle key-value lines into
        // the payload, e.g. a fabricated parent on a first commit.
        let smuggled = format!("hi\nparent: {}", Digest::hash_bytes(b"fake").to_hex());
        let result = repo.commit(&smuggled, tree);
        assert!(matches!(result, Err(Error::InvalidCommitMessage { .. })));
        assert!(matches!(
            repo.commit("hi\rthere", tree),
            Err(Error::InvalidCommitMessage { .. })
        ));

        // The rejected commit must not have touched HEAD
        assert_eq!(repo.head().unwrap(), None);
    }

    #[test]
    fn test_first_commit_never_carries_parent() {
        let (_temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        let digest = repo.commit("hi parent: deadbeef", tree).unwrap();
        let decoded = repo.get_commit(&digest).unwrap();

        // Key-value text inside a single-line message stays in the message
        assert_eq!(decoded.parent, None);
        assert_eq!(decoded.message, "hi parent: deadbeef");
    }

    #[test]
    fn test_head_absent_on_fresh_repository() {
        let (_temp_dir, repo) = init_repo();
        assert_eq!(repo.head().unwrap(), None);
    }

    #[test]
    fn test_first_commit_sets_head() {
        let (_temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        let digest = repo.commit("init", tree).unwrap();
        assert_eq!(repo.head().unwrap(), Some(digest));

        let commit = repo.get_commit(&digest).unwrap();
        assert_eq!(commit.message, "init");
        assert_eq!(commit.tree, tree);
        assert_eq!(commit.parent, None);
    }

    #[test]
    fn test_commit_chaining() {
        let (_temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        let first = repo.commit("first", tree).unwrap();
        let second = repo.commit("second", tree).unwrap();

        // The second commit links back to the first and HEAD moved on
        let commit = repo.get_commit(&second).unwrap();
        assert_eq!(commit.parent, Some(first));
        assert_eq!(repo.head().unwrap(), Some(second));
    }

    #[test]
    fn test_head_is_overwritten_not_appended() {
        let (temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        repo.commit("first", tree).unwrap();
        let second = repo.commit("second", tree).unwrap();

        let head = fs::read_to_string(temp_dir.path().join(".revlet/HEAD")).unwrap();
        assert_eq!(head.trim(), second.to_hex());
        assert_eq!(head.lines().count(), 1);
    }

    #[test]
    fn test_commit_payload_keys() {
        let (_temp_dir, repo) = init_repo();
        let tree = sample_tree(&repo);

        let digest = repo.commit("check keys", tree).unwrap();
        let (_, payload) = repo.get(&digest).unwrap();
        let text = String::from_utf8(payload).unwrap();

        assert!(text.contains("author: "));
        assert!(text.contains("timestamp: "));
        assert!(text.contains("timezone: "));
        assert!(text.contains("message: check keys"));
        assert!(text.contains(&format!("tree: {}", tree)));
    }

    #[test]
    fn test_get_commit_type_mismatch() {
        let (_temp_dir, repo) = init_repo();
        let blob = repo.put(ObjectType::Blob, b"not a commit").unwrap();
        assert!(matches!(
            repo.get_commit(&blob),
            Err(Error::InvalidObjectType { .. })
        ));
    }
}
