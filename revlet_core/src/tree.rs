//! Tree encoding and directory structure.
//!
//! A tree payload is a concatenation of newline-terminated text lines, one
//! per entry:
//!
//! ```text
//! <entry_type> <digest-hex> <name>\n
//! ```
//!
//! Entries are sorted by name before serialization so that the same
//! directory content always yields the same tree digest, regardless of
//! filesystem scan order.

use crate::error::{Error, Result};
use crate::hash::Digest;
use crate::ignore;
use crate::object::ObjectType;
use crate::store::Repository;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Entry type in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// A blob (file).
    Blob,
    /// A subtree (directory).
    Tree,
}

impl EntryType {
    /// Get the string tag of this entry type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Blob => "blob",
            EntryType::Tree => "tree",
        }
    }

    /// Parse an entry type from its string tag.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "blob" => Ok(EntryType::Blob),
            "tree" => Ok(EntryType::Tree),
            _ => Err(Error::invalid_tree_entry(format!(
                "Invalid entry type: {:?}",
                tag
            ))),
        }
    }
}

/// An entry in a tree (file or subdirectory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Type of entry (blob or tree).
    pub entry_type: EntryType,
    /// Digest of the referenced object.
    pub digest: Digest,
    /// Name of the entry (UTF-8, single path segment).
    pub name: String,
}

impl TreeEntry {
    /// Create a new tree entry, validating the name.
    pub fn new(entry_type: EntryType, digest: Digest, name: String) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::invalid_tree_entry("Name cannot be empty"));
        }

        if name == "." || name == ".." {
            return Err(Error::invalid_tree_entry(format!(
                "Name cannot be {:?}",
                name
            )));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(Error::invalid_tree_entry(format!(
                "Name cannot contain a path separator: {:?}",
                name
            )));
        }

        if name.contains('\0') || name.contains('\n') || name.contains('\r') {
            return Err(Error::invalid_tree_entry(format!(
                "Name cannot contain control separators: {:?}",
                name
            )));
        }

        Ok(Self {
            entry_type,
            digest,
            name,
        })
    }

    /// Encode the entry as its newline-terminated text line.
    pub fn encode(&self) -> String {
        format!(
            "{} {} {}\n",
            self.entry_type.as_str(),
            self.digest.to_hex(),
            self.name
        )
    }

    /// Decode an entry from one line of a tree payload.
    pub fn decode(line: &str) -> Result<Self> {
        let mut parts = line.splitn(3, ' ');
        let (Some(tag), Some(digest_hex), Some(name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid_tree_entry(format!(
                "Malformed entry line: {:?}",
                line
            )));
        };

        let entry_type = EntryType::parse(tag)?;
        let digest = Digest::from_hex(digest_hex)
            .map_err(|e| Error::invalid_tree_entry(format!("Bad digest in entry: {}", e)))?;

        Self::new(entry_type, digest, name.to_string())
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    /// Compare by name (bytewise UTF-8) for canonical ordering.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.as_bytes().cmp(other.name.as_bytes())
    }
}

/// Encode a list of tree entries (sorted by name).
pub fn encode_tree(mut entries: Vec<TreeEntry>) -> Vec<u8> {
    // Sort entries by name for canonical ordering
    entries.sort();

    let mut buf = String::new();
    for entry in entries {
        buf.push_str(&entry.encode());
    }
    buf.into_bytes()
}

/// Decode a list of tree entries from a payload.
pub fn decode_tree(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| Error::invalid_tree_entry("payload is not valid UTF-8"))?;
    text.lines().map(TreeEntry::decode).collect()
}

impl Repository {
    /// Build a tree from a directory, returning the tree's digest.
    ///
    /// Scans the directory for immediate children. Non-ignored regular files
    /// are stored as blobs; subdirectories are recursed into; symlinks and
    /// other non-regular entries are skipped. An empty directory yields a
    /// valid tree with zero entries.
    pub fn build_tree(&self, dir: &Path) -> Result<Digest> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();

            if ignore::is_ignored(&path) {
                continue;
            }

            // file_type() does not follow symlinks
            let file_type = dir_entry.file_type()?;
            let name = dir_entry
                .file_name()
                .into_string()
                .map_err(|n| Error::invalid_tree_entry(format!("Non-UTF-8 name: {:?}", n)))?;

            if file_type.is_file() {
                let content = fs::read(&path)?;
                let digest = self.put(ObjectType::Blob, &content)?;
                entries.push(TreeEntry::new(EntryType::Blob, digest, name)?);
            } else if file_type.is_dir() {
                let digest = self.build_tree(&path)?;
                entries.push(TreeEntry::new(EntryType::Tree, digest, name)?);
            }
        }

        self.put(ObjectType::Tree, &encode_tree(entries))
    }

    /// Retrieve a tree's entries by digest.
    ///
    /// Fails if the stored object is not a tree.
    pub fn get_tree(&self, digest: &Digest) -> Result<Vec<TreeEntry>> {
        let (object_type, payload) = self.get(digest)?;

        if object_type != ObjectType::Tree {
            return Err(Error::invalid_object_type(
                ObjectType::Tree.as_str(),
                object_type.as_str(),
            ));
        }

        decode_tree(&payload)
    }

    /// Flatten a tree into a path-to-digest table.
    ///
    /// Keys are `/`-joined relative paths; one entry per blob transitively
    /// reachable from the tree.
    pub fn flatten(&self, digest: &Digest) -> Result<BTreeMap<String, Digest>> {
        let mut table = BTreeMap::new();
        self.flatten_into(digest, "", &mut table)?;
        Ok(table)
    }

    fn flatten_into(
        &self,
        digest: &Digest,
        base: &str,
        table: &mut BTreeMap<String, Digest>,
    ) -> Result<()> {
        for entry in self.get_tree(digest)? {
            match entry.entry_type {
                EntryType::Blob => {
                    table.insert(format!("{}{}", base, entry.name), entry.digest);
                }
                EntryType::Tree => {
                    let prefix = format!("{}{}/", base, entry.name);
                    self.flatten_into(&entry.digest, &prefix, table)?;
                }
            }
        }
        Ok(())
    }

    /// Materialize a tree onto the working directory.
    ///
    /// First purges the working directory (ignore-aware, bottom-up), then
    /// writes every blob of the flattened tree, creating intermediate
    /// directories as needed. A failure mid-write leaves the working
    /// directory in a mixed state; there is no rollback.
    pub fn materialize(&self, digest: &Digest) -> Result<()> {
        clean_dir(self.workdir())?;

        for (rel_path, blob_digest) in self.flatten(digest)? {
            let dest = self.workdir().join(&rel_path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, self.get_blob(&blob_digest)?)?;
        }

        Ok(())
    }
}

/// Ignore-aware bottom-up cleanup of a working directory.
///
/// Deletes every non-ignored file, then attempts to remove each non-ignored
/// directory. Removal of a still-populated directory fails silently, which
/// keeps directories holding ignored files in place.
///
/// Ignore decisions for the whole directory are made before anything is
/// deleted, so removing the ignore file itself cannot strip protection from
/// its siblings mid-scan.
fn clean_dir(dir: &Path) -> Result<()> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();

        if ignore::is_ignored(&path) {
            continue;
        }

        if dir_entry.file_type()?.is_dir() {
            subdirs.push(path);
        } else {
            files.push(path);
        }
    }

    for file in &files {
        fs::remove_file(file)?;
    }

    for subdir in &subdirs {
        clean_dir(subdir)?;
        let _ = fs::remove_dir(subdir);
    }

    Ok(())
}
