//! Repository layout and object I/O.

use crate::error::{Error, Result};
use crate::hash::Digest;
use crate::object::{self, ObjectType};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the metadata directory beneath the working directory.
pub const META_DIR: &str = ".revlet";

/// Name of the per-directory ignore-pattern file.
pub const IGNORE_FILE: &str = ".rvignore";

/// A repository: a working directory plus its content-addressed store.
#[derive(Debug)]
pub struct Repository {
    workdir: PathBuf,
    meta_dir: PathBuf,
}

impl Repository {
    /// Initialize a new repository at the given working directory.
    ///
    /// Creates the metadata skeleton:
    /// - `.revlet/objects/` for stored objects
    /// - `.revlet/refs/` for named references
    ///
    /// Fails if the metadata directory already exists.
    pub fn init<P: AsRef<Path>>(workdir: P) -> Result<Self> {
        let workdir = workdir.as_ref().to_path_buf();
        let meta_dir = workdir.join(META_DIR);

        if meta_dir.exists() {
            return Err(Error::repository_exists(&meta_dir));
        }

        fs::create_dir_all(meta_dir.join("objects"))?;
        fs::create_dir_all(meta_dir.join("refs"))?;

        Ok(Self { workdir, meta_dir })
    }

    /// Open an existing repository at the given working directory.
    ///
    /// Validates the metadata directory structure.
    pub fn open<P: AsRef<Path>>(workdir: P) -> Result<Self> {
        let workdir = workdir.as_ref().to_path_buf();
        let meta_dir = workdir.join(META_DIR);

        if !meta_dir.exists() {
            return Err(Error::invalid_repository(
                &workdir,
                format!("{} directory does not exist", META_DIR),
            ));
        }

        if !meta_dir.join("objects").exists() {
            return Err(Error::invalid_repository(
                &workdir,
                "objects directory missing",
            ));
        }

        Ok(Self { workdir, meta_dir })
    }

    /// Get the working directory of the repository.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Get the metadata directory of the repository.
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    /// Get the path to an object file given its digest.
    ///
    /// Returns: `.revlet/objects/{prefix}/{suffix}`
    pub fn object_path(&self, digest: &Digest) -> PathBuf {
        self.meta_dir
            .join("objects")
            .join(digest.prefix())
            .join(digest.suffix())
    }

    /// Store an object, returning its digest.
    ///
    /// Computes the digest of the framed bytes and writes them at the
    /// digest-derived path. If the object already exists the call is a
    /// no-op: identical content always lands at the same path, so a
    /// repeated write changes nothing.
    pub fn put(&self, object_type: ObjectType, payload: &[u8]) -> Result<Digest> {
        let digest = Digest::of_object(object_type.as_str(), payload);

        let obj_path = self.object_path(&digest);
        if obj_path.exists() {
            return Ok(digest);
        }

        let frame = object::encode_frame(object_type, payload);
        self.write_object_atomic(&obj_path, &frame)?;

        Ok(digest)
    }

    /// Write an object atomically using tempfile.
    fn write_object_atomic(&self, obj_path: &Path, frame: &[u8]) -> Result<()> {
        let parent = obj_path
            .parent()
            .ok_or_else(|| Error::invalid_repository(obj_path, "object path has no parent"))?;
        fs::create_dir_all(parent)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(frame)?;
        temp_file.flush()?;
        temp_file.persist(obj_path)?;

        Ok(())
    }

    /// Retrieve an object by digest, returning its type and payload.
    pub fn get(&self, digest: &Digest) -> Result<(ObjectType, Vec<u8>)> {
        let obj_path = self.object_path(digest);

        if !obj_path.exists() {
            return Err(Error::object_not_found(digest.to_hex()));
        }

        let frame = fs::read(&obj_path)?;
        object::decode_frame(digest, &frame)
    }

    /// Retrieve a blob's content by digest.
    ///
    /// Fails if the stored object is not a blob.
    pub fn get_blob(&self, digest: &Digest) -> Result<Vec<u8>> {
        let (object_type, payload) = self.get(digest)?;

        if object_type != ObjectType::Blob {
            return Err(Error::invalid_object_type(
                ObjectType::Blob.as_str(),
                object_type.as_str(),
            ));
        }

        Ok(payload)
    }

    /// Stream a blob to a writer.
    pub fn blob_to_writer<W: Write>(&self, digest: &Digest, mut writer: W) -> Result<()> {
        let payload = self.get_blob(digest)?;
        writer.write_all(&payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        assert_eq!(repo.workdir(), temp_dir.path());
        assert!(temp_dir.path().join(".revlet/objects").exists());
        assert!(temp_dir.path().join(".revlet/refs").exists());
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();

        let result = Repository::init(temp_dir.path());
        assert!(matches!(result, Err(Error::RepositoryExists { .. })));
    }

    #[test]
    fn test_open() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();

        let repo = Repository::open(temp_dir.path()).unwrap();
        assert_eq!(repo.meta_dir(), temp_dir.path().join(".revlet"));
    }

    #[test]
    fn test_open_uninitialized_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Repository::open(temp_dir.path());
        assert!(matches!(result, Err(Error::InvalidRepository { .. })));
    }

    #[test]
    fn test_object_path_layout() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = Digest::hash_bytes(b"test");
        let path = repo.object_path(&digest);

        assert!(path.ends_with(format!(
            ".revlet/objects/{}/{}",
            digest.prefix(),
            digest.suffix()
        )));
    }

    #[test]
    fn test_put_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = repo.put(ObjectType::Blob, b"hello").unwrap();
        assert_eq!(digest, Digest::of_object("blob", b"hello"));

        let (object_type, payload) = repo.get(&digest).unwrap();
        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn test_put_stores_framed_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = repo.put(ObjectType::Blob, b"hello").unwrap();
        let on_disk = fs::read(repo.object_path(&digest)).unwrap();
        assert_eq!(on_disk, b"blob\x00hello");
    }

    #[test]
    fn test_put_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest1 = repo.put(ObjectType::Blob, b"same content").unwrap();
        let digest2 = repo.put(ObjectType::Blob, b"same content").unwrap();
        assert_eq!(digest1, digest2);

        // Exactly one object on disk
        let shard = temp_dir.path().join(".revlet/objects").join(digest1.prefix());
        let count = fs::read_dir(&shard).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_same_payload_different_type_different_digest() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let as_blob = repo.put(ObjectType::Blob, b"payload").unwrap();
        let as_commit = repo.put(ObjectType::Commit, b"payload").unwrap();
        assert_ne!(as_blob, as_commit);
    }

    #[test]
    fn test_get_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = Digest::hash_bytes(b"nonexistent");
        let result = repo.get(&digest);
        assert!(matches!(result, Err(Error::ObjectNotFound { .. })));
    }

    #[test]
    fn test_get_corrupt_object() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        // Write garbage (no NUL separator) at a digest-derived path
        let digest = Digest::hash_bytes(b"bogus");
        let obj_path = repo.object_path(&digest);
        fs::create_dir_all(obj_path.parent().unwrap()).unwrap();
        fs::write(&obj_path, b"not a frame").unwrap();

        let result = repo.get(&digest);
        assert!(matches!(result, Err(Error::CorruptObject { .. })));
    }

    #[test]
    fn test_get_unknown_tag() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = Digest::hash_bytes(b"bogus2");
        let obj_path = repo.object_path(&digest);
        fs::create_dir_all(obj_path.parent().unwrap()).unwrap();
        fs::write(&obj_path, b"branch\x00data").unwrap();

        let result = repo.get(&digest);
        assert!(matches!(result, Err(Error::CorruptObject { .. })));
    }

    #[test]
    fn test_get_blob_type_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = repo.put(ObjectType::Tree, b"").unwrap();
        let result = repo.get_blob(&digest);
        assert!(matches!(result, Err(Error::InvalidObjectType { .. })));
    }

    #[test]
    fn test_blob_to_writer() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        let digest = repo.put(ObjectType::Blob, b"stream test").unwrap();

        let mut output = Vec::new();
        repo.blob_to_writer(&digest, &mut output).unwrap();
        assert_eq!(output, b"stream test");
    }
}
