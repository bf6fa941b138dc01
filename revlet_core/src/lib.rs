//! # Revlet Core
//!
//! A minimal content-addressed version-control storage layer using BLAKE3.
//!
//! This library stores immutable objects (file blobs, directory trees,
//! commit snapshots) keyed by a cryptographic digest of their framed
//! content, and reconstructs a working directory from a stored tree.
//!
//! ## Features
//!
//! - Content-addressed storage: objects stored by digest of `tag NUL payload`
//! - Immutable objects with stable digests and idempotent writes
//! - Recursive tree construction, flattening, and materialization
//! - Commit snapshots chained through a single HEAD reference
//! - Per-directory ignore patterns applied during build and cleanup
//!
//! ## Example
//!
//! ```no_run
//! use revlet_core::Repository;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize a repository in a working directory
//! let repo = Repository::init("./my-project")?;
//!
//! // Snapshot the working directory as a tree and commit it
//! let tree = repo.build_tree(repo.workdir())?;
//! let commit = repo.commit("initial snapshot", tree)?;
//!
//! // Restore the snapshot later
//! let stored = repo.get_commit(&commit)?;
//! repo.materialize(&stored.tree)?;
//! # Ok(())
//! # }
//! ```

mod commit;
mod error;
mod hash;
mod ignore;
mod object;
mod store;
mod tree;

pub use commit::Commit;
pub use error::{Error, Result};
pub use hash::{DIGEST_SIZE, Digest};
pub use ignore::is_ignored;
pub use object::ObjectType;
pub use store::{IGNORE_FILE, META_DIR, Repository};
pub use tree::{EntryType, TreeEntry, decode_tree, encode_tree};
