//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MythError`] follows a simple propagation policy:
//! - Structural decode failures (malformed or truncated source data) abort the
//!   whole import and no partially built [`Library`](crate::assets::Library)
//!   is returned.
//! - Name-based references that do not resolve are never fatal. They are
//!   recorded as diagnostics and the reference stays inert.
//! - Scene-graph misuse (cycles, stale handles) is reported to the caller.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, MythError>`.
//!
//! ```rust,ignore
//! use myth_graph::errors::{MythError, Result};
//!
//! fn import() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// What kind of entity a name-based reference was pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// The target node of an animation channel.
    AnimationTarget,
    /// An object listed by an instanced collection.
    CollectionObject,
    /// A collection named by a node that does not exist in the document.
    Collection,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::AnimationTarget => f.write_str("animation target"),
            ReferenceKind::CollectionObject => f.write_str("collection object"),
            ReferenceKind::Collection => f.write_str("collection"),
        }
    }
}

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum MythError {
    // ========================================================================
    // Import Errors
    // ========================================================================
    /// Malformed or truncated source data. Aborts the whole import.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A name-based reference did not resolve. Never aborts an import.
    #[error("Unresolved {kind}: {name}")]
    UnresolvedReference {
        /// What the name was expected to refer to
        kind: ReferenceKind,
        /// The name that was looked up
        name: String,
    },

    /// A collection instance points at another file but no dependent library
    /// resolver was configured.
    #[error("Cannot instantiate linked element {object} from {path}: no dependent library resolver configured")]
    MissingResolver {
        /// The object that was being instantiated
        object: String,
        /// The dependent library path recorded in the document
        path: String,
    },

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// Attaching the child would make a node its own ancestor.
    #[error("Attaching would introduce a cycle in the node hierarchy")]
    HierarchyCycle,

    /// The handle does not refer to a live node.
    #[error("Invalid node handle")]
    InvalidHandle,

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing error.
    #[error("glTF error: {0}")]
    GltfError(#[from] gltf::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl MythError {
    /// Returns `true` for errors that abort an import with no partial result.
    #[must_use]
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            MythError::Decode(_)
                | MythError::IoError(_)
                | MythError::GltfError(_)
                | MythError::JsonError(_)
                | MythError::Base64Error(_)
        )
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        MythError::Decode(message.into())
    }

    pub(crate) fn unresolved(kind: ReferenceKind, name: impl Into<String>) -> Self {
        MythError::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }
}

/// Alias for `Result<T, MythError>`.
pub type Result<T> = std::result::Result<T, MythError>;
