//! # kc-cache
//!
//! Storage service abstraction for the SAML trust core.
//!
//! This crate defines the partitioned key/value contract that the artifact
//! map and replay detection build on. Production deployments plug in their
//! own backend; an in-memory implementation ships here.
//!
//! ## Storage
//!
//! - [`StorageService`] - Partitioned records with expiration and optimistic versioning
//! - [`InMemoryStorageService`] - Process-local backend with a background reaper
//!
//! ## Specialized Caches
//!
//! - [`ReplayCache`] - One-time message identifier tracking
//!
//! ## Example
//!
//! ```ignore
//! use kc_cache::{InMemoryStorageService, StorageService};
//!
//! let storage = InMemoryStorageService::default();
//! storage.create("_SAMLArtifactMap", "AAQAA...", "{...}", Some(expires_at_millis))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod provider;
pub mod replay;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryStorageService, ReaperHandle};
pub use provider::{StorageCapabilities, StorageRecord, StorageService};
pub use replay::ReplayCache;
