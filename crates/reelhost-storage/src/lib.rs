//! Reelhost Storage Library
//!
//! Storage abstraction for uploaded media. Videos go to the configured durable
//! backend (S3 or local filesystem); thumbnails always go to the local asset
//! directory.
//!
//! # Storage key format
//!
//! Keys are `<random-id><ext>`, optionally prefixed by an orientation segment
//! (`landscape/`, `portrait/`, `other/`). Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::create_asset_storage;
pub use factory::create_storage;
pub use keys::{generate_asset_path, media_type_to_ext, prefixed_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reelhost_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Storage, S3UrlStrategy};
pub use traits::{Storage, StorageError, StorageResult};
