//! Asset import
//!
//! - [`GltfLoader`]: builds a [`Library`] from a glTF 2.0 document
//! - [`ImportOptions`]: camera defaults, transparency policy, buffer base
//!   path and the dependent-library resolver
//! - [`FileAssetReader`]: resolves buffer URIs (files and `data:` URIs)

pub mod io;
pub mod library;
pub mod loaders;
pub mod options;

pub use io::FileAssetReader;
pub use library::Library;
pub use loaders::GltfLoader;
pub use options::{DependentLibraryResolver, ImportOptions};
