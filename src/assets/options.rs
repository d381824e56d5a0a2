use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::assets::library::Library;

/// Looks up the library a collection instance links to, by the path recorded
/// in the document (relative to the importing file).
pub type DependentLibraryResolver = Box<dyn Fn(&str) -> Option<Arc<Library>>>;

/// Import configuration.
///
/// The data fields can be read from a config file; the resolver can only be
/// set in code.
#[derive(Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Render target width given to imported cameras.
    pub camera_width: u32,
    /// Render target height given to imported cameras.
    pub camera_height: u32,
    /// Whether imported cameras render depth.
    pub camera_depth: bool,
    /// Opaque materials become [`TransparencyMode::Auto`](crate::resources::TransparencyMode::Auto)
    /// instead of `Opaque`.
    pub default_to_auto_transparency: bool,
    /// Directory external buffer URIs are resolved against.
    pub base_path: Option<PathBuf>,
    /// When a collection links to another file and no resolver is set, fail
    /// the import (`true`) or skip the instance and record a diagnostic.
    pub missing_resolver_is_fatal: bool,
    #[serde(skip)]
    pub dependent_library_resolver: Option<DependentLibraryResolver>,
}

impl ImportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_camera_size(mut self, width: u32, height: u32) -> Self {
        self.camera_width = width;
        self.camera_height = height;
        self
    }

    #[must_use]
    pub fn with_camera_depth(mut self, depth: bool) -> Self {
        self.camera_depth = depth;
        self
    }

    #[must_use]
    pub fn with_auto_transparency(mut self, auto: bool) -> Self {
        self.default_to_auto_transparency = auto;
        self
    }

    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_missing_resolver_fatal(mut self, fatal: bool) -> Self {
        self.missing_resolver_is_fatal = fatal;
        self
    }

    #[must_use]
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<Library>> + 'static,
    {
        self.dependent_library_resolver = Some(Box::new(resolver));
        self
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            camera_width: 1920,
            camera_height: 1080,
            camera_depth: true,
            default_to_auto_transparency: true,
            base_path: None,
            missing_resolver_is_fatal: true,
            dependent_library_resolver: None,
        }
    }
}

impl std::fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportOptions")
            .field("camera_width", &self.camera_width)
            .field("camera_height", &self.camera_height)
            .field("camera_depth", &self.camera_depth)
            .field("default_to_auto_transparency", &self.default_to_auto_transparency)
            .field("base_path", &self.base_path)
            .field("missing_resolver_is_fatal", &self.missing_resolver_is_fatal)
            .field("dependent_library_resolver", &self.dependent_library_resolver.is_some())
            .finish()
    }
}
