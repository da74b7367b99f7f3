use std::ffi::OsString;
use std::path::PathBuf;

use crate::data::normalize::UnmappedPolicy;

/// Catalogue read at startup when no path is given.
pub const DEFAULT_SOURCE: &str = "perfumedata.xlsx";

/// Startup settings. Everything has a hard-coded default; the only override is
/// an optional positional source path.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub source_path: PathBuf,
    pub unmapped_policy: UnmappedPolicy,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            unmapped_policy: UnmappedPolicy::PassThrough,
            window_size: [1150.0, 780.0],
            min_window_size: [600.0, 400.0],
        }
    }
}

impl AppConfig {
    /// Defaults, with the first argument (if any) taken as the source path.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().next() {
            config.source_path = PathBuf::from(path);
        }
        config
    }
}
