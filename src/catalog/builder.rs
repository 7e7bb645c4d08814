//! Directory scanning into a [`Catalog`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::Catalog;
use crate::error::{LibcheckError, Result};
use crate::metadata::{ManagedModuleReader, ModuleExtractor};

/// A candidate file that was not added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The outcome of scanning a library root.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub catalog: Catalog,
    /// Skipped files in enumeration order.
    pub skipped: Vec<SkippedFile>,
}

/// Walks a library root and extracts every candidate module file.
///
/// Directory entries are visited in file-name order, so when two files
/// share an identity the first one visited is kept.
pub struct CatalogBuilder<E = ManagedModuleReader> {
    extractor: E,
    extensions: Vec<String>,
}

impl CatalogBuilder<ManagedModuleReader> {
    /// A builder using the managed module reader and the `dll` extension.
    pub fn new() -> Self {
        Self::with_extractor(ManagedModuleReader::new())
    }
}

impl Default for CatalogBuilder<ManagedModuleReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ModuleExtractor> CatalogBuilder<E> {
    /// A builder using a custom extractor.
    pub fn with_extractor(extractor: E) -> Self {
        Self {
            extractor,
            extensions: vec!["dll".to_string()],
        }
    }

    /// Replace the file extensions considered module candidates.
    ///
    /// Extensions are given without the dot and compared case-insensitively.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Scan `root` recursively.
    ///
    /// Fails only when `root` itself cannot be enumerated. Unreadable
    /// subdirectories are logged and skipped.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        std::fs::read_dir(root).map_err(|source| LibcheckError::RootEnumeration {
            path: root.to_path_buf(),
            source,
        })?;

        let mut result = ScanResult::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(LibcheckError::RootEnumeration {
                        path: root.to_path_buf(),
                        source: e.into(),
                    })
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_candidate(entry.path()) {
                continue;
            }

            let path = entry.path();
            match self.extractor.extract(path) {
                Ok(record) => {
                    if let Err(duplicate) = result.catalog.insert(record) {
                        debug!("Ignored {}: {}", path.display(), duplicate);
                        result.skipped.push(SkippedFile {
                            path: path.to_path_buf(),
                            reason: duplicate.to_string(),
                        });
                    }
                }
                Err(e) => {
                    debug!("Ignored {}: {}", path.display(), e);
                    result.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Cataloged {} modules, skipped {} files under {}",
            result.catalog.len(),
            result.skipped.len(),
            root.display()
        );
        Ok(result)
    }
}
