//! Loading the documentation corpus from disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use docsync_core::{DocName, Document};

use crate::error::{io_err, PipelineError};
use crate::gate::TMP_SUFFIX;

/// Every document directly inside the documentation directory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    dir: PathBuf,
    docs: BTreeMap<DocName, Document>,
}

impl DocumentStore {
    /// Read each regular file in `dir` as UTF-8. Subdirectories and leftover
    /// write temp files are ignored.
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
        let mut docs = BTreeMap::new();

        for entry in entries {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            let meta = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
            if !meta.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.ends_with(TMP_SUFFIX) {
                tracing::warn!("skipping leftover temp file {}", path.display());
                continue;
            }
            let name = DocName::from(file_name);
            let content = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            docs.insert(name.clone(), Document::new(name, path, content));
        }

        tracing::debug!("loaded {} documents from {}", docs.len(), dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            docs,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.docs.get(&DocName::from(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Documents in file-name order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &DocName> {
        self.docs.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
