//! Templates stored on disk.
//!
//! Layout, one directory per element name:
//!
//! ```text
//! resolvers/
//! ├── infobox/
//! │   ├── infobox.jinja        (language-neutral)
//! │   ├── infobox.en.jinja
//! │   └── infobox.fr-ch.jinja
//! └── accordion/
//!     └── accordion.liquid
//! ```
//!
//! The directory is indexed once at construction; sources are read on each
//! load so edits show up without a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::registry::{TemplateLocation, TemplateRef, TemplateRegistry};
use crate::error::RegistryError;

/// Accepted template file extensions, in order of preference.
const EXTENSIONS: &[&str] = &["jinja", "liquid"];

/// Template registry backed by a directory.
#[derive(Debug, Clone)]
pub struct FsTemplates {
    root: PathBuf,
    index: HashMap<(String, Option<String>), PathBuf>,
}

impl FsTemplates {
    /// Index templates below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if `root` cannot be read.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        let mut index = HashMap::new();

        for entry in read_dir(&root)? {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = name.to_ascii_lowercase();

            for file in read_dir(&dir)? {
                let path = file.path();
                let Some(language) = parse_template_file(&name, &path) else {
                    continue;
                };
                let key = (name.clone(), language);
                let preferred = index
                    .get(&key)
                    .is_none_or(|existing: &PathBuf| extension_rank(&path) < extension_rank(existing));
                if preferred {
                    index.insert(key, path);
                }
            }
        }

        tracing::debug!(root = %root.display(), templates = index.len(), "Indexed templates");
        Ok(Self { root, index })
    }

    /// Directory the templates were indexed from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no templates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl TemplateRegistry for FsTemplates {
    fn lookup(&self, name: &str, language: Option<&str>) -> Option<TemplateRef> {
        let key = (name.to_owned(), language.map(str::to_owned));
        self.index.get(&key).map(|path| TemplateRef {
            name: key.0.clone(),
            language: key.1.clone(),
            location: TemplateLocation::Path(path.clone()),
        })
    }

    fn load_template(&self, template: &TemplateRef) -> Result<String, RegistryError> {
        let TemplateLocation::Path(path) = &template.location else {
            return Err(RegistryError::TemplateNotFound(template.name.clone()));
        };
        std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })
    }
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>, RegistryError> {
    let io_err = |source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)
}

/// Match `<name>.<ext>` or `<name>.<lang>.<ext>`; returns the language part.
fn parse_template_file(name: &str, path: &Path) -> Option<Option<String>> {
    if !path.is_file() {
        return None;
    }
    let file_name = path.file_name()?.to_str()?.to_ascii_lowercase();
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !EXTENSIONS.contains(&ext) {
        return None;
    }
    if stem == name {
        return Some(None);
    }
    let language = stem.strip_prefix(name)?.strip_prefix('.')?;
    (!language.is_empty() && !language.contains('.')).then(|| Some(language.to_owned()))
}

fn extension_rank(path: &Path) -> usize {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| EXTENSIONS.iter().position(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(EXTENSIONS.len())
}
