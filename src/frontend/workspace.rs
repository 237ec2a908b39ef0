//! A module provider over a library directory.
//!
//! [`LibraryProvider`] indexes every Natural object below a directory by its uppercased file stem, so `CALLNAT
//! 'SUBPROG'`, `INCLUDE COPYCODE` or `LOCAL USING MYLDA` find `SUBPROG.NSN`, `COPYCODE.NSC` and `MYLDA.NSL` wherever
//! they are below the root.
//!
//! ## Notes
//!
//! - The index is built once when the provider is opened. Sources are read on demand.
//! - Record definitions (`.NSD`) are parsed on first use and cached. A listing that can't be read or parsed is logged
//!   and treated as unknown.
//! - When two files share a stem, the first one in directory order wins and the other one is logged.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use natfront_core::lang::file_types::FileType;

use crate::frontend::provider::{ModuleProvider, ModuleRef, ProviderError};
use crate::frontend::record_definition::RecordDefinition;

/// Failure to list a library directory.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WorkspaceError {
    #[error("cannot read {}: {source}", .path.display())]
    #[diagnostic(code(natfront::workspace_io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every Natural source at or below `path`, sorted. A file is returned as is, whatever its extension.
pub fn natural_files(path: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    collect_files(path, &mut files)?;
    files.retain(|file| file_type_of(file).is_some());
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), WorkspaceError> {
    let io_error = |source| WorkspaceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, _>>()
        .map_err(io_error)?;
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            collect_files(&entry, files)?;
        } else {
            files.push(entry);
        }
    }
    Ok(())
}

fn file_type_of(path: &Path) -> Option<FileType> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(FileType::from_extension)
}

/// Provides the modules of one library directory.
#[derive(Debug, Default)]
pub struct LibraryProvider {
    root: PathBuf,
    modules: HashMap<String, ModuleRef>,
    record_definitions: Mutex<HashMap<String, Arc<RecordDefinition>>>,
}

impl LibraryProvider {
    /// Index every Natural object below `root`.
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    pub fn open(root: &Path) -> Result<Self, WorkspaceError> {
        let mut modules: HashMap<String, ModuleRef> = HashMap::new();
        for path in natural_files(root)? {
            let Some(file_type) = file_type_of(&path) else {
                continue;
            };
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_ascii_uppercase())
                .unwrap_or_default();
            if let Some(existing) = modules.get(&name) {
                tracing::warn!(
                    module = %name,
                    kept = %existing.path.display(),
                    ignored = %path.display(),
                    "duplicate module name in library"
                );
                continue;
            }
            modules.insert(name.clone(), ModuleRef { name, file_type, path });
        }
        tracing::debug!(modules = modules.len(), "library indexed");

        Ok(Self {
            root: root.to_path_buf(),
            modules,
            record_definitions: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Indexed modules, in no particular order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef> + '_ {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn load_record_definition(&self, module: &ModuleRef) -> Option<RecordDefinition> {
        let source = match self.read_source(module) {
            Ok(source) => source,
            Err(error) => {
                tracing::warn!(%error, "record definition not readable");
                return None;
            }
        };
        match RecordDefinition::parse(&module.name, &source) {
            Ok(definition) => Some(definition),
            Err(error) => {
                tracing::warn!(ddm = %module.name, %error, "malformed record definition");
                None
            }
        }
    }
}

impl ModuleProvider for LibraryProvider {
    fn find_module(&self, name: &str) -> Option<ModuleRef> {
        let found = self.modules.get(&name.to_ascii_uppercase()).cloned();
        if found.is_none() {
            tracing::trace!(module = name, "module not in library");
        }
        found
    }

    fn find_record_definition(&self, name: &str) -> Option<Arc<RecordDefinition>> {
        let name = name.to_ascii_uppercase();
        let mut cache = self
            .record_definitions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(definition) = cache.get(&name) {
            return Some(Arc::clone(definition));
        }

        let module = self
            .modules
            .get(&name)
            .filter(|module| module.file_type == FileType::Ddm)?;
        let definition = Arc::new(self.load_record_definition(module)?);
        cache.insert(name, Arc::clone(&definition));
        Some(definition)
    }

    fn read_source(&self, module: &ModuleRef) -> Result<String, ProviderError> {
        fs::read_to_string(&module.path).map_err(|source| ProviderError::Io {
            path: module.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDM: &str = "\
T L DB Name                             F Leng  S D Remark
- - -- -------------------------------- - ----  - - ------------------------
  1 AA PERSON-ID                        A    8  N D
";

    /// A fresh directory below the system temp dir, removed on drop.
    struct Library(PathBuf);

    impl Library {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("natfront-{name}-{}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(dir.join("nested")).unwrap();
            Library(dir)
        }

        fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.0.join(relative);
            fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for Library {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn indexes_nested_files_by_uppercased_stem() {
        let library = Library::new("index");
        library.write("subprog.nsn", "END\n");
        library.write("nested/MYLDA.NSL", "DEFINE DATA LOCAL\n1 #A (A1)\nEND-DEFINE\n");
        library.write("notes.txt", "ignored");

        let provider = LibraryProvider::open(&library.0).unwrap();
        assert_eq!(provider.len(), 2);
        let module = provider.find_module("SubProg").unwrap();
        assert_eq!(module.file_type, FileType::Subprogram);
        assert_eq!(provider.read_source(&module).unwrap(), "END\n");
        assert_eq!(provider.find_module("mylda").unwrap().file_type, FileType::Lda);
        assert!(provider.find_module("NOTES").is_none());
    }

    #[test]
    fn record_definitions_are_parsed_once() {
        let library = Library::new("ddm");
        library.write("PERSON.NSD", DDM);
        let provider = LibraryProvider::open(&library.0).unwrap();

        let first = provider.find_record_definition("person").unwrap();
        assert!(first.find_field("PERSON-ID").is_some());
        let second = provider.find_record_definition("PERSON").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn malformed_record_definition_is_unknown() {
        let library = Library::new("bad-ddm");
        library.write("BROKEN.NSD", "not a listing\n");
        let provider = LibraryProvider::open(&library.0).unwrap();
        assert!(provider.find_record_definition("BROKEN").is_none());
    }

    #[test]
    fn vanished_source_is_an_io_error() {
        let library = Library::new("vanished");
        let path = library.write("GONE.NSN", "END\n");
        let provider = LibraryProvider::open(&library.0).unwrap();
        fs::remove_file(path).unwrap();

        let module = provider.find_module("GONE").unwrap();
        assert!(matches!(provider.read_source(&module), Err(ProviderError::Io { .. })));
    }

    #[test]
    fn natural_files_filters_and_sorts() {
        let library = Library::new("files");
        library.write("B.NSP", "END\n");
        library.write("nested/A.NSC", "");
        library.write("README.md", "");

        let files = natural_files(&library.0).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|file| file.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["B.NSP", "A.NSC"]);
    }
}
