//! Lookup of other modules and record definitions during parsing.
//!
//! The parser never touches the filesystem itself. `CALLNAT`, `FETCH`, `PERFORM`, `INCLUDE`, `USING` and views ask
//! a [`ModuleProvider`] for their targets; a `None` answer is reported as unresolved and parsing continues.
//!
//! ## Notes
//! - Providers are shared between parses running on different threads, hence `Send + Sync`.
//! - [`InMemoryProvider`] serves sources from a map and is what tests use.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use natfront_core::lang::file_types::FileType;

use crate::record_definition::RecordDefinition;

/// A module found by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    /// Uppercased module name.
    pub name: String,
    pub file_type: FileType,
    pub path: PathBuf,
}

/// Failure to load a module the provider claims to know.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("module {0} is not known to this provider")]
    UnknownModule(String),
}

/// Resolves module names for the parser.
pub trait ModuleProvider: Send + Sync {
    /// Find a module by name (case-insensitive).
    fn find_module(&self, name: &str) -> Option<ModuleRef>;

    /// Find a record definition by name (case-insensitive).
    fn find_record_definition(&self, name: &str) -> Option<Arc<RecordDefinition>>;

    /// Read the source text of a module returned by [`ModuleProvider::find_module`].
    fn read_source(&self, module: &ModuleRef) -> Result<String, ProviderError>;
}

/// A provider that knows no modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyProvider;

impl ModuleProvider for EmptyProvider {
    fn find_module(&self, _name: &str) -> Option<ModuleRef> {
        None
    }

    fn find_record_definition(&self, _name: &str) -> Option<Arc<RecordDefinition>> {
        None
    }

    fn read_source(&self, module: &ModuleRef) -> Result<String, ProviderError> {
        Err(ProviderError::UnknownModule(module.name.clone()))
    }
}

/// A provider over in-memory sources.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    modules: HashMap<String, (ModuleRef, String)>,
    record_definitions: HashMap<String, Arc<RecordDefinition>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module source under `name`.
    pub fn with_module(mut self, name: &str, file_type: FileType, source: &str) -> Self {
        let name = name.to_ascii_uppercase();
        let module = ModuleRef {
            name: name.clone(),
            file_type,
            path: PathBuf::from(format!("{name}.{}", file_type.extension())),
        };
        self.modules.insert(name, (module, source.to_string()));
        self
    }

    pub fn with_record_definition(mut self, ddm: RecordDefinition) -> Self {
        self.record_definitions.insert(ddm.name.clone(), Arc::new(ddm));
        self
    }
}

impl ModuleProvider for InMemoryProvider {
    fn find_module(&self, name: &str) -> Option<ModuleRef> {
        self.modules
            .get(&name.to_ascii_uppercase())
            .map(|(module, _)| module.clone())
    }

    fn find_record_definition(&self, name: &str) -> Option<Arc<RecordDefinition>> {
        self.record_definitions.get(&name.to_ascii_uppercase()).cloned()
    }

    fn read_source(&self, module: &ModuleRef) -> Result<String, ProviderError> {
        self.modules
            .get(&module.name)
            .map(|(_, source)| source.clone())
            .ok_or_else(|| ProviderError::UnknownModule(module.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let provider = InMemoryProvider::new().with_module("subprog", FileType::Subprogram, "END");
        let module = provider.find_module("SubProg").unwrap();
        assert_eq!(module.name, "SUBPROG");
        assert_eq!(module.path, PathBuf::from("SUBPROG.NSN"));
        assert_eq!(provider.read_source(&module).unwrap(), "END");
    }

    #[test]
    fn empty_provider_finds_nothing() {
        assert!(EmptyProvider.find_module("ANY").is_none());
        assert!(EmptyProvider.find_record_definition("ANY").is_none());
    }
}
