//! Interfaces to the host that supplies declarations.
//!
//! The resolver never walks source structure itself. Hosts implement
//! [`DeclarationFeed`] for module members and [`GlobalDeclarationIndex`] for
//! the top-level candidates seeding the outermost scopes. [`DeclarationTable`]
//! is an in-memory implementation of both.

use crate::callable::InjektCallable;
use indexmap::IndexMap;
use injekt_solver::ClassifierId;
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Compilation unit handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

pub trait DeclarationFeed {
    /// Injectable members of a module classifier, typed in terms of the
    /// classifier's own type parameters.
    fn module_members(&self, module: ClassifierId) -> Vec<InjektCallable>;
}

pub trait GlobalDeclarationIndex {
    /// Top-level candidates from other compilation modules.
    fn external_declarations(&self) -> Vec<InjektCallable>;

    /// Top-level candidates of this compilation module outside `file`.
    fn internal_declarations(&self, except: FileId) -> Vec<InjektCallable>;

    /// Top-level candidates declared in `file`.
    fn file_declarations(&self, file: FileId) -> Vec<InjektCallable>;
}

#[derive(Clone, Debug, Default)]
pub struct DeclarationTable {
    external: Vec<InjektCallable>,
    files: IndexMap<FileId, Vec<InjektCallable>, FxBuildHasher>,
    modules: FxHashMap<ClassifierId, Vec<InjektCallable>>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        DeclarationTable::default()
    }

    pub fn add_external(&mut self, callable: InjektCallable) -> &mut Self {
        self.external.push(callable);
        self
    }

    pub fn add_to_file(&mut self, file: FileId, callable: InjektCallable) -> &mut Self {
        self.files.entry(file).or_default().push(callable);
        self
    }

    /// Register a file without declarations so it takes part in the
    /// internal global scope of other files.
    pub fn add_file(&mut self, file: FileId) -> &mut Self {
        self.files.entry(file).or_default();
        self
    }

    pub fn add_module_member(
        &mut self,
        module: ClassifierId,
        callable: InjektCallable,
    ) -> &mut Self {
        self.modules.entry(module).or_default().push(callable);
        self
    }
}

impl DeclarationFeed for DeclarationTable {
    fn module_members(&self, module: ClassifierId) -> Vec<InjektCallable> {
        self.modules.get(&module).cloned().unwrap_or_default()
    }
}

impl GlobalDeclarationIndex for DeclarationTable {
    fn external_declarations(&self) -> Vec<InjektCallable> {
        self.external.clone()
    }

    fn internal_declarations(&self, except: FileId) -> Vec<InjektCallable> {
        self.files
            .iter()
            .filter(|(file, _)| **file != except)
            .flat_map(|(_, declarations)| declarations.iter().cloned())
            .collect()
    }

    fn file_declarations(&self, file: FileId) -> Vec<InjektCallable> {
        self.files.get(&file).cloned().unwrap_or_default()
    }
}
