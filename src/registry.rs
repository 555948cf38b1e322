//! Symbol name to integer id registry.

use crate::domain::Symbol;
use crate::ids::IdGenerator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub id: u64,
    pub name: Symbol,
}

/// Registered symbols in insertion order. Names are uppercase-normalized.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: Vec<SymbolInfo>,
    ids: IdGenerator,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing id for `name`, or a newly issued one.
    pub fn get_or_create(&mut self, name: impl AsRef<str>) -> u64 {
        let name = Symbol::new(name);
        if let Some(existing) = self.symbols.iter().find(|s| s.name == name) {
            return existing.id;
        }
        let id = self.ids.issue();
        tracing::debug!(symbol = %name, id, "Registered symbol");
        self.symbols.push(SymbolInfo { id, name });
        id
    }

    pub fn find_by_name(&self, name: impl AsRef<str>) -> Option<&SymbolInfo> {
        let name = Symbol::new(name);
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn find_by_id(&self, id: u64) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Name for `id`, or `None` if unknown.
    pub fn name_of(&self, id: u64) -> Option<&Symbol> {
        self.find_by_id(id).map(|s| &s.name)
    }

    /// Register every name (e.g. symbols of persisted trades).
    pub fn seed<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.get_or_create(name);
        }
    }

    pub fn all(&self) -> &[SymbolInfo] {
        &self.symbols
    }

    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }
}
