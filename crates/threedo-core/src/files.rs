//! Interning tables for files referenced by a model.
//!
//! A model names three kinds of external files: MIP textures, palette maps
//! (`pmp`, reserved and currently never populated) and external sub-objects.
//! Each kind is an order-preserving table where the first occurrence of a
//! name receives the next index, starting at 0.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use string_interner::{DefaultStringInterner, Symbol};

/// An order-preserving name → first-seen index table.
///
/// # Examples
///
/// ```
/// use threedo_core::files::NameTable;
///
/// let mut table = NameTable::new();
/// assert_eq!(table.intern("ROAD"), 0);
/// assert_eq!(table.intern("WALL"), 1);
/// assert_eq!(table.intern("ROAD"), 0);
/// assert_eq!(table.names(), vec!["ROAD", "WALL"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    interner: DefaultStringInterner,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, assigning the next one on first sight.
    pub fn intern(&mut self, name: &str) -> usize {
        self.interner.get_or_intern(name).to_usize()
    }

    /// Returns the index of `name` if it has been interned.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.interner.get(name).map(Symbol::to_usize)
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }

    /// Names in index order.
    pub fn names(&self) -> Vec<&str> {
        self.interner.iter().map(|(_, name)| name).collect()
    }
}

impl PartialEq for NameTable {
    fn eq(&self, other: &Self) -> bool {
        self.names() == other.names()
    }
}

impl Eq for NameTable {}

impl Serialize for NameTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.interner.iter().map(|(_, name)| name))
    }
}

/// The three file tables populated while converting a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTables {
    mip: NameTable,
    pmp: NameTable,
    external: NameTable,
}

impl FileTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a MIP texture name.
    pub fn intern_mip(&mut self, name: &str) -> usize {
        self.mip.intern(name)
    }

    /// Interns an external sub-object file name.
    pub fn intern_external(&mut self, name: &str) -> usize {
        self.external.intern(name)
    }

    pub fn mip(&self) -> &NameTable {
        &self.mip
    }

    /// Palette map table. Nothing in the text format references it yet.
    pub fn pmp(&self) -> &NameTable {
        &self.pmp
    }

    pub fn external(&self) -> &NameTable {
        &self.external
    }

    /// Returns `true` if no table holds a name.
    pub fn is_empty(&self) -> bool {
        self.mip.is_empty() && self.pmp.is_empty() && self.external.is_empty()
    }
}

impl Serialize for FileTables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileTables", 3)?;
        state.serialize_field("mip", &self.mip)?;
        state.serialize_field("pmp", &self.pmp)?;
        state.serialize_field("3do", &self.external)?;
        state.end()
    }
}
