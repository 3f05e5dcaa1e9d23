//! The converted model: flavor graph plus referenced file tables.

use serde::Serialize;

use threedo_core::{
    files::FileTables,
    flavor::{Flavor, Offset},
    graph::FlavorGraph,
};

/// Output of one conversion.
///
/// The flavors are exactly the live set left after lowering, including any
/// offsets freed and reused by the track-hash rewrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    files: FileTables,
    flavors: FlavorGraph,
}

impl Model {
    pub fn new(flavors: FlavorGraph, files: FileTables) -> Self {
        Self { files, flavors }
    }

    pub fn flavors(&self) -> &FlavorGraph {
        &self.flavors
    }

    pub fn files(&self) -> &FileTables {
        &self.files
    }

    /// Look up a flavor by offset.
    pub fn flavor(&self, offset: Offset) -> Option<&Flavor> {
        self.flavors.get(offset)
    }

    /// Split the model into its flavor graph and file tables.
    pub fn into_parts(self) -> (FlavorGraph, FileTables) {
        (self.flavors, self.files)
    }
}
