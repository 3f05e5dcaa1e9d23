//! Flavor records.
//!
//! A flavor is one typed record of the output model graph. Every flavor is
//! addressed by an [`Offset`] and carries two integer payloads: `values1`
//! holds the primary numbers (coordinates, counts, plane coefficients) and
//! `values2` holds offsets of referenced flavors or interleaved numbers.
//!
//! The byte layout of each record is owned by the serializer; this module
//! only fixes the type codes and payload shapes.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Address of a flavor inside a model.
///
/// Offset `0` is reserved for the canonical empty record.
pub type Offset = u32;

/// The offset of the canonical empty (NIL) record.
pub const NIL_OFFSET: Offset = 0;

/// Type code of a flavor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FlavorType {
    /// Vertex, or the empty record at offset 0.
    Vertex,
    /// Flat colored polygon.
    Face,
    /// Textured polygon.
    TexturedFace,
    /// Material selecting a MIP texture.
    Material,
    /// Single-child split (`FACE`).
    FaceSplit,
    /// Two-child split (`FACE2`).
    Face2Split,
    /// Three-child split (`BSPF`).
    BspFace,
    /// Three-child split (`BSPA`).
    BspAngled,
    /// Four-child split (`BSP2`).
    Bsp2,
    /// Two-child split (`BSPN`).
    BspNormal,
    /// Ordered list of flavors.
    List,
    /// Raw dynamic-object numbers.
    Dyno,
    /// Distance switch (level of detail).
    Switch,
    /// Reference into the external object table.
    Dynamic,
    /// Object with a pointer and children.
    SuperObject,
    /// Raw data numbers.
    Data,
}

/// Error returned for a numeric type code with no [`FlavorType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown flavor type code: {0}")]
pub struct UnknownFlavorType(pub u8);

impl FlavorType {
    /// Returns the numeric type code stored in the model file.
    pub fn code(self) -> u8 {
        match self {
            FlavorType::Vertex => 0,
            FlavorType::Face => 1,
            FlavorType::TexturedFace => 2,
            FlavorType::Material => 4,
            FlavorType::FaceSplit => 5,
            FlavorType::Face2Split => 6,
            FlavorType::BspFace => 7,
            FlavorType::BspAngled => 8,
            FlavorType::Bsp2 => 9,
            FlavorType::BspNormal => 10,
            FlavorType::List => 11,
            FlavorType::Dyno => 12,
            FlavorType::Switch => 13,
            FlavorType::Dynamic => 15,
            FlavorType::SuperObject => 16,
            FlavorType::Data => 17,
        }
    }

    /// Returns `true` for the six split-plane record types.
    pub fn is_bsp(self) -> bool {
        matches!(
            self,
            FlavorType::FaceSplit
                | FlavorType::Face2Split
                | FlavorType::BspFace
                | FlavorType::BspAngled
                | FlavorType::Bsp2
                | FlavorType::BspNormal
        )
    }
}

impl TryFrom<u8> for FlavorType {
    type Error = UnknownFlavorType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let flavor_type = match code {
            0 => FlavorType::Vertex,
            1 => FlavorType::Face,
            2 => FlavorType::TexturedFace,
            4 => FlavorType::Material,
            5 => FlavorType::FaceSplit,
            6 => FlavorType::Face2Split,
            7 => FlavorType::BspFace,
            8 => FlavorType::BspAngled,
            9 => FlavorType::Bsp2,
            10 => FlavorType::BspNormal,
            11 => FlavorType::List,
            12 => FlavorType::Dyno,
            13 => FlavorType::Switch,
            15 => FlavorType::Dynamic,
            16 => FlavorType::SuperObject,
            17 => FlavorType::Data,
            _ => return Err(UnknownFlavorType(code)),
        };
        Ok(flavor_type)
    }
}

impl fmt::Display for FlavorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{:02}", self.code())
    }
}

/// Shape of a vertex record, derived from its payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VertexKind {
    /// No coordinates (the empty record).
    Empty,
    /// Coordinates only.
    Plain,
    /// Coordinates plus texture coordinates.
    Textured,
}

/// One typed record of the model graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flavor {
    flavor_type: FlavorType,
    offset: Offset,
    values1: Vec<i64>,
    values2: Vec<i64>,
    parents: Vec<Offset>,
}

impl Flavor {
    /// Builds a flavor record from its type and payloads.
    pub fn new(
        flavor_type: FlavorType,
        offset: Offset,
        values1: Vec<i64>,
        values2: Vec<i64>,
    ) -> Self {
        Self {
            flavor_type,
            offset,
            values1,
            values2,
            parents: Vec::new(),
        }
    }

    /// The canonical empty record stored at offset 0.
    pub fn empty() -> Self {
        Self::new(FlavorType::Vertex, NIL_OFFSET, Vec::new(), Vec::new())
    }

    pub fn flavor_type(&self) -> FlavorType {
        self.flavor_type
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn values1(&self) -> &[i64] {
        &self.values1
    }

    pub fn values2(&self) -> &[i64] {
        &self.values2
    }

    /// Offsets of the records that reference this one.
    ///
    /// Only populated for data records rebuilt by the track-hash rewrite.
    pub fn parents(&self) -> &[Offset] {
        &self.parents
    }

    /// Records `parent` as a referencing record.
    pub fn add_parent(&mut self, parent: Offset) {
        self.parents.push(parent);
    }

    /// Removes and returns the last entry of the secondary payload.
    pub fn pop_value2(&mut self) -> Option<i64> {
        self.values2.pop()
    }

    /// Consumes the record, returning its primary and secondary payloads.
    pub fn into_values(self) -> (Vec<i64>, Vec<i64>) {
        (self.values1, self.values2)
    }

    /// Returns the vertex shape, or `None` for non-vertex records.
    pub fn vertex_kind(&self) -> Option<VertexKind> {
        if self.flavor_type != FlavorType::Vertex {
            return None;
        }
        let kind = if !self.values2.is_empty() {
            VertexKind::Textured
        } else if !self.values1.is_empty() {
            VertexKind::Plain
        } else {
            VertexKind::Empty
        };
        Some(kind)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?}",
            self.flavor_type, self.values1, self.values2
        )?;
        if !self.parents.is_empty() {
            write!(f, " parents={:?}", self.parents)?;
        }
        Ok(())
    }
}
