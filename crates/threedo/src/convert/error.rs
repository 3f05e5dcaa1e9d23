//! Errors raised while lowering definitions into flavors.

use thiserror::Error;

use threedo_core::flavor::FlavorType;

/// A fatal lowering error. Conversion stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("undefined reference `{0}`")]
    UndefinedReference(String),

    #[error("lowering {kind} is not implemented")]
    NotImplemented { kind: &'static str },

    #[error("invalid vertex `{found}`: expected a value with 3 coordinates")]
    InvalidVertex { found: String },

    #[error("invalid texture coordinates `{found}`")]
    InvalidTexture { found: String },

    #[error("invalid colour `{found}`: expected a number")]
    InvalidColor { found: String },

    #[error("invalid split plane point `{found}`: expected 3 coordinates")]
    InvalidPlane { found: String },

    #[error("{keyword} split plane is out of range")]
    PlaneOutOfRange { keyword: &'static str },

    #[error("`{0}` refers to itself")]
    CyclicReference(String),

    #[error("{keyword} has no child")]
    MissingChild { keyword: &'static str },

    #[error("track hash: {0}")]
    TrackHash(#[from] TrackHashError),
}

/// Structural errors of the track-hash rewrite.
///
/// These indicate a malformed track rather than a grammar problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackHashError {
    #[error("hash definition `{0}` is not defined")]
    MissingDefinition(String),

    #[error("hash definition `{0}` is not a sequence of integers")]
    InvalidDefinition(String),

    #[error("`{0}` must be the first entry of its list")]
    HashNotFirst(String),

    #[error("no flavor at offset {0}")]
    MissingFlavor(i64),

    #[error("flavor at offset {offset} is {found}, expected {expected}")]
    WrongType {
        offset: u32,
        expected: FlavorType,
        found: FlavorType,
    },

    #[error("flavor at offset {offset} has {found} secondary values, expected {expected}")]
    PayloadLength {
        offset: u32,
        expected: usize,
        found: usize,
    },

    #[error("hash index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: i64, len: usize },
}
