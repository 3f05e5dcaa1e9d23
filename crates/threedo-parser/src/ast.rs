//! Syntax tree of `.3d` definitions.
//!
//! Every statement parses into one [`Node`]. Keyword constructs (`POLY`,
//! `BSPF`, `MATERIAL`, ...) get their own variant with their payload already
//! checked for arity; bracketed groups and bare words stay generic and are
//! resolved by the converter.

use std::{fmt, ops::Mul};

use indexmap::IndexMap;
use threedo_core::flavor::FlavorType;

/// One parsed item.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `NIL`
    Nil,
    /// A bare word: a definition name or a literal.
    Word(String),
    /// A `"..."` literal, without its quotes.
    Quoted(String),
    /// `<...>` numbers.
    Vector(Vec<f64>),
    /// `[...]` value with attributes.
    Value(Value),
    /// `(...)` or `{...}` sequence.
    Items(Vec<Node>),
    /// `LIST`
    List(Vec<Node>),
    /// `SUPEROBJ`
    SuperObject(SuperObject),
    /// `LINE`
    Line(Polygon),
    /// `POLY`
    Poly(Polygon),
    /// `FACE`, `BSPF`, `BSPN`, `BSPA`, `FACE2` and `BSP2`.
    Bsp(Box<Bsp>),
    /// `MATERIAL`
    Material(Material),
    /// `SWITCH DISTANCE`
    Switch(Switch),
    /// `DYNO`
    Dyno(Vec<i64>),
    /// `DATA`
    Data(Vec<i64>),
    /// `DYNAMIC`
    Dynamic(Dynamic),
    /// Colour index registered as `<name>.c` for a value carrying a `C`
    /// attribute.
    Color(i64),
}

impl Node {
    /// Short name of the node kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Nil => "NIL",
            Node::Word(_) => "word",
            Node::Quoted(_) => "quoted name",
            Node::Vector(_) => "vector",
            Node::Value(_) => "value",
            Node::Items(_) => "sequence",
            Node::List(_) => "LIST",
            Node::SuperObject(_) => "SUPEROBJ",
            Node::Line(_) => "LINE",
            Node::Poly(_) => "POLY",
            Node::Bsp(bsp) => bsp.kind.keyword(),
            Node::Material(_) => "MATERIAL",
            Node::Switch(_) => "SWITCH",
            Node::Dyno(_) => "DYNO",
            Node::Data(_) => "DATA",
            Node::Dynamic(_) => "DYNAMIC",
            Node::Color(_) => "colour",
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Node::Word(word) => Some(word),
            _ => None,
        }
    }

    /// The numbers carried by this node, if it is purely numeric.
    ///
    /// Words are parsed as numbers; a sequence is numeric when every item is.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        match self {
            Node::Word(word) => parse_number(word).map(|n| vec![n]),
            Node::Vector(numbers) => Some(numbers.clone()),
            Node::Value(value) if value.marker().is_none() => Some(value.numbers().to_vec()),
            Node::Items(items) => items
                .iter()
                .map(|item| item.as_word().and_then(parse_number))
                .collect(),
            Node::Dyno(values) | Node::Data(values) => {
                Some(values.iter().map(|v| *v as f64).collect())
            }
            Node::Color(index) => Some(vec![*index as f64]),
            _ => None,
        }
    }

    /// The first number carried by this node.
    pub fn first_number(&self) -> Option<f64> {
        self.numbers().and_then(|numbers| numbers.first().copied())
    }

    /// Returns `true` for the texture marker `T`, `(T)` or `[T]`.
    pub fn is_texture_marker(&self) -> bool {
        match self {
            Node::Word(word) => word == "T",
            Node::Items(items) => matches!(items.as_slice(), [Node::Word(word)] if word == "T"),
            Node::Value(value) => value.marker() == Some("T"),
            _ => false,
        }
    }
}

/// Parse a finite number.
pub fn parse_number(word: &str) -> Option<f64> {
    word.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an integer literal.
pub fn parse_integer(word: &str) -> Option<i64> {
    word.parse::<i64>().ok()
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Nil => write!(f, "NIL"),
            Node::Word(word) => write!(f, "{word}"),
            Node::Quoted(text) => write!(f, "\"{text}\""),
            Node::Vector(numbers) => write_joined(f, "<", numbers, ">"),
            Node::Value(value) => write!(f, "{value}"),
            Node::Items(items) => write_joined(f, "(", items, ")"),
            Node::List(items) => write_joined(f, "LIST {", items, "}"),
            Node::Dyno(values) => write_joined(f, "DYNO <", values, ">"),
            Node::Data(values) => write_joined(f, "DATA <", values, ">"),
            Node::Color(index) => write!(f, "{index}"),
            other => write!(f, "{} ...", other.kind()),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[T],
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

/// A `[...]` value: primary numbers plus named attributes.
///
/// A bare word in primary position is kept as a marker instead of numbers;
/// `[T]` is the texture marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Value {
    numbers: Vec<f64>,
    marker: Option<String>,
    attributes: IndexMap<String, Node>,
}

impl Value {
    pub fn new(numbers: Vec<f64>) -> Self {
        Self {
            numbers,
            ..Self::default()
        }
    }

    pub fn marker_value(marker: impl Into<String>) -> Self {
        Self {
            marker: Some(marker.into()),
            ..Self::default()
        }
    }

    /// Add an attribute. Single-character keys are lowercased.
    pub fn with_attribute(mut self, key: &str, value: Node) -> Self {
        self.attributes.insert(normalize_key(key), value);
        self
    }

    pub fn numbers(&self) -> &[f64] {
        &self.numbers
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn attributes(&self) -> &IndexMap<String, Node> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Node> {
        self.attributes.get(key)
    }

    /// The primary numbers truncated toward zero.
    pub fn integers(&self) -> Vec<i64> {
        self.numbers.iter().map(|n| *n as i64).collect()
    }
}

impl Mul<f64> for &Value {
    type Output = Value;

    /// Scale every primary number and truncate toward zero. Attributes are
    /// kept unchanged.
    fn mul(self, factor: f64) -> Value {
        Value {
            numbers: self.numbers.iter().map(|n| (n * factor).trunc()).collect(),
            marker: self.marker.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        match &self.marker {
            Some(marker) => write!(f, "{marker}")?,
            None => write_joined(f, "<", &self.numbers, ">")?,
        }
        for (key, value) in &self.attributes {
            write!(f, ", {key}, {value}")?;
        }
        write!(f, "]")
    }
}

/// Lowercase single-character attribute keys; longer keys are kept as written.
pub fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// `POLY` and `LINE` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub textured: bool,
    pub color: Box<Node>,
    pub vertices: Vec<Node>,
}

/// The six split-plane keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BspKind {
    Face,
    BspFace,
    BspNormal,
    BspAngled,
    Face2,
    Bsp2,
}

impl BspKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "FACE" => BspKind::Face,
            "BSPF" => BspKind::BspFace,
            "BSPN" => BspKind::BspNormal,
            "BSPA" => BspKind::BspAngled,
            "FACE2" => BspKind::Face2,
            "BSP2" => BspKind::Bsp2,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BspKind::Face => "FACE",
            BspKind::BspFace => "BSPF",
            BspKind::BspNormal => "BSPN",
            BspKind::BspAngled => "BSPA",
            BspKind::Face2 => "FACE2",
            BspKind::Bsp2 => "BSP2",
        }
    }

    /// Number of child items following the plane references.
    pub fn child_count(self) -> usize {
        match self {
            BspKind::Face => 1,
            BspKind::BspFace => 3,
            BspKind::BspNormal => 2,
            BspKind::BspAngled => 3,
            BspKind::Face2 => 2,
            BspKind::Bsp2 => 4,
        }
    }

    pub fn flavor_type(self) -> FlavorType {
        match self {
            BspKind::Face => FlavorType::FaceSplit,
            BspKind::BspFace => FlavorType::BspFace,
            BspKind::BspNormal => FlavorType::BspNormal,
            BspKind::BspAngled => FlavorType::BspAngled,
            BspKind::Face2 => FlavorType::Face2Split,
            BspKind::Bsp2 => FlavorType::Bsp2,
        }
    }
}

/// A split-plane construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Bsp {
    pub kind: BspKind,
    /// Three points on the split plane.
    pub planes: [Node; 3],
    /// Exactly `kind.child_count()` children.
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Texture group from `GROUP = n`.
    pub group: Option<i64>,
    /// Texture filename from `MIP = "name"`.
    pub mip: Option<String>,
    pub child: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchEntry {
    pub distance: i64,
    pub target: Node,
}

/// `SWITCH DISTANCE origin symbol (entries)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub origin: Box<Node>,
    pub symbol: String,
    pub entries: Vec<SwitchEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperObject {
    pub pointer: Box<Node>,
    pub children: Vec<Node>,
}

/// `DYNAMIC` external object placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic {
    /// The seven numeric fields: location, then rotation in tenths of a
    /// degree, then one unused field.
    pub fields: [f64; 7],
    /// External object filename from `EXTERN = "name"`.
    pub external: String,
}
