//! Lowering of parsed definitions into the flavor graph.
//!
//! [`Converter`] walks the definition tree depth-first from a root name.
//! Every node kind lowers to at most one new flavor; children are lowered
//! before their parent, so a parent always sees the final offsets of its
//! children. Named definitions are memoized: the second reference to a name
//! reuses the first offset. A name reached again while it is still being
//! lowered is a [`ConvertError::CyclicReference`].
//!
//! Vertices are the exception. A vertex is stored again for every polygon,
//! switch or split that references it.

mod error;
mod track;

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use threedo_core::{
    angle::to_papy_degree,
    files::FileTables,
    flavor::{FlavorType, NIL_OFFSET, Offset},
    graph::FlavorGraph,
    plane::{self, Point3},
};
use threedo_parser::{
    Definitions,
    ast::{
        Bsp, BspKind, Dynamic, Material, Node, Polygon, SuperObject, Switch, Value, parse_number,
    },
};

use crate::model::Model;

pub use error::{ConvertError, TrackHashError};

type Result<T> = std::result::Result<T, ConvertError>;

/// Texture flag used when no `MATERIAL GROUP` applies.
const DEFAULT_TEXTURE_FLAG: i64 = 8;

/// Options for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Factor applied to every coordinate and switch distance.
    pub scale: f64,
    /// Name of the track-hash definition. Enables track mode.
    pub track_hash: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            track_hash: None,
        }
    }
}

/// State inherited from enclosing nodes.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    /// Texture group of the nearest enclosing `MATERIAL` that sets one.
    group: Option<i64>,
}

/// Converts one document into a [`Model`].
///
/// # Examples
///
/// ```
/// use threedo::{ConvertOptions, Converter};
/// use threedo_parser::{LoadOptions, parse_document};
///
/// let definitions = parse_document("A : NIL;", LoadOptions::default()).unwrap();
/// let model = Converter::new(&definitions, ConvertOptions::default())
///     .build("A")
///     .unwrap();
/// assert_eq!(model.flavors().len(), 1);
/// ```
#[derive(Debug)]
pub struct Converter<'d> {
    definitions: &'d Definitions,
    options: ConvertOptions,
    flavors: FlavorGraph,
    files: FileTables,
    lowered: HashMap<String, Offset>,
    /// Names whose lowering has started but not finished.
    in_progress: HashSet<String>,
}

impl<'d> Converter<'d> {
    pub fn new(definitions: &'d Definitions, options: ConvertOptions) -> Self {
        Self {
            definitions,
            options,
            flavors: FlavorGraph::new(),
            files: FileTables::new(),
            lowered: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Returns `true` when a track-hash name is set.
    pub fn is_track(&self) -> bool {
        self.options.track_hash.is_some()
    }

    pub fn flavors(&self) -> &FlavorGraph {
        &self.flavors
    }

    pub fn files(&self) -> &FileTables {
        &self.files
    }

    /// Lower a named definition, or return its offset if it was lowered
    /// before.
    pub fn lower_named(&mut self, name: &str) -> Result<Offset> {
        self.lower_name(name, Context::default())
    }

    /// Lower `root` and return the finished model.
    pub fn build(mut self, root: &str) -> Result<Model> {
        info!(
            root,
            scale = self.options.scale,
            track_hash:? = self.options.track_hash;
            "Converting model"
        );
        let offset = self.lower_named(root)?;
        info!(root_offset = offset, flavors = self.flavors.len(); "Model converted");
        Ok(Model::new(self.flavors, self.files))
    }

    fn definition(&self, name: &str) -> Result<&'d Node> {
        self.definitions
            .get(name)
            .ok_or_else(|| ConvertError::UndefinedReference(name.to_string()))
    }

    fn lower_name(&mut self, name: &str, context: Context) -> Result<Offset> {
        if let Some(&offset) = self.lowered.get(name) {
            debug!(name, offset; "Reusing lowered definition");
            return Ok(offset);
        }
        let node = self.definition(name)?;
        if !self.in_progress.insert(name.to_string()) {
            return Err(ConvertError::CyclicReference(name.to_string()));
        }
        let offset = self.lower(node, context);
        self.in_progress.remove(name);

        let offset = offset?;
        self.lowered.insert(name.to_string(), offset);
        debug!(name, offset, kind = node.kind(); "Lowered definition");
        Ok(offset)
    }

    fn lower(&mut self, node: &'d Node, context: Context) -> Result<Offset> {
        match node {
            Node::Word(name) => self.lower_name(name, context),
            Node::Nil | Node::Line(_) => Ok(NIL_OFFSET),
            Node::Poly(polygon) => self.lower_polygon(polygon, context),
            Node::Switch(switch) => self.lower_switch(switch, context),
            Node::Material(material) => self.lower_material(material, context),
            Node::Bsp(bsp) => self.lower_bsp(bsp, context),
            Node::List(items) => self.lower_list(items, context),
            Node::SuperObject(object) => self.lower_super_object(object, context),
            Node::Dyno(values) => Ok(self.store(FlavorType::Dyno, values.clone(), Vec::new())),
            Node::Data(values) => Ok(self.store(FlavorType::Data, values.clone(), Vec::new())),
            Node::Dynamic(dynamic) => Ok(self.lower_dynamic(dynamic)),
            Node::Quoted(_)
            | Node::Vector(_)
            | Node::Value(_)
            | Node::Items(_)
            | Node::Color(_) => Err(ConvertError::NotImplemented { kind: node.kind() }),
        }
    }

    fn lower_all(&mut self, nodes: &'d [Node], context: Context) -> Result<Vec<Offset>> {
        nodes.iter().map(|node| self.lower(node, context)).collect()
    }

    fn store(&mut self, flavor_type: FlavorType, values1: Vec<i64>, values2: Vec<i64>) -> Offset {
        self.flavors.insert(flavor_type, values1, values2)
    }

    /// Scaled coordinates of a vertex or plane point, truncated toward zero.
    fn scaled(&self, node: &Node) -> Option<Vec<i64>> {
        match node {
            Node::Value(value) => Some((value * self.options.scale).integers()),
            Node::Vector(numbers) => {
                Some((&Value::new(numbers.clone()) * self.options.scale).integers())
            }
            _ => None,
        }
    }

    /// Follow one name reference. Vertices, colours and plane points are
    /// read this way, without the memo.
    fn resolve(&self, node: &'d Node) -> Result<&'d Node> {
        match node {
            Node::Word(name) => self.definition(name),
            other => Ok(other),
        }
    }

    /// Store a vertex record for a value reference.
    fn store_vertex(&mut self, node: &'d Node) -> Result<Offset> {
        let resolved = self.resolve(node)?;
        let Some(coordinates) = self.scaled(resolved) else {
            return Err(ConvertError::InvalidVertex {
                found: resolved.to_string(),
            });
        };
        let texture = match resolved {
            Node::Value(value) => value.attribute("t"),
            _ => None,
        };
        if coordinates.len() != 3 {
            return Err(ConvertError::InvalidVertex {
                found: node.to_string(),
            });
        }

        let texture = match texture {
            Some(uv) => uv
                .numbers()
                .ok_or_else(|| ConvertError::InvalidTexture {
                    found: uv.to_string(),
                })?
                .into_iter()
                .map(|n| n as i64)
                .collect(),
            None => Vec::new(),
        };
        Ok(self.store(FlavorType::Vertex, coordinates, texture))
    }

    /// A colour is a `<name>.c` entry, a numeric definition, an inline
    /// number or a numeric literal.
    fn color_index(&self, node: &'d Node) -> Result<i64> {
        let resolved = match node {
            Node::Word(name) => match (self.definitions.get(name), parse_number(name)) {
                (Some(definition), _) => definition,
                (None, Some(literal)) => return Ok(literal as i64),
                (None, None) => return Err(ConvertError::UndefinedReference(name.clone())),
            },
            other => other,
        };
        resolved
            .first_number()
            .map(|n| n as i64)
            .ok_or_else(|| ConvertError::InvalidColor {
                found: resolved.to_string(),
            })
    }

    fn plane_point(&self, node: &'d Node) -> Result<Point3> {
        let resolved = self.resolve(node)?;
        self.scaled(resolved)
            .and_then(|coordinates| Point3::from_slice(&coordinates))
            .ok_or_else(|| ConvertError::InvalidPlane {
                found: resolved.to_string(),
            })
    }

    fn lower_polygon(&mut self, polygon: &'d Polygon, context: Context) -> Result<Offset> {
        let vertices = polygon
            .vertices
            .iter()
            .map(|vertex| self.store_vertex(vertex).map(i64::from))
            .collect::<Result<Vec<_>>>()?;
        let color = self.color_index(&polygon.color)?;
        let last_index = vertices.len() as i64 - 1;

        if polygon.textured {
            let flag = texture_flag(context.group);
            Ok(self.store(
                FlavorType::TexturedFace,
                vec![flag, color, last_index],
                vertices,
            ))
        } else {
            Ok(self.store(FlavorType::Face, vec![color, last_index], vertices))
        }
    }

    fn lower_switch(&mut self, switch: &'d Switch, context: Context) -> Result<Offset> {
        let origin = self.store_vertex(&switch.origin)?;
        let mut pairs = Vec::with_capacity(switch.entries.len() * 2);
        for entry in &switch.entries {
            let distance = (entry.distance as f64 * self.options.scale) as i64;
            let target = self.lower(&entry.target, context)?;
            pairs.push(distance);
            pairs.push(i64::from(target));
        }
        Ok(self.store(FlavorType::Switch, vec![i64::from(origin)], pairs))
    }

    /// A `MATERIAL` without `MIP` is transparent: the child offset is
    /// returned as is.
    fn lower_material(&mut self, material: &'d Material, context: Context) -> Result<Offset> {
        let context = Context {
            group: material.group.or(context.group),
        };
        let child = self.lower(&material.child, context)?;
        match &material.mip {
            Some(mip) => {
                let index = self.files.intern_mip(mip) as i64;
                Ok(self.store(FlavorType::Material, vec![index, 0], vec![i64::from(child)]))
            }
            None => Ok(child),
        }
    }

    fn lower_bsp(&mut self, bsp: &'d Bsp, context: Context) -> Result<Offset> {
        if self.is_track() && bsp.kind == BspKind::Face {
            let child = bsp.children.first().ok_or(ConvertError::MissingChild {
                keyword: bsp.kind.keyword(),
            })?;
            return self.lower(child, context);
        }

        let [a, b, c] = &bsp.planes;
        let points = [self.plane_point(a)?, self.plane_point(b)?, self.plane_point(c)?];
        let coefficients =
            plane::coefficients(points).ok_or_else(|| ConvertError::PlaneOutOfRange {
                keyword: bsp.kind.keyword(),
            })?;

        let mut children = self.lower_all(&bsp.children, context)?;
        // First child stays first, the rest are visited in reverse.
        if let Some(rest) = children.get_mut(1..) {
            rest.reverse();
        }

        Ok(self.store(
            bsp.kind.flavor_type(),
            coefficients.to_vec(),
            children.into_iter().map(i64::from).collect(),
        ))
    }

    fn lower_list(&mut self, items: &'d [Node], context: Context) -> Result<Offset> {
        if let Some(hash) = self.options.track_hash.clone() {
            if items.iter().any(|item| item.as_word() == Some(hash.as_str())) {
                return self.lower_track_hash(items, &hash, context);
            }
        }

        let children = self.lower_all(items, context)?;
        Ok(self.store(
            FlavorType::List,
            vec![children.len() as i64],
            children.into_iter().map(i64::from).collect(),
        ))
    }

    fn lower_super_object(&mut self, object: &'d SuperObject, context: Context) -> Result<Offset> {
        let pointer = self.lower(&object.pointer, context)?;
        let children = self.lower_all(&object.children, context)?;
        Ok(self.store(
            FlavorType::SuperObject,
            vec![i64::from(pointer), children.len() as i64],
            children.into_iter().map(i64::from).collect(),
        ))
    }

    /// Location and rotation of an external object, followed by the
    /// complement of its external-table index.
    fn lower_dynamic(&mut self, dynamic: &'d Dynamic) -> Offset {
        let index = self.files.intern_external(&dynamic.external) as i64;
        let fields: Vec<i64> = dynamic.fields[..6].iter().map(|f| *f as i64).collect();

        let mut values: Vec<i64> = fields[..3]
            .iter()
            .map(|n| (*n as f64 * self.options.scale) as i64)
            .collect();
        values.extend(
            fields[3..]
                .iter()
                .map(|tenths| to_papy_degree(*tenths as f64 / 10.0)),
        );
        values.push(!index);

        self.store(FlavorType::Dynamic, values, Vec::new())
    }
}

/// Texture flag of a `MATERIAL GROUP`.
fn texture_flag(group: Option<i64>) -> i64 {
    match group {
        Some(0) => 1, // asphalt
        Some(1) => 2, // grass
        Some(2) => 4, // wall
        Some(3) => 8, // tso
        _ => DEFAULT_TEXTURE_FLAG,
    }
}

/// Convert `root` of `definitions` into a model.
pub fn convert(definitions: &Definitions, root: &str, options: ConvertOptions) -> Result<Model> {
    Converter::new(definitions, options).build(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threedo_core::flavor::{Flavor, VertexKind};
    use threedo_parser::{LoadOptions, parse_document};

    fn definitions(source: &str) -> Definitions {
        parse_document(source, LoadOptions::default()).expect("document should parse")
    }

    fn flavor(converter: &Converter<'_>, offset: Offset) -> Flavor {
        converter
            .flavors()
            .get(offset)
            .cloned()
            .expect("flavor should exist")
    }

    #[test]
    fn test_texture_flags() {
        assert_eq!(texture_flag(Some(0)), 1);
        assert_eq!(texture_flag(Some(2)), 4);
        assert_eq!(texture_flag(Some(42)), 8);
        assert_eq!(texture_flag(None), 8);
    }

    #[test]
    fn test_memoized_reference() {
        let defs = definitions("a : DATA (1, 2);\nl : LIST (a, a);\n");
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let list = converter.lower_named("l").unwrap();
        assert_eq!(flavor(&converter, list).values2(), [1, 1]);
        assert_eq!(converter.lower_named("l").unwrap(), list);
        assert_eq!(converter.flavors().len(), 3);
    }

    #[test]
    fn test_vertices_are_not_shared() {
        let defs = definitions("v : [<0, 0, 0>];\na : POLY 1 {v, v, v};\n");
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let poly = converter.lower_named("a").unwrap();
        assert_eq!(flavor(&converter, poly).values2(), [1, 2, 3]);
    }

    #[test]
    fn test_textured_vertex_and_group() {
        let defs = definitions(
            "v : [<10, 20, 30>, T, <4, 5>];\n\
             p : MATERIAL GROUP = 1 POLY T 3 {v, v, v};\n",
        );
        let options = ConvertOptions {
            scale: 2.0,
            track_hash: None,
        };
        let mut converter = Converter::new(&defs, options);

        let poly = converter.lower_named("p").unwrap();
        let face = flavor(&converter, poly);
        assert_eq!(face.flavor_type(), FlavorType::TexturedFace);
        assert_eq!(face.values1(), [2, 3, 2]);

        let vertex = flavor(&converter, 1);
        assert_eq!(vertex.values1(), [20, 40, 60]);
        assert_eq!(vertex.values2(), [4, 5]);
        assert_eq!(vertex.vertex_kind(), Some(VertexKind::Textured));
    }

    #[test]
    fn test_inner_material_group_wins() {
        let defs = definitions(
            "v : [<0, 0, 0>];\n\
             p : POLY T 1 {v, v, v};\n\
             m : MATERIAL GROUP = 0 MATERIAL GROUP = 2 p;\n",
        );
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let poly = converter.lower_named("m").unwrap();
        assert_eq!(flavor(&converter, poly).values1()[0], 4);
    }

    #[test]
    fn test_color_from_definition() {
        let defs = definitions(
            "red : [<0, 0, 0>, c, <9>];\n\
             v : [<0, 0, 0>];\n\
             p : POLY red.c {v, v};\n",
        );
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let poly = converter.lower_named("p").unwrap();
        assert_eq!(flavor(&converter, poly).values1(), [9, 1]);
    }

    #[test]
    fn test_undefined_color() {
        let defs = definitions("v : [<0, 0, 0>];\np : POLY nothing {v};\n");
        let err = Converter::new(&defs, ConvertOptions::default())
            .lower_named("p")
            .unwrap_err();
        assert_eq!(err, ConvertError::UndefinedReference("nothing".to_string()));
    }

    #[test]
    fn test_switch_scales_distances() {
        let defs = definitions(
            "o : [<1, 1, 1>];\n\
             near : DATA (1);\n\
             far : DATA (2);\n\
             s : SWITCH DISTANCE (o) R ((100, R, near), (250, R, far));\n",
        );
        let options = ConvertOptions {
            scale: 0.5,
            track_hash: None,
        };
        let mut converter = Converter::new(&defs, options);

        let switch = converter.lower_named("s").unwrap();
        let record = flavor(&converter, switch);
        assert_eq!(record.flavor_type(), FlavorType::Switch);
        assert_eq!(record.values1(), [1]);
        assert_eq!(record.values2(), [50, 2, 125, 3]);
    }

    #[test]
    fn test_bsp_reverses_trailing_children() {
        let defs = definitions(
            "p1 : [<0, 0, 5>];\n\
             p2 : [<1, 0, 5>];\n\
             p3 : [<0, 1, 5>];\n\
             a : DATA (1);\nb : DATA (2);\nc : DATA (3);\nd : DATA (4);\n\
             s : BSP2 (p1, p2, p3) a b c d;\n",
        );
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let split = converter.lower_named("s").unwrap();
        let record = flavor(&converter, split);
        assert_eq!(record.flavor_type(), FlavorType::Bsp2);
        assert_eq!(record.values1(), [0, 0, 1, -5]);
        assert_eq!(record.values2(), [1, 4, 3, 2]);
    }

    #[test]
    fn test_face_skipped_in_track_mode() {
        let defs = definitions(
            "p : [<0, 0, 0>];\n\
             a : DATA (1);\n\
             f : FACE (p, p, p) a;\n",
        );
        let options = ConvertOptions {
            scale: 1.0,
            track_hash: Some("hash".to_string()),
        };
        let mut converter = Converter::new(&defs, options);

        assert_eq!(converter.lower_named("f").unwrap(), 1);
        assert_eq!(converter.flavors().len(), 2);
    }

    #[test]
    fn test_super_object() {
        let defs = definitions("a : DATA (1);\nb : DATA (2);\ns : SUPEROBJ a (b, NIL);\n");
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let object = converter.lower_named("s").unwrap();
        let record = flavor(&converter, object);
        assert_eq!(record.values1(), [1, 2]);
        assert_eq!(record.values2(), [2, 0]);
    }

    #[test]
    fn test_dynamic() {
        let defs = definitions("d : DYNAMIC 10, 20, 30, 900, 0, -1800, 5, EXTERN = \"CAR\";\n");
        let options = ConvertOptions {
            scale: 2.0,
            track_hash: None,
        };
        let mut converter = Converter::new(&defs, options);

        let dynamic = converter.lower_named("d").unwrap();
        let record = flavor(&converter, dynamic);
        assert_eq!(record.flavor_type(), FlavorType::Dynamic);
        assert_eq!(
            record.values1(),
            [20, 40, 60, 1 << 30, 0, i64::from(i32::MIN), -1]
        );
        assert_eq!(converter.files().external().names(), ["CAR"]);
    }

    #[test]
    fn test_mutual_reference_is_an_error() {
        let defs = definitions("a : LIST (b);\nb : LIST (a);\n");
        let err = Converter::new(&defs, ConvertOptions::default())
            .lower_named("a")
            .unwrap_err();
        assert_eq!(err, ConvertError::CyclicReference("a".to_string()));
    }

    #[test]
    fn test_self_reference_through_material() {
        let defs = definitions("m : MATERIAL GROUP = 1 m;\n");
        let err = Converter::new(&defs, ConvertOptions::default())
            .lower_named("m")
            .unwrap_err();
        assert_eq!(err, ConvertError::CyclicReference("m".to_string()));
    }

    #[test]
    fn test_failed_lowering_can_be_retried() {
        let defs = definitions("l : LIST (missing);\n");
        let mut converter = Converter::new(&defs, ConvertOptions::default());
        for _ in 0..2 {
            assert_eq!(
                converter.lower_named("l").unwrap_err(),
                ConvertError::UndefinedReference("missing".to_string())
            );
        }
    }

    #[test]
    fn test_split_plane_out_of_range() {
        let defs = definitions(
            "p1 : [<-9000000000000000000, -9000000000000000000, 0>];\n\
             p2 : [<9000000000000000000, -9000000000000000000, 0>];\n\
             p3 : [<-9000000000000000000, 9000000000000000000, 0>];\n\
             a : DATA (1);\n\
             f : FACE (p1, p2, p3) a;\n",
        );
        let err = Converter::new(&defs, ConvertOptions::default())
            .lower_named("f")
            .unwrap_err();
        assert_eq!(err, ConvertError::PlaneOutOfRange { keyword: "FACE" });
    }

    #[test]
    fn test_split_plane_with_distant_points() {
        let defs = definitions(
            "p1 : [<9e18, 0, 0>];\n\
             p2 : [<-9e18, 0, 0>];\n\
             p3 : [<0, 9e18, 0>];\n\
             a : DATA (1);\n\
             f : FACE (p1, p2, p3) a;\n",
        );
        let mut converter = Converter::new(&defs, ConvertOptions::default());

        let face = converter.lower_named("f").unwrap();
        assert_eq!(flavor(&converter, face).values1(), [0, 0, -1, 0]);
    }

    #[test]
    fn test_inline_value_is_not_lowered() {
        let defs = definitions("l : LIST ([<1, 2, 3>]);\n");
        let err = Converter::new(&defs, ConvertOptions::default())
            .lower_named("l")
            .unwrap_err();
        assert_eq!(err, ConvertError::NotImplemented { kind: "value" });
    }
}
