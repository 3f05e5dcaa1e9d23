use threedo_parser::{
    LoadOptions,
    ast::{BspKind, Node},
    error::ErrorCode,
    parse_document,
};

const CUBE: &str = r#"3D VERSION 3.0;
% a textured side and a split
grey : [<0, 0, 0>, c, <7>];
v1 : [<0, 0, 0>, T, <0, 0>];
v2 : [<100, 0, 0>, T, <255, 0>];
v3 : [<0, 100, 0>, T, <0, 255>];
side : MATERIAL GROUP = 2, MIP = "WALL" POLY T grey.c {v1, v2, v3};
split : BSPF (v1, v2, v3), side, NIL, side;
"#;

#[test]
fn test_document_with_material_and_split() {
    let defs = parse_document(CUBE, LoadOptions::default()).expect("Failed to parse");

    assert_eq!(
        defs.names().collect::<Vec<_>>(),
        ["grey", "v1", "v2", "v3", "side", "split", "grey.c"]
    );
    assert_eq!(defs.get("grey.c"), Some(&Node::Color(7)));

    match defs.get("side") {
        Some(Node::Material(material)) => {
            assert_eq!(material.group, Some(2));
            assert_eq!(material.mip.as_deref(), Some("WALL"));
            match material.child.as_ref() {
                Node::Poly(poly) => {
                    assert!(poly.textured);
                    assert_eq!(poly.vertices.len(), 3);
                }
                other => panic!("Expected POLY child, got {other}"),
            }
        }
        other => panic!("Expected MATERIAL, got {other:?}"),
    }

    match defs.get("split") {
        Some(Node::Bsp(bsp)) => {
            assert_eq!(bsp.kind, BspKind::BspFace);
            assert_eq!(bsp.children[1], Node::Nil);
        }
        other => panic!("Expected BSPF, got {other:?}"),
    }
}

#[test]
fn test_semicolon_inside_line_does_not_split() {
    let source = "a : LIST (x; y);\nb : NIL;\n";
    let defs = parse_document(source, LoadOptions::default()).expect("Failed to parse");

    assert_eq!(defs.len(), 2);
    assert!(matches!(defs.get("a"), Some(Node::List(items)) if items.len() == 2));
}

#[test]
fn test_statement_spanning_lines() {
    let source = "3D VERSION 3.0;\ntri : POLY <5>\n  {a,\n   b,\n   c};\n";
    let defs = parse_document(source, LoadOptions::default()).expect("Failed to parse");

    assert!(matches!(defs.get("tri"), Some(Node::Poly(_))));
}

#[test]
fn test_error_spans_point_into_source() {
    let source = "3D VERSION 3.0;\nbad : MATERIAL MIP = \"TOOLONGNAME\" x;\n";
    let err = parse_document(source, LoadOptions::default()).expect_err("should fail");

    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E300));
    assert_eq!(diag.definition(), Some("bad"));
    let span = diag.labels()[0].span();
    assert_eq!(&source[span.start()..span.end()], "\"TOOLONGNAME\"");
}

#[test]
fn test_duplicates() {
    let source = "3D VERSION 3.0;\na : NIL;\na : LIST (b);\n";

    let err = parse_document(source, LoadOptions::default()).expect_err("should fail");
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E400));

    let options = LoadOptions {
        allow_duplicates: true,
    };
    let defs = parse_document(source, options).expect("Failed to parse");
    assert_eq!(defs.len(), 1);
    assert!(matches!(defs.get("a"), Some(Node::List(_))));
}

#[test]
fn test_multiple_errors_are_reported_together() {
    let source = "3D VERSION 3.0;\na : BSPF (p1, p2), x, y, z;\nb : DYNAMIC 1, 2, 3, 4, 5, 6, EXTERN = \"CAR\";\n";
    let err = parse_document(source, LoadOptions::default()).expect_err("should fail");

    let codes: Vec<_> = err.diagnostics().iter().map(|d| d.code()).collect();
    assert_eq!(codes, [Some(ErrorCode::E200), Some(ErrorCode::E200)]);
}
