//! Unit tests for the statement grammar.
//!
//! These tests drive the lexer and parser on single definition values and
//! check both the produced nodes and the error codes of malformed input.

use crate::{
    ast::{BspKind, Node, Polygon, Value},
    error::{Diagnostic, ErrorCode},
    lexer, parser,
    span::Span,
};

/// Helper function to parse a definition value
fn parse_value(value: &str) -> Result<Node, Diagnostic> {
    let tokens = lexer::tokenize(value, 0).map_err(|err| {
        err.into_diagnostics()
            .into_iter()
            .next()
            .expect("lexer error should carry a diagnostic")
    })?;
    parser::parse_statement(&tokens, Span::new(value.len()..value.len())).map(|(node, _)| node)
}

/// Helper function to parse a value and assert success
fn assert_parses(value: &str) -> Node {
    match parse_value(value) {
        Ok(node) => node,
        Err(e) => panic!("Expected `{value}` to parse, but got error: {e}"),
    }
}

/// Helper function to parse a value and assert the error code
fn assert_error_code(value: &str, code: ErrorCode) -> Diagnostic {
    match parse_value(value) {
        Ok(node) => panic!("Expected `{value}` to fail with {code}, but got {node}"),
        Err(diag) => {
            assert_eq!(diag.code(), Some(code), "unexpected diagnostic: {diag}");
            diag
        }
    }
}

fn word(text: &str) -> Node {
    Node::Word(text.to_string())
}

fn items(words: &[&str]) -> Node {
    Node::Items(words.iter().map(|w| word(w)).collect())
}

mod basic_items {
    use super::*;

    #[test]
    fn test_nil() {
        assert_eq!(assert_parses("NIL"), Node::Nil);
    }

    #[test]
    fn test_word_and_quoted() {
        assert_eq!(assert_parses("part1"), word("part1"));
        assert_eq!(
            assert_parses("\"FILE\""),
            Node::Quoted("FILE".to_string())
        );
    }

    #[test]
    fn test_vector() {
        assert_eq!(
            assert_parses("<1, -2.5, 3e2>"),
            Node::Vector(vec![1.0, -2.5, 300.0])
        );
    }

    #[test]
    fn test_vector_rejects_words() {
        assert_error_code("<1, two>", ErrorCode::E103);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(assert_parses("(a, b c)"), items(&["a", "b", "c"]));
        assert_eq!(assert_parses("{a}"), items(&["a"]));
        assert_eq!(assert_parses("()"), Node::Items(vec![]));
    }

    #[test]
    fn test_equals_is_ignored() {
        assert_eq!(assert_parses("(= a = b)"), items(&["a", "b"]));
    }
}

mod values {
    use super::*;

    #[test]
    fn test_value_with_vector_primary() {
        let node = assert_parses("[<10, -7, 3>]");
        assert_eq!(node, Node::Value(Value::new(vec![10.0, -7.0, 3.0])));
    }

    #[test]
    fn test_value_attributes_lowercase_single_letters() {
        let Node::Value(value) = assert_parses("[<1, 2, 3>, T, <0, 4>, GROUP, 2]") else {
            panic!("expected a value");
        };
        assert_eq!(value.attribute("t"), Some(&Node::Vector(vec![0.0, 4.0])));
        assert_eq!(value.attribute("GROUP"), Some(&word("2")));
    }

    #[test]
    fn test_value_marker() {
        let node = assert_parses("[T]");
        assert!(node.is_texture_marker());
    }

    #[test]
    fn test_value_numeric_word_primary() {
        let node = assert_parses("[5]");
        assert_eq!(node, Node::Value(Value::new(vec![5.0])));
    }

    #[test]
    fn test_empty_value() {
        assert_error_code("[]", ErrorCode::E101);
    }

    #[test]
    fn test_dangling_attribute_key() {
        let diag = assert_error_code("[<1>, c]", ErrorCode::E101);
        assert!(diag.message().contains("`c`"));
    }
}

mod brackets {
    use super::*;

    #[test]
    fn test_mismatched_bracket() {
        let diag = assert_error_code("(a, b]", ErrorCode::E102);
        assert_eq!(diag.labels()[0].span(), Span::new(5..6));
        assert_eq!(diag.labels()[1].span(), Span::new(0..1));
    }

    #[test]
    fn test_unclosed_bracket() {
        assert_error_code("(a, (b)", ErrorCode::E101);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_error_code("MATERIAL MIP = \"abc", ErrorCode::E001);
    }
}

mod polygons {
    use super::*;

    #[test]
    fn test_poly() {
        let node = assert_parses("POLY red.c {p1, p2, p3}");
        assert_eq!(
            node,
            Node::Poly(Polygon {
                textured: false,
                color: Box::new(word("red.c")),
                vertices: vec![word("p1"), word("p2"), word("p3")],
            })
        );
    }

    #[test]
    fn test_textured_poly_markers() {
        for value in ["POLY T c {a, b}", "POLY (T) c {a, b}", "POLY [T] c (a, b)"] {
            let Node::Poly(poly) = assert_parses(value) else {
                panic!("expected a polygon for `{value}`");
            };
            assert!(poly.textured, "`{value}` should be textured");
        }
    }

    #[test]
    fn test_texture_marker_is_not_a_colour() {
        for value in ["POLY T {a, b, c}", "LINE [T] (a, b)"] {
            let diag = assert_error_code(value, ErrorCode::E101);
            assert!(diag.message().ends_with("has no colour"), "{diag}");
        }
    }

    #[test]
    fn test_line() {
        assert!(matches!(assert_parses("LINE c (a, b)"), Node::Line(_)));
    }

    #[test]
    fn test_poly_inline_color() {
        let Node::Poly(poly) = assert_parses("POLY <5> {a, b, c}") else {
            panic!("expected a polygon");
        };
        assert_eq!(*poly.color, Node::Vector(vec![5.0]));
    }

    #[test]
    fn test_poly_needs_two_items() {
        assert_error_code("POLY {a, b}", ErrorCode::E101);
    }

    #[test]
    fn test_poly_vertices_must_be_sequence() {
        assert_error_code("POLY c v", ErrorCode::E100);
    }

    #[test]
    fn test_brace_group_ends_polygon() {
        let Node::Items(list) = assert_parses("(POLY c {a, b, c}, other)") else {
            panic!("expected a sequence");
        };
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], word("other"));
    }
}

mod material {
    use super::*;

    #[test]
    fn test_material_with_group_and_mip() {
        let Node::Material(material) = assert_parses("MATERIAL GROUP = 1, MIP = \"GRASS\", poly")
        else {
            panic!("expected a material");
        };
        assert_eq!(material.group, Some(1));
        assert_eq!(material.mip.as_deref(), Some("GRASS"));
        assert_eq!(*material.child, word("poly"));
    }

    #[test]
    fn test_material_either_order() {
        let Node::Material(material) = assert_parses("MATERIAL MIP = \"OK\" GROUP = 3 child")
        else {
            panic!("expected a material");
        };
        assert_eq!(material.group, Some(3));
        assert_eq!(material.mip.as_deref(), Some("OK"));
    }

    #[test]
    fn test_material_child_keyword() {
        let Node::Material(material) = assert_parses("MATERIAL GROUP = 0 POLY c {a, b, c}")
        else {
            panic!("expected a material");
        };
        assert!(matches!(*material.child, Node::Poly(_)));
    }

    #[test]
    fn test_mip_filename_too_long() {
        let diag = assert_error_code("MATERIAL MIP = \"TOOLONGNAME\" x", ErrorCode::E300);
        assert!(diag.help().is_some());
    }

    #[test]
    fn test_mip_eight_characters_is_fine() {
        assert_parses("MATERIAL MIP = \"ABCDEFGH\" x");
    }

    #[test]
    fn test_material_missing_child() {
        assert_error_code("MATERIAL GROUP = 1", ErrorCode::E101);
    }

    #[test]
    fn test_material_repeated_group() {
        assert_error_code("MATERIAL GROUP = 1 GROUP = 2 x", ErrorCode::E100);
    }

    #[test]
    fn test_material_group_must_be_integer() {
        assert_error_code("MATERIAL GROUP = grass x", ErrorCode::E103);
    }
}

mod dynamic {
    use super::*;

    #[test]
    fn test_dynamic() {
        let Node::Dynamic(dynamic) =
            assert_parses("DYNAMIC 1, 2, 3, 900, 0, -450, 7, EXTERN = \"CAR\"")
        else {
            panic!("expected a dynamic");
        };
        assert_eq!(dynamic.fields, [1.0, 2.0, 3.0, 900.0, 0.0, -450.0, 7.0]);
        assert_eq!(dynamic.external, "CAR");
    }

    #[test]
    fn test_dynamic_with_seven_items() {
        let diag = assert_error_code("DYNAMIC 1, 2, 3, 4, 5, 6, EXTERN = \"CAR\"", ErrorCode::E200);
        assert!(diag.message().contains("found 7"));
    }

    #[test]
    fn test_dynamic_without_extern() {
        assert_error_code("DYNAMIC 1, 2, 3, 4, 5, 6, 7, 8", ErrorCode::E101);
    }

    #[test]
    fn test_dynamic_extern_too_long() {
        assert_error_code(
            "DYNAMIC 1, 2, 3, 4, 5, 6, 7, EXTERN = \"LONGNAME1\"",
            ErrorCode::E300,
        );
    }

    #[test]
    fn test_dynamic_non_numeric_field() {
        assert_error_code("DYNAMIC 1, 2, x, 4, 5, 6, 7, EXTERN = \"CAR\"", ErrorCode::E103);
    }
}

mod switch {
    use super::*;

    #[test]
    fn test_switch_distance() {
        let Node::Switch(switch) =
            assert_parses("SWITCH DISTANCE (origin) R ((100, R, near), (400.7, R, far))")
        else {
            panic!("expected a switch");
        };
        assert_eq!(*switch.origin, word("origin"));
        assert_eq!(switch.symbol, "R");
        assert_eq!(switch.entries.len(), 2);
        assert_eq!(switch.entries[0].distance, 100);
        assert_eq!(switch.entries[0].target, word("near"));
        assert_eq!(switch.entries[1].distance, 400);
        assert_eq!(switch.entries[1].target, word("far"));
    }

    #[test]
    fn test_switch_two_item_entries() {
        let Node::Switch(switch) = assert_parses("SWITCH DISTANCE o R ((10, a))") else {
            panic!("expected a switch");
        };
        assert_eq!(switch.entries[0].target, word("a"));
    }

    #[test]
    fn test_switch_requires_distance() {
        assert_error_code("SWITCH SIZE o R ((10, a))", ErrorCode::E200);
    }

    #[test]
    fn test_switch_short_entry() {
        assert_error_code("SWITCH DISTANCE o R ((10))", ErrorCode::E200);
    }
}

mod bsp {
    use super::*;

    #[test]
    fn test_bsp_child_counts() {
        let cases = [
            ("FACE (p1, p2, p3), a", BspKind::Face),
            ("BSPF (p1, p2, p3), a, b, c", BspKind::BspFace),
            ("BSPN (p1, p2, p3), a, b", BspKind::BspNormal),
            ("BSPA (p1, p2, p3), a, b, c", BspKind::BspAngled),
            ("FACE2 (p1, p2, p3), a, b", BspKind::Face2),
            ("BSP2 (p1, p2, p3), a, b, c, d", BspKind::Bsp2),
        ];
        for (value, kind) in cases {
            let Node::Bsp(bsp) = assert_parses(value) else {
                panic!("expected a split for `{value}`");
            };
            assert_eq!(bsp.kind, kind);
            assert_eq!(bsp.children.len(), kind.child_count());
            assert_eq!(bsp.planes[2], word("p3"));
        }
    }

    #[test]
    fn test_bspf_with_two_planes() {
        let diag = assert_error_code("BSPF (p1, p2), a, b, c", ErrorCode::E200);
        assert!(diag.message().contains("found 2"));
    }

    #[test]
    fn test_bsp_missing_children() {
        let diag = assert_error_code("BSP2 (p1, p2, p3), a, b", ErrorCode::E200);
        assert!(diag.message().contains("expects 4"));
    }

    #[test]
    fn test_nested_bsp() {
        let Node::Bsp(outer) = assert_parses("BSPN (a, b, c) BSPN (d, e, f) x y z") else {
            panic!("expected a split");
        };
        assert!(matches!(outer.children[0], Node::Bsp(_)));
        assert_eq!(outer.children[1], word("z"));
    }
}

mod containers {
    use super::*;

    #[test]
    fn test_list() {
        assert_eq!(
            assert_parses("LIST {a, b}"),
            Node::List(vec![word("a"), word("b")])
        );
    }

    #[test]
    fn test_list_of_polygons_keeps_every_entry() {
        let Node::List(items) = assert_parses("LIST (POLY c {a, b, c}, POLY d {d, e, f})") else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_brace_group_closes_list_early() {
        assert_eq!(
            assert_parses("LIST ({a} b)"),
            Node::List(vec![Node::Items(vec![word("a")])])
        );
    }

    #[test]
    fn test_list_requires_sequence() {
        assert_error_code("LIST a", ErrorCode::E100);
    }

    #[test]
    fn test_super_object() {
        let Node::SuperObject(object) = assert_parses("SUPEROBJ ptr (a, b)") else {
            panic!("expected a super object");
        };
        assert_eq!(*object.pointer, word("ptr"));
        assert_eq!(object.children.len(), 2);
    }

    #[test]
    fn test_data_and_dyno() {
        assert_eq!(assert_parses("DATA (1, -2, 3)"), Node::Data(vec![1, -2, 3]));
        assert_eq!(assert_parses("DYNO <4, 5>"), Node::Dyno(vec![4, 5]));
    }

    #[test]
    fn test_data_rejects_fractions() {
        assert_error_code("DATA (1, 2.5)", ErrorCode::E103);
        assert_error_code("DYNO <1.5>", ErrorCode::E103);
    }
}
