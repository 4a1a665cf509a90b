//! End-to-end elaboration scenarios.

use ctf_elab::ast::{
    AstNode, CtfExpression, Declarator, DeclaratorEntry, EnumeratorNode, Link, LinkedUnaryExpr,
    Specifier, TraceChild, TypeSpecifierKind, TypeSpecifierNode, UnaryExpr,
};
use ctf_elab::{ByteOrder, Declaration, Error, Trace, construct_metadata};

fn expr(key: &str, val: UnaryExpr) -> CtfExpression {
    CtfExpression {
        left: vec![LinkedUnaryExpr {
            expr: UnaryExpr::String(key.to_string()),
            link: Link::None,
        }],
        right: vec![LinkedUnaryExpr { expr: val, link: Link::None }],
    }
}

fn unsigned(v: u64) -> UnaryExpr {
    UnaryExpr::UnsignedConstant(v)
}

fn string(v: &str) -> UnaryExpr {
    UnaryExpr::String(v.to_string())
}

fn type_id(name: &str) -> Specifier {
    Specifier::TypeSpecifier(TypeSpecifierNode {
        kind: TypeSpecifierKind::TypeId,
        id_type: Some(name.to_string()),
    })
}

fn id_declarator(name: &str) -> Declarator {
    Declarator::Id {
        name: Some(name.to_string()),
        pointers: vec![],
        bitfield_len: None,
    }
}

fn field(specifiers: Vec<Specifier>, names: &[&str]) -> AstNode {
    AstNode::FieldDeclaration {
        specifiers,
        declarators: names
            .iter()
            .map(|n| DeclaratorEntry { declarator: id_declarator(n) })
            .collect(),
    }
}

fn typealias_integer(alias: &str, size: u64, signed: bool, align: Option<u64>) -> AstNode {
    let mut attrs = vec![expr("size", unsigned(size)), expr("signed", string(if signed { "true" } else { "false" }))];
    if let Some(a) = align {
        attrs.push(expr("align", unsigned(a)));
    }
    AstNode::Typealias {
        target: (vec![Specifier::Integer(attrs)], None),
        alias: (
            vec![type_id(alias)],
            Declarator::Id {
                name: None,
                pointers: vec![],
                bitfield_len: None,
            },
        ),
    }
}

fn empty_trace() -> Trace {
    Trace::new(ByteOrder::Le)
}

#[test]
fn s1_integer_alias_and_struct() {
    let root = AstNode::Root {
        decls: vec![
            typealias_integer("uint32_t", 32, false, Some(32)),
            AstNode::SpecifierDecl(vec![Specifier::Struct {
                name: Some("hdr".into()),
                has_body: true,
                decls: vec![
                    field(vec![type_id("uint32_t")], &["magic"]),
                    field(vec![type_id("uint32_t")], &["version"]),
                ],
            }]),
        ],
        traces: vec![AstNode::Trace {
            children: vec![
                TraceChild::Expression(expr("major", unsigned(1))),
                TraceChild::Expression(expr("minor", unsigned(8))),
                TraceChild::Expression(expr(
                    "uuid",
                    string("11111111-2222-3333-4444-555555555555"),
                )),
                TraceChild::Expression(expr("word_size", unsigned(64))),
            ],
        }],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    construct_metadata(&root, &mut trace, ByteOrder::Le).expect("elaboration succeeds");

    assert_eq!(trace.major, Some(1));
    assert_eq!(trace.minor, Some(8));
    assert_eq!(trace.word_size, Some(64));
    assert_eq!(
        trace.uuid,
        Some(*uuid::Uuid::parse_str("11111111-2222-3333-4444-555555555555").unwrap().as_bytes())
    );

    let uint32_id = trace.names.intern("uint32_t");
    let alias = trace.root_scope.lookup_type_alias(uint32_id).expect("uint32_t alias present");
    match alias {
        Declaration::Integer(i) => {
            assert_eq!(i.size_bits, 32);
            assert!(!i.signed);
            assert_eq!(i.align_bits, 32);
            assert_eq!(i.byte_order, ByteOrder::Le);
        }
        other => panic!("expected integer, got {other:?}"),
    }

    let hdr_id = trace.names.intern("hdr");
    let hdr = trace.root_scope.lookup_struct(hdr_id).expect("hdr struct present");
    assert_eq!(hdr.fields.len(), 2);
    assert_eq!(hdr.fields[0].0, trace.names.intern("magic"));
    assert_eq!(hdr.fields[1].0, trace.names.intern("version"));
}

#[test]
fn s2_enum_on_unsigned_container() {
    let root = AstNode::Root {
        decls: vec![
            typealias_integer("uint8_t", 8, false, None),
            AstNode::SpecifierDecl(vec![Specifier::Enum {
                id: Some("state".into()),
                container: vec![type_id("uint8_t")],
                enumerators: vec![
                    EnumeratorNode { name: "IDLE".into(), values: vec![unsigned(0)] },
                    EnumeratorNode {
                        name: "RUN".into(),
                        values: vec![unsigned(1), unsigned(3)],
                    },
                    EnumeratorNode { name: "ERR".into(), values: vec![unsigned(255)] },
                ],
                has_body: true,
            }]),
        ],
        traces: vec![],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    construct_metadata(&root, &mut trace, ByteOrder::Le).expect("elaboration succeeds");

    let state_id = trace.names.intern("state");
    let en = trace.root_scope.lookup_enum(state_id).expect("state enum present");
    assert_eq!(en.container.size_bits, 8);
    assert!(!en.container.signed);

    let idle = trace.names.intern("IDLE");
    let run = trace.names.intern("RUN");
    let err = trace.names.intern("ERR");
    assert_eq!(en.name_for(0), Some(idle));
    assert_eq!(en.name_for(2), Some(run));
    assert_eq!(en.name_for(3), Some(run));
    assert_eq!(en.name_for(255), Some(err));
    assert_eq!(en.name_for(4), None);
}

#[test]
fn s3_variant_with_tag() {
    let payload_specifier = Specifier::Variant {
        name: Some("v".into()),
        choice: Some("tag".into()),
        has_body: true,
        decls: vec![
            field(vec![type_id("uint32_t")], &["a"]),
            field(vec![Specifier::String(vec![])], &["b"]),
        ],
    };

    let root = AstNode::Root {
        decls: vec![
            typealias_integer("uint32_t", 32, false, None),
            AstNode::SpecifierDecl(vec![Specifier::Struct {
                name: Some("ev".into()),
                has_body: true,
                decls: vec![
                    field(vec![type_id("uint32_t")], &["tag"]),
                    AstNode::FieldDeclaration {
                        specifiers: vec![payload_specifier],
                        declarators: vec![DeclaratorEntry { declarator: id_declarator("payload") }],
                    },
                ],
            }]),
        ],
        traces: vec![],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    construct_metadata(&root, &mut trace, ByteOrder::Le).expect("elaboration succeeds");

    let ev_id = trace.names.intern("ev");
    let ev = trace.root_scope.lookup_struct(ev_id).expect("ev struct present");
    assert_eq!(ev.fields.len(), 2);
    assert_eq!(ev.fields[0].0, trace.names.intern("tag"));
    assert_eq!(ev.fields[1].0, trace.names.intern("payload"));

    match &ev.fields[1].1 {
        Declaration::Variant(v) => {
            assert_eq!(v.tag_selector_path, trace.names.intern("tag"));
            assert_eq!(v.untagged.fields.len(), 2);
            assert_eq!(v.untagged.fields[0].0, trace.names.intern("a"));
            assert_eq!(v.untagged.fields[1].0, trace.names.intern("b"));
        }
        other => panic!("expected a tagged variant, got {other:?}"),
    }
}

#[test]
fn s4_missing_mandatory_uuid() {
    let root = AstNode::Root {
        decls: vec![],
        traces: vec![AstNode::Trace {
            children: vec![
                TraceChild::Expression(expr("major", unsigned(1))),
                TraceChild::Expression(expr("minor", unsigned(8))),
                TraceChild::Expression(expr("word_size", unsigned(64))),
            ],
        }],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    let err = construct_metadata(&root, &mut trace, ByteOrder::Le).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingMandatory { entity: "trace", field: "uuid" }
    ));
}

#[test]
fn s5_pointer_without_alias() {
    let root = AstNode::Root {
        decls: vec![AstNode::SpecifierDecl(vec![Specifier::Struct {
            name: Some("s".into()),
            has_body: true,
            decls: vec![AstNode::FieldDeclaration {
                specifiers: vec![type_id("int")],
                declarators: vec![DeclaratorEntry {
                    declarator: Declarator::Id {
                        name: Some("p".into()),
                        pointers: vec![ctf_elab::ast::PointerQualifier { const_qualifier: false }],
                        bitfield_len: None,
                    },
                }],
            }],
        }])],
        traces: vec![],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    let err = construct_metadata(&root, &mut trace, ByteOrder::Le).unwrap_err();
    match err {
        Error::Undefined { name, kind } => {
            assert_eq!(name, "int *");
            assert_eq!(kind, "pointer alias");
        }
        other => panic!("expected Undefined, got {other:?}"),
    }
}

#[test]
fn s6_duplicate_field() {
    let root = AstNode::Root {
        decls: vec![
            typealias_integer("uint32_t", 32, false, None),
            AstNode::SpecifierDecl(vec![Specifier::Struct {
                name: Some("s".into()),
                has_body: true,
                decls: vec![
                    field(vec![type_id("uint32_t")], &["x"]),
                    field(vec![type_id("uint32_t")], &["x"]),
                ],
            }]),
        ],
        traces: vec![],
        streams: vec![],
        events: vec![],
    };

    let mut trace = empty_trace();
    let err = construct_metadata(&root, &mut trace, ByteOrder::Le).unwrap_err();
    assert!(matches!(err, Error::AlreadyDefined { kind: "field", .. }));
}
