//! Top-level visitor (§4.7): root → trace → stream → event.
//!
//! [`construct_metadata`] is the crate's one public entry point (§6.2).

use crate::ast::{AstNode, EventChild, StreamChild, TraceChild};
use crate::config::ElaborationOptions;
use crate::context::Ctx;
use crate::decl::{ByteOrder, StructDecl};
use crate::definition::Instantiate;
use crate::error::Error;
use crate::scope::DeclarationScope;
use crate::specifier::{coerce_string, coerce_unsigned, sole_right, visit_specifiers};
use crate::trace::{Event, Stream, Trace, grow_and_set};
use crate::typedef::{handle_typealias, handle_typedef};
use std::rc::Rc;

/// Elaborate `ast_root` into `trace`, using `byte_order` as the trace's
/// default byte order for attributes that say `"native"`.
///
/// Precondition: `trace` is freshly constructed ([`Trace::new`]) and has
/// not yet been populated. On error, `trace` is left in a partially
/// populated state — the caller should discard it (§7 propagation policy).
pub fn construct_metadata(ast_root: &AstNode, trace: &mut Trace, byte_order: ByteOrder) -> Result<(), Error> {
    construct_metadata_with_options(ast_root, trace, byte_order, &ElaborationOptions::default())
}

/// Same as [`construct_metadata`], but applies `options` first:
/// `options.byte_order_override` takes precedence over `byte_order` when
/// present, and `options.strict_unknown_attributes` controls whether an
/// unrecognized integer/float/string attribute name (§4.6) is an error or
/// silently skipped.
pub fn construct_metadata_with_options(
    ast_root: &AstNode,
    trace: &mut Trace,
    byte_order: ByteOrder,
    options: &ElaborationOptions,
) -> Result<(), Error> {
    let byte_order = options.byte_order_override.map(ByteOrder::from).unwrap_or(byte_order);
    trace.byte_order = byte_order;
    let names = std::mem::take(&mut trace.names);
    let mut ctx = Ctx {
        names,
        trace_byte_order: byte_order,
        strict_unknown_attributes: options.strict_unknown_attributes,
    };
    let result = construct_metadata_inner(ast_root, &mut ctx, trace);
    trace.names = ctx.names;
    result
}

fn construct_metadata_inner(ast_root: &AstNode, ctx: &mut Ctx, trace: &mut Trace) -> Result<(), Error> {
    let root_scope = trace.root_scope.clone();

    let (decls, traces, streams, events) = match ast_root {
        AstNode::Root {
            decls,
            traces,
            streams,
            events,
        } => (decls, traces, streams, events),
        other => {
            return Err(Error::InvalidStructure {
                context: "root",
                reason: format!("expected a Root node, got {other:?}"),
            });
        }
    };

    for decl in decls {
        match decl {
            AstNode::Typedef {
                specifiers,
                declarators,
            } => handle_typedef(ctx, &root_scope, specifiers, declarators)?,
            AstNode::Typealias { target, alias } => {
                handle_typealias(ctx, &root_scope, target, alias)?
            }
            AstNode::SpecifierDecl(_) => {}
            other => {
                return Err(Error::InvalidStructure {
                    context: "root declaration",
                    reason: format!("unexpected child node {other:?}"),
                });
            }
        }
    }
    for decl in decls {
        if let AstNode::SpecifierDecl(specifiers) = decl {
            visit_specifiers(ctx, &root_scope, specifiers)?;
        }
    }

    for (i, t) in traces.iter().enumerate() {
        if i > 0 {
            return Err(Error::AlreadyDefined {
                name: "trace".into(),
                kind: "trace",
            });
        }
        handle_trace(ctx, trace, t)?;
    }

    for s in streams {
        handle_stream(ctx, trace, &root_scope, s)?;
    }
    for e in events {
        handle_event(ctx, trace, &root_scope, e)?;
    }

    tracing::info!(
        streams = trace.streams.iter().filter(|s| s.is_some()).count(),
        "trace elaboration complete"
    );
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, entity: &'static str, field: &'static str) -> Result<(), Error> {
    if slot.is_some() {
        return Err(Error::AlreadyDefined {
            name: field.to_string(),
            kind: entity,
        });
    }
    *slot = Some(value);
    Ok(())
}

fn parse_unsigned_field(expr: &crate::ast::CtfExpression, field: &'static str) -> Result<u64, Error> {
    coerce_unsigned(field, expr)
}

fn parse_string_field(expr: &crate::ast::CtfExpression, field: &'static str) -> Result<String, Error> {
    coerce_string(field, expr)
}

fn parse_uuid_field(expr: &crate::ast::CtfExpression, field: &'static str) -> Result<[u8; 16], Error> {
    let raw = match sole_right(field, expr)? {
        crate::ast::UnaryExpr::String(s) => s.clone(),
        _ => {
            return Err(Error::InvalidAttribute {
                attr: field.into(),
                reason: "expected a string".into(),
            });
        }
    };
    let parsed = uuid::Uuid::parse_str(&raw).map_err(|_| Error::ParseValue {
        kind: "uuid",
        raw: raw.clone(),
    })?;
    Ok(*parsed.as_bytes())
}

fn handle_trace(ctx: &mut Ctx, trace: &mut Trace, node: &AstNode) -> Result<(), Error> {
    let children = match node {
        AstNode::Trace { children } => children,
        other => {
            return Err(Error::InvalidStructure {
                context: "trace block",
                reason: format!("expected a Trace node, got {other:?}"),
            });
        }
    };

    let scope = DeclarationScope::new(Some(trace.root_scope.clone()));

    let mut major = None;
    let mut minor = None;
    let mut word_size = None;
    let mut uuid = None;

    for child in children {
        match child {
            TraceChild::Typedef {
                specifiers,
                declarators,
            } => handle_typedef(ctx, &scope, specifiers, declarators)?,
            TraceChild::Typealias { target, alias } => handle_typealias(ctx, &scope, target, alias)?,
            TraceChild::Expression(expr) => match expr.left_as_str().as_str() {
                "major" => set_once(&mut major, parse_unsigned_field(expr, "major")?, "trace", "major")?,
                "minor" => set_once(&mut minor, parse_unsigned_field(expr, "minor")?, "trace", "minor")?,
                "word_size" => set_once(
                    &mut word_size,
                    parse_unsigned_field(expr, "word_size")?,
                    "trace",
                    "word_size",
                )?,
                "uuid" => set_once(&mut uuid, parse_uuid_field(expr, "uuid")?, "trace", "uuid")?,
                other => {
                    return Err(Error::InvalidAttribute {
                        attr: other.to_string(),
                        reason: "unknown trace field".into(),
                    });
                }
            },
        }
    }

    trace.trace_scope = Some(scope);
    trace.major = Some(major.ok_or(Error::MissingMandatory {
        entity: "trace",
        field: "major",
    })?);
    trace.minor = Some(minor.ok_or(Error::MissingMandatory {
        entity: "trace",
        field: "minor",
    })?);
    trace.uuid = Some(uuid.ok_or(Error::MissingMandatory {
        entity: "trace",
        field: "uuid",
    })?);
    trace.word_size = Some(word_size.ok_or(Error::MissingMandatory {
        entity: "trace",
        field: "word_size",
    })?);
    tracing::debug!("trace block elaborated");
    Ok(())
}

fn require_struct(decl: crate::decl::Declaration, context: &'static str) -> Result<Rc<StructDecl>, Error> {
    decl.as_struct().cloned().ok_or(Error::InvalidStructure {
        context,
        reason: "expected a struct declaration".into(),
    })
}

fn handle_stream(
    ctx: &mut Ctx,
    trace: &mut Trace,
    root_scope: &Rc<DeclarationScope>,
    node: &AstNode,
) -> Result<(), Error> {
    let children = match node {
        AstNode::Stream { children } => children,
        other => {
            return Err(Error::InvalidStructure {
                context: "stream block",
                reason: format!("expected a Stream node, got {other:?}"),
            });
        }
    };

    let scope = DeclarationScope::new(Some(root_scope.clone()));
    let mut stream = Stream::new(0, scope.clone());
    let mut stream_id = None;

    for child in children {
        match child {
            StreamChild::Typedef {
                specifiers,
                declarators,
            } => handle_typedef(ctx, &scope, specifiers, declarators)?,
            StreamChild::Typealias { target, alias } => handle_typealias(ctx, &scope, target, alias)?,
            StreamChild::Expression(expr) => match expr.left_as_str().as_str() {
                "stream_id" => set_once(
                    &mut stream_id,
                    parse_unsigned_field(expr, "stream_id")?,
                    "stream",
                    "stream_id",
                )?,
                "packet.context" => {
                    let decl = resolve_bare_expression_type(ctx, &scope, expr)?;
                    stream.packet_context = Some(require_struct(decl, "stream packet.context")?);
                }
                "event.header" => {
                    let decl = resolve_bare_expression_type(ctx, &scope, expr)?;
                    stream.event_header = Some(require_struct(decl, "stream event.header")?);
                }
                "event.context" => {
                    let decl = resolve_bare_expression_type(ctx, &scope, expr)?;
                    stream.event_context = Some(require_struct(decl, "stream event.context")?);
                }
                other => {
                    return Err(Error::InvalidAttribute {
                        attr: other.to_string(),
                        reason: "unknown stream field".into(),
                    });
                }
            },
        }
    }

    let stream_id = stream_id.ok_or(Error::MissingMandatory {
        entity: "stream",
        field: "stream_id",
    })?;
    stream.stream_id = stream_id;

    let mut parent_def = None;
    if let Some(d) = &stream.packet_context {
        let def = crate::decl::Declaration::Struct(d.clone()).instantiate(parent_def.as_ref(), 0, 0);
        parent_def = Some(def.clone());
        stream.packet_context_def = Some(def);
    }
    if let Some(d) = &stream.event_header {
        let def = crate::decl::Declaration::Struct(d.clone()).instantiate(parent_def.as_ref(), 0, 0);
        parent_def = Some(def.clone());
        stream.event_header_def = Some(def);
    }
    if let Some(d) = &stream.event_context {
        let def = crate::decl::Declaration::Struct(d.clone()).instantiate(parent_def.as_ref(), 0, 0);
        stream.event_context_def = Some(def);
    }

    tracing::debug!(stream_id, "stream block elaborated");
    grow_and_set(&mut trace.streams, stream_id as usize, stream);
    Ok(())
}

fn handle_event(
    ctx: &mut Ctx,
    trace: &mut Trace,
    root_scope: &Rc<DeclarationScope>,
    node: &AstNode,
) -> Result<(), Error> {
    let children = match node {
        AstNode::Event { children } => children,
        other => {
            return Err(Error::InvalidStructure {
                context: "event block",
                reason: format!("expected an Event node, got {other:?}"),
            });
        }
    };

    let scope = DeclarationScope::new(Some(root_scope.clone()));

    let mut name = None;
    let mut id = None;
    let mut stream_id = None;
    let mut context: Option<Rc<StructDecl>> = None;
    let mut fields: Option<Rc<StructDecl>> = None;

    for child in children {
        match child {
            EventChild::Typedef {
                specifiers,
                declarators,
            } => handle_typedef(ctx, &scope, specifiers, declarators)?,
            EventChild::Typealias { target, alias } => handle_typealias(ctx, &scope, target, alias)?,
            EventChild::Expression(expr) => match expr.left_as_str().as_str() {
                "name" => set_once(&mut name, parse_string_field(expr, "name")?, "event", "name")?,
                "id" => set_once(&mut id, parse_unsigned_field(expr, "id")?, "event", "id")?,
                "stream_id" => set_once(
                    &mut stream_id,
                    parse_unsigned_field(expr, "stream_id")?,
                    "event",
                    "stream_id",
                )?,
                "context" => {
                    let decl = resolve_bare_expression_type(ctx, &scope, expr)?;
                    context = Some(require_struct(decl, "event context")?);
                }
                "fields" => {
                    let decl = resolve_bare_expression_type(ctx, &scope, expr)?;
                    fields = Some(require_struct(decl, "event fields")?);
                }
                other => {
                    return Err(Error::InvalidAttribute {
                        attr: other.to_string(),
                        reason: "unknown event field".into(),
                    });
                }
            },
        }
    }

    let name = name.ok_or(Error::MissingMandatory {
        entity: "event",
        field: "name",
    })?;
    let id = id.ok_or(Error::MissingMandatory {
        entity: "event",
        field: "id",
    })?;
    let stream_id = stream_id.ok_or(Error::MissingMandatory {
        entity: "event",
        field: "stream_id",
    })?;

    let stream = trace
        .streams
        .get_mut(stream_id as usize)
        .and_then(|s| s.as_mut())
        .ok_or(Error::Undefined {
            name: stream_id.to_string(),
            kind: "stream",
        })?;

    let parent_def = stream
        .event_context_def
        .clone()
        .or_else(|| stream.event_header_def.clone())
        .or_else(|| stream.packet_context_def.clone());

    let context_def = context
        .as_ref()
        .map(|d| crate::decl::Declaration::Struct(d.clone()).instantiate(parent_def.as_ref(), 0, 0));
    let fields_def = fields
        .as_ref()
        .map(|d| crate::decl::Declaration::Struct(d.clone()).instantiate(context_def.as_ref().or(parent_def.as_ref()), 0, 0));

    let name_id = ctx.names.intern(&name);
    let event = Event {
        name: name_id,
        id,
        stream_id,
        context,
        fields,
        context_def,
        fields_def,
    };

    tracing::debug!(id, stream_id, "event block elaborated");
    grow_and_set(&mut stream.events_by_id, id as usize, event);
    stream.name_to_id.insert(name_id, id);
    Ok(())
}

/// `packet.context = struct { ... };`-shaped expressions carry their type
/// as an inline specifier list rather than a plain value; the AST contract
/// represents that as a `CtfExpression` whose right-hand side is itself a
/// bare reference resolved the same way a field declarator's specifier is.
fn resolve_bare_expression_type(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    expr: &crate::ast::CtfExpression,
) -> Result<crate::decl::Declaration, Error> {
    let name = match sole_right(&expr.left_as_str(), expr)? {
        crate::ast::UnaryExpr::String(s) => s.clone(),
        _ => {
            return Err(Error::InvalidStructure {
                context: "struct-valued expression",
                reason: "expected a type-identifier reference".into(),
            });
        }
    };
    let id = ctx.names.intern(&name);
    scope.lookup_type_alias(id).ok_or(Error::Undefined {
        name,
        kind: "type alias",
    })
}
