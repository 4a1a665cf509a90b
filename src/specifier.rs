//! Declaration-specifier visitor (§4.6).
//!
//! Dispatches on the **first** element of a specifier list. A comment in
//! the original C visitor notes "we are only taking the first one" for
//! this dispatch; this crate preserves that exact behavior rather than
//! trying to merge multiple specifiers (see DESIGN.md, Open Question 1).

use std::rc::Rc;

use crate::ast::{CtfExpression, Specifier, SpecifierList, TypeSpecifierKind, UnaryExpr};
use crate::context::Ctx;
use crate::decl::{
    ByteOrder, Declaration, FloatDecl, IntegerDecl, StringDecl, StringEncoding, default_align_bits,
};
use crate::error::Error;
use crate::scope::DeclarationScope;

/// Visit a declaration-specifier list and produce the base declaration it
/// names (§4.6). `STRUCT`/`VARIANT`/`ENUM` delegate to the aggregate
/// builders (§4.5); a bare `TYPE_SPECIFIER` does an alias lookup.
pub fn visit_specifiers(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    specifiers: &SpecifierList,
) -> Result<Declaration, Error> {
    let first = specifiers.first().ok_or(Error::InvalidStructure {
        context: "declaration specifier list",
        reason: "empty specifier list".into(),
    })?;

    match first {
        Specifier::Struct {
            name,
            decls,
            has_body,
        } => crate::aggregate::build_struct(ctx, scope, name.as_deref(), decls, *has_body)
            .map(Declaration::Struct),
        Specifier::Variant {
            name,
            choice,
            decls,
            has_body,
        } => crate::aggregate::build_variant(
            ctx,
            scope,
            name.as_deref(),
            choice.as_deref(),
            decls,
            *has_body,
        ),
        Specifier::Enum {
            id,
            container,
            enumerators,
            has_body,
        } => crate::aggregate::build_enum(ctx, scope, id.as_deref(), container, enumerators, *has_body)
            .map(Declaration::Enum),
        Specifier::Integer(attrs) => visit_integer(ctx, attrs).map(Declaration::Integer),
        Specifier::Float(attrs) => visit_float(ctx, attrs).map(Declaration::Float),
        Specifier::String(attrs) => visit_string(ctx, attrs).map(Declaration::String),
        Specifier::TypeSpecifier(node) => visit_type_specifier_reference(ctx, scope, node),
    }
}

/// `struct S` / `variant V` / `enum E` referenced without a body, or a bare
/// type-identifier: concatenate specifier tokens with single spaces, intern,
/// and look the result up as a type alias (§4.5 "type-specifier lookup").
fn visit_type_specifier_reference(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    node: &crate::ast::TypeSpecifierNode,
) -> Result<Declaration, Error> {
    let text = match node.kind {
        TypeSpecifierKind::Struct => format!("struct {}", node.id_type.as_deref().unwrap_or("")),
        TypeSpecifierKind::Variant => format!("variant {}", node.id_type.as_deref().unwrap_or("")),
        TypeSpecifierKind::Enum => format!("enum {}", node.id_type.as_deref().unwrap_or("")),
        TypeSpecifierKind::TypeId => node.id_type.clone().unwrap_or_default(),
    };
    let id = ctx.names.intern(&text);
    scope.lookup_type_alias(id).ok_or(Error::Undefined {
        name: text,
        kind: "type alias",
    })
}

fn visit_integer(ctx: &mut Ctx, attrs: &[CtfExpression]) -> Result<Rc<IntegerDecl>, Error> {
    let mut signed = false;
    let mut byte_order: Option<ByteOrder> = None;
    let mut size: Option<u64> = None;
    let mut align: Option<u64> = None;

    for attr in attrs {
        let key = attr.left_as_str();
        match key.as_str() {
            "signed" => signed = coerce_bool(&key, attr)?,
            "byte_order" => byte_order = Some(coerce_byte_order(ctx, &key, attr)?),
            "size" => size = Some(coerce_unsigned(&key, attr)?),
            "align" => align = Some(coerce_unsigned(&key, attr)?),
            other if ctx.strict_unknown_attributes => {
                return Err(Error::InvalidAttribute {
                    attr: other.to_string(),
                    reason: "unknown integer attribute".into(),
                });
            }
            _ => {}
        }
    }

    let size_bits = size.ok_or_else(|| Error::InvalidAttribute {
        attr: "size".into(),
        reason: "mandatory attribute missing".into(),
    })?;
    let align_bits = align.unwrap_or_else(|| default_align_bits(size_bits));
    let byte_order = byte_order.unwrap_or(ctx.trace_byte_order);

    Ok(Rc::new(IntegerDecl {
        size_bits,
        byte_order,
        signed,
        align_bits,
    }))
}

fn visit_float(ctx: &mut Ctx, attrs: &[CtfExpression]) -> Result<Rc<FloatDecl>, Error> {
    let mut byte_order: Option<ByteOrder> = None;
    let mut exp_dig: Option<u64> = None;
    let mut mant_dig: Option<u64> = None;
    let mut align: Option<u64> = None;

    for attr in attrs {
        let key = attr.left_as_str();
        match key.as_str() {
            "byte_order" => byte_order = Some(coerce_byte_order(ctx, &key, attr)?),
            "exp_dig" => exp_dig = Some(coerce_unsigned(&key, attr)?),
            "mant_dig" => mant_dig = Some(coerce_unsigned(&key, attr)?),
            "align" => align = Some(coerce_unsigned(&key, attr)?),
            other if ctx.strict_unknown_attributes => {
                return Err(Error::InvalidAttribute {
                    attr: other.to_string(),
                    reason: "unknown floating_point attribute".into(),
                });
            }
            _ => {}
        }
    }

    let exp_dig = exp_dig.ok_or_else(|| Error::InvalidAttribute {
        attr: "exp_dig".into(),
        reason: "mandatory attribute missing".into(),
    })?;
    let mant_dig = mant_dig.ok_or_else(|| Error::InvalidAttribute {
        attr: "mant_dig".into(),
        reason: "mandatory attribute missing".into(),
    })?;
    let align_bits = align.unwrap_or_else(|| default_align_bits(exp_dig + mant_dig));
    let byte_order = byte_order.unwrap_or(ctx.trace_byte_order);

    Ok(Rc::new(FloatDecl {
        mant_dig,
        exp_dig,
        byte_order,
        align_bits,
    }))
}

fn visit_string(ctx: &Ctx, attrs: &[CtfExpression]) -> Result<Rc<StringDecl>, Error> {
    let mut encoding = StringEncoding::Utf8;
    for attr in attrs {
        let key = attr.left_as_str();
        match key.as_str() {
            "encoding" => {
                let s = coerce_string(&key, attr)?;
                encoding = if s == "ASCII" {
                    StringEncoding::Ascii
                } else {
                    StringEncoding::Utf8
                };
            }
            other if ctx.strict_unknown_attributes => {
                return Err(Error::InvalidAttribute {
                    attr: other.to_string(),
                    reason: "unknown string attribute".into(),
                });
            }
            _ => {}
        }
    }
    Ok(Rc::new(StringDecl { encoding }))
}

pub(crate) fn sole_right(key: &str, attr: &CtfExpression) -> Result<&UnaryExpr, Error> {
    match attr.right.as_slice() {
        [only] => Ok(&only.expr),
        _ => Err(Error::InvalidAttribute {
            attr: key.to_string(),
            reason: "expected a single value".into(),
        }),
    }
}

fn coerce_bool(key: &str, attr: &CtfExpression) -> Result<bool, Error> {
    match sole_right(key, attr)? {
        UnaryExpr::UnsignedConstant(v) => Ok(*v != 0),
        UnaryExpr::SignedConstant(v) => Ok(*v != 0),
        UnaryExpr::String(s) => match s.as_str() {
            "true" | "TRUE" => Ok(true),
            "false" | "FALSE" => Ok(false),
            other => Err(Error::InvalidAttribute {
                attr: key.to_string(),
                reason: format!("`{other}` is not a valid boolean"),
            }),
        },
    }
}

pub(crate) fn coerce_unsigned(key: &str, attr: &CtfExpression) -> Result<u64, Error> {
    match sole_right(key, attr)? {
        UnaryExpr::UnsignedConstant(v) => Ok(*v),
        UnaryExpr::SignedConstant(v) if *v >= 0 => Ok(*v as u64),
        _ => Err(Error::InvalidAttribute {
            attr: key.to_string(),
            reason: "expected an unsigned constant".into(),
        }),
    }
}

pub(crate) fn coerce_string(key: &str, attr: &CtfExpression) -> Result<String, Error> {
    match sole_right(key, attr)? {
        UnaryExpr::String(s) => Ok(s.clone()),
        _ => Err(Error::InvalidAttribute {
            attr: key.to_string(),
            reason: "expected a string".into(),
        }),
    }
}

fn coerce_byte_order(ctx: &Ctx, key: &str, attr: &CtfExpression) -> Result<ByteOrder, Error> {
    let s = coerce_string(key, attr)?;
    match s.as_str() {
        "native" => Ok(ctx.trace_byte_order),
        "network" | "be" => Ok(ByteOrder::Be),
        "le" => Ok(ByteOrder::Le),
        other => Err(Error::InvalidAttribute {
            attr: key.to_string(),
            reason: format!("`{other}` is not one of native/network/be/le"),
        }),
    }
}
