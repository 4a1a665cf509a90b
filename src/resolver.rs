//! Type-declarator resolver (§4.3).
//!
//! Turns a `(specifiers, declarator)` pair into a `(name, Declaration)`.
//! Bitfields are rejected outright; pointers must resolve through a
//! pre-registered alias (CTF has no native pointer type); arrays and
//! sequences recurse outermost-first, wrapping the innermost type last.

use std::rc::Rc;

use crate::ast::{Declarator, LinkedUnaryExpr, PointerQualifier, SpecifierList, UnaryExpr};
use crate::context::Ctx;
use crate::decl::{ArrayDecl, Declaration, SequenceDecl};
use crate::error::Error;
use crate::names::NameId;
use crate::scope::DeclarationScope;
use crate::specifier::visit_specifiers;

/// Resolve one `(specifiers, declarator)` entry to the name it binds (if
/// any — abstract declarators bind none) and its fully-built type.
pub fn resolve(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    specifiers: &SpecifierList,
    declarator: &Declarator,
) -> Result<(Option<NameId>, Declaration), Error> {
    match declarator {
        Declarator::Id {
            name,
            pointers,
            bitfield_len,
        } => {
            if bitfield_len.is_some() {
                return Err(Error::Unsupported("bitfield declarators"));
            }
            let base = if pointers.is_empty() {
                visit_specifiers(ctx, scope, specifiers)?
            } else {
                resolve_pointer_alias(ctx, scope, specifiers, pointers)?
            };
            let id = name.as_deref().map(|n| ctx.names.intern(n));
            Ok((id, base))
        }
        Declarator::Nested {
            length_list,
            sub_declarator,
        } => {
            let (id, inner) = resolve(ctx, scope, specifiers, sub_declarator)?;
            let mut ty = inner;
            if let Some(first) = length_list.first() {
                ty = wrap_one_dimension(ctx, scope, first, ty)?;
            }
            Ok((id, ty))
        }
    }
}

/// Wrap `element` in one array/sequence layer per one bracket dimension.
/// An unsigned constant length makes a fixed-size [`ArrayDecl`]; an
/// identifier naming an integer-typed field makes a [`SequenceDecl`]
/// whose runtime length is read from that field (§3.7, §3.8 testable
/// property 2).
fn wrap_one_dimension(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    len_expr: &LinkedUnaryExpr,
    element: Declaration,
) -> Result<Declaration, Error> {
    match &len_expr.expr {
        UnaryExpr::UnsignedConstant(length) => {
            Ok(Declaration::Array(Rc::new(ArrayDecl {
                length: *length,
                element,
            })))
        }
        UnaryExpr::String(name) => {
            let id = ctx.names.intern(name);
            let decl = scope.lookup_type_alias(id).ok_or_else(|| Error::Undefined {
                name: name.clone(),
                kind: "sequence length field",
            })?;
            let length_type = decl
                .as_integer()
                .ok_or(Error::InvalidStructure {
                    context: "sequence declarator",
                    reason: "length field is not an integer".into(),
                })?
                .clone();
            Ok(Declaration::Sequence(Rc::new(SequenceDecl {
                length_type,
                element,
            })))
        }
        UnaryExpr::SignedConstant(_) => Err(Error::InvalidStructure {
            context: "array/sequence declarator",
            reason: "length must be an unsigned constant or an identifier".into(),
        }),
    }
}

/// Resolve a pointer declarator through a pre-registered alias. CTF has
/// no native pointer type, so `T *`, `T * const`, `T **`, ... must each
/// have been typedef'd/typealiased in advance; this synthesizes the same
/// alias text those declarations register under (see
/// `typedef::base_specifier_text`) and looks it up.
fn resolve_pointer_alias(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    specifiers: &SpecifierList,
    pointers: &[PointerQualifier],
) -> Result<Declaration, Error> {
    let mut text = crate::typedef::base_specifier_text(specifiers)?;
    for p in pointers {
        text.push_str(" *");
        if p.const_qualifier {
            text.push_str(" const");
        }
    }
    let id = ctx.names.intern(&text);
    scope.lookup_type_alias(id).ok_or(Error::Undefined {
        name: text,
        kind: "pointer alias",
    })
}
