//! Struct / variant / enum builders (§4.5).

use std::rc::Rc;

use crate::ast::{AstNode, EnumeratorNode, Specifier, UnaryExpr};
use crate::context::Ctx;
use crate::decl::{Declaration, EnumDecl, EnumRange, StructDecl, UntaggedVariantDecl, VariantDecl};
use crate::error::Error;
use crate::names::NameId;
use crate::scope::DeclarationScope;
use crate::specifier::visit_specifiers;

/// Process the body of a struct or variant: typedefs/typealiases install
/// into `body_scope`, field declarations append to the returned vec in
/// source order (§8 property 1), duplicate field names error.
fn process_body(
    ctx: &mut Ctx,
    body_scope: &Rc<DeclarationScope>,
    decls: &[AstNode],
) -> Result<Vec<(NameId, Declaration)>, Error> {
    let mut fields = Vec::new();
    for decl in decls {
        match decl {
            AstNode::Typedef {
                specifiers,
                declarators,
            } => crate::typedef::handle_typedef(ctx, body_scope, specifiers, declarators)?,
            AstNode::Typealias { target, alias } => {
                crate::typedef::handle_typealias(ctx, body_scope, target, alias)?
            }
            AstNode::FieldDeclaration {
                specifiers,
                declarators,
            } => {
                for entry in declarators {
                    let (id, ty) =
                        crate::resolver::resolve(ctx, body_scope, specifiers, &entry.declarator)?;
                    let id = id.ok_or(Error::InvalidStructure {
                        context: "field declaration",
                        reason: "field declarator does not bind a name".into(),
                    })?;
                    if fields.iter().any(|(n, _)| *n == id) {
                        return Err(Error::AlreadyDefined {
                            name: format!("{id:?}"),
                            kind: "field",
                        });
                    }
                    fields.push((id, ty));
                }
            }
            other => {
                return Err(Error::InvalidStructure {
                    context: "struct/variant body",
                    reason: format!("unexpected child node {other:?}"),
                });
            }
        }
    }
    Ok(fields)
}

pub fn build_struct(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    name: Option<&str>,
    decls: &[AstNode],
    has_body: bool,
) -> Result<Rc<StructDecl>, Error> {
    if !has_body {
        let name = name.ok_or(Error::InvalidStructure {
            context: "struct reference",
            reason: "a bodyless struct reference must name a tag".into(),
        })?;
        let id = ctx.names.intern(name);
        return scope.lookup_struct(id).ok_or(Error::Undefined {
            name: name.to_string(),
            kind: "struct",
        });
    }

    let id = name.map(|n| ctx.names.intern(n)).unwrap_or(NameId::ANONYMOUS);
    let body_scope = DeclarationScope::new(Some(scope.clone()));
    let fields = process_body(ctx, &body_scope, decls)?;
    let built = Rc::new(StructDecl {
        name: id,
        fields,
        scope: body_scope,
    });

    if !id.is_anonymous() {
        scope.register_struct(id, built.clone())?;
    }
    Ok(built)
}

pub fn build_variant(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    name: Option<&str>,
    choice: Option<&str>,
    decls: &[AstNode],
    has_body: bool,
) -> Result<Declaration, Error> {
    let untagged = if !has_body {
        let name = name.ok_or(Error::InvalidStructure {
            context: "variant reference",
            reason: "a bodyless variant reference must name a tag".into(),
        })?;
        let id = ctx.names.intern(name);
        scope.lookup_variant(id).ok_or(Error::Undefined {
            name: name.to_string(),
            kind: "variant",
        })?
    } else {
        let id = name.map(|n| ctx.names.intern(n)).unwrap_or(NameId::ANONYMOUS);
        let body_scope = DeclarationScope::new(Some(scope.clone()));
        let fields = process_body(ctx, &body_scope, decls)?;
        let built = Rc::new(UntaggedVariantDecl {
            name: id,
            fields,
            scope: body_scope,
        });
        if !id.is_anonymous() {
            scope.register_variant(id, built.clone())?;
        }
        built
    };

    match choice {
        Some(path) => {
            let tag_selector_path = ctx.names.intern(path);
            Ok(Declaration::Variant(Rc::new(VariantDecl {
                untagged,
                tag_selector_path,
            })))
        }
        None => Ok(Declaration::UntaggedVariant(untagged)),
    }
}

fn enumerator_value_to_i64(expr: &UnaryExpr, signed: bool) -> Result<i64, Error> {
    match expr {
        UnaryExpr::UnsignedConstant(v) => Ok(*v as i64),
        UnaryExpr::SignedConstant(v) => {
            if !signed && *v < 0 {
                return Err(Error::InvalidAttribute {
                    attr: "enumerator value".into(),
                    reason: "negative value in an unsigned container".into(),
                });
            }
            Ok(*v)
        }
        UnaryExpr::String(_) => Err(Error::InvalidAttribute {
            attr: "enumerator value".into(),
            reason: "expected a constant, not an identifier".into(),
        }),
    }
}

pub fn build_enum(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    id: Option<&str>,
    container: &[Specifier],
    enumerators: &[EnumeratorNode],
    has_body: bool,
) -> Result<Rc<EnumDecl>, Error> {
    if !has_body {
        let name = id.ok_or(Error::InvalidStructure {
            context: "enum reference",
            reason: "a bodyless enum reference must name a tag".into(),
        })?;
        let name_id = ctx.names.intern(name);
        return scope.lookup_enum(name_id).ok_or(Error::Undefined {
            name: name.to_string(),
            kind: "enum",
        });
    }

    let container_decl = visit_specifiers(ctx, scope, &container.to_vec())?;
    let container_decl = container_decl
        .as_integer()
        .ok_or(Error::InvalidStructure {
            context: "enum container",
            reason: "enum container must be an integer type".into(),
        })?
        .clone();

    let mut ranges = Vec::with_capacity(enumerators.len());
    let mut next_auto = 0i64;
    for enumerator in enumerators {
        let (start, end) = match enumerator.values.as_slice() {
            [] => (next_auto, next_auto),
            [only] => {
                let v = enumerator_value_to_i64(only, container_decl.signed)?;
                (v, v)
            }
            [a, b] => {
                let a = enumerator_value_to_i64(a, container_decl.signed)?;
                let b = enumerator_value_to_i64(b, container_decl.signed)?;
                (a, b)
            }
            _ => {
                return Err(Error::InvalidStructure {
                    context: "enumerator value list",
                    reason: "expected one value or a [start, end] range".into(),
                });
            }
        };
        if end < start {
            return Err(Error::InvalidStructure {
                context: "enumerator range",
                reason: "range end precedes its start".into(),
            });
        }
        next_auto = end + 1;
        ranges.push(EnumRange {
            start,
            end,
            name: ctx.names.intern(&enumerator.name),
        });
    }

    let built = Rc::new(EnumDecl {
        container: container_decl,
        ranges,
    });

    if let Some(name) = id {
        let name_id = ctx.names.intern(name);
        scope.register_enum(name_id, built.clone())?;
    }
    Ok(built)
}
