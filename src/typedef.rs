//! `typedef` / `typealias` handlers (§4.4).

use std::rc::Rc;

use crate::ast::{Declarator, DeclaratorEntry, Specifier, SpecifierList, TypeSpecifierKind};
use crate::context::Ctx;
use crate::error::Error;
use crate::resolver::resolve;
use crate::scope::DeclarationScope;
use crate::specifier::visit_specifiers;

/// `typedef <specifiers> <declarators>;` — each declarator resolves
/// independently against the same base specifiers and registers its own
/// name as a type alias in `scope`.
pub fn handle_typedef(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    specifiers: &SpecifierList,
    declarators: &[DeclaratorEntry],
) -> Result<(), Error> {
    for entry in declarators {
        let (id, decl) = resolve(ctx, scope, specifiers, &entry.declarator)?;
        let id = id.ok_or(Error::InvalidStructure {
            context: "typedef",
            reason: "declarator does not bind a name".into(),
        })?;
        scope.register_type_alias(id, decl)?;
    }
    Ok(())
}

/// `typealias <target> := <alias>;`
///
/// The target, if given with a declarator, must be an abstract one (no
/// name of its own — see DESIGN.md, Open Question 3: only the *first*
/// declarator of a typealias target is honored, and it must be anonymous).
/// The alias side synthesizes its registration key from its specifier
/// tokens plus any pointer suffixes, exactly as [`crate::resolver`]
/// synthesizes the same key when resolving a pointer declarator.
pub fn handle_typealias(
    ctx: &mut Ctx,
    scope: &Rc<DeclarationScope>,
    target: &(SpecifierList, Option<Declarator>),
    alias: &(SpecifierList, Declarator),
) -> Result<(), Error> {
    let (target_specifiers, target_declarator) = target;
    let target_decl = match target_declarator {
        None => visit_specifiers(ctx, scope, target_specifiers)?,
        Some(declarator) => {
            let (id, decl) = resolve(ctx, scope, target_specifiers, declarator)?;
            if id.is_some() {
                return Err(Error::InvalidStructure {
                    context: "typealias target",
                    reason: "target declarator must be anonymous".into(),
                });
            }
            decl
        }
    };

    let (alias_specifiers, alias_declarator) = alias;
    let pointers = match alias_declarator {
        Declarator::Id { pointers, .. } => pointers.as_slice(),
        Declarator::Nested { .. } => {
            return Err(Error::InvalidStructure {
                context: "typealias alias",
                reason: "alias side must be a plain identifier, not an array/sequence".into(),
            });
        }
    };

    let mut text = base_specifier_text(alias_specifiers)?;
    for p in pointers {
        text.push_str(" *");
        if p.const_qualifier {
            text.push_str(" const");
        }
    }

    let id = ctx.names.intern(&text);
    scope.register_type_alias(id, target_decl)
}

/// Render a single plain type-specifier (no aggregate body) as the token
/// text used to key pointer and typealias aliases: `"struct foo"`,
/// `"enum bar"`, or a bare identifier like `"uint32_t"`. A `struct`/
/// `variant`/`enum` specifier used directly (not via a `TypeSpecifier`
/// reference node) renders the same way, by its tag.
pub fn base_specifier_text(specifiers: &SpecifierList) -> Result<String, Error> {
    let first = specifiers.first().ok_or(Error::InvalidStructure {
        context: "pointer/alias base",
        reason: "empty specifier list".into(),
    })?;
    match first {
        Specifier::TypeSpecifier(node) => Ok(match node.kind {
            TypeSpecifierKind::Struct => {
                format!("struct {}", node.id_type.as_deref().unwrap_or(""))
            }
            TypeSpecifierKind::Variant => {
                format!("variant {}", node.id_type.as_deref().unwrap_or(""))
            }
            TypeSpecifierKind::Enum => format!("enum {}", node.id_type.as_deref().unwrap_or("")),
            TypeSpecifierKind::TypeId => node.id_type.clone().unwrap_or_default(),
        }),
        Specifier::Struct { name, .. } => Ok(format!("struct {}", name.as_deref().unwrap_or(""))),
        Specifier::Variant { name, .. } => Ok(format!("variant {}", name.as_deref().unwrap_or(""))),
        Specifier::Enum { id, .. } => Ok(format!("enum {}", id.as_deref().unwrap_or(""))),
        _ => Err(Error::InvalidStructure {
            context: "pointer/alias base",
            reason: "pointer and alias declarators require a plain type-specifier base".into(),
        }),
    }
}
