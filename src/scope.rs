//! Scope stack: nested declaration scopes with separate namespaces for
//! type aliases vs. struct/variant/enum tags.
//!
//! Lookups walk from the innermost scope to the root; registration only
//! ever touches the current scope, so a descendant scope that registers a
//! name shadows the parent's binding without disturbing it (§8 property 6).
//!
//! There is no explicit `free` operation: a scope's references are held by
//! its `Rc<DeclarationScope>` handle, so dropping that handle releases
//! everything the scope owns without touching the parent, which is exactly
//! the "free(scope) releases references held by this scope only" contract.

use std::rc::Rc;

use crate::decl::{Declaration, EnumDecl, StructDecl, UntaggedVariantDecl};
use crate::error::Error;
use crate::names::NameId;

/// One level of the scope chain. `parent` is `None` only for the trace's
/// root scope.
#[derive(Debug)]
pub struct DeclarationScope {
    parent: Option<Rc<DeclarationScope>>,
    type_aliases: std::cell::RefCell<std::collections::HashMap<NameId, Declaration>>,
    structs: std::cell::RefCell<std::collections::HashMap<NameId, Rc<StructDecl>>>,
    variants: std::cell::RefCell<std::collections::HashMap<NameId, Rc<UntaggedVariantDecl>>>,
    enums: std::cell::RefCell<std::collections::HashMap<NameId, Rc<EnumDecl>>>,
}

impl DeclarationScope {
    /// Create a fresh, empty scope linked to `parent`.
    pub fn new(parent: Option<Rc<DeclarationScope>>) -> Rc<DeclarationScope> {
        Rc::new(DeclarationScope {
            parent,
            type_aliases: Default::default(),
            structs: Default::default(),
            variants: Default::default(),
            enums: Default::default(),
        })
    }

    pub fn parent(&self) -> Option<&Rc<DeclarationScope>> {
        self.parent.as_ref()
    }

    pub fn register_type_alias(&self, name: NameId, decl: Declaration) -> Result<(), Error> {
        let mut map = self.type_aliases.borrow_mut();
        if map.contains_key(&name) {
            return Err(Error::AlreadyDefined {
                name: format!("{name:?}"),
                kind: "type alias",
            });
        }
        map.insert(name, decl);
        Ok(())
    }

    pub fn register_struct(&self, name: NameId, decl: Rc<StructDecl>) -> Result<(), Error> {
        let mut map = self.structs.borrow_mut();
        if map.contains_key(&name) {
            return Err(Error::AlreadyDefined {
                name: format!("{name:?}"),
                kind: "struct",
            });
        }
        map.insert(name, decl);
        Ok(())
    }

    pub fn register_variant(&self, name: NameId, decl: Rc<UntaggedVariantDecl>) -> Result<(), Error> {
        let mut map = self.variants.borrow_mut();
        if map.contains_key(&name) {
            return Err(Error::AlreadyDefined {
                name: format!("{name:?}"),
                kind: "variant",
            });
        }
        map.insert(name, decl);
        Ok(())
    }

    pub fn register_enum(&self, name: NameId, decl: Rc<EnumDecl>) -> Result<(), Error> {
        let mut map = self.enums.borrow_mut();
        if map.contains_key(&name) {
            return Err(Error::AlreadyDefined {
                name: format!("{name:?}"),
                kind: "enum",
            });
        }
        map.insert(name, decl);
        Ok(())
    }

    pub fn lookup_type_alias(self: &Rc<Self>, name: NameId) -> Option<Declaration> {
        let mut scope = self.clone();
        loop {
            if let Some(d) = scope.type_aliases.borrow().get(&name) {
                return Some(d.clone());
            }
            scope = scope.parent.clone()?;
        }
    }

    pub fn lookup_struct(self: &Rc<Self>, name: NameId) -> Option<Rc<StructDecl>> {
        let mut scope = self.clone();
        loop {
            if let Some(d) = scope.structs.borrow().get(&name) {
                return Some(d.clone());
            }
            scope = scope.parent.clone()?;
        }
    }

    pub fn lookup_variant(self: &Rc<Self>, name: NameId) -> Option<Rc<UntaggedVariantDecl>> {
        let mut scope = self.clone();
        loop {
            if let Some(d) = scope.variants.borrow().get(&name) {
                return Some(d.clone());
            }
            scope = scope.parent.clone()?;
        }
    }

    pub fn lookup_enum(self: &Rc<Self>, name: NameId) -> Option<Rc<EnumDecl>> {
        let mut scope = self.clone();
        loop {
            if let Some(d) = scope.enums.borrow().get(&name) {
                return Some(d.clone());
            }
            scope = scope.parent.clone()?;
        }
    }
}
