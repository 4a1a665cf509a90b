//! Definition materialization hook (§6.4).
//!
//! A `DefinitionScope` is the minimal runtime-instance handle this crate
//! hands to the (external, out-of-scope) binary decoder: enough to chain
//! packet/event definitions in the right parent order without this crate
//! doing any actual decoding.

use std::rc::Rc;

use crate::decl::Declaration;

#[derive(Debug, Clone)]
pub struct DefinitionScope {
    pub offset: u64,
    pub index: u64,
    pub parent: Option<Rc<DefinitionScope>>,
}

impl DefinitionScope {
    fn new(parent: Option<&DefinitionScope>, offset: u64, index: u64) -> DefinitionScope {
        DefinitionScope {
            offset,
            index,
            parent: parent.map(|p| Rc::new(p.clone())),
        }
    }
}

/// Implemented by every declaration kind; materializes one runtime-instance
/// placeholder chained off `parent_def_scope`.
pub trait Instantiate {
    fn instantiate(&self, parent_def_scope: Option<&DefinitionScope>, offset: u64, index: u64) -> DefinitionScope;
}

impl Instantiate for Declaration {
    fn instantiate(&self, parent_def_scope: Option<&DefinitionScope>, offset: u64, index: u64) -> DefinitionScope {
        tracing::trace!(kind = self.kind_name(), offset, index, "materialized definition");
        DefinitionScope::new(parent_def_scope, offset, index)
    }
}
