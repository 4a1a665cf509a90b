//! Trace / Stream / Event output model (§3.4, §6.3).

use std::collections::HashMap;
use std::rc::Rc;

use crate::decl::{ByteOrder, StructDecl};
use crate::definition::DefinitionScope;
use crate::names::{NameId, NameRegistry};
use crate::scope::DeclarationScope;

/// Grow `vec` so index `idx` exists, then store `value` there (overwriting
/// whatever was there before — §9 Open Question: stream/event id collisions
/// overwrite silently, inherited from the original source).
pub fn grow_and_set<T>(vec: &mut Vec<Option<T>>, idx: usize, value: T) {
    if vec.len() <= idx {
        vec.resize_with(idx + 1, || None);
    }
    vec[idx] = Some(value);
}

#[derive(Debug)]
pub struct Event {
    pub name: NameId,
    pub id: u64,
    pub stream_id: u64,
    pub context: Option<Rc<StructDecl>>,
    pub fields: Option<Rc<StructDecl>>,
    pub context_def: Option<DefinitionScope>,
    pub fields_def: Option<DefinitionScope>,
}

#[derive(Debug)]
pub struct Stream {
    pub stream_id: u64,
    pub scope: Rc<DeclarationScope>,
    pub packet_context: Option<Rc<StructDecl>>,
    pub event_header: Option<Rc<StructDecl>>,
    pub event_context: Option<Rc<StructDecl>>,
    pub packet_context_def: Option<DefinitionScope>,
    pub event_header_def: Option<DefinitionScope>,
    pub event_context_def: Option<DefinitionScope>,
    pub events_by_id: Vec<Option<Event>>,
    pub name_to_id: HashMap<NameId, u64>,
}

impl Stream {
    pub fn new(stream_id: u64, scope: Rc<DeclarationScope>) -> Stream {
        Stream {
            stream_id,
            scope,
            packet_context: None,
            event_header: None,
            event_context: None,
            packet_context_def: None,
            event_header_def: None,
            event_context_def: None,
            events_by_id: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct Trace {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub uuid: Option<[u8; 16]>,
    pub word_size: Option<u64>,
    pub byte_order: ByteOrder,
    pub root_scope: Rc<DeclarationScope>,
    pub trace_scope: Option<Rc<DeclarationScope>>,
    pub streams: Vec<Option<Stream>>,
    /// The name registry used throughout this trace's elaboration.
    /// [`crate::elaborate::construct_metadata`] borrows this out into its
    /// working [`crate::context::Ctx`] and returns it here when done, so a
    /// `NameId` stored anywhere in the model can still be resolved back to
    /// text after elaboration completes.
    pub names: NameRegistry,
}

impl Trace {
    pub fn new(byte_order: ByteOrder) -> Trace {
        Trace {
            major: None,
            minor: None,
            uuid: None,
            word_size: None,
            byte_order,
            root_scope: DeclarationScope::new(None),
            trace_scope: None,
            streams: Vec::new(),
            names: NameRegistry::new(),
        }
    }
}
