//! Elaboration context threaded explicitly through every builder.
//!
//! Grounded on the teacher's `&TypeRegistry` parameter threading
//! (`extract.rs`/`emit.rs` pass `&TypeRegistry` into every function that
//! needs it rather than reaching for a global) — this crate does the same
//! with the name registry and the trace's byte order.

use crate::decl::ByteOrder;
use crate::names::NameRegistry;

/// Mutable state shared across one elaboration run.
///
/// Not `Clone`, not `Send`: the elaborator is single-threaded and
/// synchronous end to end (spec §5).
pub struct Ctx {
    pub names: NameRegistry,
    /// Set once, at the start of `construct_metadata`, from the caller's
    /// `byte_order` parameter (after applying any `ElaborationOptions`
    /// override). `"native"` byte-order attributes resolve to this value.
    pub trace_byte_order: ByteOrder,
    /// From `ElaborationOptions::strict_unknown_attributes` (§4.6): whether
    /// an unrecognized integer/float/string attribute name is an error.
    pub strict_unknown_attributes: bool,
}

impl Ctx {
    pub fn new(trace_byte_order: ByteOrder) -> Self {
        Ctx {
            names: NameRegistry::new(),
            trace_byte_order,
            strict_unknown_attributes: true,
        }
    }
}
