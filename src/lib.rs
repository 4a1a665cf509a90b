//! ctf-elab — semantic-elaboration core of a CTF metadata compiler.
//!
//! Consumes a parsed AST describing a trace's type system (integers,
//! floats, strings, enums, structs, variants, arrays, sequences, type
//! aliases) together with trace/stream/event declarations, and produces
//! an in-memory type model for downstream binary decoders.
//!
//! # Quick start
//!
//! ```no_run
//! use ctf_elab::{ByteOrder, Trace, construct_metadata};
//!
//! # fn get_ast() -> ctf_elab::AstNode { unimplemented!() }
//! let ast_root = get_ast();
//! let mut trace = Trace::new(ByteOrder::Le);
//! construct_metadata(&ast_root, &mut trace, ByteOrder::Le).unwrap();
//! ```

pub mod aggregate;
pub mod ast;
pub mod config;
pub mod context;
pub mod decl;
pub mod definition;
pub mod elaborate;
pub mod error;
pub mod names;
pub mod resolver;
pub mod scope;
pub mod specifier;
pub mod trace;
pub mod typedef;

pub use ast::AstNode;
pub use config::ElaborationOptions;
pub use decl::{ByteOrder, Declaration};
pub use definition::{DefinitionScope, Instantiate};
pub use elaborate::{construct_metadata, construct_metadata_with_options};
pub use error::{Error, Result};
pub use names::NameId;
pub use scope::DeclarationScope;
pub use trace::{Event, Stream, Trace};
