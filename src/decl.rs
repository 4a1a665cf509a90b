//! The type model: reference-counted declaration objects.
//!
//! `Declaration` is a tagged enum rather than a base-class-plus-downcast
//! hierarchy (see DESIGN.md, "shared declarations with parent/child
//! cycles"). Every container holds `Rc<Declaration>` strong references to
//! its children; a declaration is always fully built before it is wrapped
//! in `Rc` and shared, so no interior mutability is needed to populate it.

use std::rc::Rc;

use crate::names::NameId;
use crate::scope::DeclarationScope;

/// Byte order of an integer or floating-point declaration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ByteOrder {
    Le,
    Be,
}

/// A fully-built, shareable type declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Integer(Rc<IntegerDecl>),
    Float(Rc<FloatDecl>),
    String(Rc<StringDecl>),
    Enum(Rc<EnumDecl>),
    Struct(Rc<StructDecl>),
    UntaggedVariant(Rc<UntaggedVariantDecl>),
    Variant(Rc<VariantDecl>),
    Array(Rc<ArrayDecl>),
    Sequence(Rc<SequenceDecl>),
}

impl Declaration {
    pub fn align_bits(&self) -> u64 {
        match self {
            Declaration::Integer(d) => d.align_bits,
            Declaration::Float(d) => d.align_bits,
            Declaration::String(_) => 8,
            Declaration::Enum(d) => d.container.align_bits,
            Declaration::Struct(d) => d.fields.iter().map(|(_, f)| f.align_bits()).max().unwrap_or(8),
            Declaration::UntaggedVariant(d) => {
                d.fields.iter().map(|(_, f)| f.align_bits()).max().unwrap_or(8)
            }
            Declaration::Variant(d) => d.untagged.align_bits(),
            // Array/sequence alignment is that of their element (§3.8 testable property 3).
            Declaration::Array(d) => d.element.align_bits(),
            Declaration::Sequence(d) => d.element.align_bits(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Integer(_) => "integer",
            Declaration::Float(_) => "floating_point",
            Declaration::String(_) => "string",
            Declaration::Enum(_) => "enum",
            Declaration::Struct(_) => "struct",
            Declaration::UntaggedVariant(_) => "variant",
            Declaration::Variant(_) => "variant",
            Declaration::Array(_) => "array",
            Declaration::Sequence(_) => "sequence",
        }
    }

    pub fn as_integer(&self) -> Option<&Rc<IntegerDecl>> {
        match self {
            Declaration::Integer(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Rc<StructDecl>> {
        match self {
            Declaration::Struct(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IntegerDecl {
    pub size_bits: u64,
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub align_bits: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FloatDecl {
    pub mant_dig: u64,
    pub exp_dig: u64,
    pub byte_order: ByteOrder,
    pub align_bits: u64,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StringEncoding {
    Utf8,
    Ascii,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StringDecl {
    pub encoding: StringEncoding,
}

/// Inclusive value range mapped to an enumerator name.
///
/// Stored signed; unsigned containers promote their endpoints into this
/// same representation (see `aggregate::enum_decl`), which keeps a single
/// comparison/ordering rule regardless of container signedness.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EnumRange {
    pub start: i64,
    pub end: i64,
    pub name: NameId,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub container: Rc<IntegerDecl>,
    pub ranges: Vec<EnumRange>,
}

impl EnumDecl {
    pub fn name_for(&self, value: i64) -> Option<NameId> {
        self.ranges
            .iter()
            .find(|r| r.start <= value && value <= r.end)
            .map(|r| r.name)
    }
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: NameId,
    /// Fields in declaration order — insertion order is a hard invariant
    /// (§8 property 1), never re-sorted for lookup convenience.
    pub fields: Vec<(NameId, Declaration)>,
    /// The body's own scope, for local typedefs/typealiases a later
    /// consumer needs to resolve names the struct body declared (§3.2).
    pub scope: Rc<DeclarationScope>,
}

impl StructDecl {
    pub fn field(&self, name: NameId) -> Option<&Declaration> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, d)| d)
    }
}

#[derive(Debug, Clone)]
pub struct UntaggedVariantDecl {
    pub name: NameId,
    pub fields: Vec<(NameId, Declaration)>,
    /// The body's own scope, for local typedefs/typealiases a later
    /// consumer needs to resolve names the variant body declared (§3.2).
    pub scope: Rc<DeclarationScope>,
}

#[derive(Debug, Clone)]
pub struct VariantDecl {
    pub untagged: Rc<UntaggedVariantDecl>,
    /// Qualified path naming the tag-selecting field, e.g. `"tag"` or
    /// `"header.id"`.
    pub tag_selector_path: NameId,
}

#[derive(Debug, Clone)]
pub struct ArrayDecl {
    pub length: u64,
    pub element: Declaration,
}

#[derive(Debug, Clone)]
pub struct SequenceDecl {
    pub length_type: Rc<IntegerDecl>,
    pub element: Declaration,
}

/// Default alignment per §3.2: 1 if `size_bits` isn't a multiple of 8, else 8.
pub fn default_align_bits(size_bits: u64) -> u64 {
    if size_bits % 8 == 0 { 8 } else { 1 }
}
