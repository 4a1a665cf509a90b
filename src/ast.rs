//! AST input contract.
//!
//! These types describe the tree handed to [`crate::elaborate`] by the
//! (external, out-of-scope) lexer/parser. They are a documented contract,
//! not something this crate constructs from source text.

/// Link kind connecting consecutive unary expressions into a multi-token
/// path (e.g. `a.b.c`, `a->b`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Link {
    None,
    Dot,
    Arrow,
    DotDotDot,
}

#[derive(Debug, Clone)]
pub enum UnaryExpr {
    UnsignedConstant(u64),
    SignedConstant(i64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct LinkedUnaryExpr {
    pub expr: UnaryExpr,
    pub link: Link,
}

/// Both sides of a `left = right;` CTF expression are sibling lists of
/// unary expressions (e.g. `byte_order = be;` or `uuid = "...";`).
#[derive(Debug, Clone, Default)]
pub struct CtfExpression {
    pub left: Vec<LinkedUnaryExpr>,
    pub right: Vec<LinkedUnaryExpr>,
}

impl CtfExpression {
    /// The dotted/arrowed left-hand-side rendered as a single string, e.g.
    /// `"packet.context"`.
    pub fn left_as_str(&self) -> String {
        self.left
            .iter()
            .map(|u| match &u.expr {
                UnaryExpr::String(s) => s.clone(),
                UnaryExpr::UnsignedConstant(v) => v.to_string(),
                UnaryExpr::SignedConstant(v) => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// A pointer qualifier attached to a declarator (`*` or `* const`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PointerQualifier {
    pub const_qualifier: bool,
}

#[derive(Debug, Clone)]
pub enum Declarator {
    /// A plain (possibly pointer-qualified) identifier declarator.
    Id {
        name: Option<String>,
        pointers: Vec<PointerQualifier>,
        bitfield_len: Option<UnaryExpr>,
    },
    /// An array/sequence declarator: `name[len]` or `name[len] sub`.
    Nested {
        length_list: Vec<LinkedUnaryExpr>,
        sub_declarator: Box<Declarator>,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TypeSpecifierKind {
    Struct,
    Variant,
    Enum,
    /// A bare type-identifier reference, e.g. `uint32_t` used as a specifier.
    TypeId,
}

#[derive(Debug, Clone)]
pub struct TypeSpecifierNode {
    pub kind: TypeSpecifierKind,
    pub id_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumeratorNode {
    pub name: String,
    /// One value (`[v, v]`) or a range (`[start, end]`); more than two
    /// values is a structural error (§8 boundary behavior).
    pub values: Vec<UnaryExpr>,
}

/// One element of a declaration-specifier list. The list is heterogeneous;
/// dispatch (§4.6) looks only at the first element.
#[derive(Debug, Clone)]
pub enum Specifier {
    TypeSpecifier(TypeSpecifierNode),
    Integer(Vec<CtfExpression>),
    Float(Vec<CtfExpression>),
    String(Vec<CtfExpression>),
    Struct {
        name: Option<String>,
        decls: Vec<AstNode>,
        has_body: bool,
    },
    Variant {
        name: Option<String>,
        choice: Option<String>,
        decls: Vec<AstNode>,
        has_body: bool,
    },
    Enum {
        id: Option<String>,
        container: Vec<Specifier>,
        enumerators: Vec<EnumeratorNode>,
        has_body: bool,
    },
}

pub type SpecifierList = Vec<Specifier>;

#[derive(Debug, Clone)]
pub struct DeclaratorEntry {
    pub declarator: Declarator,
}

#[derive(Debug, Clone)]
pub enum AstNode {
    Root {
        decls: Vec<AstNode>,
        traces: Vec<AstNode>,
        streams: Vec<AstNode>,
        events: Vec<AstNode>,
    },
    Typedef {
        specifiers: SpecifierList,
        declarators: Vec<DeclaratorEntry>,
    },
    Typealias {
        target: (SpecifierList, Option<Declarator>),
        alias: (SpecifierList, Declarator),
    },
    /// A field declaration inside a struct/variant body: `<specifiers> <declarator>;`
    FieldDeclaration {
        specifiers: SpecifierList,
        declarators: Vec<DeclaratorEntry>,
    },
    /// A bare declaration-specifier node at the root (e.g. installing an
    /// anonymous struct into the root scope).
    SpecifierDecl(SpecifierList),
    Trace {
        children: Vec<TraceChild>,
    },
    Stream {
        children: Vec<StreamChild>,
    },
    Event {
        children: Vec<EventChild>,
    },
}

#[derive(Debug, Clone)]
pub enum TraceChild {
    Typedef {
        specifiers: SpecifierList,
        declarators: Vec<DeclaratorEntry>,
    },
    Typealias {
        target: (SpecifierList, Option<Declarator>),
        alias: (SpecifierList, Declarator),
    },
    Expression(CtfExpression),
}

#[derive(Debug, Clone)]
pub enum StreamChild {
    Typedef {
        specifiers: SpecifierList,
        declarators: Vec<DeclaratorEntry>,
    },
    Typealias {
        target: (SpecifierList, Option<Declarator>),
        alias: (SpecifierList, Declarator),
    },
    Expression(CtfExpression),
}

#[derive(Debug, Clone)]
pub enum EventChild {
    Typedef {
        specifiers: SpecifierList,
        declarators: Vec<DeclaratorEntry>,
    },
    Typealias {
        target: (SpecifierList, Option<Declarator>),
        alias: (SpecifierList, Declarator),
    },
    Expression(CtfExpression),
}
