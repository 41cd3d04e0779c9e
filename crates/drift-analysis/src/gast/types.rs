//! GAST node kinds and the node tree.
//!
//! Normalization is lossless at the source level: every node keeps the
//! range of the grammar node it came from, and kinds with no generic
//! equivalent map to `Other(tag)` rather than being dropped.

use serde::{Deserialize, Serialize};

use crate::parsers::types::Range;

/// The ~40 normalized node kinds shared across all ten languages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GastKind {
    Program,
    Module,
    Function,
    Method,
    Constructor,
    Lambda,
    Class,
    Interface,
    Struct,
    Enum,
    TypeAlias,
    Property,
    Parameter,
    Block,
    VariableDecl,
    Assignment,
    Call,
    MethodCall,
    New,
    MemberAccess,
    IndexAccess,
    Identifier,
    StringLit,
    NumberLit,
    BoolLit,
    NullLit,
    ArrayExpr,
    ObjectExpr,
    TemplateLit,
    BinaryOp,
    UnaryOp,
    Ternary,
    If,
    Loop,
    Switch,
    Return,
    Throw,
    TryCatch,
    Await,
    Yield,
    Import,
    Export,
    DecoratorApp,
    Route,
    Comment,
    /// Catch-all carrying the original grammar kind.
    Other(String),
}

impl GastKind {
    /// Stable name used in TOML pattern `node_kinds` lists.
    pub fn name(&self) -> &str {
        match self {
            Self::Program => "program",
            Self::Module => "module",
            Self::Function => "function",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Lambda => "lambda",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::TypeAlias => "type_alias",
            Self::Property => "property",
            Self::Parameter => "parameter",
            Self::Block => "block",
            Self::VariableDecl => "variable_decl",
            Self::Assignment => "assignment",
            Self::Call => "call",
            Self::MethodCall => "method_call",
            Self::New => "new",
            Self::MemberAccess => "member_access",
            Self::IndexAccess => "index_access",
            Self::Identifier => "identifier",
            Self::StringLit => "string_lit",
            Self::NumberLit => "number_lit",
            Self::BoolLit => "bool_lit",
            Self::NullLit => "null_lit",
            Self::ArrayExpr => "array_expr",
            Self::ObjectExpr => "object_expr",
            Self::TemplateLit => "template_lit",
            Self::BinaryOp => "binary_op",
            Self::UnaryOp => "unary_op",
            Self::Ternary => "ternary",
            Self::If => "if",
            Self::Loop => "loop",
            Self::Switch => "switch",
            Self::Return => "return",
            Self::Throw => "throw",
            Self::TryCatch => "try_catch",
            Self::Await => "await",
            Self::Yield => "yield",
            Self::Import => "import",
            Self::Export => "export",
            Self::DecoratorApp => "decorator_app",
            Self::Route => "route",
            Self::Comment => "comment",
            Self::Other(tag) => tag,
        }
    }
}

/// One normalized node. `name` is the declared identifier for declaration
/// kinds; `text` is the source slice for leaf-ish kinds detectors match on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GastNode {
    pub kind: GastKind,
    pub name: Option<String>,
    pub text: Option<String>,
    pub range: Range,
    pub children: Vec<GastNode>,
}

impl GastNode {
    pub fn new(kind: GastKind, range: Range) -> Self {
        Self {
            kind,
            name: None,
            text: None,
            range,
            children: Vec::new(),
        }
    }

    /// Depth-first pre-order traversal.
    pub fn walk(&self, f: &mut impl FnMut(&GastNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Count of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(GastNode::node_count).sum::<usize>()
    }

    /// First descendant (pre-order) of the given kind.
    pub fn find(&self, kind: &GastKind) -> Option<&GastNode> {
        if &self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }
}
