//! Arena-backed abstract syntax tree.
//!
//! Every node lives in one `Vec` owned by [`Ast`] and is addressed by a
//! [`NodeId`]. Parent links are handles, so the tree carries full upward and
//! downward navigation without reference cycles. Tokens and comments are
//! retained alongside the tree; tooling needs exact provenance for every
//! node.

use std::ops::Index;

use crate::span::{Loc, Span};
use crate::token::{Comment, DateTime, IntegerRepr, Token};

/// Handle to a node stored in an [`Ast`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a `[table]` header is standard or an `[[array]]` of tables.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TableKind {
    Standard,
    Array,
}

/// Whether a string literal used `"` or `'` delimiters.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StringStyle {
    Basic,
    Literal,
}

/// The four TOML date-time flavors.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DateTimeKind {
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

/// One segment of a table's resolved key path.
///
/// `[[fruit]]` followed by `[fruit.variety]` resolves the second header to
/// `fruit`, `1`, `variety` when it re-opens the second array element.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum KeySegment {
    Key(String),
    Index(usize),
}

/// The payload of a `TOMLValue` node.
#[derive(Clone, PartialEq, Debug)]
pub enum ValueKind<'t> {
    String {
        value: Box<str>,
        style: StringStyle,
        multiline: bool,
    },
    Integer(IntegerRepr),
    Float(f64),
    Boolean(bool),
    DateTime {
        kind: DateTimeKind,
        value: DateTime,
        /// The raw literal text.
        text: &'t str,
    },
}

/// A node's kind with its child handles.
///
/// `key`/`value` fields are `None` only while the parser is mid-construction;
/// a successfully parsed tree always has them populated.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind<'t> {
    Program {
        body: NodeId,
    },
    TopLevelTable {
        body: Vec<NodeId>,
    },
    Table {
        kind: TableKind,
        key: Option<NodeId>,
        body: Vec<NodeId>,
        resolved_key: Vec<KeySegment>,
    },
    KeyValue {
        key: Option<NodeId>,
        value: Option<NodeId>,
    },
    Key {
        parts: Vec<NodeId>,
    },
    Bare {
        name: &'t str,
    },
    Value(ValueKind<'t>),
    Array {
        elements: Vec<NodeId>,
    },
    InlineTable {
        body: Vec<NodeId>,
    },
}

impl NodeKind<'_> {
    /// The lint-AST type name of this node.
    ///
    /// Quoted key parts are string `TOMLValue` nodes, like any other string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Program { .. } => "Program",
            Self::TopLevelTable { .. } => "TOMLTopLevelTable",
            Self::Table { .. } => "TOMLTable",
            Self::KeyValue { .. } => "TOMLKeyValue",
            Self::Key { .. } => "TOMLKey",
            Self::Bare { .. } => "TOMLBare",
            Self::Value(_) => "TOMLValue",
            Self::Array { .. } => "TOMLArray",
            Self::InlineTable { .. } => "TOMLInlineTable",
        }
    }
}

/// One AST node: kind, parent handle, and source position.
#[derive(Clone, PartialEq, Debug)]
pub struct Node<'t> {
    pub kind: NodeKind<'t>,
    pub parent: Option<NodeId>,
    pub range: Span,
    pub loc: Loc,
}

/// A parsed TOML document.
#[derive(Debug)]
pub struct Ast<'t> {
    nodes: Vec<Node<'t>>,
    /// All tokens in source order, comments excluded.
    pub tokens: Vec<Token<'t>>,
    /// All comments in source order.
    pub comments: Vec<Comment<'t>>,
}

impl<'t> Ast<'t> {
    /// Creates an arena holding an empty program with its top-level table.
    pub(crate) fn new() -> Self {
        let program = Node {
            kind: NodeKind::Program { body: NodeId(1) },
            parent: None,
            range: Span::default(),
            loc: Loc::default(),
        };
        let top_level = Node {
            kind: NodeKind::TopLevelTable { body: Vec::new() },
            parent: Some(NodeId(0)),
            range: Span::default(),
            loc: Loc::default(),
        };
        Self {
            nodes: vec![program, top_level],
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// The `Program` node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `TOMLTopLevelTable` node.
    #[inline]
    pub fn top_level_table(&self) -> NodeId {
        NodeId(1)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<'t> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<'t> {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc(
        &mut self,
        kind: NodeKind<'t>,
        parent: NodeId,
        range: Span,
        loc: Loc,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            range,
            loc,
        });
        id
    }

    /// Iterates every node with its handle, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<'t>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// The key parts of a `TOMLKey` node.
    pub fn key_parts(&self, key: NodeId) -> &[NodeId] {
        match &self.node(key).kind {
            NodeKind::Key { parts } => parts,
            _ => &[],
        }
    }

    /// The name a key part contributes: a bare key's text or a quoted key's
    /// string value.
    pub fn key_name(&self, part: NodeId) -> Option<&str> {
        match &self.node(part).kind {
            NodeKind::Bare { name } => Some(name),
            NodeKind::Value(ValueKind::String { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// The key and value handles of a completed `TOMLKeyValue` node.
    pub fn key_value(&self, id: NodeId) -> (NodeId, NodeId) {
        match &self.node(id).kind {
            NodeKind::KeyValue {
                key: Some(key),
                value: Some(value),
            } => (*key, *value),
            _ => unreachable!("key-value node is completed during parsing"),
        }
    }

    /// The key handle of a completed `TOMLTable` node.
    pub fn table_key(&self, id: NodeId) -> NodeId {
        match &self.node(id).kind {
            NodeKind::Table { key: Some(key), .. } => *key,
            _ => unreachable!("table node is completed during parsing"),
        }
    }
}

impl<'t> Index<NodeId> for Ast<'t> {
    type Output = Node<'t>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<'t> {
        self.node(id)
    }
}
