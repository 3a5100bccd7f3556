//! Duplicate-key resolution.
//!
//! Works in two phases over one shared key-store tree. While parsing, every
//! table header is resolved as soon as it closes: the header's key path is
//! threaded through the tree, `[[array]]` headers grow a new element, and a
//! header that collides with an existing definition is rejected on the spot.
//! After parsing, a verification pass replays every key-value against the
//! same tree so dotted keys, inline tables and array elements cannot
//! redefine anything a header or an earlier key-value already claimed.

use foldhash::HashMap;

use crate::ast::{Ast, KeySegment, NodeId, NodeKind, TableKind};
use crate::error::{ErrorCode, ParseError};

#[cfg(test)]
#[path = "./resolver_tests.rs"]
mod tests;

/// Handle into [`KeysResolver::stores`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct StoreId(usize);

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum MapKey {
    Name(Box<str>),
    Index(usize),
}

/// How the verification pass has marked a store.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Mark {
    /// Untouched, or claimed only by a table header.
    None,
    /// Traversed by a dotted key on the way to a deeper value.
    Intermediate,
    /// Holds a concrete value.
    Value,
}

/// One node of the key-store tree.
struct KeyStore {
    /// Set when a table header claimed this key, with the header kind.
    table: Option<TableKind>,
    mark: Mark,
    /// The node that defined this key, for error positioning.
    node: NodeId,
    keys: HashMap<MapKey, StoreId>,
    /// For array-of-tables stores, the index of the open element.
    peek_index: usize,
}

pub(crate) struct KeysResolver {
    stores: Vec<KeyStore>,
    /// Every table header in document order, with the store its body
    /// populates.
    tables: Vec<(NodeId, StoreId)>,
}

const ROOT: StoreId = StoreId(0);

impl KeysResolver {
    pub(crate) fn new() -> Self {
        let mut resolver = Self {
            stores: Vec::new(),
            tables: Vec::new(),
        };
        resolver.alloc(NodeId::default(), Mark::None);
        resolver
    }

    fn alloc(&mut self, node: NodeId, mark: Mark) -> StoreId {
        let id = StoreId(self.stores.len());
        self.stores.push(KeyStore {
            table: None,
            mark,
            node,
            keys: HashMap::default(),
            peek_index: 0,
        });
        id
    }

    fn lookup(&self, scope: StoreId, key: &MapKey) -> Option<StoreId> {
        self.stores[scope.0].keys.get(key).copied()
    }

    fn insert(&mut self, scope: StoreId, key: MapKey, store: StoreId) {
        self.stores[scope.0].keys.insert(key, store);
    }

    /// Resolves a just-closed table header against the tree, recording the
    /// header's resolved key path on the table node.
    pub(crate) fn apply_resolve_key_for_table(
        &mut self,
        ast: &mut Ast<'_>,
        table: NodeId,
    ) -> Result<(), ParseError> {
        let kind = match &ast.node(table).kind {
            NodeKind::Table { kind, .. } => *kind,
            _ => return Ok(()),
        };
        let parts = ast.key_parts(ast.table_key(table)).to_vec();
        let mut resolved = Vec::new();
        let mut scope = ROOT;

        let (last_part, outer_parts) = match parts.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        for &part in outer_parts {
            let name = part_name(ast, part);
            resolved.push(KeySegment::Key(name.to_string()));
            let map_key = MapKey::Name(name);
            scope = match self.lookup(scope, &map_key) {
                Some(store) => {
                    if self.stores[store.0].table == Some(TableKind::Array) {
                        // Dotting through an array of tables lands in its
                        // open element.
                        let peek = self.stores[store.0].peek_index;
                        resolved.push(KeySegment::Index(peek));
                        match self.lookup(store, &MapKey::Index(peek)) {
                            Some(element) => element,
                            None => unreachable!("array store always holds its open element"),
                        }
                    } else {
                        store
                    }
                }
                None => {
                    let store = self.alloc(part, Mark::None);
                    self.insert(scope, map_key, store);
                    store
                }
            };
        }

        let name = part_name(ast, *last_part);
        resolved.push(KeySegment::Key(name.to_string()));
        let map_key = MapKey::Name(name);
        match self.lookup(scope, &map_key) {
            None => {
                if kind == TableKind::Array {
                    resolved.push(KeySegment::Index(0));
                    let element = self.alloc(*last_part, Mark::None);
                    let array = self.alloc(*last_part, Mark::None);
                    self.stores[array.0].table = Some(TableKind::Array);
                    self.insert(array, MapKey::Index(0), element);
                    self.insert(scope, map_key, array);
                    self.tables.push((table, element));
                } else {
                    let store = self.alloc(*last_part, Mark::None);
                    self.stores[store.0].table = Some(TableKind::Standard);
                    self.insert(scope, map_key, store);
                    self.tables.push((table, store));
                }
            }
            Some(store) => match self.stores[store.0].table {
                None => {
                    // Claimed so far only as a dotted-key intermediate; a
                    // standard header may still take it over.
                    if kind == TableKind::Array {
                        return Err(dupe_err(ast, *last_part));
                    }
                    self.stores[store.0].table = Some(TableKind::Standard);
                    self.stores[store.0].node = *last_part;
                    self.tables.push((table, store));
                }
                Some(TableKind::Array) => {
                    if kind != TableKind::Array {
                        return Err(dupe_err(ast, *last_part));
                    }
                    let next = self.stores[store.0].peek_index + 1;
                    resolved.push(KeySegment::Index(next));
                    let element = self.alloc(*last_part, Mark::None);
                    self.insert(store, MapKey::Index(next), element);
                    self.stores[store.0].peek_index = next;
                    self.tables.push((table, element));
                }
                Some(TableKind::Standard) => {
                    return Err(dupe_err(ast, *last_part));
                }
            },
        }

        if let NodeKind::Table { resolved_key, .. } = &mut ast.node_mut(table).kind {
            *resolved_key = resolved;
        }
        Ok(())
    }

    /// Replays every key-value of the document against the key-store tree.
    pub(crate) fn verify_duplicate_keys(&mut self, ast: &Ast<'_>) -> Result<(), ParseError> {
        let top = ast.top_level_table();
        if let NodeKind::TopLevelTable { body } = &ast.node(top).kind {
            for &child in body {
                if matches!(ast.node(child).kind, NodeKind::KeyValue { .. }) {
                    self.verify_key_value(ast, ROOT, child)?;
                }
            }
        }
        let tables = std::mem::take(&mut self.tables);
        for &(table, scope) in &tables {
            if let NodeKind::Table { body, .. } = &ast.node(table).kind {
                for &key_value in body {
                    self.verify_key_value(ast, scope, key_value)?;
                }
            }
        }
        self.tables = tables;
        Ok(())
    }

    fn verify_key_value(
        &mut self,
        ast: &Ast<'_>,
        scope: StoreId,
        key_value: NodeId,
    ) -> Result<(), ParseError> {
        let (key, value) = ast.key_value(key_value);
        let parts = ast.key_parts(key).to_vec();
        let Some(&last_part) = parts.last() else {
            return Ok(());
        };
        let mut scope = scope;
        for &part in &parts {
            let map_key = MapKey::Name(part_name(ast, part));
            scope = match self.lookup(scope, &map_key) {
                Some(store) => {
                    let existing = &self.stores[store.0];
                    if existing.mark == Mark::Value
                        || part == last_part
                        || existing.table.is_some()
                    {
                        return Err(dupe_err(ast, after_node(ast, part, existing.node)));
                    }
                    self.stores[store.0].mark = Mark::Intermediate;
                    store
                }
                None => {
                    let mark = if part == last_part {
                        Mark::Value
                    } else {
                        Mark::Intermediate
                    };
                    let store = self.alloc(part, mark);
                    self.insert(scope, map_key, store);
                    store
                }
            };
        }
        self.verify_value(ast, scope, value)
    }

    /// Descends into a value: inline tables open a nested scope per pair,
    /// array elements each get an indexed store.
    fn verify_value(&mut self, ast: &Ast<'_>, scope: StoreId, value: NodeId) -> Result<(), ParseError> {
        match &ast.node(value).kind {
            NodeKind::InlineTable { body } => {
                for &key_value in body {
                    self.verify_key_value(ast, scope, key_value)?;
                }
                Ok(())
            }
            NodeKind::Array { elements } => {
                for (index, &element) in elements.iter().enumerate() {
                    let store = self.alloc(element, Mark::Value);
                    self.insert(scope, MapKey::Index(index), store);
                    self.verify_value(ast, store, element)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Picks whichever of the two nodes appears later in the source, so the
/// duplicate is always reported at the re-definition.
fn after_node(ast: &Ast<'_>, a: NodeId, b: NodeId) -> NodeId {
    if ast.node(a).range.start <= ast.node(b).range.start {
        b
    } else {
        a
    }
}

fn dupe_err(ast: &Ast<'_>, node: NodeId) -> ParseError {
    let node = ast.node(node);
    ParseError::new(
        ErrorCode::DupeKeys,
        node.range.start,
        node.loc.start.line,
        node.loc.start.column,
    )
}

fn part_name(ast: &Ast<'_>, part: NodeId) -> Box<str> {
    match ast.key_name(part) {
        Some(name) => Box::from(name),
        None => unreachable!("key parts are bare keys or quoted strings"),
    }
}
