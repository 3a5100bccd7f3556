//! Conversion from the AST to plain nested values.
//!
//! The caller supplies the scalar representation: a closure maps each
//! [`ValueKind`] leaf to its own scalar type, and this module assembles the
//! tables and arrays around it. Key paths overwrite structurally mismatched
//! placeholders the way document order dictates, so a dotted key or a table
//! header re-shapes whatever scalar stub was there before it.

use std::collections::BTreeMap;

use crate::ast::{Ast, NodeId, NodeKind, StringStyle, TableKind, ValueKind};

#[cfg(test)]
#[path = "./convert_tests.rs"]
mod tests;

/// A plain TOML value with caller-chosen scalars.
#[derive(Clone, PartialEq, Debug)]
pub enum PlainValue<S> {
    Scalar(S),
    Array(Vec<PlainValue<S>>),
    Table(PlainTable<S>),
}

/// A plain table, keyed by resolved key names.
pub type PlainTable<S> = BTreeMap<String, PlainValue<S>>;

/// Converts `node` and everything under it to a plain value.
///
/// Pass [`Ast::root`] to convert the whole document. A key node resolves to
/// an array of its part names; a bare key to its text as a string scalar.
pub fn to_plain<'t, S, F>(ast: &Ast<'t>, node: NodeId, scalar: &mut F) -> PlainValue<S>
where
    F: FnMut(&ValueKind<'t>) -> S,
{
    match &ast.node(node).kind {
        NodeKind::Program { body } => to_plain(ast, *body, scalar),
        NodeKind::TopLevelTable { body } | NodeKind::InlineTable { body } => {
            let mut table = PlainTable::new();
            for &child in body {
                apply_body_item(ast, &mut table, child, scalar);
            }
            PlainValue::Table(table)
        }
        NodeKind::Table { .. } => {
            let mut table = PlainTable::new();
            apply_body_item(ast, &mut table, node, scalar);
            PlainValue::Table(table)
        }
        NodeKind::KeyValue { .. } => {
            let mut table = PlainTable::new();
            apply_body_item(ast, &mut table, node, scalar);
            PlainValue::Table(table)
        }
        NodeKind::Array { elements } => PlainValue::Array(
            elements
                .iter()
                .map(|&element| to_plain(ast, element, scalar))
                .collect(),
        ),
        NodeKind::Value(kind) => PlainValue::Scalar(scalar(kind)),
        NodeKind::Key { parts } => PlainValue::Array(
            parts
                .iter()
                .map(|&part| to_plain(ast, part, scalar))
                .collect(),
        ),
        NodeKind::Bare { name } => {
            let value = ValueKind::String {
                value: Box::from(*name),
                style: StringStyle::Basic,
                multiline: false,
            };
            PlainValue::Scalar(scalar(&value))
        }
    }
}

fn apply_body_item<'t, S, F>(
    ast: &Ast<'t>,
    base: &mut PlainTable<S>,
    node: NodeId,
    scalar: &mut F,
) where
    F: FnMut(&ValueKind<'t>) -> S,
{
    match &ast.node(node).kind {
        NodeKind::KeyValue { .. } => {
            let (key, value) = ast.key_value(node);
            let names = key_names(ast, key);
            let value = to_plain(ast, value, scalar);
            set_path(base, &names, value);
        }
        NodeKind::Table { kind, body, .. } => {
            let names = key_names(ast, ast.table_key(node));
            let target = open_table(base, &names, *kind == TableKind::Array);
            for &child in body {
                apply_body_item(ast, target, child, scalar);
            }
        }
        _ => {}
    }
}

fn key_names(ast: &Ast<'_>, key: NodeId) -> Vec<String> {
    ast.key_parts(key)
        .iter()
        .filter_map(|&part| ast.key_name(part).map(str::to_string))
        .collect()
}

/// Stores `value` at the dotted path `keys`. Intermediate segments holding
/// anything but a table, arrays included, are replaced with an empty table.
fn set_path<S>(base: &mut PlainTable<S>, keys: &[String], value: PlainValue<S>) {
    let Some((last, outer)) = keys.split_last() else {
        return;
    };
    let mut target = base;
    for key in outer {
        target = force_table(target, key);
    }
    target.insert(last.clone(), value);
}

/// Resolves one path segment to a table, overwriting any other shape.
fn force_table<'a, S>(base: &'a mut PlainTable<S>, key: &str) -> &'a mut PlainTable<S> {
    let slot = base
        .entry(key.to_string())
        .or_insert_with(|| PlainValue::Table(PlainTable::new()));
    if !matches!(slot, PlainValue::Table(_)) {
        *slot = PlainValue::Table(PlainTable::new());
    }
    match slot {
        PlainValue::Table(table) => table,
        _ => unreachable!("slot was just made a table"),
    }
}

/// Walks to the table a `[header]` body fills, creating or re-shaping
/// entries as needed. With `array` set, the final segment appends a fresh
/// element to an array of tables.
fn open_table<'a, S>(
    base: &'a mut PlainTable<S>,
    keys: &[String],
    array: bool,
) -> &'a mut PlainTable<S> {
    let Some((last, outer)) = keys.split_last() else {
        return base;
    };
    let mut target = base;
    for key in outer {
        target = descend(target, key);
    }
    let slot = target
        .entry(last.clone())
        .or_insert_with(|| PlainValue::Table(PlainTable::new()));
    if array {
        if !matches!(slot, PlainValue::Array(_)) {
            *slot = PlainValue::Array(Vec::new());
        }
        match slot {
            PlainValue::Array(elements) => {
                elements.push(PlainValue::Table(PlainTable::new()));
                match elements.last_mut() {
                    Some(PlainValue::Table(table)) => table,
                    _ => unreachable!("a table element was just pushed"),
                }
            }
            _ => unreachable!("slot was just made an array"),
        }
    } else {
        if !matches!(slot, PlainValue::Table(_)) {
            *slot = PlainValue::Table(PlainTable::new());
        }
        match slot {
            PlainValue::Table(table) => table,
            _ => unreachable!("slot was just made a table"),
        }
    }
}

/// Resolves one intermediate path segment to a table, descending into the
/// last element of arrays and overwriting scalars with empty tables.
fn descend<'a, S>(base: &'a mut PlainTable<S>, key: &str) -> &'a mut PlainTable<S> {
    let slot = base
        .entry(key.to_string())
        .or_insert_with(|| PlainValue::Table(PlainTable::new()));
    if matches!(slot, PlainValue::Scalar(_)) {
        *slot = PlainValue::Table(PlainTable::new());
    }
    let mut current = slot;
    loop {
        match current {
            PlainValue::Table(table) => return table,
            PlainValue::Array(elements) => {
                match elements.last_mut() {
                    None => elements.push(PlainValue::Table(PlainTable::new())),
                    Some(last @ PlainValue::Scalar(_)) => {
                        *last = PlainValue::Table(PlainTable::new());
                    }
                    Some(_) => {}
                }
                current = match elements.last_mut() {
                    Some(last) => last,
                    None => unreachable!("an element was just pushed"),
                };
            }
            PlainValue::Scalar(_) => unreachable!("scalars were replaced above"),
        }
    }
}
