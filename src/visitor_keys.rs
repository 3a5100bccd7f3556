//! Traversal order for lint visitors.

/// Child field names per node type, in visit order.
pub static VISITOR_KEYS: &[(&str, &[&str])] = &[
    ("Program", &["body"]),
    ("TOMLTopLevelTable", &["body"]),
    ("TOMLTable", &["key", "body"]),
    ("TOMLKeyValue", &["key", "value"]),
    ("TOMLKey", &["keys"]),
    ("TOMLArray", &["elements"]),
    ("TOMLInlineTable", &["body"]),
    ("TOMLBare", &[]),
    ("TOMLValue", &[]),
];

/// The child field names of `node_type`, or `None` for unknown types.
pub fn visitor_keys(node_type: &str) -> Option<&'static [&'static str]> {
    VISITOR_KEYS
        .iter()
        .find(|(name, _)| *name == node_type)
        .map(|(_, keys)| *keys)
}
