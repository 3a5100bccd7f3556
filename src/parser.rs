//! The parser driver.
//!
//! A single token-pump loop with two states: `TABLE` expects a table header
//! or a key, `VALUE` expects a value. Nested arrays and inline tables hand
//! control back to the loop through value containers instead of recursing,
//! so nesting depth never grows the native call stack.

use crate::ast::{Ast, DateTimeKind, NodeId, NodeKind, StringStyle, TableKind, ValueKind};
use crate::context::{Context, NextToken, ParserState, ValueContainer};
use crate::error::{ErrorCode, ParseError};
use crate::options::TomlVersion;
use crate::resolver::KeysResolver;
use crate::span::LineCol;
use crate::token::{Token, TokenKind};

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

pub(crate) fn parse_ast(text: &str, version: TomlVersion) -> Result<Ast<'_>, ParseError> {
    let ast = Ast::new();
    let top = ast.top_level_table();
    Parser {
        version,
        ctx: Context::new(text, version, top),
        ast,
        resolver: KeysResolver::new(),
    }
    .run()
}

struct Parser<'t> {
    version: TomlVersion,
    ast: Ast<'t>,
    ctx: Context<'t>,
    resolver: KeysResolver,
}

impl<'t> Parser<'t> {
    fn run(mut self) -> Result<Ast<'t>, ParseError> {
        let top = self.ast.top_level_table();
        let mut token = self.ctx.next_token(NextToken::default())?;
        if let Some(first) = &token {
            let node = self.ast.node_mut(top);
            node.range.start = first.range.start;
            node.loc.start = first.loc.start;

            while let Some(t) = token {
                let state = self.ctx.state_stack.pop().unwrap_or(ParserState::Table);
                let next = match state {
                    ParserState::Table => self.table_state(t)?,
                    ParserState::Value => self.value_state(t)?,
                };
                self.ctx.state_stack.extend(next);
                token = self.ctx.next_token(NextToken::default())?;
            }
            let state = self.ctx.state_stack.pop().unwrap_or(ParserState::Table);
            if state == ParserState::Value {
                return Err(self.ctx.err_token(ErrorCode::MissingValue, None));
            }
            if self.ctx.table != top {
                self.end_from_last_child(self.ctx.table);
            }
            self.end_from_last_child(top);
        }

        self.resolver.verify_duplicate_keys(&self.ast)?;

        let end = self.ctx.end_pos();
        let root = self.ast.root();
        let node = self.ast.node_mut(root);
        node.range.end = end.offset;
        node.loc.end = LineCol::new(end.line, end.column);

        self.ast.tokens = std::mem::take(&mut self.ctx.tokens);
        self.ast.comments = std::mem::take(&mut self.ctx.comments);
        Ok(self.ast)
    }

    fn table_state(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        if is_key_token(&token) {
            let table = self.ctx.table;
            return self.process_key_value(token, table);
        }
        if token.is_punct('[') {
            return self.process_table(token);
        }
        Err(self.ctx.err_token(ErrorCode::UnexpectedToken, Some(&token)))
    }

    fn value_state(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        match &token.kind {
            TokenKind::BasicString(_)
            | TokenKind::LiteralString(_)
            | TokenKind::MultiLineBasicString(_)
            | TokenKind::MultiLineLiteralString(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Boolean(_)
            | TokenKind::OffsetDateTime(_)
            | TokenKind::LocalDateTime(_)
            | TokenKind::LocalDate(_)
            | TokenKind::LocalTime(_) => self.process_simple_value(token),
            TokenKind::Punctuator('[') => self.process_array(token),
            TokenKind::Punctuator('{') => self.process_inline_table(token),
            _ => Err(self.ctx.err_token(ErrorCode::UnexpectedToken, Some(&token))),
        }
    }

    fn process_table(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        let top = self.ast.top_level_table();
        if self.ctx.table != top {
            self.end_from_last_child(self.ctx.table);
        }
        let table = self.ast.alloc(
            NodeKind::Table {
                kind: TableKind::Standard,
                key: None,
                body: Vec::new(),
                resolved_key: Vec::new(),
            },
            top,
            token.range,
            token.loc,
        );
        if let NodeKind::TopLevelTable { body } = &mut self.ast.node_mut(top).kind {
            body.push(table);
        }
        self.ctx.table = table;

        let same_line = NextToken {
            need_same_line: Some(ErrorCode::InvalidKeyValueNewline),
            values_enabled: false,
        };
        let mut target = self.ctx.next_token(same_line)?;
        let mut is_array = false;
        if let Some(t) = &target {
            if t.is_punct('[') {
                // `[[` must be two adjacent brackets.
                if token.range.end < t.range.start {
                    return Err(self.ctx.err_token(ErrorCode::InvalidSpace, Some(t)));
                }
                is_array = true;
                if let NodeKind::Table { kind, .. } = &mut self.ast.node_mut(table).kind {
                    *kind = TableKind::Array;
                }
                target = self.ctx.next_token(same_line)?;
            }
        }
        if let Some(t) = &target {
            if t.is_punct(']') {
                return Err(self.ctx.err_token(ErrorCode::MissingKey, Some(t)));
            }
        }
        let Some(t) = target else {
            return Err(self.ctx.err_token(ErrorCode::UnterminatedTableKey, None));
        };
        let (_, target) = self.process_key_node(t, table)?;
        let mut closing = match &target {
            Some(t) if t.is_punct(']') => t.clone(),
            _ => {
                return Err(self.ctx.err_token(ErrorCode::UnterminatedTableKey, target.as_ref()));
            }
        };
        if is_array {
            let target = self.ctx.next_token(same_line)?;
            let second = match &target {
                Some(t) if t.is_punct(']') => t.clone(),
                _ => {
                    return Err(
                        self.ctx.err_token(ErrorCode::UnterminatedTableKey, target.as_ref())
                    );
                }
            };
            if closing.range.end < second.range.start {
                return Err(self.ctx.err_token(ErrorCode::InvalidSpace, Some(&second)));
            }
            closing = second;
        }
        self.end_from_token(table, &closing);
        self.resolver.apply_resolve_key_for_table(&mut self.ast, table)?;
        self.ctx.need_new_line = true;
        Ok(None)
    }

    fn process_key_value(
        &mut self,
        token: Token<'t>,
        table_node: NodeId,
    ) -> Result<Option<ParserState>, ParseError> {
        let key_value = self.ast.alloc(
            NodeKind::KeyValue {
                key: None,
                value: None,
            },
            table_node,
            token.range,
            token.loc,
        );
        match &mut self.ast.node_mut(table_node).kind {
            NodeKind::TopLevelTable { body } | NodeKind::Table { body, .. } => {
                body.push(key_value);
            }
            _ => {}
        }
        let (_, target) = self.process_key_node(token, key_value)?;
        if !is_punct_opt(&target, '=') {
            return Err(self.ctx.err_token(ErrorCode::MissingEqualsSign, target.as_ref()));
        }
        self.ctx.add_value_container(ValueContainer::KeyValue { key_value });
        self.ctx.need_same_line = Some(ErrorCode::InvalidKeyValueNewline);
        Ok(Some(ParserState::Value))
    }

    /// Parses a dotted key starting at `token`, attaching the key node to
    /// `parent`. Returns the key and the first token past it.
    fn process_key_node(
        &mut self,
        token: Token<'t>,
        parent: NodeId,
    ) -> Result<(NodeId, Option<Token<'t>>), ParseError> {
        let key = self.ast.alloc(
            NodeKind::Key { parts: Vec::new() },
            parent,
            token.range,
            token.loc,
        );
        match &mut self.ast.node_mut(parent).kind {
            NodeKind::Table { key: slot, .. } | NodeKind::KeyValue { key: slot, .. } => {
                *slot = Some(key);
            }
            _ => {}
        }
        let same_line = NextToken {
            need_same_line: Some(ErrorCode::InvalidKeyValueNewline),
            values_enabled: false,
        };
        let mut target = Some(token);
        while let Some(t) = &target {
            if !is_key_token(t) {
                break;
            }
            self.process_key_part(t.clone(), key);
            target = self.ctx.next_token(same_line)?;
            if is_punct_opt(&target, '.') {
                target = self.ctx.next_token(same_line)?;
                if self.version.requires_key_part_after_dot()
                    && !matches!(&target, Some(t) if is_key_token(t))
                {
                    return Err(self.ctx.err_token(ErrorCode::MissingKey, target.as_ref()));
                }
            } else {
                break;
            }
        }
        let last = self.ast.key_parts(key).last().copied();
        if let Some(last) = last {
            self.end_from_node(key, last);
        }
        Ok((key, target))
    }

    fn process_key_part(&mut self, token: Token<'t>, key: NodeId) {
        let kind = match &token.kind {
            TokenKind::Bare => NodeKind::Bare { name: token.value },
            TokenKind::BasicString(s) => NodeKind::Value(ValueKind::String {
                value: s.clone(),
                style: StringStyle::Basic,
                multiline: false,
            }),
            TokenKind::LiteralString(s) => NodeKind::Value(ValueKind::String {
                value: s.clone(),
                style: StringStyle::Literal,
                multiline: false,
            }),
            _ => return,
        };
        let part = self.ast.alloc(kind, key, token.range, token.loc);
        if let NodeKind::Key { parts } = &mut self.ast.node_mut(key).kind {
            parts.push(part);
        }
    }

    fn process_simple_value(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        let container = self.ctx.consume_value_container();
        let kind = match token.kind.clone() {
            TokenKind::BasicString(value) => ValueKind::String {
                value,
                style: StringStyle::Basic,
                multiline: false,
            },
            TokenKind::LiteralString(value) => ValueKind::String {
                value,
                style: StringStyle::Literal,
                multiline: false,
            },
            TokenKind::MultiLineBasicString(value) => ValueKind::String {
                value,
                style: StringStyle::Basic,
                multiline: true,
            },
            TokenKind::MultiLineLiteralString(value) => ValueKind::String {
                value,
                style: StringStyle::Literal,
                multiline: true,
            },
            TokenKind::Integer(repr) => ValueKind::Integer(repr),
            TokenKind::Float(value) => ValueKind::Float(value),
            TokenKind::Boolean(value) => ValueKind::Boolean(value),
            TokenKind::OffsetDateTime(value) => ValueKind::DateTime {
                kind: DateTimeKind::OffsetDateTime,
                value,
                text: token.value,
            },
            TokenKind::LocalDateTime(value) => ValueKind::DateTime {
                kind: DateTimeKind::LocalDateTime,
                value,
                text: token.value,
            },
            TokenKind::LocalDate(value) => ValueKind::DateTime {
                kind: DateTimeKind::LocalDate,
                value,
                text: token.value,
            },
            TokenKind::LocalTime(value) => ValueKind::DateTime {
                kind: DateTimeKind::LocalTime,
                value,
                text: token.value,
            },
            TokenKind::Bare | TokenKind::Punctuator(_) => {
                unreachable!("VALUE state never sees key tokens")
            }
        };
        let value = self
            .ast
            .alloc(NodeKind::Value(kind), container.parent(), token.range, token.loc);
        self.deliver(container, value)
    }

    fn process_array(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        let outer = self.ctx.consume_value_container();
        let array = self.ast.alloc(
            NodeKind::Array {
                elements: Vec::new(),
            },
            outer.parent(),
            token.range,
            token.loc,
        );
        let values = NextToken {
            values_enabled: true,
            ..NextToken::default()
        };
        let next = self.ctx.next_token(values)?;
        if let Some(t) = &next {
            if t.is_punct(']') {
                self.end_from_token(array, t);
                return self.deliver(outer, array);
            }
        }
        self.ctx.back_token();
        self.ctx.add_value_container(ValueContainer::ArrayElement {
            array,
            outer: Box::new(outer),
        });
        Ok(Some(ParserState::Value))
    }

    fn process_inline_table(&mut self, token: Token<'t>) -> Result<Option<ParserState>, ParseError> {
        let outer = self.ctx.consume_value_container();
        let table = self.ast.alloc(
            NodeKind::InlineTable { body: Vec::new() },
            outer.parent(),
            token.range,
            token.loc,
        );
        let next = self.ctx.next_token(self.inline_next())?;
        if let Some(t) = next {
            if is_key_token(&t) {
                return self.process_inline_table_key_value(t, table, Box::new(outer));
            }
            if t.is_punct('}') {
                self.end_from_token(table, &t);
                return self.deliver(outer, table);
            }
            return Err(self.ctx.err_token(ErrorCode::UnexpectedToken, Some(&t)));
        }
        Err(self.ctx.err_token(ErrorCode::UnexpectedToken, None))
    }

    fn process_inline_table_key_value(
        &mut self,
        token: Token<'t>,
        table: NodeId,
        outer: Box<ValueContainer>,
    ) -> Result<Option<ParserState>, ParseError> {
        let key_value = self.ast.alloc(
            NodeKind::KeyValue {
                key: None,
                value: None,
            },
            table,
            token.range,
            token.loc,
        );
        if let NodeKind::InlineTable { body } = &mut self.ast.node_mut(table).kind {
            body.push(key_value);
        }
        let (_, target) = self.process_key_node(token, key_value)?;
        if !is_punct_opt(&target, '=') {
            return Err(self.ctx.err_token(ErrorCode::MissingEqualsSign, target.as_ref()));
        }
        self.ctx.add_value_container(ValueContainer::InlineTableKeyValue {
            key_value,
            table,
            outer,
        });
        self.ctx.need_same_line = Some(ErrorCode::InvalidKeyValueNewline);
        Ok(Some(ParserState::Value))
    }

    /// Hands a finished value to its container, then keeps delivering as
    /// arrays and inline tables close.
    fn deliver(
        &mut self,
        mut container: ValueContainer,
        mut value: NodeId,
    ) -> Result<Option<ParserState>, ParseError> {
        loop {
            match container {
                ValueContainer::KeyValue { key_value } => {
                    self.set_key_value_value(key_value, value);
                    self.ctx.need_new_line = true;
                    return Ok(None);
                }
                ValueContainer::ArrayElement { array, outer } => {
                    if let NodeKind::Array { elements } = &mut self.ast.node_mut(array).kind {
                        elements.push(value);
                    }
                    let values = NextToken {
                        values_enabled: true,
                        ..NextToken::default()
                    };
                    let mut next = self.ctx.next_token(values)?;
                    let has_comma = is_punct_opt(&next, ',');
                    if has_comma {
                        next = self.ctx.next_token(values)?;
                    }
                    if let Some(t) = &next {
                        if t.is_punct(']') {
                            self.end_from_token(array, t);
                            container = *outer;
                            value = array;
                            continue;
                        }
                    }
                    if has_comma {
                        self.ctx.back_token();
                        self.ctx.add_value_container(ValueContainer::ArrayElement {
                            array,
                            outer,
                        });
                        return Ok(Some(ParserState::Value));
                    }
                    return Err(self.ctx.err_token(
                        if next.is_some() {
                            ErrorCode::MissingComma
                        } else {
                            ErrorCode::UnterminatedArray
                        },
                        next.as_ref(),
                    ));
                }
                ValueContainer::InlineTableKeyValue {
                    key_value,
                    table,
                    outer,
                } => {
                    self.set_key_value_value(key_value, value);
                    let mut next = self.ctx.next_token(self.inline_next())?;
                    if is_punct_opt(&next, ',') {
                        next = self.ctx.next_token(self.inline_next())?;
                        let Some(t) = next else {
                            return Err(
                                self.ctx.err_token(ErrorCode::UnterminatedInlineTable, None)
                            );
                        };
                        if is_key_token(&t) {
                            return self.process_inline_table_key_value(t, table, outer);
                        }
                        if t.is_punct('}') {
                            if self.version.allows_trailing_comma_in_inline_tables() {
                                self.end_from_token(table, &t);
                                container = *outer;
                                value = table;
                                continue;
                            }
                            return Err(self.ctx.err_token(
                                ErrorCode::InvalidTrailingCommaInInlineTable,
                                Some(&t),
                            ));
                        }
                        return Err(self.ctx.err_token(ErrorCode::UnexpectedToken, Some(&t)));
                    }
                    if let Some(t) = &next {
                        if t.is_punct('}') {
                            self.end_from_token(table, t);
                            container = *outer;
                            value = table;
                            continue;
                        }
                    }
                    return Err(self.ctx.err_token(
                        if next.is_some() {
                            ErrorCode::MissingComma
                        } else {
                            ErrorCode::UnterminatedInlineTable
                        },
                        next.as_ref(),
                    ));
                }
            }
        }
    }

    fn inline_next(&self) -> NextToken {
        NextToken {
            need_same_line: if self.version.allows_newlines_in_inline_tables() {
                None
            } else {
                Some(ErrorCode::InvalidInlineTableNewline)
            },
            values_enabled: false,
        }
    }

    fn set_key_value_value(&mut self, key_value: NodeId, value: NodeId) {
        if let NodeKind::KeyValue { value: slot, .. } = &mut self.ast.node_mut(key_value).kind {
            *slot = Some(value);
        }
        self.end_from_node(key_value, value);
    }

    fn end_from_node(&mut self, node: NodeId, child: NodeId) {
        let (end, loc_end) = {
            let child = self.ast.node(child);
            (child.range.end, child.loc.end)
        };
        let node = self.ast.node_mut(node);
        node.range.end = end;
        node.loc.end = loc_end;
    }

    fn end_from_token(&mut self, node: NodeId, token: &Token<'t>) {
        let n = self.ast.node_mut(node);
        n.range.end = token.range.end;
        n.loc.end = token.loc.end;
    }

    fn end_from_last_child(&mut self, node: NodeId) {
        let last = match &self.ast.node(node).kind {
            NodeKind::TopLevelTable { body }
            | NodeKind::Table { body, .. }
            | NodeKind::InlineTable { body } => body.last().copied(),
            _ => None,
        };
        if let Some(child) = last {
            self.end_from_node(node, child);
        }
    }
}

fn is_key_token(token: &Token<'_>) -> bool {
    matches!(
        token.kind,
        TokenKind::Bare | TokenKind::BasicString(_) | TokenKind::LiteralString(_)
    )
}

fn is_punct_opt(token: &Option<Token<'_>>, c: char) -> bool {
    matches!(token, Some(t) if t.is_punct(c))
}
