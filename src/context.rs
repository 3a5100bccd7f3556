//! Parse context: token supply, line discipline, and the value-container
//! stack.

use crate::ast::NodeId;
use crate::error::{ErrorCode, ParseError};
use crate::options::TomlVersion;
use crate::token::{Comment, Token};
use crate::tokenizer::{TokenOrComment, Tokenizer};

/// The two driver states.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ParserState {
    Table,
    Value,
}

/// A pending "a value goes here" slot.
///
/// Once a value is produced the parser pops the container and the variant
/// decides what happens next: a plain key-value records the value and demands
/// a newline, an array element looks for a comma or `]`, an inline-table
/// pair looks for a comma or `}`. Arrays and inline tables carry the
/// container they were opened under, so a finished node is handed back to
/// its surroundings without native recursion.
#[derive(Debug)]
pub(crate) enum ValueContainer {
    KeyValue {
        key_value: NodeId,
    },
    ArrayElement {
        array: NodeId,
        outer: Box<ValueContainer>,
    },
    InlineTableKeyValue {
        key_value: NodeId,
        table: NodeId,
        outer: Box<ValueContainer>,
    },
}

impl ValueContainer {
    /// The node a produced value attaches to.
    pub(crate) fn parent(&self) -> NodeId {
        match self {
            Self::KeyValue { key_value, .. } => *key_value,
            Self::ArrayElement { array, .. } => *array,
            Self::InlineTableKeyValue { key_value, .. } => *key_value,
        }
    }
}

/// Options for one [`Context::next_token`] call.
#[derive(Copy, Clone, Default)]
pub(crate) struct NextToken {
    /// Report this code if the token starts on a new line.
    pub(crate) need_same_line: Option<ErrorCode>,
    /// Let the tokenizer produce value literals for this read.
    pub(crate) values_enabled: bool,
}

pub(crate) struct Context<'t> {
    tokenizer: Tokenizer<'t>,
    pub(crate) tokens: Vec<Token<'t>>,
    pub(crate) comments: Vec<Comment<'t>>,
    back: Option<Token<'t>>,
    prev: Option<Token<'t>>,
    curr: Option<Token<'t>>,
    pub(crate) state_stack: Vec<ParserState>,
    /// The next token must start a new line.
    pub(crate) need_new_line: bool,
    /// The next token must stay on the current line, else this code.
    pub(crate) need_same_line: Option<ErrorCode>,
    value_containers: Vec<ValueContainer>,
    /// The table new key-values attach to.
    pub(crate) table: NodeId,
}

impl<'t> Context<'t> {
    pub(crate) fn new(text: &'t str, version: TomlVersion, top_level_table: NodeId) -> Self {
        Self {
            tokenizer: Tokenizer::new(text, version),
            tokens: Vec::new(),
            comments: Vec::new(),
            back: None,
            prev: None,
            curr: None,
            state_stack: Vec::new(),
            need_new_line: false,
            need_same_line: None,
            value_containers: Vec::new(),
            table: top_level_table,
        }
    }

    /// The position just past everything consumed so far.
    pub(crate) fn end_pos(&self) -> crate::cursor::Pos {
        self.tokenizer.end_pos()
    }

    /// Reads the next token, enforcing the pending line discipline.
    pub(crate) fn next_token(
        &mut self,
        option: NextToken,
    ) -> Result<Option<Token<'t>>, ParseError> {
        self.prev = self.curr.take();
        self.curr = match self.back.take() {
            Some(token) => Some(token),
            None => self.next_from_tokenizer(option.values_enabled)?,
        };
        if let (Some(prev), Some(curr)) = (&self.prev, &self.curr) {
            if prev.loc.end.line == curr.loc.start.line {
                if self.need_new_line {
                    return Err(self.err_token(ErrorCode::MissingNewline, Some(curr)));
                }
            } else if let Some(code) = self.need_same_line.or(option.need_same_line) {
                return Err(self.err_token(code, Some(curr)));
            }
        }
        self.need_new_line = false;
        self.need_same_line = None;
        Ok(self.curr.clone())
    }

    fn next_from_tokenizer(
        &mut self,
        values_enabled: bool,
    ) -> Result<Option<Token<'t>>, ParseError> {
        let saved = self.tokenizer.values_enabled;
        if values_enabled {
            self.tokenizer.values_enabled = true;
        }
        let token = loop {
            match self.tokenizer.next() {
                Ok(Some(TokenOrComment::Comment(comment))) => self.comments.push(comment),
                Ok(Some(TokenOrComment::Token(token))) => break Some(token),
                Ok(None) => break None,
                Err(err) => {
                    self.tokenizer.values_enabled = saved;
                    return Err(err);
                }
            }
        };
        if let Some(token) = &token {
            self.tokens.push(token.clone());
        }
        self.tokenizer.values_enabled = saved;
        Ok(token)
    }

    /// Pushes the current token back so the next read returns it again.
    pub(crate) fn back_token(&mut self) {
        debug_assert!(self.back.is_none(), "only one token of pushback");
        self.back = self.curr.take();
        self.curr = self.prev.clone();
    }

    pub(crate) fn add_value_container(&mut self, container: ValueContainer) {
        self.value_containers.push(container);
        self.tokenizer.values_enabled = true;
    }

    pub(crate) fn consume_value_container(&mut self) -> ValueContainer {
        let container = self
            .value_containers
            .pop()
            .unwrap_or_else(|| unreachable!("VALUE state always has a pending container"));
        self.tokenizer.values_enabled = !self.value_containers.is_empty();
        container
    }

    /// Builds an error at a token, or at the read position when the input
    /// ended.
    pub(crate) fn err_token(&self, code: ErrorCode, token: Option<&Token<'t>>) -> ParseError {
        match token {
            Some(token) => ParseError::new(
                code,
                token.range.start,
                token.loc.start.line,
                token.loc.start.column,
            ),
            None => {
                let pos = self.tokenizer.start_pos();
                ParseError::new(code, pos.offset, pos.line, pos.column)
            }
        }
    }
}
