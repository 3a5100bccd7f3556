//! Character-level cursor over the source text.
//!
//! Decodes the input as Unicode scalar values and folds `\r\n` and bare
//! `\r` into a single logical `'\n'` unit that advances the line counter.
//! Offsets and columns are measured in bytes, so they index straight back
//! into the source `&str`.

#[cfg(test)]
#[path = "./cursor_tests.rs"]
mod tests;

/// A cursor position: byte offset plus 1-based line and 0-based column.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct Pos {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub(crate) fn origin() -> Self {
        Pos {
            offset: 0,
            line: 1,
            column: 0,
        }
    }
}

/// Iterates the Unicode scalar values of the source.
///
/// `start` is the position of the most recently consumed character and `end`
/// is the position one past it; both are valid to slice the source with.
pub(crate) struct CodePointIterator<'t> {
    text: &'t str,
    eof: bool,
    pub(crate) start: Pos,
    pub(crate) end: Pos,
}

impl<'t> CodePointIterator<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        Self {
            text,
            eof: false,
            start: Pos::origin(),
            end: Pos::origin(),
        }
    }

    /// Consumes and returns the next scalar value, or `None` at end of input.
    pub(crate) fn next(&mut self) -> Option<char> {
        if self.eof {
            return None;
        }
        let pos = self.end;
        let cp = self.move_at(pos);
        if cp.is_none() {
            self.eof = true;
        }
        cp
    }

    /// Consumes the next character only if it equals `cp`. No-op otherwise.
    pub(crate) fn eat(&mut self, cp: char) -> bool {
        if self.peek_raw(self.end.offset) == Some(cp) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Seeks to an absolute position and consumes the character there.
    ///
    /// Both `start` and `end` are rewritten, so this also serves as the
    /// backtracking primitive: save a [`Pos`], seek back to it later.
    pub(crate) fn move_at(&mut self, pos: Pos) -> Option<char> {
        self.start = pos;
        self.end = pos;
        self.eof = false;

        let Some(cp) = self.peek_raw(pos.offset) else {
            return None;
        };
        self.end.offset += cp.len_utf8();
        match cp {
            '\n' => {
                self.end.line += 1;
                self.end.column = 0;
            }
            '\r' => {
                // CRLF and a bare CR both count as one logical newline.
                if self.peek_raw(self.end.offset) == Some('\n') {
                    self.end.offset += 1;
                }
                self.end.line += 1;
                self.end.column = 0;
                return Some('\n');
            }
            _ => {
                self.end.column += cp.len_utf8();
            }
        }
        Some(cp)
    }

    /// Lookahead from the current position, without moving the cursor.
    pub(crate) fn sub_code_points(&self) -> SubCodePoints<'t> {
        SubCodePoints {
            text: self.text,
            offset: self.end.offset,
            count: 0,
            done: false,
        }
    }

    fn peek_raw(&self, offset: usize) -> Option<char> {
        self.text.get(offset..)?.chars().next()
    }
}

/// A secondary, non-mutating cursor used for fixed-width lookahead.
///
/// Applies the same CRLF folding as the primary cursor. `count` records how
/// many scalar values [`next`](Self::next) has been asked for, which the
/// tokenizer uses to skip past a matched lookahead.
pub(crate) struct SubCodePoints<'t> {
    text: &'t str,
    offset: usize,
    pub(crate) count: usize,
    done: bool,
}

impl SubCodePoints<'_> {
    pub(crate) fn next(&mut self) -> Option<char> {
        if self.done {
            return None;
        }
        self.count += 1;
        let Some(cp) = self.text.get(self.offset..).and_then(|s| s.chars().next()) else {
            self.done = true;
            return None;
        };
        self.offset += cp.len_utf8();
        if cp == '\r' {
            if self.text.as_bytes().get(self.offset) == Some(&b'\n') {
                self.offset += 1;
            }
            return Some('\n');
        }
        Some(cp)
    }
}

impl Iterator for SubCodePoints<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        SubCodePoints::next(self)
    }
}
