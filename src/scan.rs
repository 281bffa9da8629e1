//! Byte-level cursor over C source text.
//!
//! The rewriter does not parse C; it only needs to recognize string
//! literals, identifiers at token boundaries, digit runs and a fixed
//! array-declaration shape. This cursor provides exactly those pieces.
//! All significant bytes are ASCII, so scanning byte-by-byte keeps every
//! recorded offset on a UTF-8 boundary.

/// True for bytes that can appear in a C identifier.
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn at(src: &'a str, pos: usize) -> Self {
        Cursor { src, pos }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Advance one byte. Safe for scanning because only ASCII bytes are
    /// ever inspected; multi-byte characters pass through untouched.
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Consume `b` if it is the next byte.
    pub(crate) fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `word` if it starts here and ends at an identifier boundary.
    /// The caller is responsible for the boundary before `word`.
    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        let end = self.pos + word.len();
        if self.src.as_bytes().get(self.pos..end) != Some(word.as_bytes()) {
            return false;
        }
        if self.src.as_bytes().get(end).copied().is_some_and(is_ident_byte) {
            return false;
        }
        self.pos = end;
        true
    }

    /// Consume a non-empty run of ASCII digits.
    pub(crate) fn read_digits(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            None
        } else {
            Some(&self.src[start..self.pos])
        }
    }

    /// Consume a double-quoted string literal, honoring `\"` and `\\`
    /// (and any other backslash escape) inside. Returns the literal
    /// including its quotes, or `None` if the cursor is not at a quote or
    /// the literal never terminates (the cursor is left unspecified then;
    /// callers treat it as "no match").
    pub(crate) fn read_string_literal(&mut self) -> Option<&'a str> {
        if self.peek() != Some(b'"') {
            return None;
        }
        let start = self.pos;
        self.bump();
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.bump();
                    if self.at_end() {
                        return None;
                    }
                    self.bump();
                }
                b'"' => {
                    self.bump();
                    return Some(&self.src[start..self.pos]);
                }
                _ => self.bump(),
            }
        }
        None
    }
}

/// Find the next occurrence of `word` at identifier boundaries on both
/// sides, starting the search at byte offset `from`.
pub(crate) fn find_word(src: &str, from: usize, word: &str) -> Option<usize> {
    let mut search = from;
    while search <= src.len() {
        let rel = src.get(search..)?.find(word)?;
        let start = search + rel;
        let bounded_before =
            start == 0 || !src.as_bytes().get(start - 1).copied().is_some_and(is_ident_byte);
        let bounded_after = !src
            .as_bytes()
            .get(start + word.len())
            .copied()
            .is_some_and(is_ident_byte);
        if bounded_before && bounded_after {
            return Some(start);
        }
        search = start + 1;
    }
    None
}
