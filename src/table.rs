//! Translation Table Loader
//!
//! Parses the line-oriented translation table into rows and builds the
//! lookup index used by the rewriter. Each row holds N per-language strings
//! followed by one generated C array identifier:
//!
//! ```text
//! ; comment line
//! "Hello"  "Bonjour"   greet_str
//! "OK"     "D'accord"  ok_btnmap
//! ```
//!
//! The language count N is fixed from the first accepted row and is not
//! re-validated against later rows; existing table files depend on the
//! lenient behavior, so a mismatched row is kept rather than rejected.

use std::collections::HashMap;

use crate::Verbosity;
use crate::escape::normalize_unicode_escapes;

/// One table entry: N per-language strings plus the generated array name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    /// Per-language strings in table column order.
    pub strings: Vec<String>,
    /// C identifier of the generated per-language array.
    pub array_name: String,
}

/// A fully loaded translation table.
///
/// Rows keep their table order so generation is deterministic. The index
/// maps every per-language string of every row back to its owning row;
/// when the same string appears in more than one row, the later row wins
/// and a warning is printed (loading continues).
#[derive(Debug, Clone)]
pub struct TranslationTable {
    rows: Vec<TranslationRow>,
    lang_count: usize,
    index: HashMap<String, usize>,
}

impl TranslationTable {
    /// Parse table text into rows and the string index.
    ///
    /// Line handling:
    /// - blank lines and lines starting with `;` are skipped
    /// - fields are split shell-style (see `split_fields`); a line that
    ///   fails to split (unterminated quote) is skipped
    /// - empty fields are dropped; a line with fewer than 3 remaining
    ///   fields is discarded
    /// - every accepted field is normalized per the escape module
    ///
    /// An empty table is representable; callers check [`Self::is_empty`].
    pub fn parse(text: &str, verbosity: Verbosity) -> Self {
        let mut rows = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some(fields) = split_fields(line) else {
                continue;
            };
            let fields: Vec<String> = fields
                .into_iter()
                .filter(|f| !f.is_empty())
                .map(|f| normalize_unicode_escapes(&f))
                .collect();
            if fields.len() < 3 {
                continue;
            }
            let mut fields = fields;
            // At least 3 fields here, so the pop always yields the identifier.
            let array_name = fields.pop().unwrap_or_default();
            rows.push(TranslationRow { strings: fields, array_name });
        }

        let lang_count = rows.first().map_or(0, |row| row.strings.len());

        let mut index = HashMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            for s in &row.strings {
                if index.insert(s.clone(), row_idx).is_some() && verbosity >= Verbosity::Normal {
                    eprintln!("Warning: duplicate string '{}', later row wins", s);
                }
            }
        }

        TranslationTable { rows, lang_count, index }
    }

    /// True when no row was accepted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of languages, fixed from the first accepted row.
    pub fn lang_count(&self) -> usize {
        self.lang_count
    }

    /// Accepted rows in table order.
    pub fn rows(&self) -> &[TranslationRow] {
        &self.rows
    }

    /// Look up the row owning `key`, where `key` may be any of the row's
    /// per-language strings.
    pub fn row_for(&self, key: &str) -> Option<&TranslationRow> {
        self.index.get(key).and_then(|&idx| self.rows.get(idx))
    }

    /// Look up the generated array name for `key`.
    pub fn array_name_for(&self, key: &str) -> Option<&str> {
        self.row_for(key).map(|row| row.array_name.as_str())
    }

    /// The translation of `key` for language slot `lang`.
    ///
    /// A row shorter than the table's language count falls back to its
    /// first string for the missing slots, so mismatched rows degrade to
    /// repeating the canonical text instead of breaking the output.
    pub fn translation_for(&self, key: &str, lang: usize) -> Option<&str> {
        let row = self.row_for(key)?;
        row.strings
            .get(lang)
            .or_else(|| row.strings.first())
            .map(String::as_str)
    }
}

/// Split a table line into fields, shell-style.
///
/// Supported syntax:
/// - whitespace separates fields
/// - single quotes group literally (no escapes inside)
/// - double quotes group with `\"` and `\\` escapes; any other backslash
///   is kept as-is so `\uXXXX` escapes survive splitting
/// - outside quotes a backslash escapes the next character
///
/// Returns `None` for an unterminated quote or a trailing escape; the
/// caller drops the line and keeps loading.
pub(crate) fn split_fields(line: &str) -> Option<Vec<String>> {
    #[derive(PartialEq)]
    enum State {
        Plain,
        Single,
        Double,
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_field = false;
    let mut state = State::Plain;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match state {
            State::Plain => match c {
                '\'' => {
                    in_field = true;
                    state = State::Single;
                }
                '"' => {
                    in_field = true;
                    state = State::Double;
                }
                '\\' => {
                    current.push(chars.next()?);
                    in_field = true;
                }
                c if c.is_whitespace() => {
                    if in_field {
                        fields.push(std::mem::take(&mut current));
                        in_field = false;
                    }
                }
                c => {
                    current.push(c);
                    in_field = true;
                }
            },
            State::Single => match c {
                '\'' => state = State::Plain,
                c => current.push(c),
            },
            State::Double => match c {
                '"' => state = State::Plain,
                '\\' => {
                    let next = chars.next()?;
                    if next != '"' && next != '\\' {
                        current.push('\\');
                    }
                    current.push(next);
                }
                c => current.push(c),
            },
        }
    }

    if state != State::Plain {
        return None;
    }
    if in_field {
        fields.push(current);
    }
    Some(fields)
}
