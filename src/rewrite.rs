//! Source Rewriter
//!
//! Rewrites one C source document against a loaded translation table in
//! four ordered phases:
//!
//! 1. whole-document `\uXXXX` escape normalization
//! 2. map-initializer rewriting: flat `static const char *map[N] = {...};`
//!    initializers whose items hit the table become per-language 2-D
//!    arrays, and the next `lv_btnmatrix_set_map(obj, map);` call is
//!    rewritten to index by the language variable
//! 3. exclusion-zone detection: spans of every map-initializer body, so
//!    generated array contents are never re-rewritten as plain literals
//! 4. literal rewriting: every remaining string literal whose content is
//!    a table key becomes `ARRAY_NAME[lang_index]`
//!
//! Anything that does not match a phase's grammar is left untouched; the
//! rewriter never fails on unparsable source constructs.

use crate::escape::normalize_unicode_escapes;
use crate::scan::{Cursor, find_word};
use crate::table::TranslationTable;
use crate::{ReservedNames, Verbosity};

/// Result of rewriting one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The final document text.
    pub text: String,
    /// True when at least one map initializer or string literal was
    /// substituted. Escape normalization alone does not count.
    pub modified: bool,
}

/// A recognized map-array initializer.
#[derive(Debug)]
struct MapInitializer<'s> {
    /// Offset of the `static` keyword.
    start: usize,
    /// Offset just past the terminating `;`.
    end: usize,
    /// The literal numeric size, when the first dimension is numeric.
    size: Option<&'s str>,
    /// Span of the initializer body, between the outer braces.
    body_start: usize,
    body_end: usize,
    /// Comma-separated items, trimmed, empties dropped.
    items: Vec<&'s str>,
}

pub struct Rewriter<'a> {
    table: &'a TranslationTable,
    names: &'a ReservedNames,
    verbosity: Verbosity,
}

impl<'a> Rewriter<'a> {
    pub fn new(table: &'a TranslationTable, names: &'a ReservedNames, verbosity: Verbosity) -> Self {
        Rewriter { table, names, verbosity }
    }

    /// Run all four phases and conditionally prepend the include directive.
    pub fn rewrite(&self, source: &str) -> RewriteOutcome {
        let text = normalize_unicode_escapes(source);
        let mut modified = false;
        let text = self.rewrite_map_initializers(&text, &mut modified);
        let zones = self.map_body_spans(&text);
        let mut text = self.rewrite_literals(&text, &zones, &mut modified);
        if modified {
            let directive = format!("#include \"{}\"", self.names.header_name);
            if !text.starts_with(&directive) {
                text = format!("{}\n{}", directive, text);
            }
        }
        RewriteOutcome { text, modified }
    }

    /// Phase 2: expand matching flat map initializers into per-language
    /// 2-D arrays and redirect the following apply-map call.
    fn rewrite_map_initializers(&self, src: &str, modified: &mut bool) -> String {
        let lang_count = self.table.lang_count();
        let mut out = String::new();
        let mut pos = 0;

        while let Some(init) = self.find_map_initializer(src, pos, false) {
            out.push_str(&src[pos..init.start]);

            let mut has_match = false;
            let mut lang_items: Vec<Vec<String>> = vec![Vec::new(); lang_count];
            for &item in &init.items {
                if item == "NULL" {
                    // Null placeholders stay null in every language.
                    for slot in &mut lang_items {
                        slot.push(item.to_string());
                    }
                    continue;
                }
                let content = quoted_content(item);
                let row = content.and_then(|c| self.table.row_for(c));
                match (content, row) {
                    (Some(content), Some(_)) => {
                        has_match = true;
                        for (i, slot) in lang_items.iter_mut().enumerate() {
                            let translated =
                                self.table.translation_for(content, i).unwrap_or(content);
                            slot.push(format!("\"{}\"", translated));
                        }
                    }
                    // Unknown literals and non-literal tokens pass through
                    // identically across all languages.
                    _ => {
                        for slot in &mut lang_items {
                            slot.push(item.to_string());
                        }
                    }
                }
            }

            if has_match {
                *modified = true;
                if self.verbosity >= Verbosity::Verbose {
                    eprintln!(
                        "[multilang] expanded {} initializer ({} items, {} languages)",
                        self.names.map_array,
                        init.items.len(),
                        lang_count
                    );
                }
                out.push_str(&format!(
                    "static const char *{}[{}][{}] = {{\n",
                    self.names.map_array,
                    self.names.lang_count_const,
                    init.size.unwrap_or("0")
                ));
                for slot in &lang_items {
                    out.push_str("    {");
                    out.push_str(&slot.join(", "));
                    out.push_str("},\n");
                }
                out.push_str("};");

                if let Some((call_start, call_end)) = self.find_apply_call(src, init.end) {
                    out.push_str(&src[init.end..call_start]);
                    out.push_str(&format!(
                        "{}({}, {}[{}]);",
                        self.names.apply_map_call,
                        self.names.apply_map_receiver,
                        self.names.map_array,
                        self.names.lang_index_var
                    ));
                    pos = call_end;
                } else {
                    pos = init.end;
                }
            } else {
                // No item hit the table: the initializer stays byte-identical.
                out.push_str(&src[init.start..init.end]);
                pos = init.end;
            }
        }

        out.push_str(&src[pos..]);
        out
    }

    /// Phase 3: spans of every map-initializer body, original or already
    /// expanded, used as exclusion zones by the literal pass.
    fn map_body_spans(&self, src: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut pos = 0;
        while let Some(init) = self.find_map_initializer(src, pos, true) {
            spans.push((init.body_start, init.body_end));
            pos = init.end;
        }
        spans
    }

    /// Phase 4: replace known string literals outside exclusion zones with
    /// per-language array lookups.
    fn rewrite_literals(
        &self,
        src: &str,
        zones: &[(usize, usize)],
        modified: &mut bool,
    ) -> String {
        let mut out = String::new();
        let mut copied = 0;
        let mut cur = Cursor::at(src, 0);

        while !cur.at_end() {
            if cur.peek() != Some(b'"') {
                cur.bump();
                continue;
            }
            let start = cur.pos();
            let Some(literal) = cur.read_string_literal() else {
                // Unterminated literal: leave the rest of the document as-is.
                break;
            };
            let content = &literal[1..literal.len() - 1];
            let in_zone = zones.iter().any(|&(lo, hi)| lo <= start && start < hi);
            if in_zone {
                continue;
            }
            if let Some(array_name) = self.table.array_name_for(content) {
                out.push_str(&src[copied..start]);
                out.push_str(&format!("{}[{}]", array_name, self.names.lang_index_var));
                copied = cur.pos();
                *modified = true;
                if self.verbosity >= Verbosity::Verbose {
                    eprintln!(
                        "[multilang] replaced \"{}\" with {}[{}]",
                        content, array_name, self.names.lang_index_var
                    );
                }
            }
        }

        out.push_str(&src[copied..]);
        out
    }

    /// Find the next map initializer at or after `from`.
    ///
    /// With `include_expanded` false only the flat original form is
    /// accepted: `static const char *map[<digits>] = { ... };`. With it
    /// true the first dimension may also be the language-count constant
    /// and an optional second numeric dimension is allowed, so already
    /// rewritten arrays are recognized too.
    fn find_map_initializer<'s>(
        &self,
        src: &'s str,
        from: usize,
        include_expanded: bool,
    ) -> Option<MapInitializer<'s>> {
        let mut search = from;
        while let Some(start) = find_word(src, search, "static") {
            if let Some(init) = self.parse_map_initializer(src, start, include_expanded) {
                return Some(init);
            }
            search = start + 1;
        }
        None
    }

    /// Parse one map initializer starting at the `static` keyword.
    /// Any deviation from the expected shape yields `None`.
    fn parse_map_initializer<'s>(
        &self,
        src: &'s str,
        start: usize,
        include_expanded: bool,
    ) -> Option<MapInitializer<'s>> {
        let mut cur = Cursor::at(src, start);
        if !cur.eat_word("static") {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_word("const") {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_word("char") {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b'*') {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_word(&self.names.map_array) {
            return None;
        }
        if !cur.eat_byte(b'[') {
            return None;
        }
        let size = if include_expanded && cur.eat_word(&self.names.lang_count_const) {
            None
        } else {
            Some(cur.read_digits()?)
        };
        if !cur.eat_byte(b']') {
            return None;
        }
        if include_expanded && cur.eat_byte(b'[') {
            cur.read_digits()?;
            if !cur.eat_byte(b']') {
                return None;
            }
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b'=') {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b'{') {
            return None;
        }

        let body_start = cur.pos();
        let mut items = Vec::new();
        let mut item_start = cur.pos();
        let mut depth = 0usize;
        loop {
            match cur.peek()? {
                b'"' => {
                    // Commas and braces inside string literals are content,
                    // not separators.
                    cur.read_string_literal()?;
                }
                b'{' => {
                    depth += 1;
                    cur.bump();
                }
                b'}' if depth > 0 => {
                    depth -= 1;
                    cur.bump();
                }
                b'}' => {
                    push_item(&mut items, &src[item_start..cur.pos()]);
                    let body_end = cur.pos();
                    cur.bump();
                    cur.skip_whitespace();
                    if !cur.eat_byte(b';') {
                        return None;
                    }
                    return Some(MapInitializer {
                        start,
                        end: cur.pos(),
                        size,
                        body_start,
                        body_end,
                        items,
                    });
                }
                b',' if depth == 0 => {
                    push_item(&mut items, &src[item_start..cur.pos()]);
                    cur.bump();
                    item_start = cur.pos();
                }
                _ => cur.bump(),
            }
        }
    }

    /// Find the first apply-map call at or after `from`:
    /// `lv_btnmatrix_set_map ( obj , map ) ;` with arbitrary whitespace.
    /// Returns the call's span.
    fn find_apply_call(&self, src: &str, from: usize) -> Option<(usize, usize)> {
        let mut search = from;
        while let Some(start) = find_word(src, search, &self.names.apply_map_call) {
            if let Some(end) = self.parse_apply_call(src, start) {
                return Some((start, end));
            }
            search = start + 1;
        }
        None
    }

    /// Parse one apply-map call starting at the call identifier; returns
    /// the offset just past the terminating `;`.
    fn parse_apply_call(&self, src: &str, start: usize) -> Option<usize> {
        let mut cur = Cursor::at(src, start);
        if !cur.eat_word(&self.names.apply_map_call) {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b'(') {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_word(&self.names.apply_map_receiver) {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b',') {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_word(&self.names.map_array) {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b')') {
            return None;
        }
        cur.skip_whitespace();
        if !cur.eat_byte(b';') {
            return None;
        }
        Some(cur.pos())
    }
}

/// The unquoted content of `item` when it is a quoted string literal.
fn quoted_content(item: &str) -> Option<&str> {
    if item.len() >= 2 && item.starts_with('"') && item.ends_with('"') {
        Some(&item[1..item.len() - 1])
    } else {
        None
    }
}

fn push_item<'s>(items: &mut Vec<&'s str>, raw: &'s str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        items.push(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> TranslationTable {
        TranslationTable::parse(text, Verbosity::Silent)
    }

    fn rewrite(table: &TranslationTable, source: &str) -> RewriteOutcome {
        let names = ReservedNames::default();
        Rewriter::new(table, &names, Verbosity::Silent).rewrite(source)
    }

    const TWO_LANG_TABLE: &str =
        "\"Hello\" \"Bonjour\" greet_str\n\"OK\" \"D'accord\" ok_btnmap\n";

    #[test]
    fn test_end_to_end_example() {
        let table = table(TWO_LANG_TABLE);
        let source = "char *s = \"Hello\";\n\
                      static const char *map[1] = {\"OK\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n";
        let outcome = rewrite(&table, source);
        let expected = "#include \"strings.h\"\n\
                        char *s = greet_str[lang_index];\n\
                        static const char *map[TOTAL_LANG][1] = {\n    \
                        {\"OK\"},\n    \
                        {\"D'accord\"},\n\
                        };\n\
                        lv_btnmatrix_set_map(obj, map[lang_index]);\n";
        assert!(outcome.modified);
        assert_eq!(outcome.text, expected);
    }

    #[test]
    fn test_literal_replacement_uses_any_language_as_key() {
        let table = table(TWO_LANG_TABLE);
        let outcome = rewrite(&table, "label_set(\"Bonjour\");");
        assert_eq!(
            outcome.text,
            "#include \"strings.h\"\nlabel_set(greet_str[lang_index]);"
        );
    }

    #[test]
    fn test_unknown_literal_untouched() {
        let table = table(TWO_LANG_TABLE);
        let source = "char *s = \"Unknown\";\n";
        let outcome = rewrite(&table, source);
        assert!(!outcome.modified);
        assert_eq!(outcome.text, source);
    }

    #[test]
    fn test_map_without_any_table_match_byte_identical() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[3]  =  { \"a\",\"b\" , NULL };\nrest();\n";
        let outcome = rewrite(&table, source);
        assert!(!outcome.modified);
        assert_eq!(outcome.text, source);
    }

    #[test]
    fn test_map_mixed_items_pass_through_per_language() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[4] = {\"OK\", NULL, \"\\n\", LV_SYMBOL_OK};\n\
                      lv_btnmatrix_set_map(obj, map);\n";
        let outcome = rewrite(&table, source);
        let expected = "#include \"strings.h\"\n\
                        static const char *map[TOTAL_LANG][4] = {\n    \
                        {\"OK\", NULL, \"\\n\", LV_SYMBOL_OK},\n    \
                        {\"D'accord\", NULL, \"\\n\", LV_SYMBOL_OK},\n\
                        };\n\
                        lv_btnmatrix_set_map(obj, map[lang_index]);\n";
        assert_eq!(outcome.text, expected);
    }

    #[test]
    fn test_generated_map_body_excluded_from_literal_pass() {
        // "OK" appears both inside the map and as a standalone literal.
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[1] = {\"OK\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n\
                      char *t = \"OK\";\n";
        let outcome = rewrite(&table, source);
        assert!(outcome.text.contains("{\"OK\"},\n    {\"D'accord\"},"));
        assert!(outcome.text.contains("char *t = ok_btnmap[lang_index];"));
        // Inside the generated body the literals stay literals.
        assert!(!outcome.text.contains("{ok_btnmap"));
    }

    #[test]
    fn test_apply_call_missing_is_fine() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[1] = {\"OK\"};\n";
        let outcome = rewrite(&table, source);
        assert!(outcome.modified);
        assert!(outcome.text.contains("map[TOTAL_LANG][1]"));
    }

    #[test]
    fn test_only_first_apply_call_rewritten() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[1] = {\"OK\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n\
                      lv_btnmatrix_set_map(obj, map);\n";
        let outcome = rewrite(&table, source);
        assert_eq!(outcome.text.matches("map[lang_index]").count(), 1);
    }

    #[test]
    fn test_comma_inside_item_literal_is_not_a_separator() {
        let table = table("\"a,b\" \"x,y\" pair_str\n\"OK\" \"Bien\" ok_str\n");
        let source = "static const char *map[1] = {\"a,b\"};\n";
        let outcome = rewrite(&table, source);
        assert!(outcome.text.contains("{\"a,b\"},\n    {\"x,y\"},"));
    }

    #[test]
    fn test_include_not_duplicated() {
        let table = table(TWO_LANG_TABLE);
        let source = "#include \"strings.h\"\nchar *s = \"Hello\";\n";
        let outcome = rewrite(&table, source);
        assert_eq!(outcome.text.matches("#include \"strings.h\"").count(), 1);
        assert!(outcome.modified);
    }

    #[test]
    fn test_include_not_added_without_substitution() {
        let table = table(TWO_LANG_TABLE);
        let outcome = rewrite(&table, "int x = 1;\n");
        assert!(!outcome.modified);
        assert_eq!(outcome.text, "int x = 1;\n");
    }

    #[test]
    fn test_document_escapes_normalized_without_marking_modified() {
        let table = table(TWO_LANG_TABLE);
        let outcome = rewrite(&table, "char *s = \"\\u4f60\";\n");
        assert!(!outcome.modified);
        assert_eq!(outcome.text, "char *s = \"\\344\\275\\240\";\n");
    }

    #[test]
    fn test_normalized_escape_matches_table_key() {
        // The table key is authored as \uXXXX and the source too; both
        // normalize to the same octal form before matching.
        let table = table("\"Hello\" \"\\u4f60\\u597d\" greet_str\n\"OK\" \"Bien\" ok_str\n");
        let outcome = rewrite(&table, "char *s = \"\\u4f60\\u597d\";\n");
        assert!(outcome.modified);
        assert!(outcome.text.contains("char *s = greet_str[lang_index];"));
    }

    #[test]
    fn test_unterminated_literal_leaves_rest_untouched() {
        let table = table(TWO_LANG_TABLE);
        let source = "char *s = \"Hello\"; char *broken = \"no end";
        let outcome = rewrite(&table, source);
        assert!(outcome.text.contains("greet_str[lang_index]"));
        assert!(outcome.text.ends_with("char *broken = \"no end"));
    }

    #[test]
    fn test_escaped_quotes_inside_literal() {
        let table = table(TWO_LANG_TABLE);
        let source = "char *s = \"say \\\"Hello\\\"\"; char *t = \"Hello\";\n";
        let outcome = rewrite(&table, source);
        // The literal containing escaped quotes is not a table key.
        assert!(outcome.text.contains("\"say \\\"Hello\\\"\""));
        assert!(outcome.text.contains("char *t = greet_str[lang_index];"));
    }

    #[test]
    fn test_three_language_map_order_preserved() {
        let table = table("\"Yes\" \"Oui\" \"Ja\" yes_btnmap\n\"No\" \"Non\" \"Nein\" no_btnmap\n");
        let source = "static const char *map[2] = {\"Yes\", \"No\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n";
        let outcome = rewrite(&table, source);
        let expected_body = "{\n    {\"Yes\", \"No\"},\n    {\"Oui\", \"Non\"},\n    {\"Ja\", \"Nein\"},\n}";
        assert!(outcome.text.contains(expected_body));
    }

    #[test]
    fn test_two_maps_rewritten_independently() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *map[1] = {\"OK\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n\
                      static const char *map[1] = {\"unrelated\"};\n\
                      static const char *map[1] = {\"Hello\"};\n\
                      lv_btnmatrix_set_map(obj, map);\n";
        let outcome = rewrite(&table, source);
        assert_eq!(outcome.text.matches("map[TOTAL_LANG][1]").count(), 2);
        assert!(outcome.text.contains("{\"unrelated\"};"));
        assert_eq!(outcome.text.matches("map[lang_index]").count(), 2);
    }

    #[test]
    fn test_nested_name_substring_not_matched() {
        let table = table(TWO_LANG_TABLE);
        let source = "static const char *remap[1] = {\"OK\"};\n";
        let outcome = rewrite(&table, source);
        // `remap` is not the reserved array name; only the literal pass
        // applies (and there is no exclusion zone covering it).
        assert!(outcome.text.contains("static const char *remap[1] = {ok_btnmap[lang_index]};"));
    }
}
