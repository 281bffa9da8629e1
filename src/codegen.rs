//! Table Code Generator
//!
//! Emits the two C artifacts consumed by the rewritten source: a header
//! declaring the language-count constant, the language-index variable and
//! one extern per-language array per table row, and a source file defining
//! all of them. Output is deterministic in table row and column order.

use crate::ReservedNames;
use crate::table::TranslationTable;

/// Generate the declaration header (`strings.h`).
pub fn generate_header(table: &TranslationTable, names: &ReservedNames) -> String {
    let guard = include_guard(&names.header_name);
    let mut out = String::new();
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
    out.push_str(&format!("#define {} {}\n\n", names.lang_count_const, table.lang_count()));
    out.push_str(&format!("extern unsigned char {};\n\n", names.lang_index_var));
    for row in table.rows() {
        out.push_str(&format!(
            "extern const char * {}[{}];\n",
            row.array_name, names.lang_count_const
        ));
    }
    out.push_str("\n#endif\n");
    out
}

/// Generate the definition file (`strings.c`).
///
/// Each array is initialized with the row's strings in table column order.
/// A row whose length differs from the language count is emitted as-is,
/// matching the loader's lenient handling of mismatched rows.
pub fn generate_source(table: &TranslationTable, names: &ReservedNames) -> String {
    let mut out = String::new();
    out.push_str(&format!("#include \"{}\"\n\n", names.header_name));
    for row in table.rows() {
        out.push_str(&format!(
            "const char * {}[{}] = {{\n",
            row.array_name, names.lang_count_const
        ));
        for s in &row.strings {
            out.push_str(&format!("    \"{}\",\n", s));
        }
        out.push_str("};\n\n");
    }
    out.push_str(&format!("unsigned char {} = 0;\n", names.lang_index_var));
    out
}

/// Derive an include-guard macro from the header file name,
/// e.g. `strings.h` -> `STRINGS_H`.
fn include_guard(header_name: &str) -> String {
    header_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verbosity;

    fn two_language_table() -> TranslationTable {
        TranslationTable::parse(
            "\"Hello\" \"Bonjour\" greet_str\n\"OK\" \"D'accord\" ok_btnmap\n",
            Verbosity::Silent,
        )
    }

    #[test]
    fn test_header_layout() {
        let header = generate_header(&two_language_table(), &ReservedNames::default());
        let expected = "\
#ifndef STRINGS_H
#define STRINGS_H

#define TOTAL_LANG 2

extern unsigned char lang_index;

extern const char * greet_str[TOTAL_LANG];
extern const char * ok_btnmap[TOTAL_LANG];

#endif
";
        assert_eq!(header, expected);
    }

    #[test]
    fn test_source_layout() {
        let source = generate_source(&two_language_table(), &ReservedNames::default());
        let expected = "\
#include \"strings.h\"

const char * greet_str[TOTAL_LANG] = {
    \"Hello\",
    \"Bonjour\",
};

const char * ok_btnmap[TOTAL_LANG] = {
    \"OK\",
    \"D'accord\",
};

unsigned char lang_index = 0;
";
        assert_eq!(source, expected);
    }

    #[test]
    fn test_include_guard_derivation() {
        assert_eq!(include_guard("strings.h"), "STRINGS_H");
        assert_eq!(include_guard("ui-text.h"), "UI_TEXT_H");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let table = two_language_table();
        let names = ReservedNames::default();
        assert_eq!(generate_header(&table, &names), generate_header(&table, &names));
        assert_eq!(generate_source(&table, &names), generate_source(&table, &names));
    }
}
