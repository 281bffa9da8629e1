//! multilang: a source-localization preprocessor.
//!
//! Given a translation table mapping canonical strings to per-language
//! translations plus a generated array identifier, this crate rewrites a C
//! source document so that string literals and fixed-size string-array
//! initializers reference generated per-language lookup tables, selected at
//! runtime by one language-index variable. It also generates those tables'
//! declarations and definitions.
//!
//! The pipeline is: load the table ([`TranslationTable::parse`]), emit the
//! artifacts ([`generate_header`], [`generate_source`]), then rewrite the
//! source ([`Rewriter::rewrite`]). Generation and rewriting are independent
//! consumers of the loaded table.

pub mod codegen;
pub mod escape;
pub mod rewrite;
mod scan;
pub mod table;

pub use codegen::{generate_header, generate_source};
pub use escape::normalize_unicode_escapes;
pub use rewrite::{RewriteOutcome, Rewriter};
pub use table::{TranslationRow, TranslationTable};

/// Verbosity level for diagnostics printed while loading and rewriting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No diagnostics
    Silent = 0,
    /// Warnings only, e.g. duplicate table strings (default)
    Normal = 1,
    /// Warnings plus per-substitution reports
    Verbose = 2,
}

/// The identifiers and file names woven through generation and rewriting.
///
/// These are threaded explicitly to every consumer instead of living in
/// constants, so the generator and rewriter always agree on what they emit
/// and match. `Default` yields the names the consuming C program expects:
/// `TOTAL_LANG`, `lang_index`, the `map` array, the
/// `lv_btnmatrix_set_map(obj, map)` call shape, and `strings.h`/`strings.c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    /// C macro holding the number of languages.
    pub lang_count_const: String,
    /// Mutable variable selecting the active language at runtime.
    pub lang_index_var: String,
    /// Reserved array variable targeted for per-language expansion.
    pub map_array: String,
    /// Call that applies the map array; its argument gets indexed.
    pub apply_map_call: String,
    /// First argument of the apply-map call.
    pub apply_map_receiver: String,
    /// Generated declaration header file name, also the include target.
    pub header_name: String,
    /// Generated definition file name.
    pub source_name: String,
}

impl Default for ReservedNames {
    fn default() -> Self {
        ReservedNames {
            lang_count_const: "TOTAL_LANG".to_string(),
            lang_index_var: "lang_index".to_string(),
            map_array: "map".to_string(),
            apply_map_call: "lv_btnmatrix_set_map".to_string(),
            apply_map_receiver: "obj".to_string(),
            header_name: "strings.h".to_string(),
            source_name: "strings.c".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Silent < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
    }

    #[test]
    fn test_default_reserved_names() {
        let names = ReservedNames::default();
        assert_eq!(names.lang_count_const, "TOTAL_LANG");
        assert_eq!(names.lang_index_var, "lang_index");
        assert_eq!(names.map_array, "map");
        assert_eq!(names.apply_map_call, "lv_btnmatrix_set_map");
        assert_eq!(names.header_name, "strings.h");
    }
}
