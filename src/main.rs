use std::fs;

use clap::{Arg, Command};
use multilang::{
    ReservedNames, Rewriter, TranslationTable, Verbosity, generate_header, generate_source,
};

fn main() {
    let matches = Command::new("multilang")
        .version("0.1.0")
        .about("Rewrites C string literals into generated per-language lookup tables")
        .arg(
            Arg::new("source")
                .help("C source file to rewrite in place")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("table")
                .long("table")
                .short('t')
                .help("Translation table file")
                .default_value("multi_lang.txt"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Report each substitution")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress warnings")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let source_path = matches.get_one::<String>("source").unwrap();
    let table_path = matches.get_one::<String>("table").unwrap();
    let verbosity = if matches.get_flag("quiet") {
        Verbosity::Silent
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    if let Err(e) = run(source_path, table_path, verbosity) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(source_path: &str, table_path: &str, verbosity: Verbosity) -> Result<(), String> {
    let table_text = fs::read_to_string(table_path)
        .map_err(|e| format!("Failed to read file '{}': {}", table_path, e))?;
    let table = TranslationTable::parse(&table_text, verbosity);

    if table.is_empty() {
        // No rows means nothing to generate and nothing to rewrite.
        println!("No valid rows in {}", table_path);
        return Ok(());
    }

    let names = ReservedNames::default();

    fs::write(&names.header_name, generate_header(&table, &names))
        .map_err(|e| format!("Failed to write file '{}': {}", names.header_name, e))?;
    fs::write(&names.source_name, generate_source(&table, &names))
        .map_err(|e| format!("Failed to write file '{}': {}", names.source_name, e))?;

    let source_text = fs::read_to_string(source_path)
        .map_err(|e| format!("Failed to read file '{}': {}", source_path, e))?;
    let outcome = Rewriter::new(&table, &names, verbosity).rewrite(&source_text);
    fs::write(source_path, &outcome.text)
        .map_err(|e| format!("Failed to write file '{}': {}", source_path, e))?;

    if verbosity >= Verbosity::Verbose {
        eprintln!(
            "[multilang] {} rows, {} languages, source {}",
            table.rows().len(),
            table.lang_count(),
            if outcome.modified { "modified" } else { "unchanged" }
        );
    }
    Ok(())
}
