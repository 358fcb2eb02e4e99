//! SQL text builders.
//!
//! Identifiers and literals that come from configuration (table names,
//! file paths, category values) are always quoted through these helpers
//! before being spliced into a statement.

use std::path::Path;

/// Double-quotes an identifier, escaping embedded quotes.
#[must_use]
pub fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quotes a string literal, escaping embedded quotes.
#[must_use]
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// String literal for a filesystem path.
#[must_use]
pub fn path_literal(path: &Path) -> String {
    literal(&path.to_string_lossy())
}

/// Parenthesised literal list for `IN (...)`.
#[must_use]
pub fn literal_list(values: &[&str]) -> String {
    let items: Vec<String> = values.iter().map(|v| literal(v)).collect();
    format!("({})", items.join(", "))
}

/// Predicate that is true when `expr` survives a lenient integer cast.
///
/// The value is rendered as text and trimmed; it casts when it is an
/// optionally signed run of digits with an optional fractional part
/// (truncated toward zero) and the integral part fits a 32-bit integer.
/// Exponent notation, other text and null do not cast.
#[must_use]
pub fn casts_to_int(expr: &str) -> String {
    let text = format!("trim(CAST({expr} AS VARCHAR))");
    format!(
        "COALESCE(regexp_full_match({text}, '[+-]?[0-9]+(\\.[0-9]+)?') \
         AND TRY_CAST(regexp_extract({text}, '^[+-]?[0-9]+') AS INTEGER) IS NOT NULL, FALSE)"
    )
}
