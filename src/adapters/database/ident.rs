//! Identifier quoting and pattern escaping
//!
//! Table and database names never travel as bound parameters, so every
//! statement that embeds one goes through these helpers first.

/// Quotes `name` as a SQL Server identifier (`[name]`)
pub fn quote_mssql_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Quotes `name` as a PostgreSQL identifier (`"name"`)
pub fn quote_pg_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds a `LIKE` pattern matching names that start with `prefix`
///
/// `\` is the escape character; callers must add `ESCAPE '\'` to the
/// predicate.
pub fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 4);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_' | '[') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Keeps names that literally start with `prefix`, sorted
pub fn filter_prefixed(names: Vec<String>, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = names
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names.dedup();
    names
}
