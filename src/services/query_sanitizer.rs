//! Search query cleanup applied before a query reaches SQL.

/// Characters removed from search queries.
const STRIPPED_CHARS: [char; 4] = ['\'', '"', ';', '\\'];

/// Comment delimiters removed from search queries.
const STRIPPED_SEQUENCES: [&str; 4] = ["--", "#", "/*", "*/"];

/// Strips quotes, semicolons, backslashes and SQL comment delimiters, then trims.
///
/// Queries are always bound as parameters; this only keeps stray syntax out
/// of the match text.
pub fn sanitize_query(query: &str) -> String {
    let mut cleaned: String = query.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    while let Some(seq) = STRIPPED_SEQUENCES.iter().find(|s| cleaned.contains(**s)) {
        cleaned = cleaned.replace(seq, "");
    }
    cleaned.trim().to_string()
}

/// Returns the sanitized query, or `None` when nothing searchable is left.
pub fn effective_query(query: Option<&str>) -> Option<String> {
    query.map(sanitize_query).filter(|q| !q.is_empty())
}
