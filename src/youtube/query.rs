/// Turns a category's keywords into a search query where every keyword is
/// a required term (`+term`). Phrases are quoted so they must match whole.
///
/// Returns `None` when no non-blank keyword remains.
pub fn build_search_query(keywords: &[String]) -> Option<String> {
    let terms: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| {
            let k = k.replace('"', "");
            if k.chars().any(char::is_whitespace) {
                format!("+\"{}\"", k)
            } else {
                format!("+{}", k)
            }
        })
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

/// True when a category has at least one keyword worth searching for.
pub fn has_usable_keywords(keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.trim().is_empty())
}
