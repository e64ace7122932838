//! Free-text filtering of the catalog. A query is split into lowercase
//! words; an entry matches when every word is a substring of at least one of
//! its tags (declared tags plus the display name). Pure functions of
//! (query, catalog) with no retained state.

use crate::catalog::entry::{Catalog, CatalogEntry};

/// Split a query into search words: split on spaces, drop empties, remove
/// exact duplicates (case-sensitively, before lowering), lowercase the rest.
pub fn tokenize(query: &str) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    for token in query.split(' ') {
        if token.is_empty() || seen.contains(&token) {
            continue;
        }
        seen.push(token);
    }
    seen.into_iter().map(|t| t.to_lowercase()).collect()
}

/// Conjunctive tag-substring match. The searchable tag set is the entry's
/// declared tags plus its display name (final path segment), lowercased.
/// Interior path segments are intentionally not searchable.
pub fn entry_matches(entry: &CatalogEntry, words: &[String]) -> bool {
    if words.is_empty() {
        return true;
    }
    let tags: Vec<String> = entry
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .chain(std::iter::once(entry.display_name().to_lowercase()))
        .collect();
    words
        .iter()
        .all(|w| tags.iter().any(|tag| tag.contains(w.as_str())))
}

/// Stable filter over the catalog in its original order; no scoring or
/// re-ranking. An empty query passes every entry through.
pub fn search<'a>(query: &str, catalog: &'a Catalog) -> Vec<&'a CatalogEntry> {
    let words = tokenize(query);
    catalog
        .entries()
        .iter()
        .filter(|entry| entry_matches(entry, &words))
        .collect()
}
