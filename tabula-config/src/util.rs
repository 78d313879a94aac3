use tabula_model::SortBy;

/// Split a comma separated list, dropping blank entries.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// `"name"` is a single-path sort; `"city,name"` sorts by both.
pub fn parse_sort_by(raw: &str) -> SortBy {
    let mut paths = parse_csv(raw);
    match paths.len() {
        0 => SortBy::default(),
        1 => SortBy::from(paths.remove(0)),
        _ => SortBy::multi(paths),
    }
}

/// Parse a positive integer, rejecting zero.
pub fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|value| *value > 0)
}
