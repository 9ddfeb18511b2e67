use crate::Gist;

/// Case-insensitive match of an already lowercased term against description,
/// owner login, filenames and any fetched file content.
pub fn matches_term(gist: &Gist, lower_term: &str) -> bool {
    if gist.description_text().to_lowercase().contains(lower_term) {
        return true;
    }
    if gist
        .owner_login()
        .is_some_and(|login| login.to_lowercase().contains(lower_term))
    {
        return true;
    }
    gist.files.values().any(|file| {
        file.filename.to_lowercase().contains(lower_term)
            || file
                .content
                .as_deref()
                .is_some_and(|content| content.to_lowercase().contains(lower_term))
    })
}

/// Client-side filter over an already fetched set. An empty term keeps everything.
pub fn filter_gists<'a>(gists: &'a [Gist], term: &str) -> Vec<&'a Gist> {
    if term.is_empty() {
        return gists.iter().collect();
    }
    let lower_term = term.to_lowercase();
    gists
        .iter()
        .filter(|gist| matches_term(gist, &lower_term))
        .collect()
}
