use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Failed to compile slug regex"));

const MAX_SLUG_LEN: usize = 100;

fn slugify_segment(segment: &str) -> String {
    let lowered = segment.trim().to_lowercase();
    let replaced = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let mut slug = replaced.trim_matches('-').to_string();

    if slug.len() > MAX_SLUG_LEN {
        slug = slug
            .chars()
            .take(MAX_SLUG_LEN)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string();
    }

    slug
}

/// URL-friendly slug derived from a page title; `untitled` when nothing survives
pub fn generate_slug_from_title(title: &str) -> String {
    let slug = slugify_segment(title);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Clean a user-typed slug segment by segment, keeping `/` as the path
/// separator and dropping empty segments
pub fn normalize_slug(input: &str) -> String {
    let slug = input
        .split('/')
        .map(slugify_segment)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
