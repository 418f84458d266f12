//! Utilities for generating deterministic, URL-safe slugs from titles.
//!
//! [`normalize`] is the authoring-time transformation applied to post and
//! category titles. It is pure and idempotent and knows nothing about
//! collisions; callers that need uniqueness supply a predicate to
//! [`generate_unique_slug`] which retries with a numeric suffix.

use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while generating a unique slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Normalize free text into a slug.
///
/// Lower-cases the input, drops ASCII apostrophes, collapses every run of
/// characters outside `[a-z0-9]` into a single hyphen and trims hyphens from
/// both ends. Input made only of separators yields an empty string.
pub fn normalize(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        match ch {
            '\'' => {}
            'a'..='z' | '0'..='9' => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(ch);
            }
            _ => pending_hyphen = true,
        }
    }

    slug
}

/// Derive a non-empty base slug from the provided title.
pub fn derive_slug(title: &str) -> Result<String, SlugError> {
    let slug = normalize(title);
    if slug.is_empty() {
        return Err(SlugError::EmptyInput);
    }
    Ok(slug)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug is not
/// taken yet. Collisions are retried with a monotonic suffix (`-2`, `-3`, ...).
pub fn generate_unique_slug<F>(title: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(title)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}
