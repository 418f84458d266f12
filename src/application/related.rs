//! Category-based related-post selection.

use std::num::NonZeroUsize;

use inkpress_content_types::{Post, PostPreview};
use time::OffsetDateTime;

/// Number of related posts shown under a post unless configured otherwise.
pub const DEFAULT_RELATED_MAX: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Anything that can take part in related-post selection.
pub trait RelatedCandidate {
    fn candidate_id(&self) -> &str;
    fn category_ids(&self) -> Vec<&str>;
    fn published_at(&self) -> Option<OffsetDateTime>;
}

impl RelatedCandidate for PostPreview {
    fn candidate_id(&self) -> &str {
        &self.id
    }

    fn category_ids(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.id.as_str()).collect()
    }

    fn published_at(&self) -> Option<OffsetDateTime> {
        self.published_at
    }
}

impl RelatedCandidate for Post {
    fn candidate_id(&self) -> &str {
        &self.id
    }

    fn category_ids(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.id.as_str()).collect()
    }

    fn published_at(&self) -> Option<OffsetDateTime> {
        self.published_at
    }
}

/// Pick up to `max` items from `pool` that share a category with `target`.
///
/// The target itself is never selected. Results are ordered most recent
/// first; ties (and items without a timestamp, which sort last) keep their
/// pool order. A target without categories has no related items.
pub fn select_related<T, C>(target: &T, pool: Vec<C>, max: NonZeroUsize) -> Vec<C>
where
    T: RelatedCandidate + ?Sized,
    C: RelatedCandidate,
{
    let wanted = target.category_ids();
    if wanted.is_empty() {
        return Vec::new();
    }

    let target_id = target.candidate_id();
    let mut selected: Vec<C> = pool
        .into_iter()
        .filter(|item| item.candidate_id() != target_id)
        .filter(|item| item.category_ids().iter().any(|id| wanted.contains(id)))
        .collect();

    // `sort_by` is stable, which keeps pool order among equal timestamps.
    selected.sort_by(|left, right| right.published_at().cmp(&left.published_at()));
    selected.truncate(max.get());
    selected
}
