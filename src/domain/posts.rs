//! Post visibility and display rules.

use std::collections::{BTreeMap, BTreeSet};

use inkpress_content_types::TagWithCount;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// A post is visible once its publication time has passed.
///
/// Posts without a publication time are drafts and never visible.
pub fn is_published(published_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    published_at.is_some_and(|at| at <= now)
}

pub fn format_human_date(at: OffsetDateTime) -> String {
    at.date().format(HUMAN_DATE_FORMAT).unwrap_or_default()
}

/// Count tags across posts, one tag list per post.
///
/// A tag repeated within one post counts once. Blank tags are skipped. The
/// result is ordered by count, most used first, then alphabetically.
pub fn tally_tags<I, T>(tag_lists: I) -> Vec<TagWithCount>
where
    I: IntoIterator<Item = T>,
    T: IntoIterator<Item = String>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for tags in tag_lists {
        let unique: BTreeSet<String> = tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        for tag in unique {
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut tally: Vec<TagWithCount> = counts
        .into_iter()
        .map(|(tag, post_count)| TagWithCount { tag, post_count })
        .collect();
    tally.sort_by(|a, b| b.post_count.cmp(&a.post_count));
    tally
}
