//! Offset pagination helpers shared by every listing.
//!
//! Listings are addressed by a 1-based page number. A [`PageRequest`] turns
//! that number into the half-open offset range requested from the content
//! source, and [`render_tokens`] turns `(current, total)` into the sequence
//! of page numbers and ellipses shown in a pager.

use std::num::NonZeroU32;

use serde::Serialize;

/// Page size used by listings unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(12).unwrap();
/// Number of consecutive page numbers shown around the current page.
pub const DEFAULT_VISIBLE_PAGES: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Half-open offset range `[start, end)` into an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
}

impl PageWindow {
    /// Compute the window for a 1-based page.
    ///
    /// Windows past the end of the collection are valid; the source simply
    /// returns no items for them.
    pub fn compute(page: NonZeroU32, page_size: NonZeroU32) -> Self {
        let size = u64::from(page_size.get());
        let start = u64::from(page.get() - 1) * size;
        Self {
            start,
            end: start + size,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of pages needed for `total_items`; zero items means zero pages.
pub fn total_pages(total_items: u64, page_size: NonZeroU32) -> u64 {
    total_items.div_ceil(u64::from(page_size.get()))
}

/// Parse a raw `page` query value.
///
/// Missing, malformed, zero, negative and fractional values all fall back to
/// the first page. This never fails.
pub fn parse_page_param(raw: Option<&str>) -> NonZeroU32 {
    raw.map(str::trim)
        .and_then(|value| value.parse::<u32>().ok())
        .and_then(NonZeroU32::new)
        .unwrap_or(NonZeroU32::MIN)
}

/// Requested page of a listing plus the page size of its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
}

impl PageRequest {
    pub fn new(page: NonZeroU32, page_size: NonZeroU32) -> Self {
        Self { page, page_size }
    }

    pub fn from_raw(raw: Option<&str>, page_size: NonZeroU32) -> Self {
        Self::new(parse_page_param(raw), page_size)
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::compute(self.page, self.page_size)
    }

    pub fn is_first(&self) -> bool {
        self.page == NonZeroU32::MIN
    }

    /// Whether the page lies beyond the last page of a non-empty listing.
    pub fn is_out_of_range(&self, total_pages: u64) -> bool {
        total_pages > 0 && u64::from(self.page.get()) > total_pages
    }
}

/// One page of an offset-paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub window: PageWindow,
}

impl<T> OffsetPage<T> {
    pub fn new(request: PageRequest, items: Vec<T>, total_items: u64) -> Self {
        Self {
            items,
            page: request.page.get(),
            page_size: request.page_size.get(),
            total_items,
            total_pages: total_pages(total_items, request.page_size),
            window: request.window(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Element of a pager: a page number or a gap marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationToken {
    Page { number: u64, active: bool },
    Ellipsis,
}

impl PaginationToken {
    fn page(number: u64, current: u64) -> Self {
        Self::Page {
            number,
            active: number == current,
        }
    }

    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Page { number, .. } => Some(*number),
            Self::Ellipsis => None,
        }
    }
}

/// Produce pager tokens for `current` out of `total` pages.
///
/// A window of `visible` pages is centred on `current` and shifted left when
/// it would run past the last page. The first and last page are always
/// reachable, with a single ellipsis standing in for any gap. `current` is
/// not clamped; an out-of-range value simply yields no active token.
pub fn render_tokens(current: u64, total: u64, visible: NonZeroU32) -> Vec<PaginationToken> {
    if total <= 1 {
        return Vec::new();
    }

    let visible = u64::from(visible.get());
    let mut start = current.saturating_sub(visible / 2).max(1);
    let end = total.min(start.saturating_add(visible - 1));
    if end < start.saturating_add(visible - 1) {
        start = end.saturating_sub(visible - 1).max(1);
    }

    let mut tokens = Vec::with_capacity((end - start) as usize + 5);

    if start > 1 {
        tokens.push(PaginationToken::page(1, current));
        if start > 2 {
            tokens.push(PaginationToken::Ellipsis);
        }
    }

    tokens.extend((start..=end).map(|number| PaginationToken::page(number, current)));

    if end < total {
        if end < total - 1 {
            tokens.push(PaginationToken::Ellipsis);
        }
        tokens.push(PaginationToken::page(total, current));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    fn numbers(tokens: &[PaginationToken]) -> Vec<Option<u64>> {
        tokens.iter().map(PaginationToken::number).collect()
    }

    fn active(tokens: &[PaginationToken]) -> Vec<u64> {
        tokens
            .iter()
            .filter_map(|token| match token {
                PaginationToken::Page {
                    number,
                    active: true,
                } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn window_spans_exactly_one_page() {
        for page_size in [1, 5, 12, 100] {
            for page in [1, 2, 7, 1000] {
                let window = PageWindow::compute(nz(page), nz(page_size));
                assert_eq!(window.len(), u64::from(page_size));
                assert_eq!(window.start, u64::from(page - 1) * u64::from(page_size));
            }
        }
    }

    #[test]
    fn window_for_first_and_third_page() {
        assert_eq!(
            PageWindow::compute(nz(1), nz(12)),
            PageWindow { start: 0, end: 12 }
        );
        assert_eq!(
            PageWindow::compute(nz(3), nz(12)),
            PageWindow { start: 24, end: 36 }
        );
    }

    #[test]
    fn window_does_not_overflow_for_extreme_pages() {
        let window = PageWindow::compute(nz(u32::MAX), nz(u32::MAX));
        assert_eq!(window.len(), u64::from(u32::MAX));
    }

    #[test]
    fn total_pages_is_zero_only_for_empty_collections() {
        assert_eq!(total_pages(0, nz(12)), 0);
        for total in 1..=50_u64 {
            for size in [1, 3, 12] {
                let pages = total_pages(total, nz(size));
                let size = u64::from(size);
                assert!(pages > 0);
                assert!((pages - 1) * size < total && total <= pages * size);
            }
        }
    }

    #[test]
    fn parse_page_param_defaults_to_first_page() {
        assert_eq!(parse_page_param(None).get(), 1);
        assert_eq!(parse_page_param(Some("")).get(), 1);
        assert_eq!(parse_page_param(Some("abc")).get(), 1);
        assert_eq!(parse_page_param(Some("0")).get(), 1);
        assert_eq!(parse_page_param(Some("-3")).get(), 1);
        assert_eq!(parse_page_param(Some("2.5")).get(), 1);
        assert_eq!(parse_page_param(Some("99999999999")).get(), 1);
        assert_eq!(parse_page_param(Some(" 4 ")).get(), 4);
        assert_eq!(parse_page_param(Some("7")).get(), 7);
    }

    #[test]
    fn out_of_range_detection_ignores_empty_listings() {
        let request = PageRequest::new(nz(3), nz(12));
        assert!(request.is_out_of_range(2));
        assert!(!request.is_out_of_range(3));
        assert!(!request.is_out_of_range(0));
    }

    #[test]
    fn tokens_are_empty_for_single_or_no_page() {
        assert!(render_tokens(1, 0, DEFAULT_VISIBLE_PAGES).is_empty());
        assert!(render_tokens(1, 1, DEFAULT_VISIBLE_PAGES).is_empty());
        assert!(!render_tokens(1, 2, DEFAULT_VISIBLE_PAGES).is_empty());
    }

    #[test]
    fn tokens_for_first_page_of_ten() {
        let tokens = render_tokens(1, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(10)]
        );
        assert_eq!(active(&tokens), vec![1]);
    }

    #[test]
    fn tokens_for_middle_page_of_ten() {
        let tokens = render_tokens(6, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![
                Some(1),
                None,
                Some(4),
                Some(5),
                Some(6),
                Some(7),
                Some(8),
                None,
                Some(10)
            ]
        );
        assert_eq!(active(&tokens), vec![6]);
    }

    #[test]
    fn tokens_shift_window_left_near_the_end() {
        let tokens = render_tokens(10, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![Some(1), None, Some(6), Some(7), Some(8), Some(9), Some(10)]
        );
        assert_eq!(active(&tokens), vec![10]);
    }

    #[test]
    fn no_ellipsis_when_gap_is_a_single_page() {
        let tokens = render_tokens(4, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                None,
                Some(10)
            ]
        );

        let tokens = render_tokens(7, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![
                Some(1),
                None,
                Some(5),
                Some(6),
                Some(7),
                Some(8),
                Some(9),
                Some(10)
            ]
        );
    }

    #[test]
    fn short_listings_show_every_page() {
        let tokens = render_tokens(2, 3, DEFAULT_VISIBLE_PAGES);
        assert_eq!(numbers(&tokens), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn out_of_range_current_has_no_active_token() {
        let tokens = render_tokens(20, 10, DEFAULT_VISIBLE_PAGES);
        assert_eq!(
            numbers(&tokens),
            vec![Some(1), None, Some(6), Some(7), Some(8), Some(9), Some(10)]
        );
        assert!(active(&tokens).is_empty());
    }

    #[test]
    fn single_page_window_keeps_bounds() {
        let tokens = render_tokens(5, 10, nz(1));
        assert_eq!(
            numbers(&tokens),
            vec![Some(1), None, Some(5), None, Some(10)]
        );
    }

    #[test]
    fn tokens_never_repeat_pages_or_stack_ellipses() {
        for visible in 1..=7 {
            for total in 0..=25_u64 {
                for current in 1..=total.max(1) {
                    let tokens = render_tokens(current, total, nz(visible));
                    assert_eq!(tokens.is_empty(), total <= 1);

                    for pair in tokens.windows(2) {
                        assert!(
                            !(pair[0] == PaginationToken::Ellipsis
                                && pair[1] == PaginationToken::Ellipsis),
                            "double ellipsis for current={current} total={total}"
                        );
                    }

                    let pages: Vec<u64> = tokens.iter().filter_map(|t| t.number()).collect();
                    assert!(pages.windows(2).all(|pair| pair[0] < pair[1]));
                    if total > 1 {
                        assert_eq!(pages.first(), Some(&1));
                        assert_eq!(pages.last(), Some(&total));
                        assert_eq!(active(&tokens), vec![current]);
                    }
                }
            }
        }
    }

    #[test]
    fn offset_page_reports_totals() {
        let request = PageRequest::new(nz(2), nz(12));
        let page = OffsetPage::new(request, vec!["a", "b"], 14);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.window, PageWindow { start: 12, end: 24 });
        assert!(!page.is_empty());
        assert!(!request.is_out_of_range(page.total_pages));
        assert!(PageRequest::new(nz(3), nz(12)).is_out_of_range(page.total_pages));
    }
}
