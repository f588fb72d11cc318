use crate::error::RootSignalsError;
use crate::types::Page;
use futures_util::Stream;
use std::future::Future;

/// Streams up to `limit` items from a cursor-paginated endpoint.
///
/// `fetch(page_size, cursor)` is asked for at most the remaining number of
/// items. Iteration stops at the limit, on an empty page, or when the page has
/// no `next` cursor; an oversized last page is truncated.
pub fn iterate_cursor_list<T, F, Fut>(
    mut fetch: F,
    limit: usize,
) -> impl Stream<Item = Result<T, RootSignalsError>>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RootSignalsError>>,
{
    async_stream::try_stream! {
        let mut remaining = limit;
        let mut cursor: Option<String> = None;
        while remaining > 0 {
            let page = fetch(remaining, cursor.take()).await?;
            if page.results.is_empty() {
                break;
            }
            let used = page.results.len().min(remaining);
            remaining -= used;
            let next = page.next.as_deref().and_then(cursor_from_next);
            for item in page.results.into_iter().take(used) {
                yield item;
            }
            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }
    }
}

/// `next` is either a bare cursor or a full URL carrying a `cursor` query parameter.
pub(crate) fn cursor_from_next(next: &str) -> Option<String> {
    let next = next.trim();
    if next.is_empty() {
        return None;
    }
    match reqwest::Url::parse(next) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "cursor")
            .map(|(_, v)| v.into_owned()),
        Err(_) => Some(next.to_string()),
    }
}
