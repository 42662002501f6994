//! Shared wire types and pagination infrastructure for the YouTube API client.

use serde::Deserialize;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// Response envelope shared by every `*.list` endpoint this client calls.
///
/// The YouTube Data API wraps all list results in the same shape: a resource
/// `kind`, the page of `items`, paging counters, and an optional continuation
/// token. Only the resource type in `items` differs between endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    /// Identifies the API resource's type, e.g. `youtube#playlistItemListResponse`.
    pub kind: String,
    /// The resources returned for this page.
    #[serde(default)]
    pub items: VecDeque<T>,
    /// Paging details for the full result set.
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    /// Token to pass as `pageToken` to retrieve the next page, if any.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}

type PendingPage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, (VecDeque<T>, Option<String>))>> + 'a + Send>>;

/// A stream over a paginated list endpoint that follows continuation tokens
/// on demand.
///
/// Items are yielded one at a time; when the current page is exhausted and a
/// `nextPageToken` was present, the fetcher is invoked again with that token.
/// Pagination is forward-only, and the first error ends the stream.
pub struct PagedStream<'a, T, F> {
    /// Items from the most recently fetched page, drained front to back.
    buffered: VecDeque<T>,
    /// The in-flight request for the next page, if one has been started.
    pending: Option<PendingPage<'a, F, T>>,
    /// Set once the last page has been consumed or an error was yielded.
    exhausted: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Creates a stream that calls `fetcher` with `None` for the first page
    /// and with each `nextPageToken` thereafter.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<String>)>> + Send + 'a,
    {
        // The fetcher rides along inside the future so that the stream can
        // hand it back to itself when it needs the following page.
        let first = async move {
            let page = fetcher(None).await?;
            Ok((fetcher, page))
        };
        Self {
            buffered: VecDeque::new(),
            pending: Some(Box::pin(first)),
            exhausted: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<String>)>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.exhausted {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending.as_mut() else {
                self.exhausted = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, (items, next_token)))) => {
                    self.buffered.extend(items);
                    if let Some(next_token) = next_token {
                        // Queue up the next page, but don't poll it until the
                        // buffered items have been drained.
                        self.pending = Some(Box::pin(async move {
                            let page = fetcher(Some(next_token)).await?;
                            Ok((fetcher, page))
                        }));
                    } else {
                        self.pending = None;
                        self.exhausted = true;
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending = None;
                    self.exhausted = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn follows_continuation_tokens() {
        let stream = PagedStream::new(|token| async move {
            match token.as_deref() {
                None => Ok((VecDeque::from([1, 2]), Some("p2".to_string()))),
                Some("p2") => Ok((VecDeque::from([3]), None)),
                Some(other) => Err(eyre::eyre!("unexpected token {other}")),
            }
        });
        let mut stream = std::pin::pin!(stream);

        let mut got = Vec::new();
        while let Some(item) = stream.next().await {
            got.push(item.unwrap());
        }
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn ends_after_first_error() {
        let stream = PagedStream::new(|token| async move {
            match token.as_deref() {
                None => Ok((VecDeque::from(["a"]), Some("boom".to_string()))),
                Some(_) => Err(eyre::eyre!("server exploded")),
            }
        });
        let mut stream = std::pin::pin!(stream);

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn list_response_tolerates_missing_items() {
        let response: ListResponse<String> = serde_json::from_str(
            r#"{"kind": "youtube#playlistItemListResponse",
                "pageInfo": {"totalResults": 0, "resultsPerPage": 50}}"#,
        )
        .unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.page_info.unwrap().total_results, 0);
        assert_eq!(response.next_page_token, None);
    }
}
