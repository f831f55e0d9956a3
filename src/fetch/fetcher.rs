use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::FetchError;

/// HTTP GET client with cooperative cancellation.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug, Default)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher around an already configured client (timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and returns the response body.
    ///
    /// Any non-2xx status is an error. Cancelling `token` aborts the request.
    pub async fn fetch(&self, url: &str, token: &CancellationToken) -> Result<Bytes, FetchError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Canceled),
            res = self.get(url) => res,
        }
    }

    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_owned(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        debug!(url, status = status.as_u16(), "fetched");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        resp.bytes().await.map_err(transport)
    }

    /// Fetches every distinct URL concurrently and returns `{url: body}`.
    ///
    /// The first failure cancels all other in-flight fetches and is returned.
    /// Cancelling `token` stops everything and returns [`FetchError::Canceled`].
    pub async fn fetch_all<I, S>(
        &self,
        urls: I,
        token: &CancellationToken,
    ) -> Result<HashMap<String, Bytes>, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let child = token.child_token();
        let mut seen = HashSet::new();
        let mut set = JoinSet::new();

        for url in urls {
            let url = url.into();
            if !seen.insert(url.clone()) {
                continue;
            }
            let fetcher = self.clone();
            let token = child.clone();
            set.spawn(async move {
                let res = fetcher.fetch(&url, &token).await;
                (url, res)
            });
        }

        let mut bodies = HashMap::with_capacity(seen.len());
        let mut first_err: Option<FetchError> = None;

        while let Some(joined) = set.join_next().await {
            let err = match joined {
                Ok((url, Ok(body))) => {
                    bodies.insert(url, body);
                    continue;
                }
                Ok((_, Err(FetchError::Canceled))) => continue,
                Ok((_, Err(e))) => e,
                Err(join_err) => FetchError::Task {
                    reason: join_err.to_string(),
                },
            };
            if first_err.is_none() {
                warn!(error = %err, label = err.as_label(), "fetch failed, canceling the rest");
                child.cancel();
                first_err = Some(err);
            }
        }

        if let Some(err) = first_err {
            return Err(err);
        }
        if bodies.len() < seen.len() {
            return Err(FetchError::Canceled);
        }
        Ok(bodies)
    }
}

/// [`Fetcher::fetch_all`] with a default client.
pub async fn fetch_all<I, S>(
    urls: I,
    token: &CancellationToken,
) -> Result<HashMap<String, Bytes>, FetchError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Fetcher::new().fetch_all(urls, token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP/1.1 server:
    /// - `/<code>` answers with that status code
    /// - `/slow...` never answers within the test
    /// - anything else answers 200 with `path <path>`
    async fn serve() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = sock.read(&mut buf).await.unwrap_or(0);
                    let req = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let path = req.split_whitespace().nth(1).unwrap_or("/").to_owned();

                    if path.starts_with("/slow") {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    let (status, body) = match path.trim_start_matches('/').parse::<u16>() {
                        Ok(code) => (code, format!("status {code}")),
                        Err(_) => (200, format!("path {path}")),
                    };
                    let resp = format!(
                        "HTTP/1.1 {status} X\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = sock.write_all(resp.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn fetcher() -> Fetcher {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client");
        Fetcher::with_client(client)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let (base, _) = serve().await;
        let body = fetcher()
            .fetch(&format!("{base}/hello"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(&body[..], b"path /hello");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let (base, _) = serve().await;
        let url = format!("{base}/404");
        let err = fetcher()
            .fetch(&url, &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            FetchError::Status { url: got, status } => {
                assert_eq!(got, url);
                assert_eq!(status, 404);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_collects_every_body() {
        let (base, hits) = serve().await;
        let urls = vec![
            format!("{base}/a"),
            format!("{base}/b"),
            format!("{base}/a"),
        ];
        let bodies = fetcher()
            .fetch_all(urls, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(bodies.len(), 2);
        assert_eq!(&bodies[&format!("{base}/b")][..], b"path /b");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_failure_cancels_the_rest() {
        let (base, _) = serve().await;
        let urls = [
            format!("{base}/slow"),
            format!("{base}/500"),
            format!("{base}/slow?again"),
        ];
        let res = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher().fetch_all(urls, &CancellationToken::new()),
        )
        .await
        .expect("fetch_all did not cancel the slow requests");

        let err = res.unwrap_err();
        assert!(err.to_string().starts_with("error fetching URL"));
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_caller_cancellation() {
        let (base, _) = serve().await;
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher().fetch_all([format!("{base}/slow")], &token),
        )
        .await
        .expect("cancellation was not observed");
        assert!(res.unwrap_err().is_canceled());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let bodies = fetch_all(Vec::<String>::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(bodies.is_empty());
    }
}
