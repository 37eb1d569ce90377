//! Live adapter fetching source images over HTTP.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::error::ThumbnailError;
use crate::ports::image_fetcher::{FetchFuture, FetchedImage, ImageFetcher};

/// Fetches images with a plain `GET`.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            let fetch_error =
                |message: String| ThumbnailError::Fetch { url: url.clone(), message };

            let response =
                self.client.get(&url).send().await.map_err(|e| fetch_error(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(fetch_error(format!("HTTP {status}")));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let data = response.bytes().await.map_err(|e| fetch_error(e.to_string()))?.to_vec();
            debug!(url = %url, bytes = data.len(), content_type = ?content_type, "fetched source image");

            Ok(FetchedImage { data, content_type })
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer a single request on a local port with a canned response and
    /// return the server's base URL.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static [u8],
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher { client: Client::builder().no_proxy().build().unwrap() }
    }

    #[tokio::test]
    async fn not_found_is_a_fetch_error() {
        let base = serve_once("404 Not Found", "text/plain", b"missing").await;
        let url = format!("{base}/images/cat.png");

        let err = fetcher().fetch(&url).await.unwrap_err();
        match err {
            ThumbnailError::Fetch { url: failed_url, message } => {
                assert_eq!(failed_url, url);
                assert_eq!(message, "HTTP 404 Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_fetch_error() {
        let base = serve_once("503 Service Unavailable", "text/html", b"<h1>down</h1>").await;
        let err = fetcher().fetch(&format!("{base}/a.png")).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn ok_returns_body_and_content_type() {
        let base = serve_once("200 OK", "image/png", b"abc").await;
        let image = fetcher().fetch(&format!("{base}/images/cat.png")).await.unwrap();
        assert_eq!(image.data, b"abc");
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn connection_refused_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher().fetch(&format!("http://{addr}/cat.png")).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::Fetch { .. }));
    }
}
