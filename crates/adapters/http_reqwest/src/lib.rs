//! # snapcam-adapter-http-reqwest
//!
//! Implements the `UrlSource` port with [`reqwest`].
//!
//! Only a `200 OK` response yields bytes. Other statuses are logged and
//! answered with no image; transport failures and timeouts surface as
//! [`FetchError`] for the fetcher to log.

mod error;

pub use error::FetchError;

use std::time::Duration;

use reqwest::StatusCode;

use snapcam_app::ports::UrlSource;
use snapcam_domain::error::SnapcamError;

/// Fetches images with HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpUrlSource {
    client: reqwest::Client,
}

impl HttpUrlSource {
    /// Upper bound for a whole request, body included.
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// Client with the default [`TIMEOUT`](Self::TIMEOUT).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] when the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Self::TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Http`] when the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl UrlSource for HttpUrlSource {
    async fn get(&self, url: &str) -> Result<Option<Vec<u8>>, SnapcamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from)?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url, %status, "snapshot URL did not answer 200 OK");
            return Ok(None);
        }
        let body = response.bytes().await.map_err(FetchError::from)?;
        Ok(Some(body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;

    use super::*;

    async fn serve() -> SocketAddr {
        let app = Router::new()
            .route("/snap.jpg", get(|| async { b"jpeg".to_vec() }))
            .route("/empty.jpg", get(|| async { Vec::<u8>::new() }))
            .route(
                "/missing.jpg",
                get(|| async { (AxumStatus::NOT_FOUND, "nope") }),
            )
            .route(
                "/created.jpg",
                get(|| async { (AxumStatus::CREATED, b"jpeg".to_vec()) }),
            )
            .route(
                "/slow.jpg",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    b"late".to_vec()
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn should_return_body_on_200() {
        let addr = serve().await;
        let source = HttpUrlSource::new().unwrap();

        let bytes = source.get(&format!("http://{addr}/snap.jpg")).await.unwrap();

        assert_eq!(bytes.as_deref(), Some(&b"jpeg"[..]));
    }

    #[tokio::test]
    async fn should_return_empty_body_as_image() {
        let addr = serve().await;
        let source = HttpUrlSource::new().unwrap();

        let bytes = source.get(&format!("http://{addr}/empty.jpg")).await.unwrap();

        assert_eq!(bytes.as_deref(), Some(&b""[..]));
    }

    #[tokio::test]
    async fn should_return_none_on_404() {
        let addr = serve().await;
        let source = HttpUrlSource::new().unwrap();

        let bytes = source.get(&format!("http://{addr}/missing.jpg")).await.unwrap();

        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn should_return_none_on_other_success_status() {
        let addr = serve().await;
        let source = HttpUrlSource::new().unwrap();

        let bytes = source.get(&format!("http://{addr}/created.jpg")).await.unwrap();

        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn should_fail_on_timeout() {
        let addr = serve().await;
        let source = HttpUrlSource::with_timeout(Duration::from_millis(100)).unwrap();

        let result = source.get(&format!("http://{addr}/slow.jpg")).await;

        assert!(matches!(result, Err(SnapcamError::Source(_))));
    }

    #[tokio::test]
    async fn should_fail_on_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let source = HttpUrlSource::new().unwrap();

        let result = source.get(&format!("http://{addr}/snap.jpg")).await;

        assert!(result.is_err());
    }
}
