//! Key set cache: fetch the identity provider's published JWKS and serve
//! signing keys by `kid` from an immutable, atomically swapped snapshot.
//!
//! Concurrent readers always see a complete snapshot; a refresh builds a new
//! one and swaps it in whole. Refreshes are serialized so a cold or expired
//! cache triggers at most one fetch at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use serde::Deserialize;
use url::Url;

use crate::services::auth::AuthError;

/// One public signing key as published by the provider.
///
/// Only the fields verification needs are kept; `n`/`e` are absent for
/// non-RSA key types.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug)]
struct Snapshot {
    retrieved_at: Instant,
    keys: Vec<Jwk>,
}

pub struct KeySetCache {
    client: reqwest::Client,
    jwks_url: Url,
    ttl: Duration,
    cached: ArcSwapOption<Snapshot>,
    refresh: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySetCache")
            .field("jwks_url", &self.jwks_url.as_str())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl KeySetCache {
    pub fn new(
        jwks_url: Url,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            client,
            jwks_url,
            ttl,
            cached: ArcSwapOption::empty(),
            refresh: tokio::sync::Mutex::new(()),
        })
    }

    /// Linear scan for the first key whose `kid` matches.
    ///
    /// Refreshes only when there is no snapshot yet or the snapshot aged past
    /// the TTL; a `kid` miss on a fresh snapshot is simply a miss.
    pub async fn resolve(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        let snapshot = match self.fresh_snapshot() {
            Some(snapshot) => snapshot,
            None => self.refresh().await?,
        };

        Ok(snapshot.keys.iter().find(|key| key.kid == kid).cloned())
    }

    fn fresh_snapshot(&self) -> Option<Arc<Snapshot>> {
        let snapshot = self.cached.load_full()?;
        (snapshot.retrieved_at.elapsed() < self.ttl).then_some(snapshot)
    }

    async fn refresh(&self) -> Result<Arc<Snapshot>, AuthError> {
        let _guard = self.refresh.lock().await;

        // someone may have refreshed while we waited for the lock
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        let jwks = self.fetch().await?;
        let snapshot = Arc::new(Snapshot {
            retrieved_at: Instant::now(),
            keys: jwks.keys,
        });
        self.cached.store(Some(snapshot.clone()));
        Ok(snapshot)
    }

    async fn fetch(&self) -> Result<Jwks, AuthError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| {
                tracing::warn!(url = %self.jwks_url, error = %err, "could not fetch JWKS");
                AuthError::KeySetUnavailable
            })?;

        response.json::<Jwks>().await.map_err(|err| {
            tracing::warn!(url = %self.jwks_url, error = %err, "could not decode JWKS");
            AuthError::KeySetUnavailable
        })
    }
}

#[cfg(test)]
impl KeySetCache {
    /// Cache seeded with a fixed key set; never touches the network.
    pub(crate) fn preloaded(keys: Vec<Jwk>) -> Self {
        let cache = Self::unreachable();
        cache.cached.store(Some(Arc::new(Snapshot {
            retrieved_at: Instant::now(),
            keys,
        })));
        cache
    }

    /// Cache pointed at a closed port, for exercising fetch failures.
    pub(crate) fn unreachable() -> Self {
        Self::new(
            Url::parse("http://127.0.0.1:1/.well-known/jwks.json").unwrap(),
            Duration::from_secs(3600),
            Duration::from_secs(1),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::get;

    use super::*;
    use crate::services::auth::test_support;

    struct JwksFixture {
        body: String,
        hits: AtomicUsize,
    }

    async fn serve_jwks(State(fixture): State<Arc<JwksFixture>>) -> impl IntoResponse {
        fixture.hits.fetch_add(1, Ordering::SeqCst);
        (
            [(header::CONTENT_TYPE, "application/json")],
            fixture.body.clone(),
        )
    }

    async fn spawn_jwks_endpoint(fixture: Arc<JwksFixture>) -> Url {
        let app = axum::Router::new()
            .route("/.well-known/jwks.json", get(serve_jwks))
            .with_state(fixture);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/.well-known/jwks.json")).unwrap()
    }

    fn jwks_body(kids: &[&str]) -> String {
        let keys: Vec<serde_json::Value> = kids
            .iter()
            .map(|kid| {
                serde_json::json!({
                    "kty": "RSA",
                    "kid": kid,
                    "use": "sig",
                    "alg": "RS256",
                    "n": test_support::RSA_MODULUS_B64,
                    "e": test_support::RSA_EXPONENT_B64,
                })
            })
            .collect();
        serde_json::json!({ "keys": keys }).to_string()
    }

    fn fixture(kids: &[&str]) -> Arc<JwksFixture> {
        Arc::new(JwksFixture {
            body: jwks_body(kids),
            hits: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn resolves_a_published_key_by_kid() {
        let url = spawn_jwks_endpoint(fixture(&["k-1", "k-2"])).await;
        let cache =
            KeySetCache::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap();

        let key = cache.resolve("k-2").await.unwrap().unwrap();
        assert_eq!(key.kid, "k-2");
        assert_eq!(key.kty, "RSA");
    }

    #[tokio::test]
    async fn unknown_kid_is_a_miss_not_an_error() {
        let url = spawn_jwks_endpoint(fixture(&["k-1"])).await;
        let cache =
            KeySetCache::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap();

        assert!(cache.resolve("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_key_set_unavailable() {
        let cache = KeySetCache::unreachable();
        assert_eq!(
            cache.resolve("k-1").await.unwrap_err(),
            AuthError::KeySetUnavailable
        );
    }

    #[tokio::test]
    async fn undecodable_body_surfaces_as_key_set_unavailable() {
        let fixture = Arc::new(JwksFixture {
            body: "not json".to_string(),
            hits: AtomicUsize::new(0),
        });
        let url = spawn_jwks_endpoint(fixture).await;
        let cache =
            KeySetCache::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap();

        assert_eq!(
            cache.resolve("k-1").await.unwrap_err(),
            AuthError::KeySetUnavailable
        );
    }

    #[tokio::test]
    async fn snapshot_is_reused_within_the_ttl() {
        let fixture = fixture(&["k-1"]);
        let url = spawn_jwks_endpoint(fixture.clone()).await;
        let cache =
            KeySetCache::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap();

        cache.resolve("k-1").await.unwrap();
        cache.resolve("k-1").await.unwrap();
        // a kid miss on a fresh snapshot must not refetch either
        cache.resolve("unknown").await.unwrap();

        assert_eq!(fixture.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_snapshot_is_refetched() {
        let fixture = fixture(&["k-1"]);
        let url = spawn_jwks_endpoint(fixture.clone()).await;
        let cache = KeySetCache::new(url, Duration::ZERO, Duration::from_secs(2)).unwrap();

        cache.resolve("k-1").await.unwrap();
        cache.resolve("k-1").await.unwrap();

        assert_eq!(fixture.hits.load(Ordering::SeqCst), 2);
    }

    // The provider publishing two records with the same kid is undefined
    // behavior upstream; we take the first match. This pins the choice so a
    // change is deliberate.
    #[tokio::test]
    async fn duplicate_kid_resolves_to_the_first_record() {
        let body = serde_json::json!({
            "keys": [
                { "kty": "RSA", "kid": "dup", "n": "first-n", "e": "AQAB" },
                { "kty": "RSA", "kid": "dup", "n": "second-n", "e": "AQAB" },
            ]
        })
        .to_string();
        let url = spawn_jwks_endpoint(Arc::new(JwksFixture {
            body,
            hits: AtomicUsize::new(0),
        }))
        .await;
        let cache =
            KeySetCache::new(url, Duration::from_secs(300), Duration::from_secs(2)).unwrap();

        let key = cache.resolve("dup").await.unwrap().unwrap();
        assert_eq!(key.n.as_deref(), Some("first-n"));
    }
}
