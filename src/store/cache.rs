//! Redis cache in front of a graph store
//!
//! Subgraph fetches are the only repeated external reads an investigation
//! makes. The cache is opt-in and never turns a cache failure into a fetch
//! failure.

use std::env;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use super::{GraphStore, GraphStoreError};
use crate::model::SubgraphPayload;

// Environment variable names
const ENV_REDIS_HOST: &str = "CLAIM_INVESTIGATOR_REDIS_HOST";
const ENV_REDIS_PORT: &str = "CLAIM_INVESTIGATOR_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "CLAIM_INVESTIGATOR_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "CLAIM_INVESTIGATOR_REDIS_DB";
const ENV_CACHE_TTL: &str = "CLAIM_INVESTIGATOR_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600;

const PREFIX_SUBGRAPH: &str = "subgraph:";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

/// Redis-backed subgraph cache
#[derive(Clone)]
pub struct SubgraphCache {
    client: Client,
    ttl_seconds: u64,
}

impl SubgraphCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `CLAIM_INVESTIGATOR_REDIS_HOST` (default: 127.0.0.1)
    /// - `CLAIM_INVESTIGATOR_REDIS_PORT` (default: 6379)
    /// - `CLAIM_INVESTIGATOR_REDIS_PASSWORD` (default: none)
    /// - `CLAIM_INVESTIGATOR_REDIS_DB` (default: 0)
    /// - `CLAIM_INVESTIGATOR_CACHE_TTL` in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        // redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    pub async fn get_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, CacheError> {
        let key = cache_key(claim_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(claim_id.to_string())),
        }
    }

    pub async fn set_subgraph(
        &self,
        claim_id: &str,
        subgraph: &SubgraphPayload,
    ) -> Result<(), CacheError> {
        let key = cache_key(claim_id);
        let json = serde_json::to_string(subgraph)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;

        tracing::debug!(key = %key, ttl = self.ttl_seconds, "Cached subgraph");
        Ok(())
    }
}

fn cache_key(claim_id: &str) -> String {
    format!("{}{}", PREFIX_SUBGRAPH, claim_id)
}

/// Graph store decorator that consults the subgraph cache first
pub struct CachingGraphStore<S> {
    inner: S,
    cache: Option<SubgraphCache>,
}

impl<S: GraphStore> CachingGraphStore<S> {
    pub fn new(inner: S, cache: Option<SubgraphCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<S: GraphStore> GraphStore for CachingGraphStore<S> {
    async fn fetch_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, GraphStoreError> {
        if let Some(ref cache) = self.cache {
            match cache.get_subgraph(claim_id).await {
                Ok(subgraph) => {
                    tracing::debug!(claim_id = %claim_id, "Cache hit for subgraph");
                    return Ok(subgraph);
                }
                Err(CacheError::Miss(_)) => {
                    tracing::debug!(claim_id = %claim_id, "Cache miss for subgraph");
                }
                Err(e) => {
                    tracing::warn!(claim_id = %claim_id, error = %e, "Subgraph cache read failed");
                }
            }
        }

        let subgraph = self.inner.fetch_subgraph(claim_id).await?;

        if let Some(ref cache) = self.cache
            && let Err(e) = cache.set_subgraph(claim_id, &subgraph).await
        {
            tracing::debug!(claim_id = %claim_id, error = %e, "Failed to cache subgraph");
        }

        Ok(subgraph)
    }
}
