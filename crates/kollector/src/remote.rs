//! The authoritative, network-backed copy of a user's collection.
//!
//! The transport (REST client, auth headers, retries, timeouts) lives outside
//! this crate. It implements [`RemoteDataSource`] and can use
//! [`decode_collectibles`] to turn a response body into collectibles.

use crate::error::{KollectorError, Result};
use crate::model::Collectible;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// The full collection of `user_id`. Pure read; caching is the caller's job.
    async fn fetch_collectibles(&self, user_id: &str) -> Result<Vec<Collectible>>;
}

#[async_trait]
impl<T: RemoteDataSource + ?Sized> RemoteDataSource for std::sync::Arc<T> {
    async fn fetch_collectibles(&self, user_id: &str) -> Result<Vec<Collectible>> {
        (**self).fetch_collectibles(user_id).await
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<Collectible>),
    Envelope { data: Vec<Collectible> },
}

/// Decodes a response body: either a bare array or `{ "data": [...] }`.
pub fn decode_collectibles(body: &[u8]) -> Result<Vec<Collectible>> {
    let payload: Payload = serde_json::from_slice(body)
        .map_err(|e| KollectorError::Decoding(format!("collectibles payload: {}", e)))?;
    Ok(match payload {
        Payload::Bare(items) => items,
        Payload::Envelope { data } => data,
    })
}
