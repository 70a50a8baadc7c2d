use async_trait::async_trait;

use crate::core::{
    HydratedRecord,
    IndexEntry,
    Result,
};

pub mod api;

pub use api::PokeApiProvider;

/// Read-only source of creature records, keyed by sequential provider id.
#[async_trait]
pub trait CreatureProvider: Send + Sync {
    /// Fetches the base record and its species record.
    ///
    /// Returns `PokedexError::RecordNotFound` when the provider does not know `id`.
    async fn fetch_record(&self, id: u32) -> Result<HydratedRecord>;

    /// Lists the first `limit` ids with their names, in id order.
    async fn fetch_index(&self, limit: u32) -> Result<Vec<IndexEntry>>;
}
