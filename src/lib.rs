pub mod cache;
pub mod core;
pub mod custom;
pub mod persistence;
pub mod provider;
pub mod walker;

use std::sync::Arc;

pub use cache::RecordCache;
pub use crate::core::{
    HydratedRecord,
    PageRequest,
    PageResult,
    PokedexError,
    Settings,
    TypeFilter,
};
pub use custom::CustomStoreClient;
pub use provider::{
    CreatureProvider,
    PokeApiProvider,
};
pub use walker::{
    FetchWalker,
    RequestTracker,
    WalkOptions,
};

/// Builds a walker over PokeAPI and a custom store client sharing one HTTP client.
pub fn connect(
    settings: &Settings,
    cache: Arc<RecordCache>,
) -> Result<(FetchWalker<PokeApiProvider>, CustomStoreClient), PokedexError> {
    let client = crate::core::http::http_client(settings.request_timeout())?;

    let provider = PokeApiProvider::new(settings.provider_url.clone(), client.clone());
    let walker = FetchWalker::new(provider, cache, WalkOptions::from(settings));
    let store = CustomStoreClient::new(settings.custom_store_url.clone(), client);

    Ok((walker, store))
}
