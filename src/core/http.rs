use std::time::Duration;

use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        ACCEPT,
        USER_AGENT,
    },
    Client,
    Response,
    StatusCode,
};

use crate::core::PokedexError;

pub fn http_client(timeout: Duration) -> Result<Client, PokedexError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("pokedex/0.1 (+reqwest)"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| PokedexError::Custom(format!("HTTP client build failed: {e}")))
}

/// Maps a non-success status to an error. A 404 becomes `RecordNotFound(id)` when the
/// request addressed a single record.
pub fn ensure_success(resp: &Response, id: Option<u32>) -> Result<(), PokedexError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(PokedexError::RecordNotFound(id)),
        (StatusCode::CONFLICT, _) => {
            Err(PokedexError::Conflict(format!("{} rejected the request", resp.url())))
        }
        _ => Err(PokedexError::Status { status: status.as_u16(), url: resp.url().to_string() }),
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
