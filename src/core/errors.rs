use thiserror::Error;

#[derive(Error, Debug)]
pub enum PokedexError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("HTTP error {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Record {0} not found")]
    RecordNotFound(u32),

    #[error("Failed to fetch name index: {0}")]
    IndexFetchFailed(String),

    #[error("Invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("PokedexError: {0}")]
    Custom(String),
}

impl PokedexError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PokedexError::RecordNotFound(_))
    }
}

impl From<std::io::Error> for PokedexError {
    fn from(error: std::io::Error) -> Self {
        PokedexError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for PokedexError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return PokedexError::Decode(error.to_string());
        }
        if let Some(status) = error.status() {
            return PokedexError::Status {
                status: status.as_u16(),
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        PokedexError::ProviderUnavailable(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PokedexError>;
