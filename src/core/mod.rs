pub mod config;
pub mod errors;
pub mod http;
pub mod models;

pub use config::Settings;
pub use errors::{
    PokedexError,
    Result,
};
pub use models::{
    HydratedRecord,
    IndexEntry,
    PageRequest,
    PageResult,
    SpeciesData,
    Stat,
    TypeFilter,
};
