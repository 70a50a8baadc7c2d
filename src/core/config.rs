use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::persistence::{
    data_file_exists,
    delete_data_file,
    load_json_or_default,
    save_json,
};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider_url: String,
    pub custom_store_url: String,
    pub page_size: u32,
    /// Size of the provider id space walked in browse mode and listed for search.
    pub total_records: u32,
    pub search_candidate_limit: usize,
    pub search_batch_size: usize,
    /// Share of `total_records` assumed to match an active type filter when estimating
    /// page counts. There is no count endpoint per type, so this is only a guess.
    pub filtered_total_ratio: f64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_url: "https://pokeapi.co/api/v2".to_string(),
            custom_store_url: "http://localhost:5000/api/pokemon".to_string(),
            page_size: 24,
            total_records: 151,
            search_candidate_limit: 50,
            search_batch_size: 10,
            filtered_total_ratio: 0.7,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        load_json_or_default::<Settings>(SETTINGS_FILE).sanitized()
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        save_json(self, SETTINGS_FILE)
    }

    /// Deletes the saved settings file so the next load falls back to defaults.
    pub fn reset() -> Result<bool, Box<dyn std::error::Error>> {
        delete_data_file(SETTINGS_FILE)
    }

    pub fn is_saved() -> bool {
        data_file_exists(SETTINGS_FILE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Clamps values a hand-edited settings file could break the walker with.
    pub fn sanitized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.search_batch_size = self.search_batch_size.max(1);
        if !(0.0..=1.0).contains(&self.filtered_total_ratio) {
            self.filtered_total_ratio = Settings::default().filtered_total_ratio;
        }
        self
    }
}
