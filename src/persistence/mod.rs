use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

const APP_NAME: &str = "pokedex";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    save_json_to(data, &get_data_file_path(filename))
}

pub fn save_json_to<T: Serialize>(
    data: &T,
    file_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    tracing::debug!("Data saved to: {}", file_path.display());
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(
    filename: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    load_json_from(&get_data_file_path(filename))
}

pub fn load_json_from<T: for<'de> Deserialize<'de> + Default>(
    file_path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    tracing::debug!("Data loaded from: {}", file_path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(filename: &str) -> T {
    match load_json::<T>(filename) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to load {}: {}. Using defaults.", filename, e);
            T::default()
        }
    }
}

/// Removes a saved data file. Returns whether there was one to remove.
pub fn delete_data_file(filename: &str) -> Result<bool, Box<dyn std::error::Error>> {
    delete_file_at(&get_data_file_path(filename))
}

pub fn delete_file_at(file_path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Ok(false);
    }
    fs::remove_file(file_path)?;
    tracing::debug!("Deleted: {}", file_path.display());
    Ok(true)
}

pub fn data_file_exists(filename: &str) -> bool {
    get_data_file_path(filename).exists()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::core::Settings;

    #[test]
    fn test_settings_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings { page_size: 12, ..Settings::default() };
        save_json_to(&settings, &path).unwrap();

        let loaded: Settings = load_json_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let loaded: Settings = load_json_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_delete_saved_settings_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        save_json_to(&Settings { total_records: 1025, ..Settings::default() }, &path).unwrap();

        assert!(delete_file_at(&path).unwrap());
        assert!(!path.exists());
        assert!(!delete_file_at(&path).unwrap());

        let loaded: Settings = load_json_from(&path).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load_json_from::<Settings>(&path).is_err());
    }
}
