use packsim_data::read_text_if_exists;
use std::io;
use std::path::PathBuf;

pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_COLLECTION: &str = "collection.json";
pub const DEFAULT_HTML: &str = "collection.html";
pub const DEFAULT_BOOSTER_TABLE: &str = "boosters.json";
pub const DEFAULT_API_KEY_FILE: &str = "apikey.txt";

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub cache_dir: PathBuf,
    pub collection_path: PathBuf,
    pub booster_table: PathBuf,
    pub html_path: Option<PathBuf>,
    pub text_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub api_key_file: PathBuf,
    pub seed: Option<u64>,
    pub legacy: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            collection_path: PathBuf::from(DEFAULT_COLLECTION),
            booster_table: PathBuf::from(DEFAULT_BOOSTER_TABLE),
            html_path: Some(PathBuf::from(DEFAULT_HTML)),
            text_path: None,
            api_key: None,
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
            seed: None,
            legacy: false,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = var("PACKSIM_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("PACKSIM_COLLECTION") {
            config.collection_path = PathBuf::from(path);
        }
        if let Some(path) = var("PACKSIM_BOOSTERS") {
            config.booster_table = PathBuf::from(path);
        }
        if let Some(path) = var("PACKSIM_API_KEY_FILE") {
            config.api_key_file = PathBuf::from(path);
        }
        config.api_key = var("PACKSIM_API_KEY").filter(|key| !key.trim().is_empty());
        config
    }

    /// Explicit key first, then the key file. Requests go out anonymously when
    /// neither is present.
    pub fn resolve_api_key(&self) -> io::Result<Option<String>> {
        if let Some(key) = &self.api_key {
            return Ok(Some(key.trim().to_string()));
        }
        Ok(read_text_if_exists(&self.api_key_file)?
            .map(|raw| raw.trim().to_string())
            .filter(|key| !key.is_empty()))
    }
}
