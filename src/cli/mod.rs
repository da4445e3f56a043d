pub mod runner;
pub mod script;

use anyhow::{Context, Result};
use mvtokv::StoreConfig;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Store configuration from a JSON file, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    StoreConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Script text from a file, or from stdin when no path is given
pub fn load_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading script from stdin")?;
            Ok(buf)
        }
    }
}
