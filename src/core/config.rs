use crate::config::{Config, migrate};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    /// Print the configuration actually in effect (file values plus defaults).
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", serde_yaml::to_string(cfg)?);
        Ok(())
    }

    /// Report keys missing from the file on disk and add them with defaults.
    pub fn check(path: &Path) -> AppResult<()> {
        if !path.exists() {
            warning(format!(
                "Config file {} not found, run `geotimer init`",
                path.display()
            ));
            return Ok(());
        }

        // rifiuta subito un file illeggibile
        let raw = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str::<serde_yaml::Value>(&raw)?;

        let added = migrate::fill_missing_keys(path)?;
        if added.is_empty() {
            success("Configuration is complete.");
        } else {
            for key in &added {
                info(format!("Added missing key '{key}' with its default value"));
            }
            success(format!("Configuration updated ({} key(s) added).", added.len()));
        }
        Ok(())
    }

    /// Open the config file in `editor`, then $EDITOR/$VISUAL, then a platform default.
    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let requested = editor.clone().unwrap_or_else(|| default_editor.clone());

        match Command::new(&requested).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!("Configuration file edited using '{requested}'"));
                return Ok(());
            }
            _ => warning(format!(
                "Editor '{requested}' not available, falling back to '{default_editor}'"
            )),
        }

        let status = Command::new(&default_editor)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("cannot run '{default_editor}': {e}")))?;
        if !status.success() {
            return Err(AppError::Config(format!(
                "editor '{default_editor}' exited with {status}"
            )));
        }
        success(format!("Configuration file edited using fallback '{default_editor}'"));
        Ok(())
    }
}
