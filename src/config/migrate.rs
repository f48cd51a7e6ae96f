//! Configuration file upgrades.
//!
//! Older config files may lack keys introduced later. `fill_missing_keys`
//! inserts each missing key with its default value and rewrites the file,
//! keeping every value the user already set.

use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Default value for each known key, in file order.
fn known_keys() -> Vec<(&'static str, Value)> {
    vec![
        (
            "database",
            Value::String(super::Config::database_file().to_string_lossy().to_string()),
        ),
        ("notifications", Value::Bool(super::default_notifications())),
        (
            "sweep_interval_secs",
            Value::Number(super::default_sweep_interval().into()),
        ),
        (
            "default_radius_meters",
            Value::Number(super::default_radius().into()),
        ),
        ("log_level", Value::String(super::default_log_level())),
    ]
}

/// Return the names of the keys absent from `map`.
pub fn missing_keys(map: &Mapping) -> Vec<&'static str> {
    known_keys()
        .into_iter()
        .filter(|(k, _)| !map.contains_key(Value::String((*k).to_string())))
        .map(|(k, _)| k)
        .collect()
}

/// Add every missing key to the config file at `path`.
///
/// Returns the list of keys that were added (empty when the file was
/// already complete, in which case it is not rewritten).
pub fn fill_missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
    let content = fs::read_to_string(path)?;
    let mut yaml: Value = serde_yaml::from_str(&content)?;

    let map = yaml
        .as_mapping_mut()
        .ok_or_else(|| AppError::Config(format!("{:?} is not a YAML mapping", path)))?;

    let mut added = Vec::new();
    for (key, default) in known_keys() {
        let k = Value::String(key.to_string());
        if !map.contains_key(&k) {
            map.insert(k, default);
            added.push(key);
        }
    }

    if !added.is_empty() {
        fs::write(path, serde_yaml::to_string(&yaml)?)?;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_only_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geotimer.conf");
        fs::write(&path, "database: /tmp/x.sqlite\nnotifications: false\n").unwrap();

        let added = fill_missing_keys(&path).unwrap();
        assert_eq!(
            added,
            vec!["sweep_interval_secs", "default_radius_meters", "log_level"]
        );

        let cfg: super::super::Config =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert!(!cfg.notifications);
        assert_eq!(cfg.sweep_interval_secs, 30);

        assert!(fill_missing_keys(&path).unwrap().is_empty());
    }
}
