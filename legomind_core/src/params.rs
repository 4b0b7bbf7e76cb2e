//! Runtime parameters of the robot program
//!
//! Every tunable has a built-in default, so a params file only needs to list
//! the values it overrides. Values are kept as JSON so integers, floats and
//! strings share one store.

use crate::error::{LegoError, LegoResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Default location of the params file, relative to the working directory
pub const DEFAULT_PARAMS_PATH: &str = ".legomind/params.yaml";

/// Built-in values: distances in centimeters, speeds in degrees per second
const DEFAULTS: &[(&str, i64)] = &[
    ("sample_interval_ms", 100),
    ("min_range_cm", 3),
    ("critical_cm", 10),
    ("warning_cm", 20),
    ("max_range_cm", 250),
    ("cruise_speed", 400),
    ("slow_speed", 100),
    // one full turn plus 79 degrees
    ("evade_angle_deg", 439),
    ("demo_step_ms", 3000),
    ("demo_pause_ms", 1000),
    ("demo_reverse_speed", 100),
    ("probe_samples", 0),
];

type ParamMap = BTreeMap<String, Value>;

fn default_params() -> ParamMap {
    DEFAULTS
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(*value)))
        .collect()
}

/// Shared key/value store; clones see the same values
#[derive(Clone)]
pub struct RuntimeParams {
    values: Arc<RwLock<ParamMap>>,
    persist_path: Option<PathBuf>,
}

impl RuntimeParams {
    /// Defaults only, not backed by a file
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(default_params())),
            persist_path: None,
        }
    }

    /// Defaults overlaid with [`DEFAULT_PARAMS_PATH`] when that file exists
    pub fn init() -> LegoResult<Self> {
        let path = PathBuf::from(DEFAULT_PARAMS_PATH);
        let mut params = Self::new();
        if path.exists() {
            params.overlay_file(&path)?;
        }
        params.persist_path = Some(path);
        Ok(params)
    }

    /// Defaults overlaid with `path`, which must exist
    pub fn from_file(path: &Path) -> LegoResult<Self> {
        if !path.exists() {
            return Err(LegoError::config(format!(
                "Params file not found: {}",
                path.display()
            )));
        }
        let mut params = Self::new();
        params.overlay_file(path)?;
        params.persist_path = Some(path.to_path_buf());
        Ok(params)
    }

    /// `None` when the key is missing or holds a value of another type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let values = self.values.read().ok()?;
        serde_json::from_value(values.get(key)?.clone()).ok()
    }

    pub fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.get(key).unwrap_or(default)
    }

    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values
            .read()
            .map(|values| values.contains_key(key))
            .unwrap_or(false)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: T) -> LegoResult<()> {
        let value = serde_json::to_value(value)?;
        self.values.write()?.insert(key.to_string(), value);
        Ok(())
    }

    /// Drop every override, including keys without a built-in default
    pub fn reset(&self) -> LegoResult<()> {
        *self.values.write()? = default_params();
        Ok(())
    }

    /// Write all current values as YAML to the backing file
    ///
    /// Stores created with [`RuntimeParams::new`] write to [`DEFAULT_PARAMS_PATH`].
    pub fn save(&self) -> LegoResult<()> {
        let path = self
            .persist_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PARAMS_PATH));

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)?,
            _ => {}
        }

        let yaml = serde_yaml::to_string(&*self.values.read()?)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    fn overlay_file(&self, path: &Path) -> LegoResult<()> {
        let text = std::fs::read_to_string(path)?;
        let overrides: ParamMap = serde_yaml::from_str(&text)?;
        self.values.write()?.extend(overrides);
        Ok(())
    }
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_and_overrides() {
        let params = RuntimeParams::new();

        assert_eq!(params.get_i32("cruise_speed", 0), 400);
        assert_eq!(params.get_u64("sample_interval_ms", 0), 100);
        assert_eq!(params.get_i32("evade_angle_deg", 0), 439);

        params.set("wheel_diameter_cm", 42.5).unwrap();
        assert_relative_eq!(params.get_f64("wheel_diameter_cm", 0.0), 42.5);
        // Integers read back as floats too
        assert_relative_eq!(params.get_f64("warning_cm", 0.0), 20.0);

        params.set("slow_speed", 150).unwrap();
        assert_eq!(params.get_i32("slow_speed", 0), 150);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let params = RuntimeParams::new();
        params.set("warning_cm", 35).unwrap();
        params.set("extra", true).unwrap();
        assert!(params.contains("extra"));

        params.reset().unwrap();

        assert_eq!(params.get_i32("warning_cm", 0), 20);
        assert!(!params.contains("extra"));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let params = RuntimeParams::new();
        params.set("cruise_speed", "fast").unwrap();
        assert_eq!(params.get_i32("cruise_speed", 400), 400);
    }

    #[test]
    fn test_save_and_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "critical_cm: 12\ncruise_speed: 300\n").unwrap();

        let params = RuntimeParams::from_file(&path).unwrap();
        assert_eq!(params.get_i32("critical_cm", 0), 12);
        assert_eq!(params.get_i32("cruise_speed", 0), 300);
        // Keys absent from the file keep their defaults
        assert_eq!(params.get_i32("warning_cm", 0), 20);

        params.set("slow_speed", 80).unwrap();
        assert_eq!(params.persist_path(), Some(path.as_path()));
        params.save().unwrap();

        let reloaded = RuntimeParams::from_file(&path).unwrap();
        assert_eq!(reloaded.get_i32("slow_speed", 0), 80);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RuntimeParams::from_file(Path::new("/nonexistent/params.yaml"));
        assert!(matches!(err, Err(LegoError::Config(_))));
    }
}
