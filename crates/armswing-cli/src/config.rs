//! Configuration vault – reads/writes `~/.armswing/config.toml`.

use armswing_perception::EstimatorConfig;
use armswing_perception::sagittal::{DEFAULT_DEAD_ZONE, DEFAULT_MIN_PROJECTED_NORM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::demo::MockPose;

/// Persisted user configuration stored in `~/.armswing/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shortest projected arm / torso vector that still has a direction.
    #[serde(default = "default_min_projected_norm")]
    pub min_projected_norm: f64,

    /// Half-width of the neutral band of the front/back classification.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,

    /// Pose shown by `/mock` before the first `/next`.
    #[serde(default)]
    pub start_pose: MockPose,
}

fn default_min_projected_norm() -> f64 {
    DEFAULT_MIN_PROJECTED_NORM
}
fn default_dead_zone() -> f64 {
    DEFAULT_DEAD_ZONE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_projected_norm: default_min_projected_norm(),
            dead_zone: default_dead_zone(),
            start_pose: MockPose::default(),
        }
    }
}

impl Config {
    /// The estimator tolerances carried by this config.
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            min_projected_norm: self.min_projected_norm,
            dead_zone: self.dead_zone,
        }
    }
}

/// Return the path to `~/.armswing/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".armswing").join("config.toml")
}

/// Load the effective config: the file at [`config_path`] (or the defaults
/// when it does not exist) with the `ARMSWING_*` overrides applied.
pub fn load() -> Result<Config, String> {
    let file = load_file()?;
    Ok(with_env_overrides(file.unwrap_or_default()))
}

/// Load only what is stored on disk.  Returns `None` if the file does not
/// exist.  Environment overrides are not applied.
pub fn load_file() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `ARMSWING_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ARMSWING_MIN_PROJECTED_NORM` | `min_projected_norm` |
/// | `ARMSWING_DEAD_ZONE` | `dead_zone` |
/// | `ARMSWING_START_POSE` | `start_pose` |
///
/// Values that do not parse are ignored.
pub fn with_env_overrides(mut cfg: Config) -> Config {
    apply_env_overrides(&mut cfg);
    cfg
}

fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ARMSWING_MIN_PROJECTED_NORM")
        && let Ok(n) = v.parse::<f64>()
    {
        cfg.min_projected_norm = n;
    }
    if let Ok(v) = std::env::var("ARMSWING_DEAD_ZONE")
        && let Ok(n) = v.parse::<f64>()
    {
        cfg.dead_zone = n;
    }
    if let Ok(v) = std::env::var("ARMSWING_START_POSE")
        && let Ok(pose) = v.parse::<MockPose>()
    {
        cfg.start_pose = pose;
    }
}

/// Save the config to disk, creating `~/.armswing/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
