//! Compute-once settings snapshot.
//!
//! The entry point owns a [`SettingsHolder`]; the first [`SettingsHolder::get`]
//! discovers and loads configuration, later calls hand out the same
//! `Arc<PlatformSettings>` until [`SettingsHolder::invalidate`] is called.

use super::error::ConfigError;
use super::settings::PlatformSettings;
use arc_swap::ArcSwapOption;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Variable naming the configuration directory.
pub const CONFIG_DIR_VAR: &str = "DP_CONFIG_DIR";

/// Directory tried relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Where settings come from.
#[derive(Debug, Clone, Default)]
pub struct ConfigDiscovery {
    /// Explicit config directory; skips discovery when set.
    pub config_dir: Option<PathBuf>,
    /// Explicit environment name; otherwise `DP_ENVIRONMENT` or `local`.
    pub environment: Option<String>,
}

impl ConfigDiscovery {
    /// Discover everything from the environment and working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` instead of discovering one.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Use `environment` instead of `DP_ENVIRONMENT`.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// The config directory to load, if any.
    ///
    /// Order: explicit directory, `DP_CONFIG_DIR` when it exists, `./config`
    /// when it exists. `None` means environment variables only.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.resolve_dir_with(&|name: &str| std::env::var(name).ok())
    }

    fn resolve_dir_with<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = &self.config_dir {
            if !dir.is_dir() {
                warn!(path = %dir.display(), "Config directory does not exist");
            }
            return Some(dir.clone());
        }

        if let Some(dir) = lookup(CONFIG_DIR_VAR).map(PathBuf::from) {
            if dir.is_dir() {
                return Some(dir);
            }
            warn!(
                path = %dir.display(),
                "{} points to a missing directory, ignoring", CONFIG_DIR_VAR
            );
        }

        let fallback = Path::new(DEFAULT_CONFIG_DIR);
        fallback.is_dir().then(|| fallback.to_path_buf())
    }

    /// Load settings from the discovered directory, or from the environment alone.
    pub fn load(&self) -> Result<PlatformSettings, ConfigError> {
        match self.resolve_dir() {
            Some(dir) => {
                debug!(path = %dir.display(), "Loading settings from config directory");
                PlatformSettings::from_yaml(&dir, self.environment.as_deref())
            }
            None => {
                debug!("No config directory found, using environment variables only");
                PlatformSettings::from_env()
            }
        }
    }
}

/// Lazily loaded, explicitly invalidatable settings snapshot.
pub struct SettingsHolder {
    discovery: ConfigDiscovery,
    current: ArcSwapOption<PlatformSettings>,
}

impl SettingsHolder {
    /// Holder that loads through `discovery` on first use.
    pub fn new(discovery: ConfigDiscovery) -> Self {
        Self {
            discovery,
            current: ArcSwapOption::empty(),
        }
    }

    /// Holder pre-populated with `settings`.
    ///
    /// After [`SettingsHolder::invalidate`] it falls back to default discovery.
    pub fn with_settings(settings: PlatformSettings) -> Self {
        let holder = Self::new(ConfigDiscovery::default());
        holder.current.store(Some(Arc::new(settings)));
        holder
    }

    /// The current snapshot, loading it if needed.
    ///
    /// Two threads racing on the first call may both load; the last store wins.
    pub fn get(&self) -> Result<Arc<PlatformSettings>, ConfigError> {
        if let Some(settings) = self.current.load_full() {
            return Ok(settings);
        }

        let settings = Arc::new(self.discovery.load()?);
        info!(
            environment = %settings.environment,
            project = %settings.project_name,
            "Settings loaded"
        );
        self.current.store(Some(Arc::clone(&settings)));
        Ok(settings)
    }

    /// Drop the snapshot; the next [`SettingsHolder::get`] reloads.
    pub fn invalidate(&self) {
        if self.current.swap(None).is_some() {
            debug!("Settings snapshot invalidated");
        }
    }

    /// Whether a snapshot is currently held.
    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// The discovery rules used on reload.
    pub fn discovery(&self) -> &ConfigDiscovery {
        &self.discovery
    }
}

impl Default for SettingsHolder {
    fn default() -> Self {
        Self::new(ConfigDiscovery::default())
    }
}
