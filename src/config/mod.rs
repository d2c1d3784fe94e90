//! Layered configuration for data platform services.
//!
//! Resolution order (lowest to highest precedence):
//! 1. **Defaults** - per-field defaults of the typed settings
//! 2. **Base layers** - `{config_dir}/base/{logging,kafka,spark,iceberg}.yaml`
//! 3. **Environment layer** - `{config_dir}/environments/{env}.yaml`
//! 4. **Overrides** - prefixed environment variables (`DP_KAFKA_*`, `DP_DB_*`, ...),
//!    also accepted in nested form (`DP_KAFKA__*`, `DP_DATABASE__*`)
//!
//! YAML layers are deep-merged field-by-field; sequences and scalars replace
//! wholesale. String values may reference variables as `${NAME}` or
//! `${NAME:default}`; these are resolved after merging.
//!
//! ## Environment Variables
//! - `DP_CONFIG_DIR` - Config directory (default: `./config` if present)
//! - `DP_ENVIRONMENT` - Active environment (default: `local`)

mod error;
mod holder;
mod interpolate;
pub mod lenient;
mod loader;
mod merge;
mod settings;

pub use error::ConfigError;
pub use holder::{CONFIG_DIR_VAR, ConfigDiscovery, DEFAULT_CONFIG_DIR, SettingsHolder};
pub use interpolate::{has_reference, resolve_env_vars, resolve_env_vars_with, substitute};
pub use loader::{
    ConfigSources, DEFAULT_BASE_FILES, DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR, LayerKind,
    load_layered_config, load_layered_config_with, read_yaml_document,
};
pub use merge::{deep_merge, deep_merge_all};
pub use settings::*;
