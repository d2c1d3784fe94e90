//! Typed platform settings.
//!
//! Each group deserializes from its section of the resolved configuration,
//! falls back to per-field defaults, and then takes overrides from prefixed
//! environment variables (`DP_KAFKA_BOOTSTRAP_SERVERS`, `DP_DB_PORT`, ...).
//! Environment values always win over YAML values.

use super::error::ConfigError;
use super::lenient::{self, parse_bool, parse_int};
use super::loader::{ConfigSources, load_layered_config};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

/// Placeholder printed instead of credentials.
pub const REDACTED: &str = "***";

/// Sets one field from the raw text of an environment variable.
pub type Setter<T> = fn(&mut T, &str) -> Result<(), String>;

/// `(variable suffix, setter)` pairs for one settings group.
pub type EnvFields<T> = &'static [(&'static str, Setter<T>)];

/// A settings group with a fixed environment prefix.
pub trait SettingsGroup: Sized + 'static {
    /// Prefix prepended to every field's variable suffix.
    const ENV_PREFIX: &'static str;

    /// `DP_{SECTION}__` form of the prefix, read before [`Self::ENV_PREFIX`].
    const NESTED_PREFIX: Option<&'static str> = None;

    /// Fields that can be overridden from the environment.
    fn env_fields() -> EnvFields<Self>;

    /// Apply `{ENV_PREFIX}{SUFFIX}` overrides read through `lookup`.
    fn apply_env_overrides_with<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        apply_fields(self, lookup)
    }
}

/// Run every setter of `T` whose variable is present.
///
/// Nested variables are applied first, so the flat prefix wins when both
/// are set.
fn apply_fields<T, F>(target: &mut T, lookup: &F) -> Result<(), ConfigError>
where
    T: SettingsGroup,
    F: Fn(&str) -> Option<String>,
{
    for prefix in T::NESTED_PREFIX.into_iter().chain([T::ENV_PREFIX]) {
        for &(suffix, set) in T::env_fields() {
            let var = format!("{prefix}{suffix}");
            if let Some(raw) = lookup(&var) {
                set(target, &raw)
                    .map_err(|reason| ConfigError::invalid_env_value(&var, &raw, reason))?;
            }
        }
    }
    Ok(())
}

fn set_string(field: &mut String, raw: &str) -> Result<(), String> {
    *field = raw.to_string();
    Ok(())
}

fn set_opt_string(field: &mut Option<String>, raw: &str) -> Result<(), String> {
    *field = (!raw.is_empty()).then(|| raw.to_string());
    Ok(())
}

fn set_bool(field: &mut bool, raw: &str) -> Result<(), String> {
    *field = parse_bool(raw)?;
    Ok(())
}

fn set_int<T>(field: &mut T, raw: &str) -> Result<(), String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    *field = parse_int(raw)?;
    Ok(())
}

/// Kafka connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSettings {
    pub bootstrap_servers: String,
    pub schema_registry_url: String,
    pub security_protocol: String,

    // Consumer
    pub consumer_group_id: Option<String>,
    pub auto_offset_reset: String,
    #[serde(deserialize_with = "lenient::bool_from_any")]
    pub enable_auto_commit: bool,

    // Producer
    #[serde(deserialize_with = "lenient::string_from_scalar")]
    pub acks: String,
    #[serde(deserialize_with = "lenient::int_from_any")]
    pub retries: u32,
    pub compression_type: String,
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:29092".to_string(),
            schema_registry_url: "http://localhost:8081".to_string(),
            security_protocol: "PLAINTEXT".to_string(),
            consumer_group_id: None,
            auto_offset_reset: "earliest".to_string(),
            enable_auto_commit: false,
            acks: "all".to_string(),
            retries: 3,
            compression_type: "lz4".to_string(),
        }
    }
}

impl SettingsGroup for KafkaSettings {
    const ENV_PREFIX: &'static str = "DP_KAFKA_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_KAFKA__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<KafkaSettings> = &[
            ("BOOTSTRAP_SERVERS", |s, v| set_string(&mut s.bootstrap_servers, v)),
            ("SCHEMA_REGISTRY_URL", |s, v| set_string(&mut s.schema_registry_url, v)),
            ("SECURITY_PROTOCOL", |s, v| set_string(&mut s.security_protocol, v)),
            ("CONSUMER_GROUP_ID", |s, v| set_opt_string(&mut s.consumer_group_id, v)),
            ("AUTO_OFFSET_RESET", |s, v| set_string(&mut s.auto_offset_reset, v)),
            ("ENABLE_AUTO_COMMIT", |s, v| set_bool(&mut s.enable_auto_commit, v)),
            ("ACKS", |s, v| set_string(&mut s.acks, v)),
            ("RETRIES", |s, v| set_int(&mut s.retries, v)),
            ("COMPRESSION_TYPE", |s, v| set_string(&mut s.compression_type, v)),
        ];
        FIELDS
    }
}

/// S3 / MinIO settings. `endpoint_url` is `None` for real AWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket_bronze: String,
    pub bucket_silver: String,
    pub bucket_gold: String,
    pub region: String,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            endpoint_url: Some("http://localhost:9000".to_string()),
            access_key_id: Some("minioadmin".to_string()),
            secret_access_key: Some("minioadmin".to_string()),
            bucket_bronze: "bronze".to_string(),
            bucket_silver: "silver".to_string(),
            bucket_gold: "gold".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

impl SettingsGroup for S3Settings {
    const ENV_PREFIX: &'static str = "DP_S3_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_S3__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<S3Settings> = &[
            ("ENDPOINT_URL", |s, v| set_opt_string(&mut s.endpoint_url, v)),
            ("ACCESS_KEY_ID", |s, v| set_opt_string(&mut s.access_key_id, v)),
            ("SECRET_ACCESS_KEY", |s, v| set_opt_string(&mut s.secret_access_key, v)),
            ("BUCKET_BRONZE", |s, v| set_string(&mut s.bucket_bronze, v)),
            ("BUCKET_SILVER", |s, v| set_string(&mut s.bucket_silver, v)),
            ("BUCKET_GOLD", |s, v| set_string(&mut s.bucket_gold, v)),
            ("REGION", |s, v| set_string(&mut s.region, v)),
        ];
        FIELDS
    }
}

/// Iceberg catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcebergSettings {
    /// `rest`, `glue` or `hive`.
    pub catalog_type: String,
    pub catalog_uri: String,
    pub warehouse: String,
}

impl Default for IcebergSettings {
    fn default() -> Self {
        Self {
            catalog_type: "rest".to_string(),
            catalog_uri: "http://localhost:8181".to_string(),
            warehouse: "s3://warehouse/".to_string(),
        }
    }
}

impl SettingsGroup for IcebergSettings {
    const ENV_PREFIX: &'static str = "DP_ICEBERG_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_ICEBERG__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<IcebergSettings> = &[
            ("CATALOG_TYPE", |s, v| set_string(&mut s.catalog_type, v)),
            ("CATALOG_URI", |s, v| set_string(&mut s.catalog_uri, v)),
            ("WAREHOUSE", |s, v| set_string(&mut s.warehouse, v)),
        ];
        FIELDS
    }
}

/// Spark settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkSettings {
    pub master: String,
    pub app_name: String,
    pub executor_memory: String,
    pub driver_memory: String,
}

impl Default for SparkSettings {
    fn default() -> Self {
        Self {
            master: "local[*]".to_string(),
            app_name: "data-platform".to_string(),
            executor_memory: "2g".to_string(),
            driver_memory: "1g".to_string(),
        }
    }
}

impl SettingsGroup for SparkSettings {
    const ENV_PREFIX: &'static str = "DP_SPARK_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_SPARK__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<SparkSettings> = &[
            ("MASTER", |s, v| set_string(&mut s.master, v)),
            ("APP_NAME", |s, v| set_string(&mut s.app_name, v)),
            ("EXECUTOR_MEMORY", |s, v| set_string(&mut s.executor_memory, v)),
            ("DRIVER_MEMORY", |s, v| set_string(&mut s.driver_memory, v)),
        ];
        FIELDS
    }
}

/// PostgreSQL settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(deserialize_with = "lenient::int_from_any")]
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "dataplatform".to_string(),
            username: "dataplatform".to_string(),
            password: "dataplatform".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// PostgreSQL connection URL.
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

impl SettingsGroup for DatabaseSettings {
    const ENV_PREFIX: &'static str = "DP_DB_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_DATABASE__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<DatabaseSettings> = &[
            ("HOST", |s, v| set_string(&mut s.host, v)),
            ("PORT", |s, v| set_int(&mut s.port, v)),
            ("DATABASE", |s, v| set_string(&mut s.database, v)),
            ("USERNAME", |s, v| set_string(&mut s.username, v)),
            ("PASSWORD", |s, v| set_string(&mut s.password, v)),
        ];
        FIELDS
    }
}

/// Logging settings, usually from `base/logging.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn(ing), error or critical.
    pub level: String,
    /// Emit JSON lines instead of console output.
    #[serde(deserialize_with = "lenient::bool_from_any")]
    pub json: bool,
    pub service_name: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            service_name: None,
        }
    }
}

impl SettingsGroup for LoggingSettings {
    const ENV_PREFIX: &'static str = "DP_LOG_";
    const NESTED_PREFIX: Option<&'static str> = Some("DP_LOGGING__");

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<LoggingSettings> = &[
            ("LEVEL", |s, v| set_string(&mut s.level, v)),
            ("JSON", |s, v| set_bool(&mut s.json, v)),
            ("SERVICE_NAME", |s, v| set_opt_string(&mut s.service_name, v)),
        ];
        FIELDS
    }
}

/// All platform settings.
///
/// Unknown keys in the resolved configuration are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Deployment environment.
    pub environment: String,
    /// Enable debug mode.
    #[serde(deserialize_with = "lenient::bool_from_any")]
    pub debug: bool,
    pub project_name: String,

    pub kafka: KafkaSettings,
    pub s3: S3Settings,
    pub iceberg: IcebergSettings,
    pub spark: SparkSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            debug: false,
            project_name: "data-platform".to_string(),
            kafka: KafkaSettings::default(),
            s3: S3Settings::default(),
            iceberg: IcebergSettings::default(),
            spark: SparkSettings::default(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl SettingsGroup for PlatformSettings {
    const ENV_PREFIX: &'static str = "DP_";

    fn env_fields() -> EnvFields<Self> {
        const FIELDS: EnvFields<PlatformSettings> = &[
            ("ENVIRONMENT", |s, v| set_string(&mut s.environment, v)),
            ("DEBUG", |s, v| set_bool(&mut s.debug, v)),
            ("PROJECT_NAME", |s, v| set_string(&mut s.project_name, v)),
        ];
        FIELDS
    }

    fn apply_env_overrides_with<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        apply_fields(self, lookup)?;
        self.kafka.apply_env_overrides_with(lookup)?;
        self.s3.apply_env_overrides_with(lookup)?;
        self.iceberg.apply_env_overrides_with(lookup)?;
        self.spark.apply_env_overrides_with(lookup)?;
        self.database.apply_env_overrides_with(lookup)?;
        self.logging.apply_env_overrides_with(lookup)?;
        Ok(())
    }
}

impl PlatformSettings {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(&|name: &str| std::env::var(name).ok())
    }

    /// Defaults plus overrides read through `lookup`.
    pub fn from_env_with<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        settings.apply_env_overrides_with(lookup)?;
        Ok(settings)
    }

    /// Bind a resolved configuration mapping, then apply environment overrides.
    pub fn from_resolved(resolved: Value) -> Result<Self, ConfigError> {
        Self::from_resolved_with(resolved, &|name: &str| std::env::var(name).ok())
    }

    /// Like [`PlatformSettings::from_resolved`] with an explicit variable lookup.
    pub fn from_resolved_with<F>(resolved: Value, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings: Self = serde_json::from_value(resolved)?;
        settings.apply_env_overrides_with(lookup)?;
        Ok(settings)
    }

    /// Load layered YAML from `config_dir` and bind it.
    ///
    /// When no layer sets `environment`, it takes the name of the selected
    /// environment layer.
    pub fn from_yaml(config_dir: impl AsRef<Path>, environment: Option<&str>) -> Result<Self, ConfigError> {
        let mut sources = ConfigSources::new(config_dir.as_ref());
        if let Some(env) = environment {
            sources = sources.with_environment(env);
        }
        let mut resolved = load_layered_config(&sources)?;
        if let Value::Object(map) = &mut resolved {
            map.entry("environment")
                .or_insert_with(|| Value::String(sources.effective_environment()));
        }
        Self::from_resolved(resolved)
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }

    /// Copy with credentials replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |field: &mut Option<String>| {
            if field.is_some() {
                *field = Some(REDACTED.to_string());
            }
        };
        mask(&mut copy.s3.access_key_id);
        mask(&mut copy.s3.secret_access_key);
        copy.database.password = REDACTED.to_string();
        copy
    }
}
