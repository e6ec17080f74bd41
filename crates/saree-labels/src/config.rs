//! # Label Configuration
//!
//! Configuration for label generation and print dispatch.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SAREE_LABEL_SYMBOLOGY=qr                                           │
//! │     SAREE_LABEL_SPOOL_DIR=/var/spool/saree-labels                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/saree-pos/labels.toml (Linux)                            │
//! │     ~/Library/Application Support/com.saree.pos/labels.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Thermal 58 mm, Code128, abort on first error                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # labels.toml
//! [print]
//! profile = { kind = "thermal", paperWidth = "58mm" }
//! symbology = "code128"
//! payload = "sku"
//! batch_policy = "abort_on_first_error"
//!
//! [barcode]
//! module_width = 2
//! bar_height = 50
//! display_value = true
//! quiet_zone = 10
//!
//! [dispatch]
//! title = "Product Labels"
//! fallback_delay_ms = 500
//! # load_timeout_ms = 10000
//! spool_dir = "/var/spool/saree-labels"
//! max_open_surfaces = 1
//! ```

use saree_core::{PayloadKind, PrintProfile, Symbology};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::barcode::BarcodeOptions;
use crate::dispatch::DispatchOptions;
use crate::error::{ConfigError, ConfigResult};
use crate::layout::GridLayout;
use crate::pipeline::{BatchPolicy, LabelPipeline};
use crate::spool::SpoolHost;
use crate::template::{TemplateOptions, DEFAULT_FALLBACK_DELAY_MS};

// =============================================================================
// Print Settings
// =============================================================================

/// Defaults applied when a request leaves a field out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default)]
    pub profile: PrintProfile,

    #[serde(default)]
    pub symbology: Symbology,

    #[serde(default)]
    pub payload: PayloadKind,

    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

// =============================================================================
// Dispatch Settings
// =============================================================================

/// Print window and spool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Title of the print window.
    #[serde(default = "default_title")]
    pub title: String,

    /// Wait before printing a document with no images (milliseconds).
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u64,

    /// Image load watchdog (milliseconds). Absent means wait indefinitely.
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,

    /// Where spooled print jobs are written.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,

    /// Jobs that may be open at the same time.
    #[serde(default = "default_max_open_surfaces")]
    pub max_open_surfaces: usize,
}

fn default_title() -> String {
    "Product Labels".to_string()
}

fn default_fallback_delay() -> u64 {
    DEFAULT_FALLBACK_DELAY_MS
}

fn default_spool_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "saree", "pos")
        .map(|dirs| dirs.data_local_dir().join("spool"))
        .unwrap_or_else(|| std::env::temp_dir().join("saree-labels"))
}

fn default_max_open_surfaces() -> usize {
    1
}

impl Default for DispatchSettings {
    fn default() -> Self {
        DispatchSettings {
            title: default_title(),
            fallback_delay_ms: default_fallback_delay(),
            load_timeout_ms: None,
            spool_dir: default_spool_dir(),
            max_open_surfaces: default_max_open_surfaces(),
        }
    }
}

// =============================================================================
// Main Label Configuration
// =============================================================================

/// Complete label configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub print: PrintSettings,

    #[serde(default)]
    pub barcode: BarcodeOptions,

    #[serde(default)]
    pub dispatch: DispatchSettings,
}

impl LabelConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (labels.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading label config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load label config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Label config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        // Range checks plus label geometry for the default profile
        GridLayout::for_profile(&self.print.profile)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        self.barcode
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.dispatch.max_open_surfaces == 0 {
            return Err(ConfigError::Invalid(
                "max_open_surfaces must be greater than 0".into(),
            ));
        }

        if self.dispatch.load_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "load_timeout_ms must be greater than 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SAREE_LABEL_SYMBOLOGY") {
            match value.parse() {
                Ok(symbology) => {
                    debug!(%symbology, "Overriding symbology from environment");
                    self.print.symbology = symbology;
                }
                Err(e) => warn!(value = %value, error = %e, "Ignoring SAREE_LABEL_SYMBOLOGY"),
            }
        }

        if let Ok(value) = std::env::var("SAREE_LABEL_BATCH_POLICY") {
            match value.parse() {
                Ok(policy) => {
                    debug!(%policy, "Overriding batch policy from environment");
                    self.print.batch_policy = policy;
                }
                Err(e) => warn!(value = %value, error = %e, "Ignoring SAREE_LABEL_BATCH_POLICY"),
            }
        }

        if let Ok(dir) = std::env::var("SAREE_LABEL_SPOOL_DIR") {
            debug!(dir = %dir, "Overriding spool directory from environment");
            self.dispatch.spool_dir = PathBuf::from(dir);
        }

        if let Ok(ms) = std::env::var("SAREE_LABEL_LOAD_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.dispatch.load_timeout_ms = Some(ms);
            }
        }

        if let Ok(ms) = std::env::var("SAREE_LABEL_FALLBACK_DELAY_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.dispatch.fallback_delay_ms = ms;
            }
        }

        if let Ok(n) = std::env::var("SAREE_LABEL_MAX_SURFACES") {
            if let Ok(n) = n.parse::<usize>() {
                self.dispatch.max_open_surfaces = n;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "saree", "pos")
            .map(|dirs| dirs.config_dir().join("labels.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn template_options(&self) -> TemplateOptions {
        TemplateOptions {
            title: self.dispatch.title.clone(),
            fallback_delay_ms: self.dispatch.fallback_delay_ms,
            load_timeout_ms: self.dispatch.load_timeout_ms,
        }
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            fallback_delay: Duration::from_millis(self.dispatch.fallback_delay_ms),
            load_timeout: self.dispatch.load_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Pipeline using the configured barcode, template and batch settings.
    pub fn pipeline(&self) -> LabelPipeline {
        LabelPipeline::new(self.barcode, self.template_options(), self.print.batch_policy)
    }

    /// Spool host for the configured directory.
    pub fn spool_host(&self) -> SpoolHost {
        SpoolHost::new(&self.dispatch.spool_dir, self.dispatch.max_open_surfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saree_core::PaperWidth;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LabelConfig::default();
        assert_eq!(
            config.print.profile,
            PrintProfile::Thermal {
                paper_width: PaperWidth::Mm58
            }
        );
        assert_eq!(config.print.symbology, Symbology::Code128);
        assert_eq!(config.print.batch_policy, BatchPolicy::AbortOnFirstError);
        assert_eq!(config.barcode.module_width, 2);
        assert_eq!(config.dispatch.fallback_delay_ms, 500);
        assert_eq!(config.dispatch.load_timeout_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_file_format() {
        let config: LabelConfig = toml::from_str(
            r#"
            [print]
            profile = { kind = "normal", columns = 4, labelsPerPage = 24 }
            symbology = "qr"
            payload = "json"
            batch_policy = "skip_failed"

            [barcode]
            module_width = 3

            [dispatch]
            load_timeout_ms = 10000
            spool_dir = "/tmp/labels"
            "#,
        )
        .unwrap();

        assert_eq!(config.print.profile.columns(), 4);
        assert_eq!(config.print.symbology, Symbology::Qr);
        assert_eq!(config.print.payload, PayloadKind::Json);
        assert_eq!(config.print.batch_policy, BatchPolicy::SkipFailed);
        assert_eq!(config.barcode.module_width, 3);
        assert_eq!(config.barcode.bar_height, 50);
        assert_eq!(
            config.dispatch_options().load_timeout,
            Some(Duration::from_secs(10))
        );
        assert_eq!(config.dispatch.max_open_surfaces, 1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = LabelConfig::default();
        config.dispatch.max_open_surfaces = 0;
        assert!(config.validate().is_err());

        let mut config = LabelConfig::default();
        config.barcode.bar_height = 0;
        assert!(config.validate().is_err());

        let mut config = LabelConfig::default();
        config.print.profile = PrintProfile::Normal {
            columns: 40,
            labels_per_page: 24,
        };
        assert!(config.validate().is_err());

        let mut config = LabelConfig::default();
        config.barcode.module_width = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profile_without_room_for_labels_rejected() {
        // in range, but 200 rows leave no height for a label
        let mut config = LabelConfig::default();
        config.print.profile = PrintProfile::Normal {
            columns: 1,
            labels_per_page: 200,
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("labels.toml");
        std::fs::write(
            &path,
            "[print]\nprofile = { kind = \"normal\", columns = 1, labelsPerPage = 200 }\n",
        )
        .unwrap();
        assert!(LabelConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("labels.toml");

        let mut config = LabelConfig::default();
        config.print.symbology = Symbology::Qr;
        config.dispatch.spool_dir = tmp.path().join("spool");
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[print]"));
        assert!(contents.contains("[dispatch]"));

        let loaded: LabelConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = LabelConfig::load_or_default(Some(tmp.path().join("absent.toml")));
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatch.title, "Product Labels");
    }
}
