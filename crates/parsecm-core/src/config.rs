use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ManeuverConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverConfig {
    /// Added to the initial attitude time so `tstart` lines up with the
    /// AOMANUVR command in the backstop.
    #[serde(default = "default_tstart_offset")]
    pub tstart_offset_secs: f64,
    /// Obsid recorded for attitudes without an `ID:` line.
    #[serde(default = "default_intermediate_obsid")]
    pub intermediate_obsid: String,
}

fn default_tstart_offset() -> f64 {
    10.0
}

fn default_intermediate_obsid() -> String {
    "IN_IA".to_string()
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            tstart_offset_secs: default_tstart_offset(),
            intermediate_obsid: default_intermediate_obsid(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlignmentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    #[serde(default = "default_alignment_variable")]
    pub variable: String,
}

fn default_alignment_variable() -> String {
    "ODB_SI_ALIGN".to_string()
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            variable: default_alignment_variable(),
        }
    }
}

// ---------------------------------------------------------------------------
// ParseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub maneuver: ManeuverConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
}

impl ParseConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: ParseConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if !self.maneuver.tstart_offset_secs.is_finite() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "maneuver.tstart_offset_secs must be a finite number".to_string(),
            });
        }
        if self.maneuver.intermediate_obsid.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "maneuver.intermediate_obsid is blank; intermediate attitudes will be indistinguishable".to_string(),
            });
        }
        if self.alignment.variable.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "alignment.variable must name the assignment to read".to_string(),
            });
        }
        warnings
    }
}
