use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CuadreError, Result};

/// Business-owned knobs for one consolidation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_commission_pct")]
    pub commission_pct: f64,
    /// One-indexed row holding the column headers on every sheet.
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_noise_keywords")]
    pub noise_keywords: Vec<String>,
    /// Tag letter -> employee display name.
    #[serde(default = "default_employees")]
    pub employees: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: ColumnNames,
}

/// Accepted header spellings for each column the loader reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub description: Vec<String>,
    #[serde(default)]
    pub type_hint: Vec<String>,
    pub cash: Vec<String>,
    pub transfer: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            description: strings(&["Description", "Descripción", "Descripcion"]),
            type_hint: strings(&["Type", "Tipo"]),
            cash: strings(&["Cash(+)", "Efectivo (+)"]),
            transfer: strings(&["Transfer(+)", "Transferencia (+)"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_commission_pct() -> f64 {
    15.0
}

fn default_header_row() -> u32 {
    6
}

fn default_noise_keywords() -> Vec<String> {
    strings(&[
        "TOTAL",
        "UTILIDAD",
        "PROFIT",
        "EFECTIVO EN CAJA",
        "CASH ON HAND",
        "BASE DE CAJA",
        "CASH BASE",
        "EGRESOS",
        "EXPENSES",
        "RESUMEN",
        "SUMMARY",
        "SALDO",
    ])
}

fn default_employees() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("A".to_string(), "Anderson".to_string()),
        ("J".to_string(), "Jhosept".to_string()),
    ])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commission_pct: default_commission_pct(),
            header_row: default_header_row(),
            noise_keywords: default_noise_keywords(),
            employees: default_employees(),
            columns: ColumnNames::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        validate_pct(self.commission_pct)?;
        if self.header_row == 0 {
            return Err(CuadreError::InvalidHeaderRow);
        }
        if self.columns.description.is_empty() {
            return Err(CuadreError::Settings(
                "columns.description needs at least one header name".to_string(),
            ));
        }
        for key in self.employees.keys() {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {}
                _ => {
                    return Err(CuadreError::Settings(format!(
                        "employee tag '{key}' must be a single letter"
                    )))
                }
            }
        }
        Ok(())
    }
}

pub fn validate_pct(pct: f64) -> Result<()> {
    if pct.is_finite() && (0.0..=100.0).contains(&pct) {
        Ok(())
    } else {
        Err(CuadreError::InvalidPercentage(pct))
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cuadre")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, or from the default location when `None`.
/// A missing file yields defaults; a malformed one is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = path.map_or_else(settings_path, Path::to_path_buf);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| CuadreError::Settings(format!("{}: {e}", path.display())))?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map_or_else(settings_path, Path::to_path_buf);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CuadreError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}
