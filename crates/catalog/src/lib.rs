#![deny(warnings)]

//! Upgrade line catalog: the built-in YAML definitions plus user-supplied
//! line files.

use relic_core::{validate_line, Equipment, LineConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const BUILTIN: &[(&str, &str)] = &[
    ("zodiac.yaml", include_str!("../../../assets/lines/zodiac.yaml")),
    ("anima.yaml", include_str!("../../../assets/lines/anima.yaml")),
    ("eureka.yaml", include_str!("../../../assets/lines/eureka.yaml")),
    ("resistance.yaml", include_str!("../../../assets/lines/resistance.yaml")),
    ("manderville.yaml", include_str!("../../../assets/lines/manderville.yaml")),
    ("phantom.yaml", include_str!("../../../assets/lines/phantom.yaml")),
    ("phantom-armor.yaml", include_str!("../../../assets/lines/phantom-armor.yaml")),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid line file {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
    #[error("line file {source_name}: {error}")]
    Invalid {
        source_name: String,
        error: ValidationError,
    },
    #[error("io error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Parse and validate one YAML line definition. `source_name` only labels errors.
pub fn parse_line(source_name: &str, text: &str) -> Result<LineConfig, CatalogError> {
    let line: LineConfig = serde_yaml::from_str(text).map_err(|e| CatalogError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;
    validate_line(&line).map_err(|error| CatalogError::Invalid {
        source_name: source_name.to_string(),
        error,
    })?;
    Ok(line)
}

/// Ordered set of line definitions, unique per `(id, equipment)`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lines: Vec<LineConfig>,
}

impl Catalog {
    /// The lines shipped with the tracker.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (name, text) in BUILTIN {
            catalog.insert(parse_line(name, text)?);
        }
        Ok(catalog)
    }

    /// Insert `line`, replacing any line with the same id and equipment.
    /// Returns `true` when a line was replaced.
    pub fn insert(&mut self, line: LineConfig) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|l| l.id == line.id && l.equipment == line.equipment)
        {
            Some(existing) => {
                *existing = line;
                true
            }
            None => {
                self.lines.push(line);
                false
            }
        }
    }

    /// Load every `*.yaml`/`*.yml` file in `dir`, in file-name order.
    /// A missing directory loads nothing.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, CatalogError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            warn!(dir = %dir.display(), "line directory not found");
            return Ok(0);
        }
        let io = |e: std::io::Error| CatalogError::Io {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| matches!(p.extension().and_then(|x| x.to_str()), Some("yaml" | "yml")))
            .collect();
        paths.sort();

        for path in &paths {
            let text = fs::read_to_string(path).map_err(|e| CatalogError::Io {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let line = parse_line(&path.display().to_string(), &text)?;
            let id = line.id.clone();
            if self.insert(line) {
                info!(line = %id, path = %path.display(), "line overridden");
            } else {
                info!(line = %id, path = %path.display(), "line added");
            }
        }
        Ok(paths.len())
    }

    pub fn lines(&self) -> &[LineConfig] {
        &self.lines
    }

    pub fn get(&self, id: &str, equipment: Equipment) -> Option<&LineConfig> {
        self.lines
            .iter()
            .find(|l| l.id.as_str() == id && l.equipment == equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
id: custom
name: Custom Weapons
units:
  - { id: pld, name: PLD }
steps:
  - { id: step1, name: One }
materials:
  - id: ore
    name: Ore
    category: One
    requirement: { kind: per_unit, quantity: 2, steps: [step1] }
"#;

    #[test]
    fn minimal_line_uses_defaults() {
        let line = parse_line("minimal", MINIMAL).unwrap();
        assert_eq!(line.equipment, Equipment::Weapon);
        assert_eq!(line.policy, relic_core::StepPolicy::Independent);
        assert_eq!(line.storage_keys().progress_key, "customWeaponProgress");
    }

    #[test]
    fn parse_errors_name_the_source() {
        let err = parse_line("broken.yaml", "id: [").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
        let bad = MINIMAL.replace("steps: [step1]", "steps: [step7]");
        assert!(matches!(
            parse_line("bad.yaml", &bad),
            Err(CatalogError::Invalid { error: ValidationError::UnknownStep { .. }, .. })
        ));
    }

    #[test]
    fn insert_replaces_same_line() {
        let mut catalog = Catalog::default();
        let line = parse_line("a", MINIMAL).unwrap();
        assert!(!catalog.insert(line.clone()));
        let mut renamed = line;
        renamed.name = "Renamed".to_string();
        assert!(catalog.insert(renamed));
        assert_eq!(catalog.lines().len(), 1);
        assert_eq!(catalog.get("custom", Equipment::Weapon).unwrap().name, "Renamed");
        assert!(catalog.get("custom", Equipment::Armor).is_none());
    }

    #[test]
    fn missing_dir_loads_nothing() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.load_dir("/definitely/not/here").unwrap(), 0);
    }
}
