//! Stage catalog -- the ordered registry of pipeline stages.
//!
//! Stages are pure data: an identifier, a display name, and zero or more
//! requirement flags. All behavior attached to the flags lives in the
//! transition engine; the catalog only answers lookups.

use serde::{Deserialize, Serialize};

/// Requirement flags attached to a stage.
///
/// The reference catalog never sets both flags on one stage, but consumers
/// must not rely on that: when both are set, the call requirement is
/// ordered before the conversion requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRequirements {
    /// Entering this stage requires scheduling a call.
    #[serde(default)]
    pub call: bool,
    /// Entering this stage requires converting the lead into a client.
    #[serde(default)]
    pub conversion: bool,
}

impl StageRequirements {
    /// Returns `true` if no auxiliary workflow is required.
    pub fn is_plain(&self) -> bool {
        !self.call && !self.conversion
    }
}

/// A single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stable snake_case identifier (e.g., `mensaje_conexion`).
    pub id: String,

    /// Human-readable board column title.
    pub name: String,

    #[serde(flatten)]
    pub requirements: StageRequirements,
}

impl Stage {
    /// Creates a plain stage with no requirement flags.
    pub fn plain(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            requirements: StageRequirements::default(),
        }
    }

    /// Creates a stage that requires a call on entry.
    pub fn with_call(id: &str, name: &str) -> Self {
        Self {
            requirements: StageRequirements {
                call: true,
                conversion: false,
            },
            ..Self::plain(id, name)
        }
    }

    /// Creates a stage that requires conversion on entry.
    pub fn with_conversion(id: &str, name: &str) -> Self {
        Self {
            requirements: StageRequirements {
                call: false,
                conversion: true,
            },
            ..Self::plain(id, name)
        }
    }
}

/// Ordered, static registry of pipeline stages.
///
/// Board columns render in catalog order. Lookups are linear; catalogs are
/// a handful of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

impl StageCatalog {
    /// Builds a catalog from an ordered list of stages.
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// The stages in board order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Looks up a stage by identifier.
    pub fn get(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Returns `true` if the identifier names a known stage.
    pub fn contains(&self, stage_id: &str) -> bool {
        self.get(stage_id).is_some()
    }

    /// Returns the requirement flags for a stage, or `None` if unknown.
    pub fn requirements(&self, stage_id: &str) -> Option<StageRequirements> {
        self.get(stage_id).map(|s| s.requirements)
    }

    /// Board position of a stage (0 = first column).
    pub fn position(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    /// The identifier of the first stage, where new leads land.
    ///
    /// Empty catalogs are rejected at the config layer, so this is only
    /// `None` for a hand-built empty catalog.
    pub fn entry_stage(&self) -> Option<&str> {
        self.stages.first().map(|s| s.id.as_str())
    }

    /// Identifiers of stages carrying a conversion requirement.
    pub fn conversion_stage_ids(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.requirements.conversion)
            .map(|s| s.id.as_str())
            .collect()
    }
}

impl Default for StageCatalog {
    /// The reference pipeline configuration.
    fn default() -> Self {
        Self::new(vec![
            Stage::plain("nuevo", "Nuevo"),
            Stage::plain("mensaje_conexion", "Mensaje de conexión"),
            Stage::plain("respuesta_recibida", "Respuesta recibida"),
            Stage::with_call("llamada_agendada", "Llamada agendada"),
            Stage::plain("propuesta_enviada", "Propuesta enviada"),
            Stage::with_conversion("cliente_cerrado", "Cliente cerrado"),
            Stage::plain("descartado", "Descartado"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_catalog_order() {
        let catalog = StageCatalog::default();
        assert_eq!(catalog.entry_stage(), Some("nuevo"));
        assert_eq!(catalog.position("llamada_agendada"), Some(3));
        assert_eq!(catalog.stages().len(), 7);
    }

    #[test]
    fn requirements_lookup() {
        let catalog = StageCatalog::default();
        assert!(catalog.requirements("nuevo").unwrap().is_plain());
        assert!(catalog.requirements("llamada_agendada").unwrap().call);
        assert!(catalog.requirements("cliente_cerrado").unwrap().conversion);
        assert_eq!(catalog.requirements("no_such_stage"), None);
    }

    #[test]
    fn conversion_stages() {
        let catalog = StageCatalog::default();
        assert_eq!(catalog.conversion_stage_ids(), vec!["cliente_cerrado"]);
    }

    #[test]
    fn both_flags_survive_roundtrip() {
        // Not in the reference catalog, but must not be lost in (de)serialization.
        let stage = Stage {
            id: "cierre_directo".into(),
            name: "Cierre directo".into(),
            requirements: StageRequirements {
                call: true,
                conversion: true,
            },
        };
        let yaml_like = serde_json::to_string(&stage).unwrap();
        let back: Stage = serde_json::from_str(&yaml_like).unwrap();
        assert_eq!(back.requirements.call, true);
        assert_eq!(back.requirements.conversion, true);
    }
}
