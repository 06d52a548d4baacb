use super::OracleError;
use crate::state::{UnitId, UnitRecord};
use crate::stats::Attributes;

/// Builds enemy units for encounter events.
pub trait EnemyFactory: Send + Sync {
    /// Instantiates the named enemy, optionally at a different level.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::EnemyTemplateNotFound` for unknown names.
    fn create_enemy(&self, template: &str, level: Option<u32>) -> Result<UnitRecord, OracleError>;
}

/// Static description of an enemy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "default_level"))]
    pub level: u32,
    pub max_health: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Attributes,
    /// Memoria the enemy carries; paid out on defeat.
    #[cfg_attr(feature = "serde", serde(default))]
    pub memoria: i32,
    /// Extra memoria paid out on defeat.
    #[cfg_attr(feature = "serde", serde(default))]
    pub memoria_loot: i32,
}

#[cfg(feature = "serde")]
fn default_level() -> u32 {
    1
}

impl EnemyTemplate {
    pub fn new(name: impl Into<String>, max_health: i32, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            level: 1,
            max_health,
            attributes,
            memoria: 0,
            memoria_loot: 0,
        }
    }

    pub fn instantiate(&self, id: UnitId, level: Option<u32>) -> UnitRecord {
        UnitRecord::new(id, self.name.clone(), self.attributes, self.max_health)
            .with_level(level.unwrap_or(self.level))
            .with_memoria(self.memoria, self.memoria)
            .with_loot(self.memoria_loot)
    }
}
