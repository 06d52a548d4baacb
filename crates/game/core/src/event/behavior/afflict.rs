use behavior_tree::{Behavior, Status};
use tracing::{debug, warn};

use crate::event::context::keys;
use crate::event::step::StepContext;

/// Registry entry applied by [`Afflict`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Affliction {
    Symptom(String),
    Ailment(String),
}

impl Affliction {
    pub fn name(&self) -> &str {
        match self {
            Affliction::Symptom(name) | Affliction::Ailment(name) => name,
        }
    }
}

/// Applies a named symptom or ailment from the registry to the unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Afflict {
    pub affliction: Affliction,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocking: bool,
}

impl Afflict {
    pub fn symptom(name: impl Into<String>) -> Self {
        Self {
            affliction: Affliction::Symptom(name.into()),
            blocking: false,
        }
    }

    pub fn ailment(name: impl Into<String>) -> Self {
        Self {
            affliction: Affliction::Ailment(name.into()),
            blocking: false,
        }
    }
}

impl Behavior<StepContext<'_>> for Afflict {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let applied = match &self.affliction {
            Affliction::Symptom(name) => match ctx.registry.symptom(name) {
                Some(symptom) => ctx.unit.apply_symptom(symptom).is_some(),
                None => {
                    warn!(unit = %ctx.unit.id, symptom = %name, "unknown symptom");
                    return Status::Failure;
                }
            },
            Affliction::Ailment(name) => match ctx.registry.ailment(name) {
                Some(ailment) => ctx.unit.add_status_effect(ailment),
                None => {
                    warn!(unit = %ctx.unit.id, ailment = %name, "unknown ailment");
                    return Status::Failure;
                }
            },
        };

        debug!(unit = %ctx.unit.id, affliction = self.affliction.name(), applied, "affliction applied");
        if applied {
            ctx.publish(keys::AFFLICTION, self.affliction.name());
            ctx.update_health_display();
        }
        Status::from_bool(applied)
    }

    fn is_blocking(&self) -> bool {
        self.blocking
    }
}
