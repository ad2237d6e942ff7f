use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{AdherentStatus, Entrant, EntrantRole, MemberStatus};
use super::fitness::FitnessStatus;

/// Specific reasons the gate operator must act on; never collapsed into a generic denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum EntryDenial {
    TitularInactive { status: MemberStatus },
    AdherentInactive,
}

impl EntryDenial {
    pub fn summary(&self) -> String {
        match self {
            EntryDenial::TitularInactive {
                status: MemberStatus::PendingValidation,
            } => "titular inactive (pending validation)".to_string(),
            EntryDenial::TitularInactive { .. } => "titular inactive".to_string(),
            EntryDenial::AdherentInactive => "adherent inactive".to_string(),
        }
    }
}

impl fmt::Display for EntryDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDecision {
    pub dni: String,
    pub role: EntrantRole,
    pub permitted: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<EntryDenial>,
    pub fitness: FitnessStatus,
}

/// Decide whether `entrant` may enter. Fitness is advisory and never blocks entry; the titular's
/// status is checked first so it dominates the message when both conditions fail.
pub fn resolve_entry(entrant: &Entrant<'_>, fitness: FitnessStatus) -> EntryDecision {
    let titular = entrant.titular();

    let denial = if titular.status != MemberStatus::Active {
        Some(EntryDenial::TitularInactive {
            status: titular.status,
        })
    } else {
        match entrant {
            Entrant::Adherent { adherent, .. }
                if adherent.adherent_status != AdherentStatus::Active =>
            {
                Some(EntryDenial::AdherentInactive)
            }
            _ => None,
        }
    };

    let reason = match &denial {
        Some(denial) => denial.summary(),
        None => format!("entry permitted; {}", fitness.message),
    };

    EntryDecision {
        dni: entrant.dni().to_string(),
        role: entrant.role(),
        permitted: denial.is_none(),
        reason,
        denial,
        fitness,
    }
}
