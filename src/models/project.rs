//! Project and partner records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{PartnerId, ProjectId};

/// An organization owning one or more event projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
}

/// One event project: the unit statistics and reports are attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub name: String,
    /// Owning partner, when the project declares one. Drives the partner
    /// level of template resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<PartnerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<DateTime<Utc>>,
}
