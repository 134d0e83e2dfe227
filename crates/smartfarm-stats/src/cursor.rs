//! [`CurrentStateCursor`] — the open interval the stats accumulator is
//! tracking, plus the cumulative sub-step counter colocated under the same
//! key (matching the source, which stores `node_count` alongside `state`/
//! `started_at` under `robot:current_state:{map}:{robot}`).

use chrono::{DateTime, Local};
use smartfarm_core::RobotOperationState;

use crate::error::StatsError;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStateCursor {
    pub state: RobotOperationState,
    pub started_at: DateTime<Local>,
    pub node_count: u32,
}

impl CurrentStateCursor {
    pub(crate) fn to_fields(&self) -> [(&'static str, String); 3] {
        [
            ("state", self.state.as_str().to_string()),
            ("started_at", self.started_at.to_rfc3339()),
            ("node_count", self.node_count.to_string()),
        ]
    }

    pub(crate) fn from_fields(
        fields: &std::collections::HashMap<String, String>,
    ) -> Result<Option<Self>, StatsError> {
        let (Some(state_raw), Some(started_raw)) = (fields.get("state"), fields.get("started_at")) else {
            return Ok(None);
        };
        let state = RobotOperationState::parse(state_raw)?;
        let started_at = DateTime::parse_from_rfc3339(started_raw)
            .map_err(|e| {
                StatsError::Smartfarm(smartfarm_core::SmartfarmError::MalformedPayload(format!(
                    "bad started_at timestamp: {e}"
                )))
            })?
            .with_timezone(&Local);
        let node_count = fields
            .get("node_count")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Ok(Some(Self { state, started_at, node_count }))
    }
}
