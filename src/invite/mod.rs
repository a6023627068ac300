use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::error::Error;
use crate::transition::Status;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type InviteId = TypedId<Invite>;

/// Direct outreach from a business to one influencer. Unrelated to any
/// application the influencer may also have made.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Invite {
    pub id: InviteId,
    pub campaign_id: CampaignId,
    pub business_id: UserId,
    pub influencer_id: UserId,
    pub message: String,
    pub offer_rate: Option<String>,
    pub status: InviteStatus,
    pub sent_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Invite {
    fn tag() -> &'static str {
        "INV"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl Status for InviteStatus {
    fn allowed(self) -> &'static [InviteStatus] {
        match self {
            InviteStatus::Pending => &[InviteStatus::Accepted, InviteStatus::Declined],
            InviteStatus::Accepted | InviteStatus::Declined => &[],
        }
    }
}

impl Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InviteDraft {
    pub influencer_id: UserId,
    pub message: String,
    #[serde(default)]
    pub offer_rate: Option<String>,
}

impl InviteDraft {
    pub fn validate(&self) -> Result<(), Error> {
        if self.message.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "message",
                reason: "must not be blank",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::Transition;

    #[test]
    fn responses_are_final() {
        assert!(Transition::validate(InviteStatus::Pending, InviteStatus::Declined).is_some());
        assert!(Transition::validate(InviteStatus::Declined, InviteStatus::Accepted).is_none());
        assert!(Transition::validate(InviteStatus::Accepted, InviteStatus::Pending).is_none());
        assert!(InviteStatus::Accepted.is_terminal());
    }
}
