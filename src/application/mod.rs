use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::creator::Creator;
use crate::error::Error;
use crate::listing::{Facets, Platform};
use crate::transition::Status;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type ApplicationId = TypedId<Application>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub campaign_id: CampaignId,
    /// Owner of the campaign at apply time; decides on the application even
    /// after the campaign is deleted.
    pub business_id: UserId,
    pub applicant_id: UserId,
    pub applicant_name: String,
    pub proposed_rate: Option<String>,
    pub pitch: String,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Application {
    fn tag() -> &'static str {
        "APP"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Review,
    Shortlisted,
    Accepted,
    Rejected,
}

impl Status for ApplicationStatus {
    fn allowed(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;

        match self {
            Pending | Review => &[Shortlisted, Rejected, Accepted],
            Shortlisted => &[Rejected, Accepted],
            Accepted | Rejected => &[],
        }
    }
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Review => "under review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// What an influencer submits when applying.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApplicationDraft {
    pub applicant_name: String,
    #[serde(default)]
    pub proposed_rate: Option<String>,
    pub pitch: String,
}

impl ApplicationDraft {
    pub fn validate(&self) -> Result<(), Error> {
        if self.applicant_name.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "applicant_name",
                reason: "must not be blank",
            });
        }
        if self.pitch.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "pitch",
                reason: "must not be blank",
            });
        }

        Ok(())
    }
}

/// An application joined with the applicant's creator profile, which is
/// what business-side applicant listings filter and sort on.
#[derive(Copy, Clone, Debug)]
pub struct Applicant<'a> {
    pub application: &'a Application,
    pub creator: Option<&'a Creator>,
}

impl Facets for Applicant<'_> {
    fn timestamp(&self) -> DateTime<Utc> {
        self.application.applied_date
    }

    fn has_platform(&self, platform: Platform) -> bool {
        self.creator.map_or(false, |c| c.has_platform(platform))
    }

    fn has_category(&self, category: &str) -> bool {
        self.creator.map_or(false, |c| c.has_category(category))
    }

    fn followers(&self) -> Option<u64> {
        self.creator.and_then(|c| c.followers())
    }

    fn engagement_rate(&self) -> Option<f64> {
        self.creator.and_then(|c| c.engagement_rate())
    }
}
