use std::fmt::{self, Display};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::listing::{Facets, Platform};
use crate::transition::Status;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub const DEFAULT_CURRENCY: &str = "SGD";

/// Stand-ins used wherever a campaign is referenced but no longer exists.
pub const PLACEHOLDER_BUSINESS_NAME: &str = "Business";
pub const PLACEHOLDER_TITLE: &str = "Campaign";

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub owner_id: UserId,
    pub title: String,
    pub business_name: String,
    pub status: CampaignStatus,
    pub budget: Budget,
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub payment_terms: Option<String>,
    pub usage_rights: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub posted_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

impl Campaign {
    pub fn is_accepting_applications(&self, today: NaiveDate) -> Result<(), Error> {
        if self.status != CampaignStatus::Live {
            return Err(Error::CampaignNotAcceptingApplications {
                campaign_id: self.id,
                status: self.status,
            });
        }

        match self.application_deadline {
            Some(deadline) if deadline < today => Err(Error::ApplicationDeadlinePassed {
                campaign_id: self.id,
                deadline,
            }),
            _ => Ok(()),
        }
    }
}

impl Facets for Campaign {
    fn timestamp(&self) -> DateTime<Utc> {
        self.posted_date
    }

    fn has_platform(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    fn budget(&self) -> Option<f64> {
        self.budget.min.or(self.budget.max).map(f64::from)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Budget {
    pub min: Option<u32>,
    pub max: Option<u32>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

impl Default for Budget {
    fn default() -> Budget {
        Budget {
            min: None,
            max: None,
            currency: default_currency(),
        }
    }
}

impl Budget {
    /// The minimum rendered as `"<currency> <amount>"`, e.g. `"SGD 500"`.
    pub fn formatted_min(&self) -> Option<String> {
        self.min
            .map(|amount| format!("{} {}", self.currency, amount))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Deliverable {
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Live,
    Paused,
    Closed,
}

impl Status for CampaignStatus {
    fn allowed(self) -> &'static [CampaignStatus] {
        match self {
            CampaignStatus::Draft => &[CampaignStatus::Live, CampaignStatus::Closed],
            CampaignStatus::Live => &[CampaignStatus::Paused, CampaignStatus::Closed],
            CampaignStatus::Paused => &[CampaignStatus::Live, CampaignStatus::Closed],
            CampaignStatus::Closed => &[],
        }
    }
}

impl Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Live => "live",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// The editable part of a campaign, as submitted by the campaign wizard.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignDetails {
    pub title: String,
    pub business_name: String,
    #[serde(default)]
    pub budget: Budget,
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub usage_rights: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
}

impl CampaignDetails {
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "title",
                reason: "must not be blank",
            });
        }
        if self.business_name.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "business_name",
                reason: "must not be blank",
            });
        }
        if self.deliverables.is_empty() {
            return Err(Error::ValidationFailed {
                field: "deliverables",
                reason: "at least one deliverable is required",
            });
        }
        if self
            .deliverables
            .iter()
            .any(|d| d.kind.trim().is_empty() || d.quantity == 0)
        {
            return Err(Error::ValidationFailed {
                field: "deliverables",
                reason: "each deliverable needs a type and a quantity of at least one",
            });
        }
        if let (Some(min), Some(max)) = (self.budget.min, self.budget.max) {
            if min > max {
                return Err(Error::ValidationFailed {
                    field: "budget",
                    reason: "minimum exceeds maximum",
                });
            }
        }

        Ok(())
    }
}
