use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{Application, ApplicationId};
use crate::campaign::{
    Budget, Campaign, CampaignId, PLACEHOLDER_BUSINESS_NAME, PLACEHOLDER_TITLE,
};
use crate::transition::Status;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::{Identity, Role, UserId};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

/// Compensation shown when neither the application nor the campaign names
/// an amount.
pub const UNDECIDED_COMPENSATION: &str = "TBD";

pub type DealId = TypedId<Deal>;

/// The workroom for an accepted application. Everything copied from the
/// campaign is a snapshot taken at acceptance.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Deal {
    pub id: DealId,
    pub application_id: ApplicationId,
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub business_id: UserId,
    pub business_name: String,
    pub influencer_id: UserId,
    pub influencer_name: String,
    pub compensation: String,
    pub budget: Option<Budget>,
    pub payment_terms: Option<String>,
    pub usage_rights: Option<String>,
    #[serde(default)]
    pub deliverables: Vec<DealDeliverable>,
    pub status: DealStatus,
    pub escrow_status: EscrowStatus,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub revision_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Deal {
    fn tag() -> &'static str {
        "DEL"
    }
}

impl Deal {
    pub fn is_participant(&self, identity: &Identity) -> bool {
        match identity.role {
            Role::Business => self.business_id == identity.actor_id,
            Role::Influencer => self.influencer_id == identity.actor_id,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct DealDeliverable {
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: u32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Pending,
    #[serde(alias = "funded")]
    InProgress,
    Submitted,
    RevisionRequested,
    Approved,
    Completed,
}

impl Status for DealStatus {
    fn allowed(self) -> &'static [DealStatus] {
        use DealStatus::*;

        match self {
            Pending => &[InProgress],
            InProgress | RevisionRequested => &[Submitted],
            Submitted => &[Approved, RevisionRequested],
            Approved => &[Completed],
            Completed => &[],
        }
    }
}

impl Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DealStatus::Pending => "pending",
            DealStatus::InProgress => "in progress",
            DealStatus::Submitted => "submitted",
            DealStatus::RevisionRequested => "revision requested",
            DealStatus::Approved => "approved",
            DealStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    Funded,
}

/// The named moves a participant can make on a deal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealAction {
    FundEscrow,
    Submit,
    Approve,
    RequestRevision,
    CompleteAndPay,
}

impl DealAction {
    pub fn target(self) -> DealStatus {
        match self {
            DealAction::FundEscrow => DealStatus::InProgress,
            DealAction::Submit => DealStatus::Submitted,
            DealAction::Approve => DealStatus::Approved,
            DealAction::RequestRevision => DealStatus::RevisionRequested,
            DealAction::CompleteAndPay => DealStatus::Completed,
        }
    }

    pub fn role(self) -> Role {
        match self {
            DealAction::Submit => Role::Influencer,
            _ => Role::Business,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DealAction::FundEscrow => "fund escrow",
            DealAction::Submit => "submit deliverables",
            DealAction::Approve => "approve deliverables",
            DealAction::RequestRevision => "request revision",
            DealAction::CompleteAndPay => "complete and pay",
        }
    }
}

/// Builds the deal for an accepted application. A missing campaign yields
/// placeholder names and an empty checklist rather than an error.
pub fn materialize(
    application: &Application,
    campaign: Option<&Campaign>,
    business_id: UserId,
    now: DateTime<Utc>,
) -> Deal {
    let proposed_rate = application
        .proposed_rate
        .as_deref()
        .map(str::trim)
        .filter(|rate| !rate.is_empty())
        .map(str::to_owned);

    let compensation = proposed_rate
        .or_else(|| campaign.and_then(|c| c.budget.formatted_min()))
        .unwrap_or_else(|| UNDECIDED_COMPENSATION.to_owned());

    let deliverables = campaign
        .map(|c| {
            c.deliverables
                .iter()
                .map(|d| DealDeliverable {
                    kind: d.kind.clone(),
                    quantity: d.quantity,
                    completed: false,
                })
                .collect()
        })
        .unwrap_or_default();

    Deal {
        id: DealId::new(),
        application_id: application.id,
        campaign_id: application.campaign_id,
        campaign_title: campaign.map_or(PLACEHOLDER_TITLE.to_owned(), |c| c.title.clone()),
        business_id,
        business_name: campaign.map_or(PLACEHOLDER_BUSINESS_NAME.to_owned(), |c| {
            c.business_name.clone()
        }),
        influencer_id: application.applicant_id,
        influencer_name: application.applicant_name.clone(),
        compensation,
        budget: campaign.map(|c| c.budget.clone()),
        payment_terms: campaign.and_then(|c| c.payment_terms.clone()),
        usage_rights: campaign.and_then(|c| c.usage_rights.clone()),
        deliverables,
        status: DealStatus::Pending,
        escrow_status: EscrowStatus::Pending,
        files: vec![],
        revision_notes: vec![],
        created_at: now,
        modified_at: now,
    }
}
