use chrono::Utc;
use serde::Serialize;

use crate::campaign::CampaignId;
use crate::creator::Creator;
use crate::deal::{self, Deal};
use crate::error::Error;
use crate::listing::{self, Filter, SortOrder};
use crate::marketplace::Marketplace;
use crate::notify::Severity;
use crate::transition::Transition;
use crate::user::{Identity, Role};
use crate::views;

use super::{Applicant, Application, ApplicationDraft, ApplicationId, ApplicationStatus};

/// The outcome of a business decision on an application. `deal` is set
/// whenever the application ends up accepted.
#[derive(Clone, Debug, Serialize)]
pub struct Review {
    pub application: Application,
    pub transition: Transition<ApplicationStatus>,
    pub deal: Option<Deal>,
}

#[tracing::instrument(skip(market))]
pub async fn apply_to_campaign(
    market: &mut Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
    draft: ApplicationDraft,
) -> Result<Application, Error> {
    identity.require(Role::Influencer, "apply to campaign")?;
    draft.validate()?;

    let campaign = market
        .campaign(campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;
    campaign.is_accepting_applications(Utc::now().date_naive())?;
    let business_id = campaign.owner_id;

    if views::applied_set(market, identity.actor_id).contains(&campaign_id) {
        let existing = market.applications.values().find(|application| {
            application.campaign_id == campaign_id && application.applicant_id == identity.actor_id
        });
        if let Some(existing) = existing {
            return Err(Error::AlreadyApplied {
                campaign_id,
                application_id: existing.id,
            });
        }
    }

    let now = Utc::now();
    let application = Application {
        id: ApplicationId::new(),
        campaign_id,
        business_id,
        applicant_id: identity.actor_id,
        applicant_name: draft.applicant_name.trim().to_owned(),
        proposed_rate: draft
            .proposed_rate
            .map(|rate| rate.trim().to_owned())
            .filter(|rate| !rate.is_empty()),
        pitch: draft.pitch.trim().to_owned(),
        status: ApplicationStatus::Pending,
        applied_date: now,
        modified_at: now,
    };

    market.applications.insert(application.id, application.clone());
    market.persist_applications().await;
    market.notify("Application submitted", Severity::Success);

    Ok(application)
}

#[tracing::instrument(skip(market))]
pub fn get_my_applications(
    market: &Marketplace,
    identity: &Identity,
) -> Result<Vec<Application>, Error> {
    identity.require(Role::Influencer, "list own applications")?;

    let applications = market
        .applications()
        .into_iter()
        .filter(|application| application.applicant_id == identity.actor_id)
        .cloned()
        .collect();

    Ok(applications)
}

/// Applications to one of the actor's campaigns, joined with each
/// applicant's creator profile so creator facets can be filtered on.
#[tracing::instrument(skip(market))]
pub fn get_applicants(
    market: &Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
    filters: &[Filter],
    sort: Option<SortOrder>,
) -> Result<Vec<(Application, Option<Creator>)>, Error> {
    identity.require(Role::Business, "list applicants")?;

    let campaign = market
        .campaign(campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;
    if campaign.owner_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    let applicants: Vec<Applicant> = market
        .applications()
        .into_iter()
        .filter(|application| application.campaign_id == campaign_id)
        .map(|application| Applicant {
            application,
            creator: market.creator(application.applicant_id),
        })
        .collect();

    let applicants = listing::apply(&applicants, filters, sort)
        .into_iter()
        .map(|applicant| (applicant.application.clone(), applicant.creator.cloned()))
        .collect();

    Ok(applicants)
}

/// Shortlists, rejects or accepts. Accepting creates the deal the first
/// time only; later accepts hand back the same deal.
#[tracing::instrument(skip(market))]
pub async fn review_application(
    market: &mut Marketplace,
    identity: &Identity,
    application_id: ApplicationId,
    status: ApplicationStatus,
) -> Result<Review, Error> {
    identity.require(Role::Business, "review application")?;

    let mut application = market
        .application(application_id)
        .cloned()
        .ok_or(Error::ApplicationNotFound { application_id })?;

    let campaign = market.campaign(application.campaign_id).cloned();
    let owner_id = campaign
        .as_ref()
        .map_or(application.business_id, |campaign| campaign.owner_id);
    if owner_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    let transition = Transition::validate(application.status, status).ok_or(
        Error::ApplicationTransitionNotAllowed {
            application_id,
            from: application.status,
            to: status,
        },
    )?;

    let now = Utc::now();
    if transition.changed {
        application.status = transition.to;
        application.modified_at = now;
        market.applications.insert(application.id, application.clone());
        market.persist_applications().await;
    }

    let mut deal = None;
    if application.status == ApplicationStatus::Accepted {
        match market.deal_for_application(application_id) {
            Some(existing) => deal = Some(existing.clone()),
            None => {
                let created =
                    deal::materialize(&application, campaign.as_ref(), owner_id, now);
                market.deals.insert(created.id, created.clone());
                market.persist_deals().await;
                deal = Some(created);
            }
        }
    }

    if transition.changed {
        let message = match transition.to {
            ApplicationStatus::Accepted => "Application accepted, deal created".to_owned(),
            status => format!("Application {}", status),
        };
        market.notify(&message, Severity::Success);
    }

    Ok(Review {
        application,
        transition,
        deal,
    })
}

/// Deletes the actor's own application from any status. The campaign
/// leaves the applied set, so applying again is possible.
#[tracing::instrument(skip(market))]
pub async fn withdraw_application(
    market: &mut Marketplace,
    identity: &Identity,
    application_id: ApplicationId,
) -> Result<Application, Error> {
    identity.require(Role::Influencer, "withdraw application")?;

    let application = market
        .application(application_id)
        .ok_or(Error::ApplicationNotFound { application_id })?;
    if application.applicant_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    let application = market
        .applications
        .remove(&application_id)
        .ok_or(Error::ApplicationNotFound { application_id })?;

    market.persist_applications().await;
    market.notify("Application withdrawn", Severity::Info);

    Ok(application)
}
