use chrono::Utc;

use crate::error::Error;
use crate::listing::{self, Filter, SortOrder};
use crate::marketplace::Marketplace;
use crate::notify::Severity;
use crate::transition::Transition;
use crate::user::{Identity, Role};

use super::{Campaign, CampaignDetails, CampaignId, CampaignStatus};

#[tracing::instrument(skip(market))]
pub async fn create_campaign(
    market: &mut Marketplace,
    identity: &Identity,
    details: CampaignDetails,
    publish: bool,
) -> Result<Campaign, Error> {
    identity.require(Role::Business, "create campaign")?;
    details.validate()?;

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        owner_id: identity.actor_id,
        title: details.title.trim().to_owned(),
        business_name: details.business_name.trim().to_owned(),
        status: if publish {
            CampaignStatus::Live
        } else {
            CampaignStatus::Draft
        },
        budget: details.budget,
        deliverables: details.deliverables,
        platforms: details.platforms,
        categories: details.categories,
        payment_terms: details.payment_terms,
        usage_rights: details.usage_rights,
        application_deadline: details.application_deadline,
        posted_date: now,
        modified_at: now,
    };

    market.campaigns.insert(campaign.id, campaign.clone());
    market.persist_campaigns().await;
    market.notify(
        &format!("Campaign \"{}\" created", campaign.title),
        Severity::Success,
    );

    Ok(campaign)
}

/// Owners see their own campaigns in every status; everyone else only sees
/// live ones.
#[tracing::instrument(skip(market))]
pub fn get_campaigns(
    market: &Marketplace,
    viewer: Option<&Identity>,
    status: Option<CampaignStatus>,
    filters: &[Filter],
    sort: Option<SortOrder>,
) -> Vec<Campaign> {
    let campaigns = market
        .campaigns()
        .into_iter()
        .filter(|campaign| {
            campaign.status == CampaignStatus::Live
                || viewer.map_or(false, |viewer| viewer.actor_id == campaign.owner_id)
        })
        .filter(|campaign| status.map_or(true, |status| campaign.status == status));

    listing::apply(campaigns, filters, sort)
        .into_iter()
        .cloned()
        .collect()
}

#[tracing::instrument(skip(market))]
pub fn get_campaign_by_id(market: &Marketplace, campaign_id: CampaignId) -> Option<Campaign> {
    market.campaign(campaign_id).cloned()
}

fn expect_owned_campaign(
    market: &Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = market
        .campaign(campaign_id)
        .cloned()
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    if campaign.owner_id != identity.actor_id {
        return Err(Error::NotParticipant {
            actor_id: identity.actor_id,
        });
    }

    Ok(campaign)
}

/// Replaces the editable details. Refused once anyone has applied.
#[tracing::instrument(skip(market))]
pub async fn update_campaign_details(
    market: &mut Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
    details: CampaignDetails,
) -> Result<Campaign, Error> {
    identity.require(Role::Business, "edit campaign")?;
    let mut campaign = expect_owned_campaign(market, identity, campaign_id)?;
    details.validate()?;

    let application_count = market
        .applications
        .values()
        .filter(|application| application.campaign_id == campaign_id)
        .count();
    if application_count > 0 {
        return Err(Error::CampaignLocked {
            campaign_id,
            application_count,
        });
    }

    campaign.title = details.title.trim().to_owned();
    campaign.business_name = details.business_name.trim().to_owned();
    campaign.budget = details.budget;
    campaign.deliverables = details.deliverables;
    campaign.platforms = details.platforms;
    campaign.categories = details.categories;
    campaign.payment_terms = details.payment_terms;
    campaign.usage_rights = details.usage_rights;
    campaign.application_deadline = details.application_deadline;
    campaign.modified_at = Utc::now();

    market.campaigns.insert(campaign.id, campaign.clone());
    market.persist_campaigns().await;
    market.notify("Campaign updated", Severity::Success);

    Ok(campaign)
}

#[tracing::instrument(skip(market))]
pub async fn change_campaign_status(
    market: &mut Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
    status: CampaignStatus,
) -> Result<Transition<CampaignStatus>, Error> {
    identity.require(Role::Business, "change campaign status")?;
    let mut campaign = expect_owned_campaign(market, identity, campaign_id)?;

    let transition = Transition::validate(campaign.status, status).ok_or(
        Error::CampaignTransitionNotAllowed {
            campaign_id,
            from: campaign.status,
            to: status,
        },
    )?;

    if transition.changed {
        campaign.status = transition.to;
        campaign.modified_at = Utc::now();
        market.campaigns.insert(campaign.id, campaign);
        market.persist_campaigns().await;
        market.notify(
            &format!("Campaign is now {}", transition.to),
            Severity::Success,
        );
    }

    Ok(transition)
}

/// Removes the campaign record only. Applications, invites and deals that
/// point at it are kept and render with placeholder campaign fields.
#[tracing::instrument(skip(market))]
pub async fn delete_campaign(
    market: &mut Marketplace,
    identity: &Identity,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    identity.require(Role::Business, "delete campaign")?;
    expect_owned_campaign(market, identity, campaign_id)?;

    let campaign = market
        .campaigns
        .remove(&campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    market.persist_campaigns().await;
    market.notify("Campaign deleted", Severity::Info);

    Ok(campaign)
}
