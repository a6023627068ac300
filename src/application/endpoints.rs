use std::collections::HashSet;

use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::manager::{self, Review};
use super::{Application, ApplicationDraft, ApplicationId, ApplicationStatus};
use crate::campaign::{Campaign, CampaignId, PLACEHOLDER_BUSINESS_NAME, PLACEHOLDER_TITLE};
use crate::creator::CreatorBody;
use crate::deal::DealBody;
use crate::error::Error;
use crate::listing::ListingQuery;
use crate::marketplace::Marketplace;
use crate::transition::Transition;
use crate::user::{Identity, UserId};
use crate::views;

#[derive(Clone, Debug, Deserialize)]
pub struct ReviewApplicationBody {
    pub status: ApplicationStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct ApplicationBody {
    pub id: ApplicationId,
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub business_id: UserId,
    pub business_name: String,
    pub applicant_id: UserId,
    pub applicant_name: String,
    pub proposed_rate: Option<String>,
    pub pitch: String,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ApplicationBody {
    pub fn render(application: Application, campaign: Option<&Campaign>) -> ApplicationBody {
        ApplicationBody {
            id: application.id,
            campaign_id: application.campaign_id,
            campaign_title: campaign.map_or(PLACEHOLDER_TITLE.to_owned(), |c| c.title.clone()),
            business_id: application.business_id,
            business_name: campaign.map_or(PLACEHOLDER_BUSINESS_NAME.to_owned(), |c| {
                c.business_name.clone()
            }),
            applicant_id: application.applicant_id,
            applicant_name: application.applicant_name,
            proposed_rate: application.proposed_rate,
            pitch: application.pitch,
            status: application.status,
            applied_date: application.applied_date,
            modified_at: application.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ApplicantBody {
    pub application: ApplicationBody,
    pub creator: Option<CreatorBody>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReviewBody {
    pub application: ApplicationBody,
    pub transition: Transition<ApplicationStatus>,
    pub deal: Option<DealBody>,
}

#[post("/campaigns/{campaign_id}/applications")]
#[tracing::instrument(skip(market))]
pub async fn apply_to_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<ApplicationDraft>,
) -> Result<Json<ApplicationBody>, Error> {
    let campaign_id = params.into_inner();
    let mut market = market.lock().await;

    let application =
        manager::apply_to_campaign(&mut market, &identity, campaign_id, body.into_inner()).await?;
    let campaign = market.campaign(campaign_id);

    Ok(Json(ApplicationBody::render(application, campaign)))
}

#[get("/campaigns/{campaign_id}/applicants")]
#[tracing::instrument(skip(market))]
pub async fn get_applicants_for_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
    query: Query<ListingQuery>,
) -> Result<Json<Vec<ApplicantBody>>, Error> {
    let campaign_id = params.into_inner();
    let filters = query.filters()?;
    let sort = query.sort()?;
    let market = market.lock().await;

    let campaign = market.campaign(campaign_id);
    let body = manager::get_applicants(&market, &identity, campaign_id, &filters, sort)?
        .into_iter()
        .map(|(application, creator)| ApplicantBody {
            application: ApplicationBody::render(application, campaign),
            creator: creator.map(CreatorBody::render),
        })
        .collect();

    Ok(Json(body))
}

#[get("/applications")]
#[tracing::instrument(skip(market))]
pub async fn get_my_applications(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
) -> Result<Json<Vec<ApplicationBody>>, Error> {
    let market = market.lock().await;

    let body = manager::get_my_applications(&market, &identity)?
        .into_iter()
        .map(|application| {
            let campaign = market.campaign(application.campaign_id);
            ApplicationBody::render(application, campaign)
        })
        .collect();

    Ok(Json(body))
}

#[get("/applications/applied")]
#[tracing::instrument(skip(market))]
pub async fn get_applied_campaigns(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
) -> Result<Json<HashSet<CampaignId>>, Error> {
    let market = market.lock().await;

    Ok(Json(views::applied_set(&market, identity.actor_id)))
}

#[post("/applications/{application_id}/status")]
#[tracing::instrument(skip(market))]
pub async fn review_application(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<ApplicationId>,
    body: Json<ReviewApplicationBody>,
) -> Result<Json<ReviewBody>, Error> {
    let application_id = params.into_inner();
    let mut market = market.lock().await;

    let Review {
        application,
        transition,
        deal,
    } = manager::review_application(&mut market, &identity, application_id, body.status).await?;
    let campaign = market.campaign(application.campaign_id);

    Ok(Json(ReviewBody {
        application: ApplicationBody::render(application, campaign),
        transition,
        deal: deal.map(DealBody::render),
    }))
}

#[delete("/applications/{application_id}")]
#[tracing::instrument(skip(market))]
pub async fn withdraw_application(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<ApplicationId>,
) -> Result<Json<ApplicationBody>, Error> {
    let application_id = params.into_inner();
    let mut market = market.lock().await;

    let application = manager::withdraw_application(&mut market, &identity, application_id).await?;
    let campaign = market.campaign(application.campaign_id);

    Ok(Json(ApplicationBody::render(application, campaign)))
}
