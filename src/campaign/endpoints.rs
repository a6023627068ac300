use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{manager, Budget, Campaign, CampaignDetails, CampaignId, CampaignStatus, Deliverable};
use crate::error::Error;
use crate::listing::{ListingQuery, Platform};
use crate::marketplace::Marketplace;
use crate::transition::Transition;
use crate::user::{Identity, UserId};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCampaignBody {
    #[serde(flatten)]
    pub details: CampaignDetails,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChangeCampaignStatusBody {
    pub status: CampaignStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CampaignStatusQuery {
    pub status: Option<CampaignStatus>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub owner_id: UserId,
    pub title: String,
    pub business_name: String,
    pub status: CampaignStatus,
    pub budget: Budget,
    pub deliverables: Vec<Deliverable>,
    pub platforms: Vec<Platform>,
    pub categories: Vec<String>,
    pub payment_terms: Option<String>,
    pub usage_rights: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub application_count: usize,
    pub posted_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(market: &Marketplace, campaign: Campaign) -> CampaignBody {
        let application_count = market
            .applications
            .values()
            .filter(|application| application.campaign_id == campaign.id)
            .count();

        CampaignBody {
            id: campaign.id,
            owner_id: campaign.owner_id,
            title: campaign.title,
            business_name: campaign.business_name,
            status: campaign.status,
            budget: campaign.budget,
            deliverables: campaign.deliverables,
            platforms: campaign.platforms,
            categories: campaign.categories,
            payment_terms: campaign.payment_terms,
            usage_rights: campaign.usage_rights,
            application_deadline: campaign.application_deadline,
            application_count,
            posted_date: campaign.posted_date,
            modified_at: campaign.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignStatusBody {
    pub campaign: CampaignBody,
    pub transition: Transition<CampaignStatus>,
}

#[post("/campaigns")]
#[tracing::instrument(skip(market))]
pub async fn create_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();
    let mut market = market.lock().await;

    let campaign =
        manager::create_campaign(&mut market, &identity, body.details, body.publish).await?;

    Ok(Json(CampaignBody::render(&market, campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(market))]
pub async fn get_campaigns(
    market: Data<Mutex<Marketplace>>,
    identity: Option<Identity>,
    status: Query<CampaignStatusQuery>,
    query: Query<ListingQuery>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let filters = query.filters()?;
    let sort = query.sort()?;
    let market = market.lock().await;

    let body = manager::get_campaigns(&market, identity.as_ref(), status.status, &filters, sort)
        .into_iter()
        .map(|campaign| CampaignBody::render(&market, campaign))
        .collect();

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(market))]
pub async fn get_campaign_by_id(
    market: Data<Mutex<Marketplace>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let market = market.lock().await;

    let campaign = manager::get_campaign_by_id(&market, campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(Json(CampaignBody::render(&market, campaign)))
}

#[post("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(market))]
pub async fn update_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<CampaignDetails>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let mut market = market.lock().await;

    let campaign =
        manager::update_campaign_details(&mut market, &identity, campaign_id, body.into_inner())
            .await?;

    Ok(Json(CampaignBody::render(&market, campaign)))
}

#[post("/campaigns/{campaign_id}/status")]
#[tracing::instrument(skip(market))]
pub async fn change_campaign_status(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<ChangeCampaignStatusBody>,
) -> Result<Json<CampaignStatusBody>, Error> {
    let campaign_id = params.into_inner();
    let mut market = market.lock().await;

    let transition =
        manager::change_campaign_status(&mut market, &identity, campaign_id, body.status).await?;
    let campaign = manager::get_campaign_by_id(&market, campaign_id)
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(Json(CampaignStatusBody {
        campaign: CampaignBody::render(&market, campaign),
        transition,
    }))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(market))]
pub async fn delete_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let mut market = market.lock().await;

    let campaign = manager::delete_campaign(&mut market, &identity, campaign_id).await?;

    Ok(Json(CampaignBody::render(&market, campaign)))
}
