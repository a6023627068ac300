use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::manager::{self, DealUpdate};
use super::{Deal, DealDeliverable, DealId, DealStatus, EscrowStatus};
use crate::application::ApplicationId;
use crate::campaign::{Budget, CampaignId};
use crate::error::Error;
use crate::marketplace::Marketplace;
use crate::transition::Transition;
use crate::user::{Identity, UserId};
use crate::views::{self, DeliverableProgress};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmitDealBody {
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestRevisionBody {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AttachFileBody {
    pub file: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DealBody {
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
    pub deliverables: Vec<DealDeliverable>,
    pub progress: DeliverableProgress,
    pub status: DealStatus,
    pub escrow_status: EscrowStatus,
    pub files: Vec<String>,
    pub revision_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl DealBody {
    pub fn render(deal: Deal) -> DealBody {
        DealBody {
            progress: views::deliverable_progress(&deal),
            id: deal.id,
            application_id: deal.application_id,
            campaign_id: deal.campaign_id,
            campaign_title: deal.campaign_title,
            business_id: deal.business_id,
            business_name: deal.business_name,
            influencer_id: deal.influencer_id,
            influencer_name: deal.influencer_name,
            compensation: deal.compensation,
            budget: deal.budget,
            payment_terms: deal.payment_terms,
            usage_rights: deal.usage_rights,
            deliverables: deal.deliverables,
            status: deal.status,
            escrow_status: deal.escrow_status,
            files: deal.files,
            revision_notes: deal.revision_notes,
            created_at: deal.created_at,
            modified_at: deal.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DealUpdateBody {
    pub deal: DealBody,
    pub transition: Transition<DealStatus>,
}

impl DealUpdateBody {
    pub fn render(update: DealUpdate) -> DealUpdateBody {
        DealUpdateBody {
            deal: DealBody::render(update.deal),
            transition: update.transition,
        }
    }
}

#[get("/deals")]
#[tracing::instrument(skip(market))]
pub async fn get_deals(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
) -> Result<Json<Vec<DealBody>>, Error> {
    let market = market.lock().await;

    let body = manager::get_deals(&market, &identity)
        .into_iter()
        .map(DealBody::render)
        .collect();

    Ok(Json(body))
}

#[get("/deals/{deal_id}")]
#[tracing::instrument(skip(market))]
pub async fn get_deal_by_id(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
) -> Result<Json<DealBody>, Error> {
    let deal_id = params.into_inner();
    let market = market.lock().await;

    let deal = manager::get_deal_by_id(&market, &identity, deal_id)?;

    Ok(Json(DealBody::render(deal)))
}

#[post("/deals/{deal_id}/fund")]
#[tracing::instrument(skip(market))]
pub async fn fund_deal_escrow(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
) -> Result<Json<DealUpdateBody>, Error> {
    let deal_id = params.into_inner();
    let mut market = market.lock().await;

    let update = manager::fund_escrow(&mut market, &identity, deal_id).await?;

    Ok(Json(DealUpdateBody::render(update)))
}

#[post("/deals/{deal_id}/submit")]
#[tracing::instrument(skip(market))]
pub async fn submit_deal(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
    body: Json<SubmitDealBody>,
) -> Result<Json<DealUpdateBody>, Error> {
    let deal_id = params.into_inner();
    let body = body.into_inner();
    let mut market = market.lock().await;

    let update = manager::submit_deliverables(&mut market, &identity, deal_id, body.files).await?;

    Ok(Json(DealUpdateBody::render(update)))
}

#[post("/deals/{deal_id}/approve")]
#[tracing::instrument(skip(market))]
pub async fn approve_deal(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
) -> Result<Json<DealUpdateBody>, Error> {
    let deal_id = params.into_inner();
    let mut market = market.lock().await;

    let update = manager::approve_deliverables(&mut market, &identity, deal_id).await?;

    Ok(Json(DealUpdateBody::render(update)))
}

#[post("/deals/{deal_id}/request-revision")]
#[tracing::instrument(skip(market))]
pub async fn request_deal_revision(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
    body: Json<RequestRevisionBody>,
) -> Result<Json<DealUpdateBody>, Error> {
    let deal_id = params.into_inner();
    let body = body.into_inner();
    let mut market = market.lock().await;

    let update = manager::request_revision(&mut market, &identity, deal_id, body.note).await?;

    Ok(Json(DealUpdateBody::render(update)))
}

#[post("/deals/{deal_id}/complete")]
#[tracing::instrument(skip(market))]
pub async fn complete_deal(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
) -> Result<Json<DealUpdateBody>, Error> {
    let deal_id = params.into_inner();
    let mut market = market.lock().await;

    let update = manager::complete_and_pay(&mut market, &identity, deal_id).await?;

    Ok(Json(DealUpdateBody::render(update)))
}

#[post("/deals/{deal_id}/deliverables/{index}/toggle")]
#[tracing::instrument(skip(market))]
pub async fn toggle_deal_deliverable(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<(DealId, usize)>,
) -> Result<Json<DealBody>, Error> {
    let (deal_id, index) = params.into_inner();
    let mut market = market.lock().await;

    let deal = manager::toggle_deliverable(&mut market, &identity, deal_id, index).await?;

    Ok(Json(DealBody::render(deal)))
}

#[post("/deals/{deal_id}/files")]
#[tracing::instrument(skip(market))]
pub async fn attach_deal_file(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<DealId>,
    body: Json<AttachFileBody>,
) -> Result<Json<DealBody>, Error> {
    let deal_id = params.into_inner();
    let body = body.into_inner();
    let mut market = market.lock().await;

    let deal = manager::attach_file(&mut market, &identity, deal_id, body.file).await?;

    Ok(Json(DealBody::render(deal)))
}
