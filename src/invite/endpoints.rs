use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::manager::{self, InviteUpdate};
use super::{Invite, InviteDraft, InviteId, InviteStatus};
use crate::campaign::{Campaign, CampaignId, PLACEHOLDER_BUSINESS_NAME, PLACEHOLDER_TITLE};
use crate::error::Error;
use crate::marketplace::Marketplace;
use crate::transition::Transition;
use crate::user::{Identity, UserId};

#[derive(Clone, Debug, Deserialize)]
pub struct RespondToInviteBody {
    pub status: InviteStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct InviteBody {
    pub id: InviteId,
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub business_id: UserId,
    pub business_name: String,
    pub influencer_id: UserId,
    pub message: String,
    pub offer_rate: Option<String>,
    pub status: InviteStatus,
    pub sent_date: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl InviteBody {
    pub fn render(invite: Invite, campaign: Option<&Campaign>) -> InviteBody {
        InviteBody {
            id: invite.id,
            campaign_id: invite.campaign_id,
            campaign_title: campaign.map_or(PLACEHOLDER_TITLE.to_owned(), |c| c.title.clone()),
            business_id: invite.business_id,
            business_name: campaign.map_or(PLACEHOLDER_BUSINESS_NAME.to_owned(), |c| {
                c.business_name.clone()
            }),
            influencer_id: invite.influencer_id,
            message: invite.message,
            offer_rate: invite.offer_rate,
            status: invite.status,
            sent_date: invite.sent_date,
            modified_at: invite.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InviteUpdateBody {
    pub invite: InviteBody,
    pub transition: Transition<InviteStatus>,
}

#[post("/campaigns/{campaign_id}/invites")]
#[tracing::instrument(skip(market))]
pub async fn send_invite_for_campaign(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<InviteDraft>,
) -> Result<Json<InviteBody>, Error> {
    let campaign_id = params.into_inner();
    let mut market = market.lock().await;

    let invite = manager::send_invite(&mut market, &identity, campaign_id, body.into_inner()).await?;
    let campaign = market.campaign(invite.campaign_id);

    Ok(Json(InviteBody::render(invite, campaign)))
}

#[get("/invites")]
#[tracing::instrument(skip(market))]
pub async fn get_invites(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
) -> Result<Json<Vec<InviteBody>>, Error> {
    let market = market.lock().await;

    let body = manager::get_invites(&market, &identity)
        .into_iter()
        .map(|invite| {
            let campaign = market.campaign(invite.campaign_id);
            InviteBody::render(invite, campaign)
        })
        .collect();

    Ok(Json(body))
}

#[post("/invites/{invite_id}/respond")]
#[tracing::instrument(skip(market))]
pub async fn respond_to_invite(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    params: Path<InviteId>,
    body: Json<RespondToInviteBody>,
) -> Result<Json<InviteUpdateBody>, Error> {
    let invite_id = params.into_inner();
    let mut market = market.lock().await;

    let InviteUpdate { invite, transition } =
        manager::respond_to_invite(&mut market, &identity, invite_id, body.status).await?;
    let campaign = market.campaign(invite.campaign_id);

    Ok(Json(InviteUpdateBody {
        invite: InviteBody::render(invite, campaign),
        transition,
    }))
}
