use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{manager, Creator, CreatorProfile, PlatformPresence};
use crate::error::Error;
use crate::listing::{Facets, ListingQuery};
use crate::marketplace::Marketplace;
use crate::user::{Identity, UserId};

#[derive(Clone, Debug, Serialize)]
pub struct CreatorBody {
    pub id: UserId,
    pub name: String,
    pub categories: Vec<String>,
    pub platforms: Vec<PlatformPresence>,
    pub followers: Option<u64>,
    pub engagement_rate: Option<f64>,
    pub joined_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CreatorBody {
    pub fn render(creator: Creator) -> CreatorBody {
        CreatorBody {
            followers: creator.followers(),
            engagement_rate: creator.engagement_rate(),
            id: creator.id,
            name: creator.name,
            categories: creator.categories,
            platforms: creator.platforms,
            joined_at: creator.joined_at,
            modified_at: creator.modified_at,
        }
    }
}

#[post("/creators/me")]
#[tracing::instrument(skip(market))]
pub async fn upsert_my_creator_profile(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
    body: Json<CreatorProfile>,
) -> Result<Json<CreatorBody>, Error> {
    let mut market = market.lock().await;

    let creator = manager::upsert_creator_profile(&mut market, &identity, body.into_inner()).await?;

    Ok(Json(CreatorBody::render(creator)))
}

#[get("/creators")]
#[tracing::instrument(skip(market))]
pub async fn get_creators(
    market: Data<Mutex<Marketplace>>,
    query: Query<ListingQuery>,
) -> Result<Json<Vec<CreatorBody>>, Error> {
    let filters = query.filters()?;
    let sort = query.sort()?;
    let market = market.lock().await;

    let body = manager::get_creators(&market, &filters, sort)
        .into_iter()
        .map(CreatorBody::render)
        .collect();

    Ok(Json(body))
}

#[get("/creators/{creator_id}")]
#[tracing::instrument(skip(market))]
pub async fn get_creator_by_id(
    market: Data<Mutex<Marketplace>>,
    params: Path<UserId>,
) -> Result<Json<CreatorBody>, Error> {
    let creator_id = params.into_inner();
    let market = market.lock().await;

    let creator =
        manager::get_creator_by_id(&market, creator_id).ok_or(Error::CreatorNotFound { creator_id })?;

    Ok(Json(CreatorBody::render(creator)))
}
