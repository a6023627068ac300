use crate::error::Error;
use crate::store::{self, KeyValueStore};

use super::Campaign;

const CAMPAIGNS: &str = "campaigns";

#[tracing::instrument(skip(db))]
pub async fn load_campaigns(db: &dyn KeyValueStore) -> Vec<Campaign> {
    store::load_collection(db, CAMPAIGNS).await
}

#[tracing::instrument(skip(db, campaigns))]
pub async fn save_campaigns(db: &dyn KeyValueStore, campaigns: Vec<&Campaign>) -> Result<(), Error> {
    store::save_collection(db, CAMPAIGNS, campaigns).await
}
