use crate::error::Error;
use crate::store::{self, KeyValueStore};

use super::Deal;

const DEALS: &str = "deals";

#[tracing::instrument(skip(db))]
pub async fn load_deals(db: &dyn KeyValueStore) -> Vec<Deal> {
    store::load_collection(db, DEALS).await
}

#[tracing::instrument(skip(db, deals))]
pub async fn save_deals(db: &dyn KeyValueStore, deals: Vec<&Deal>) -> Result<(), Error> {
    store::save_collection(db, DEALS, deals).await
}
