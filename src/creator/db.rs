use crate::error::Error;
use crate::store::{self, KeyValueStore};

use super::Creator;

const CREATORS: &str = "creators";

#[tracing::instrument(skip(db))]
pub async fn load_creators(db: &dyn KeyValueStore) -> Vec<Creator> {
    store::load_collection(db, CREATORS).await
}

#[tracing::instrument(skip(db, creators))]
pub async fn save_creators(db: &dyn KeyValueStore, creators: Vec<&Creator>) -> Result<(), Error> {
    store::save_collection(db, CREATORS, creators).await
}
