use crate::error::Error;
use crate::store::{self, KeyValueStore};

use super::Application;

const APPLICATIONS: &str = "applications";

#[tracing::instrument(skip(db))]
pub async fn load_applications(db: &dyn KeyValueStore) -> Vec<Application> {
    store::load_collection(db, APPLICATIONS).await
}

#[tracing::instrument(skip(db, applications))]
pub async fn save_applications(
    db: &dyn KeyValueStore,
    applications: Vec<&Application>,
) -> Result<(), Error> {
    store::save_collection(db, APPLICATIONS, applications).await
}
