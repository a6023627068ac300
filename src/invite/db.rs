use crate::error::Error;
use crate::store::{self, KeyValueStore};

use super::Invite;

const INVITES: &str = "invites";

#[tracing::instrument(skip(db))]
pub async fn load_invites(db: &dyn KeyValueStore) -> Vec<Invite> {
    store::load_collection(db, INVITES).await
}

#[tracing::instrument(skip(db, invites))]
pub async fn save_invites(db: &dyn KeyValueStore, invites: Vec<&Invite>) -> Result<(), Error> {
    store::save_collection(db, INVITES, invites).await
}
