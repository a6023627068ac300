use actix_web::web::{self, JsonConfig, PathConfig, QueryConfig};
use actix_web::{HttpResponse, ResponseError};

pub mod application;
pub mod campaign;
pub mod creator;
pub mod deal;
pub mod error;
pub mod invite;
pub mod listing;
pub mod marketplace;
pub mod notify;
pub mod seed;
pub mod settings;
pub mod store;
pub mod transition;
pub mod typedid;
pub mod user;
pub mod views;

use error::Error;

/// Registers every route plus the extractor error formats. The caller
/// provides the shared `Data<Mutex<Marketplace>>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(campaign::endpoints::create_campaign)
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::update_campaign)
    .service(campaign::endpoints::change_campaign_status)
    .service(campaign::endpoints::delete_campaign)
    .service(application::endpoints::apply_to_campaign)
    .service(application::endpoints::get_applicants_for_campaign)
    .service(application::endpoints::get_applied_campaigns)
    .service(application::endpoints::get_my_applications)
    .service(application::endpoints::review_application)
    .service(application::endpoints::withdraw_application)
    .service(invite::endpoints::send_invite_for_campaign)
    .service(invite::endpoints::get_invites)
    .service(invite::endpoints::respond_to_invite)
    .service(deal::endpoints::get_deals)
    .service(deal::endpoints::get_deal_by_id)
    .service(deal::endpoints::fund_deal_escrow)
    .service(deal::endpoints::submit_deal)
    .service(deal::endpoints::approve_deal)
    .service(deal::endpoints::request_deal_revision)
    .service(deal::endpoints::complete_deal)
    .service(deal::endpoints::toggle_deal_deliverable)
    .service(deal::endpoints::attach_deal_file)
    .service(creator::endpoints::upsert_my_creator_profile)
    .service(creator::endpoints::get_creators)
    .service(creator::endpoints::get_creator_by_id)
    .service(views::get_kpis);
}

pub async fn path_not_found() -> HttpResponse {
    Error::PathNotFound.error_response()
}
