use std::collections::{BTreeMap, HashSet};

use actix_web::get;
use actix_web::web::{Data, Json};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::ApplicationStatus;
use crate::campaign::{CampaignId, CampaignStatus};
use crate::deal::{Deal, DealStatus};
use crate::error::Error;
use crate::invite::InviteStatus;
use crate::marketplace::Marketplace;
use crate::user::{Identity, Role, UserId};

/// Campaign ids the influencer currently has an application for. Rebuilt
/// from the application collection on every call.
pub fn applied_set(market: &Marketplace, applicant_id: UserId) -> HashSet<CampaignId> {
    market
        .applications
        .values()
        .filter(|application| application.applicant_id == applicant_id)
        .map(|application| application.campaign_id)
        .collect()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DeliverableProgress {
    pub completed: usize,
    pub total: usize,
}

pub fn deliverable_progress(deal: &Deal) -> DeliverableProgress {
    DeliverableProgress {
        completed: deal.deliverables.iter().filter(|d| d.completed).count(),
        total: deal.deliverables.len(),
    }
}

/// Dashboard counts for one actor, each broken down by status.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Kpis {
    pub role: Role,
    pub live_campaigns: usize,
    pub campaigns: BTreeMap<CampaignStatus, usize>,
    pub applications: BTreeMap<ApplicationStatus, usize>,
    pub invites: BTreeMap<InviteStatus, usize>,
    pub deals: BTreeMap<DealStatus, usize>,
}

pub fn kpis(market: &Marketplace, identity: &Identity) -> Kpis {
    let actor_id = identity.actor_id;

    match identity.role {
        Role::Business => {
            let owned: HashSet<CampaignId> = market
                .campaigns
                .values()
                .filter(|campaign| campaign.owner_id == actor_id)
                .map(|campaign| campaign.id)
                .collect();
            let campaigns = count_by(
                market
                    .campaigns
                    .values()
                    .filter(|campaign| campaign.owner_id == actor_id)
                    .map(|campaign| campaign.status),
            );

            Kpis {
                role: identity.role,
                live_campaigns: campaigns.get(&CampaignStatus::Live).copied().unwrap_or(0),
                campaigns,
                applications: count_by(
                    market
                        .applications
                        .values()
                        .filter(|application| owned.contains(&application.campaign_id))
                        .map(|application| application.status),
                ),
                invites: count_by(
                    market
                        .invites
                        .values()
                        .filter(|invite| invite.business_id == actor_id)
                        .map(|invite| invite.status),
                ),
                deals: count_by(
                    market
                        .deals
                        .values()
                        .filter(|deal| deal.business_id == actor_id)
                        .map(|deal| deal.status),
                ),
            }
        }
        Role::Influencer => Kpis {
            role: identity.role,
            live_campaigns: market
                .campaigns
                .values()
                .filter(|campaign| campaign.status == CampaignStatus::Live)
                .count(),
            campaigns: BTreeMap::new(),
            applications: count_by(
                market
                    .applications
                    .values()
                    .filter(|application| application.applicant_id == actor_id)
                    .map(|application| application.status),
            ),
            invites: count_by(
                market
                    .invites
                    .values()
                    .filter(|invite| invite.influencer_id == actor_id)
                    .map(|invite| invite.status),
            ),
            deals: count_by(
                market
                    .deals
                    .values()
                    .filter(|deal| deal.influencer_id == actor_id)
                    .map(|deal| deal.status),
            ),
        },
    }
}

fn count_by<S: Ord>(statuses: impl Iterator<Item = S>) -> BTreeMap<S, usize> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status).or_insert(0) += 1;
    }
    counts
}

#[get("/kpis")]
#[tracing::instrument(skip(market))]
pub async fn get_kpis(
    market: Data<Mutex<Marketplace>>,
    identity: Identity,
) -> Result<Json<Kpis>, Error> {
    let market = market.lock().await;

    Ok(Json(kpis(&market, &identity)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::application::{Application, ApplicationId};
    use crate::marketplace::test::{harness, live_campaign};

    fn apply(market: &mut Marketplace, campaign_id: CampaignId, applicant_id: UserId) {
        let now = Utc::now();
        let application = Application {
            id: ApplicationId::new(),
            campaign_id,
            business_id: UserId::new(),
            applicant_id,
            applicant_name: "Mia".into(),
            proposed_rate: None,
            pitch: "Hi".into(),
            status: ApplicationStatus::Pending,
            applied_date: now,
            modified_at: now,
        };
        market.applications.insert(application.id, application);
    }

    #[test]
    fn applied_set_tracks_one_influencer() {
        let mut h = harness();
        let business = UserId::new();
        let first = live_campaign(&mut h.market, business);
        let second = live_campaign(&mut h.market, business);
        let mia = UserId::new();
        apply(&mut h.market, first.id, mia);
        apply(&mut h.market, second.id, UserId::new());

        let applied = applied_set(&h.market, mia);

        assert!(applied.contains(&first.id));
        assert!(!applied.contains(&second.id));
    }

    #[test]
    fn kpis_split_by_role() {
        let mut h = harness();
        let business = Identity::business(UserId::new());
        let influencer = Identity::influencer(UserId::new());
        let mine = live_campaign(&mut h.market, business.actor_id);
        live_campaign(&mut h.market, UserId::new());
        apply(&mut h.market, mine.id, influencer.actor_id);

        let for_business = kpis(&h.market, &business);
        assert_eq!(for_business.live_campaigns, 1);
        assert_eq!(for_business.campaigns.get(&CampaignStatus::Live), Some(&1));
        assert_eq!(
            for_business.applications.get(&ApplicationStatus::Pending),
            Some(&1)
        );

        let for_influencer = kpis(&h.market, &influencer);
        assert_eq!(for_influencer.live_campaigns, 2);
        assert!(for_influencer.campaigns.is_empty());
        assert_eq!(
            for_influencer.applications.get(&ApplicationStatus::Pending),
            Some(&1)
        );
        assert!(for_influencer.deals.is_empty());
    }
}
