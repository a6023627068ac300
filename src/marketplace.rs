use std::collections::HashMap;

use tracing::{info, warn};

use crate::application::{db as application_db, Application, ApplicationId};
use crate::campaign::{db as campaign_db, Campaign, CampaignId};
use crate::creator::{db as creator_db, Creator};
use crate::deal::{db as deal_db, Deal, DealId};
use crate::error::Error;
use crate::invite::{db as invite_db, Invite, InviteId};
use crate::notify::{Notifier, Severity};
use crate::store::KeyValueStore;
use crate::user::UserId;

/// Owns every lifecycle collection in memory and writes each one back to
/// the injected store after it changes. The in-memory copy stays
/// authoritative when a write fails; the failure is logged and surfaced as
/// a warning notice.
pub struct Marketplace {
    store: Box<dyn KeyValueStore>,
    notifier: Box<dyn Notifier>,
    pub(crate) campaigns: HashMap<CampaignId, Campaign>,
    pub(crate) applications: HashMap<ApplicationId, Application>,
    pub(crate) invites: HashMap<InviteId, Invite>,
    pub(crate) deals: HashMap<DealId, Deal>,
    pub(crate) creators: HashMap<UserId, Creator>,
}

impl Marketplace {
    pub fn new(store: Box<dyn KeyValueStore>, notifier: Box<dyn Notifier>) -> Marketplace {
        Marketplace {
            store,
            notifier,
            campaigns: HashMap::new(),
            applications: HashMap::new(),
            invites: HashMap::new(),
            deals: HashMap::new(),
            creators: HashMap::new(),
        }
    }

    #[tracing::instrument(skip(store, notifier))]
    pub async fn load(
        store: Box<dyn KeyValueStore>,
        notifier: Box<dyn Notifier>,
    ) -> Marketplace {
        let campaigns = campaign_db::load_campaigns(&*store).await;
        let applications = application_db::load_applications(&*store).await;
        let invites = invite_db::load_invites(&*store).await;
        let deals = deal_db::load_deals(&*store).await;
        let creators = creator_db::load_creators(&*store).await;

        info!(
            campaigns = campaigns.len(),
            applications = applications.len(),
            invites = invites.len(),
            deals = deals.len(),
            creators = creators.len(),
            "loaded marketplace"
        );

        Marketplace {
            store,
            notifier,
            campaigns: campaigns.into_iter().map(|c| (c.id, c)).collect(),
            applications: applications.into_iter().map(|a| (a.id, a)).collect(),
            invites: invites.into_iter().map(|i| (i.id, i)).collect(),
            deals: deals.into_iter().map(|d| (d.id, d)).collect(),
            creators: creators.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn campaign(&self, campaign_id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&campaign_id)
    }

    pub fn application(&self, application_id: ApplicationId) -> Option<&Application> {
        self.applications.get(&application_id)
    }

    pub fn invite(&self, invite_id: InviteId) -> Option<&Invite> {
        self.invites.get(&invite_id)
    }

    pub fn deal(&self, deal_id: DealId) -> Option<&Deal> {
        self.deals.get(&deal_id)
    }

    pub fn creator(&self, creator_id: UserId) -> Option<&Creator> {
        self.creators.get(&creator_id)
    }

    pub fn deal_for_application(&self, application_id: ApplicationId) -> Option<&Deal> {
        self.deals
            .values()
            .find(|deal| deal.application_id == application_id)
    }

    /// Campaigns oldest first, which is the order listings start from.
    pub fn campaigns(&self) -> Vec<&Campaign> {
        let mut campaigns: Vec<&Campaign> = self.campaigns.values().collect();
        campaigns.sort_by_key(|c| (c.posted_date, c.id));
        campaigns
    }

    pub fn applications(&self) -> Vec<&Application> {
        let mut applications: Vec<&Application> = self.applications.values().collect();
        applications.sort_by_key(|a| (a.applied_date, a.id));
        applications
    }

    pub fn invites(&self) -> Vec<&Invite> {
        let mut invites: Vec<&Invite> = self.invites.values().collect();
        invites.sort_by_key(|i| (i.sent_date, i.id));
        invites
    }

    pub fn deals(&self) -> Vec<&Deal> {
        let mut deals: Vec<&Deal> = self.deals.values().collect();
        deals.sort_by_key(|d| (d.created_at, d.id));
        deals
    }

    pub fn creators(&self) -> Vec<&Creator> {
        let mut creators: Vec<&Creator> = self.creators.values().collect();
        creators.sort_by_key(|c| (c.joined_at, c.id));
        creators
    }

    pub(crate) fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    fn report_save(&self, collection: &str, result: Result<(), Error>) {
        if let Err(err) = result {
            warn!(error = %err, collection, "failed to persist");
            self.notify("Changes could not be saved", Severity::Warning);
        }
    }

    pub(crate) async fn persist_campaigns(&self) {
        let result = campaign_db::save_campaigns(&*self.store, self.campaigns()).await;
        self.report_save("campaigns", result);
    }

    pub(crate) async fn persist_applications(&self) {
        let result = application_db::save_applications(&*self.store, self.applications()).await;
        self.report_save("applications", result);
    }

    pub(crate) async fn persist_invites(&self) {
        let result = invite_db::save_invites(&*self.store, self.invites()).await;
        self.report_save("invites", result);
    }

    pub(crate) async fn persist_deals(&self) {
        let result = deal_db::save_deals(&*self.store, self.deals()).await;
        self.report_save("deals", result);
    }

    pub(crate) async fn persist_creators(&self) {
        let result = creator_db::save_creators(&*self.store, self.creators()).await;
        self.report_save("creators", result);
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::application::manager::{apply_to_campaign, review_application};
    use crate::application::{ApplicationDraft, ApplicationStatus};
    use crate::campaign::{Budget, CampaignDetails, CampaignStatus, Deliverable};
    use crate::listing::Platform;
    use crate::notify::RecordingNotifier;
    use crate::store::MemoryStore;
    use crate::user::Identity;

    /// A store shared between the marketplace under test and the assertions.
    pub struct SharedStore(pub Arc<MemoryStore>);

    #[async_trait::async_trait]
    impl KeyValueStore for SharedStore {
        async fn load(&self, key: &str) -> Result<Option<String>, crate::error::Error> {
            self.0.load(key).await
        }

        async fn save(&self, key: &str, payload: String) -> Result<(), crate::error::Error> {
            self.0.save(key, payload).await
        }
    }

    pub struct Harness {
        pub market: Marketplace,
        pub store: Arc<MemoryStore>,
        pub notifier: RecordingNotifier,
    }

    pub fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        let market = Marketplace::new(
            Box::new(SharedStore(Arc::clone(&store))),
            Box::new(notifier.clone()),
        );

        Harness {
            market,
            store,
            notifier,
        }
    }

    pub fn campaign_details() -> CampaignDetails {
        CampaignDetails {
            title: "Summer skincare launch".into(),
            business_name: "Glow Co".into(),
            budget: Budget {
                min: Some(500),
                max: Some(2000),
                currency: "SGD".into(),
            },
            deliverables: vec![
                Deliverable {
                    kind: "reel".into(),
                    quantity: 1,
                },
                Deliverable {
                    kind: "story".into(),
                    quantity: 2,
                },
            ],
            platforms: vec![Platform::Instagram, Platform::Tiktok],
            categories: vec!["Beauty".into()],
            payment_terms: Some("50% upfront".into()),
            usage_rights: Some("6 months organic".into()),
            application_deadline: Some((Utc::now() + Duration::days(30)).date_naive()),
        }
    }

    /// Inserts a live campaign owned by `owner_id` directly into the maps.
    pub fn live_campaign(market: &mut Marketplace, owner_id: UserId) -> Campaign {
        let details = campaign_details();
        let now = Utc::now();
        let campaign = Campaign {
            id: CampaignId::new(),
            owner_id,
            title: details.title,
            business_name: details.business_name,
            status: CampaignStatus::Live,
            budget: details.budget,
            deliverables: details.deliverables,
            platforms: details.platforms,
            categories: details.categories,
            payment_terms: details.payment_terms,
            usage_rights: details.usage_rights,
            application_deadline: details.application_deadline,
            posted_date: now,
            modified_at: now,
        };
        market.campaigns.insert(campaign.id, campaign.clone());
        campaign
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn load(&self, _key: &str) -> Result<Option<String>, crate::error::Error> {
            Ok(None)
        }

        async fn save(&self, _key: &str, _payload: String) -> Result<(), crate::error::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded").into())
        }
    }

    #[tokio::test]
    async fn failed_writes_keep_the_change_in_memory() {
        let notifier = RecordingNotifier::new();
        let mut market = Marketplace::new(Box::new(FailingStore), Box::new(notifier.clone()));
        let business = Identity::business(UserId::new());
        let influencer = Identity::influencer(UserId::new());
        let campaign = live_campaign(&mut market, business.actor_id);

        let application = apply_to_campaign(
            &mut market,
            &influencer,
            campaign.id,
            ApplicationDraft {
                applicant_name: "Mia".into(),
                proposed_rate: None,
                pitch: "Hi".into(),
            },
        )
        .await
        .unwrap();

        assert!(market.application(application.id).is_some());
        assert_eq!(
            notifier.notices(),
            vec![
                ("Changes could not be saved".to_owned(), Severity::Warning),
                ("Application submitted".to_owned(), Severity::Success),
            ]
        );

        let review = review_application(
            &mut market,
            &business,
            application.id,
            ApplicationStatus::Accepted,
        )
        .await
        .unwrap();

        let deal = review.deal.unwrap();
        assert!(market.deal(deal.id).is_some());
        assert_eq!(
            market.application(application.id).unwrap().status,
            ApplicationStatus::Accepted
        );
        assert_eq!(
            notifier.notices().last(),
            Some(&(
                "Application accepted, deal created".to_owned(),
                Severity::Success
            ))
        );
    }
}
