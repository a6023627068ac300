use chrono::{Duration, Utc};
use tracing::info;

use crate::application::{self, ApplicationDraft};
use crate::campaign::{self, Budget, CampaignDetails, Deliverable};
use crate::creator::{self, CreatorProfile, PlatformPresence};
use crate::error::Error;
use crate::listing::Platform;
use crate::marketplace::Marketplace;
use crate::user::{Identity, UserId};

/// Fills an empty marketplace with a business, two creators, two campaigns
/// and one application. Does nothing when campaigns already exist.
pub async fn seed(market: &mut Marketplace) -> Result<(), Error> {
    if !market.campaigns().is_empty() {
        info!("store already has campaigns, skipping seed");
        return Ok(());
    }

    let business = Identity::business(UserId::new());
    let mia = Identity::influencer(UserId::new());
    let jun = Identity::influencer(UserId::new());

    creator::manager::upsert_creator_profile(
        market,
        &mia,
        CreatorProfile {
            name: "Mia Tan".to_string(),
            categories: vec!["Beauty".to_string(), "Lifestyle".to_string()],
            platforms: vec![
                PlatformPresence {
                    platform: Platform::Instagram,
                    handle: Some("@miatan".to_string()),
                    followers: Some(182_000),
                    engagement_rate: Some(4.1),
                },
                PlatformPresence {
                    platform: Platform::Tiktok,
                    handle: Some("@miatan".to_string()),
                    followers: Some(320_000),
                    engagement_rate: Some(6.3),
                },
            ],
        },
    )
    .await?;

    creator::manager::upsert_creator_profile(
        market,
        &jun,
        CreatorProfile {
            name: "Jun Lim".to_string(),
            categories: vec!["Food".to_string()],
            platforms: vec![PlatformPresence {
                platform: Platform::Youtube,
                handle: Some("JunEats".to_string()),
                followers: Some(45_000),
                engagement_rate: Some(2.7),
            }],
        },
    )
    .await?;

    let skincare = campaign::manager::create_campaign(
        market,
        &business,
        CampaignDetails {
            title: "Summer skincare launch".to_string(),
            business_name: "Glow Co".to_string(),
            budget: Budget {
                min: Some(500),
                max: Some(2000),
                currency: campaign::DEFAULT_CURRENCY.to_string(),
            },
            deliverables: vec![
                Deliverable {
                    kind: "Instagram Reel".to_string(),
                    quantity: 1,
                },
                Deliverable {
                    kind: "Instagram Story".to_string(),
                    quantity: 3,
                },
            ],
            platforms: vec![Platform::Instagram, Platform::Tiktok],
            categories: vec!["Beauty".to_string()],
            payment_terms: Some("50% on funding, 50% on approval".to_string()),
            usage_rights: Some("6 months organic".to_string()),
            application_deadline: Some((Utc::now() + Duration::days(30)).date_naive()),
        },
        true,
    )
    .await?;

    campaign::manager::create_campaign(
        market,
        &business,
        CampaignDetails {
            title: "Hawker food trail".to_string(),
            business_name: "Glow Co".to_string(),
            budget: Budget {
                min: None,
                max: Some(800),
                currency: campaign::DEFAULT_CURRENCY.to_string(),
            },
            deliverables: vec![Deliverable {
                kind: "YouTube video".to_string(),
                quantity: 1,
            }],
            platforms: vec![Platform::Youtube],
            categories: vec!["Food".to_string()],
            payment_terms: None,
            usage_rights: None,
            application_deadline: None,
        },
        false,
    )
    .await?;

    application::manager::apply_to_campaign(
        market,
        &mia,
        skincare.id,
        ApplicationDraft {
            applicant_name: "Mia Tan".to_string(),
            proposed_rate: Some("SGD 1500".to_string()),
            pitch: "My audience is 70% women aged 18-30 who follow skincare routines."
                .to_string(),
        },
    )
    .await?;

    info!(
        business = %business.actor_id,
        influencer = %mia.actor_id,
        "seeded demo marketplace"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::test::harness;

    #[tokio::test]
    async fn seeding_is_skipped_once_populated() {
        let mut h = harness();

        seed(&mut h.market).await.unwrap();
        seed(&mut h.market).await.unwrap();

        assert_eq!(h.market.campaigns().len(), 2);
        assert_eq!(h.market.creators().len(), 2);
        assert_eq!(h.market.applications().len(), 1);
    }
}
