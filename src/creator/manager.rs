use chrono::Utc;

use crate::error::Error;
use crate::listing::{self, Filter, SortOrder};
use crate::marketplace::Marketplace;
use crate::notify::Severity;
use crate::user::{Identity, Role, UserId};

use super::{Creator, CreatorProfile};

/// Creates or replaces the acting influencer's profile, keeping the
/// original join time.
#[tracing::instrument(skip(market))]
pub async fn upsert_creator_profile(
    market: &mut Marketplace,
    identity: &Identity,
    profile: CreatorProfile,
) -> Result<Creator, Error> {
    identity.require(Role::Influencer, "edit creator profile")?;
    profile.validate()?;

    let now = Utc::now();
    let joined_at = market
        .creator(identity.actor_id)
        .map_or(now, |existing| existing.joined_at);

    let creator = Creator {
        id: identity.actor_id,
        name: profile.name.trim().to_owned(),
        categories: profile.categories,
        platforms: profile.platforms,
        joined_at,
        modified_at: now,
    };

    market.creators.insert(creator.id, creator.clone());
    market.persist_creators().await;
    market.notify("Profile saved", Severity::Success);

    Ok(creator)
}

#[tracing::instrument(skip(market))]
pub fn get_creator_by_id(market: &Marketplace, creator_id: UserId) -> Option<Creator> {
    market.creator(creator_id).cloned()
}

#[tracing::instrument(skip(market))]
pub fn get_creators(
    market: &Marketplace,
    filters: &[Filter],
    sort: Option<SortOrder>,
) -> Vec<Creator> {
    listing::apply(market.creators(), filters, sort)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::PlatformPresence;
    use crate::listing::{NumericRange, Platform};
    use crate::marketplace::test::harness;

    fn profile(name: &str, followers: u64) -> CreatorProfile {
        CreatorProfile {
            name: name.into(),
            categories: vec!["Food".into()],
            platforms: vec![PlatformPresence {
                platform: Platform::Instagram,
                handle: Some(format!("@{}", name.to_lowercase())),
                followers: Some(followers),
                engagement_rate: Some(3.2),
            }],
        }
    }

    #[tokio::test]
    async fn updating_a_profile_keeps_join_time() {
        let mut h = harness();
        let influencer = Identity::influencer(UserId::new());

        let first = upsert_creator_profile(&mut h.market, &influencer, profile("Mia", 1_000))
            .await
            .unwrap();
        let second = upsert_creator_profile(&mut h.market, &influencer, profile("Mia T", 2_000))
            .await
            .unwrap();

        assert_eq!(first.joined_at, second.joined_at);
        assert_eq!(second.name, "Mia T");
        assert_eq!(h.market.creators().len(), 1);
    }

    #[tokio::test]
    async fn businesses_cannot_own_profiles() {
        let mut h = harness();
        let business = Identity::business(UserId::new());

        let result = upsert_creator_profile(&mut h.market, &business, profile("Glow", 10)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::ForbiddenForRole {
                role: Role::Business,
                action: "edit creator profile"
            }
        );
    }

    #[tokio::test]
    async fn discovery_filters_on_followers() {
        let mut h = harness();
        for (name, followers) in &[("Small", 5_000), ("Mid", 150_000), ("Big", 900_000)] {
            let influencer = Identity::influencer(UserId::new());
            upsert_creator_profile(&mut h.market, &influencer, profile(name, *followers))
                .await
                .unwrap();
        }

        let range: NumericRange = "100k-500k".parse().unwrap();
        let mid = get_creators(&h.market, &[Filter::Followers(vec![range])], None);
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].name, "Mid");

        let ranked = get_creators(&h.market, &[], Some(SortOrder::Followers));
        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Big", "Mid", "Small"]);
    }
}
