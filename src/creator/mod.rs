use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::listing::{Facets, Platform};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

/// An influencer's public profile. Keyed by the influencer's own user id.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Creator {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<PlatformPresence>,
    pub joined_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PlatformPresence {
    pub platform: Platform,
    pub handle: Option<String>,
    pub followers: Option<u64>,
    pub engagement_rate: Option<f64>,
}

impl Facets for Creator {
    fn timestamp(&self) -> DateTime<Utc> {
        self.joined_at
    }

    fn has_platform(&self, platform: Platform) -> bool {
        self.platforms.iter().any(|p| p.platform == platform)
    }

    fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// The largest audience across platforms.
    fn followers(&self) -> Option<u64> {
        self.platforms.iter().filter_map(|p| p.followers).max()
    }

    /// The best engagement rate across platforms, in percent.
    fn engagement_rate(&self) -> Option<f64> {
        self.platforms
            .iter()
            .filter_map(|p| p.engagement_rate)
            .fold(None, |best: Option<f64>, rate| match best {
                Some(best) if best >= rate => Some(best),
                _ => Some(rate),
            })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreatorProfile {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<PlatformPresence>,
}

impl CreatorProfile {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationFailed {
                field: "name",
                reason: "must not be blank",
            });
        }
        if self
            .platforms
            .iter()
            .any(|p| p.engagement_rate.map_or(false, |rate| !rate.is_finite() || rate < 0.0))
        {
            return Err(Error::ValidationFailed {
                field: "platforms",
                reason: "engagement rate must be a non-negative percentage",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence(platform: Platform, followers: Option<u64>, rate: Option<f64>) -> PlatformPresence {
        PlatformPresence {
            platform,
            handle: None,
            followers,
            engagement_rate: rate,
        }
    }

    #[test]
    fn facets_take_the_best_platform() {
        let now = Utc::now();
        let creator = Creator {
            id: UserId::new(),
            name: "Mia".into(),
            categories: vec!["Beauty".into()],
            platforms: vec![
                presence(Platform::Instagram, Some(80_000), Some(2.5)),
                presence(Platform::Tiktok, Some(250_000), Some(6.0)),
                presence(Platform::Youtube, None, None),
            ],
            joined_at: now,
            modified_at: now,
        };

        assert_eq!(creator.followers(), Some(250_000));
        assert_eq!(creator.engagement_rate(), Some(6.0));
        assert!(creator.has_platform(Platform::Youtube));
        assert!(creator.has_category("beauty"));
        assert!(!creator.has_platform(Platform::Facebook));
    }

    #[test]
    fn negative_engagement_fails_validation() {
        let profile = CreatorProfile {
            name: "Mia".into(),
            categories: vec![],
            platforms: vec![presence(Platform::Instagram, Some(10), Some(-1.0))],
        };

        assert!(profile.validate().is_err());
    }
}
