use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Facebook,
    Twitter,
    Xiaohongshu,
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Platform, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "youtube" | "yt" => Ok(Platform::Youtube),
            "facebook" | "fb" => Ok(Platform::Facebook),
            "twitter" | "x" => Ok(Platform::Twitter),
            "xiaohongshu" | "rednote" => Ok(Platform::Xiaohongshu),
            _ => Err(Error::InvalidFilter {
                value: s.to_owned(),
            }),
        }
    }
}

/// A half-open numeric range `[min, max)`, unbounded above when `max` is
/// `None`. Parsed from `"100k-500k"`, `"1m+"` or `"2%-5%"`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }
}

impl Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

impl FromStr for NumericRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<NumericRange, Error> {
        let invalid = || Error::InvalidFilter {
            value: s.to_owned(),
        };
        let text = s.trim();

        if let Some(min) = text.strip_suffix('+') {
            let min = parse_amount(min).ok_or_else(invalid)?;
            return Ok(NumericRange { min, max: None });
        }

        let (min, max) = text.split_once('-').ok_or_else(invalid)?;
        let min = parse_amount(min).ok_or_else(invalid)?;
        let max = parse_amount(max).ok_or_else(invalid)?;
        if max < min {
            return Err(invalid());
        }

        Ok(NumericRange {
            min,
            max: Some(max),
        })
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    let text: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | ' '))
        .collect();

    let (digits, multiplier) = match text.chars().last()? {
        'k' | 'K' => (&text[..text.len() - 1], 1_000.0),
        'm' | 'M' => (&text[..text.len() - 1], 1_000_000.0),
        _ => (text.as_str(), 1.0),
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    Some(value * multiplier)
}

/// The attributes a listing can be filtered and sorted on.
pub trait Facets {
    fn timestamp(&self) -> DateTime<Utc>;

    fn has_platform(&self, _platform: Platform) -> bool {
        false
    }

    fn has_category(&self, _category: &str) -> bool {
        false
    }

    fn followers(&self) -> Option<u64> {
        None
    }

    fn engagement_rate(&self) -> Option<f64> {
        None
    }

    fn budget(&self) -> Option<f64> {
        None
    }
}

/// One filter group. Values inside a group are alternatives; an empty group
/// constrains nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Platforms(Vec<Platform>),
    Categories(Vec<String>),
    Followers(Vec<NumericRange>),
    Engagement(Vec<NumericRange>),
    Budget(Vec<NumericRange>),
}

impl Filter {
    pub fn matches<T: Facets + ?Sized>(&self, item: &T) -> bool {
        match self {
            Filter::Platforms(platforms) => {
                platforms.is_empty() || platforms.iter().any(|p| item.has_platform(*p))
            }
            Filter::Categories(categories) => {
                categories.is_empty() || categories.iter().any(|c| item.has_category(c))
            }
            Filter::Followers(ranges) => {
                matches_ranges(ranges, item.followers().map(|value| value as f64))
            }
            Filter::Engagement(ranges) => matches_ranges(ranges, item.engagement_rate()),
            Filter::Budget(ranges) => matches_ranges(ranges, item.budget()),
        }
    }
}

fn matches_ranges(ranges: &[NumericRange], value: Option<f64>) -> bool {
    if ranges.is_empty() {
        return true;
    }

    match value {
        Some(value) => ranges.iter().any(|range| range.contains(value)),
        None => false,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Newest,
    Followers,
    Engagement,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<SortOrder, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "recent" => Ok(SortOrder::Newest),
            "followers" => Ok(SortOrder::Followers),
            "engagement" => Ok(SortOrder::Engagement),
            _ => Err(Error::InvalidFilter {
                value: s.to_owned(),
            }),
        }
    }
}

impl SortOrder {
    pub fn compare<T: Facets + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        match self {
            SortOrder::Newest => b.timestamp().cmp(&a.timestamp()),
            SortOrder::Followers => descending_present_first(
                a.followers().map(|value| value as f64),
                b.followers().map(|value| value as f64),
            ),
            SortOrder::Engagement => {
                descending_present_first(a.engagement_rate(), b.engagement_rate())
            }
        }
    }
}

// missing and zero both sort after every real value
fn descending_present_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|value| *value > 0.0);
    let b = b.filter(|value| *value > 0.0);

    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Runs the filter groups (all must match) and then the optional sort. The
/// sort is stable, so ties and unsorted output keep input order.
pub fn apply<'a, T, I>(items: I, filters: &[Filter], sort: Option<SortOrder>) -> Vec<&'a T>
where
    T: Facets + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut selected: Vec<&T> = items
        .into_iter()
        .filter(|item| filters.iter().all(|filter| filter.matches(*item)))
        .collect();

    if let Some(sort) = sort {
        selected.sort_by(|a, b| sort.compare(*a, *b));
    }

    selected
}

/// Query string form of a listing request. Each group takes a comma
/// separated list, e.g. `?platforms=instagram,tiktok&followers=100k-500k`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub platforms: Option<String>,
    pub categories: Option<String>,
    pub followers: Option<String>,
    pub engagement: Option<String>,
    pub budget: Option<String>,
    pub sort: Option<String>,
}

impl ListingQuery {
    pub fn filters(&self) -> Result<Vec<Filter>, Error> {
        let mut filters = vec![];

        if let Some(platforms) = &self.platforms {
            filters.push(Filter::Platforms(split(platforms)?));
        }
        if let Some(categories) = &self.categories {
            let categories = categories
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned)
                .collect();
            filters.push(Filter::Categories(categories));
        }
        if let Some(followers) = &self.followers {
            filters.push(Filter::Followers(split(followers)?));
        }
        if let Some(engagement) = &self.engagement {
            filters.push(Filter::Engagement(split(engagement)?));
        }
        if let Some(budget) = &self.budget {
            filters.push(Filter::Budget(split(budget)?));
        }

        Ok(filters)
    }

    pub fn sort(&self) -> Result<Option<SortOrder>, Error> {
        self.sort.as_deref().map(SortOrder::from_str).transpose()
    }
}

fn split<T: FromStr<Err = Error>>(list: &str) -> Result<Vec<T>, Error> {
    list.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(T::from_str)
        .collect()
}
