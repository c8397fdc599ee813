use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ParseError;

/// Social platform a record targets.
///
/// Declaration order is the display order and the order in which publish
/// command fields are populated: Facebook, Instagram, LinkedIn, TikTok, None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "none")]
    None,
}

impl Platform {
    /// Every platform, in display order.
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::TikTok,
        Platform::None,
    ];

    /// Platforms the automation endpoint can publish to.
    pub const PUBLISHABLE: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::TikTok,
    ];

    pub fn is_publishable(self) -> bool {
        self != Platform::None
    }

    /// Field name carrying this platform's record id in a publish command.
    pub fn command_field(self) -> Option<&'static str> {
        match self {
            Platform::Facebook => Some("facebook_post_id"),
            Platform::Instagram => Some("instagram_post_id"),
            Platform::LinkedIn => Some("linkedin_post_id"),
            Platform::TikTok => Some("tiktok_post_id"),
            Platform::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::LinkedIn => "linkedin",
            Platform::TikTok => "tiktok",
            Platform::None => "none",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" | "fb" => Ok(Platform::Facebook),
            "instagram" | "ig" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::LinkedIn),
            "tiktok" => Ok(Platform::TikTok),
            "none" | "" => Ok(Platform::None),
            _ => Err(ParseError::new("platform", s)),
        }
    }
}

/// What kind of content a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    SocialPost,
    StandaloneImage,
    Video,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::SocialPost => "social_post",
            SourceType::StandaloneImage => "standalone_image",
            SourceType::Video => "video",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "social_post" => Ok(SourceType::SocialPost),
            "standalone_image" => Ok(SourceType::StandaloneImage),
            "video" => Ok(SourceType::Video),
            _ => Err(ParseError::new("source type", s)),
        }
    }
}

/// Record lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Draft => "draft",
            RecordStatus::Scheduled => "scheduled",
            RecordStatus::Published => "published",
            RecordStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RecordStatus::Draft),
            "scheduled" => Ok(RecordStatus::Scheduled),
            "published" => Ok(RecordStatus::Published),
            "failed" => Ok(RecordStatus::Failed),
            _ => Err(ParseError::new("record status", s)),
        }
    }
}

/// Which platforms each kind of content may be published to.
///
/// This replaces per-page platform lists: an image that was never turned into
/// a video cannot go to TikTok, everything else can go everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRules {
    allowed: BTreeMap<SourceType, BTreeSet<Platform>>,
}

impl Default for PlatformRules {
    fn default() -> Self {
        Self::new()
            .with_rule(SourceType::SocialPost, Platform::PUBLISHABLE)
            .with_rule(
                SourceType::StandaloneImage,
                [Platform::Facebook, Platform::Instagram, Platform::LinkedIn],
            )
            .with_rule(SourceType::Video, Platform::PUBLISHABLE)
    }
}

impl PlatformRules {
    /// Rules that allow nothing.
    pub fn new() -> Self {
        Self {
            allowed: BTreeMap::new(),
        }
    }

    /// Replace the allowed platforms for a source type. `Platform::None` is dropped.
    pub fn with_rule(
        mut self,
        source_type: SourceType,
        platforms: impl IntoIterator<Item = Platform>,
    ) -> Self {
        let platforms = platforms
            .into_iter()
            .filter(|p| p.is_publishable())
            .collect();
        self.allowed.insert(source_type, platforms);
        self
    }

    pub fn allows(&self, source_type: SourceType, platform: Platform) -> bool {
        self.allowed
            .get(&source_type)
            .is_some_and(|set| set.contains(&platform))
    }

    /// Allowed platforms for a source type, in display order.
    pub fn allowed(&self, source_type: SourceType) -> Vec<Platform> {
        self.allowed
            .get(&source_type)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
