use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use serde::Deserialize;

use crate::types::FeedItem;

/// One element of the hosting platform's `/api/v1/posts` JSON array.
///
/// Only the fields the normalizer consumes are modelled; the endpoint
/// returns many more, which serde ignores.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub canonical_url: String,
    #[serde(default)]
    pub post_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// The two upstream entry shapes, before normalization.
///
/// All field-precedence decisions live in [`RawEntry::normalize`]; nothing
/// downstream inspects the wire formats.
#[derive(Debug)]
pub enum RawEntry {
    Syndication(Box<Entry>),
    Platform(PlatformPost),
}

impl RawEntry {
    /// Map an upstream entry into the canonical item shape, attaching the
    /// organisation it came from.
    pub fn normalize(self, organisation: &str) -> FeedItem {
        match self {
            RawEntry::Syndication(entry) => normalize_syndication(*entry, organisation),
            RawEntry::Platform(post) => normalize_platform(post, organisation),
        }
    }
}

fn normalize_syndication(entry: Entry, organisation: &str) -> FeedItem {
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let published_at = entry.published.or(entry.updated);

    // Prefer the fullest rendering of the post over terser summaries.
    let content_body = entry.content.and_then(|c| c.body);
    let summary = entry.summary.map(|s| s.content);
    let media_description = entry
        .media
        .into_iter()
        .next()
        .and_then(|m| m.description)
        .map(|d| d.content);
    let raw_description = content_body
        .or(summary)
        .or(media_description)
        .unwrap_or_default();

    FeedItem {
        title,
        link,
        published_at,
        raw_description,
        organisation: organisation.to_string(),
    }
}

fn normalize_platform(post: PlatformPost, organisation: &str) -> FeedItem {
    // Platform posts carry the full body; the subtitle is only a stand-in.
    let raw_description = post
        .body_html
        .filter(|body| !body.is_empty())
        .or(post.subtitle)
        .unwrap_or_default();

    FeedItem {
        title: post.title,
        link: post.canonical_url,
        published_at: post.post_date,
        raw_description,
        organisation: organisation.to_string(),
    }
}
