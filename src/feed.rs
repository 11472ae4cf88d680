use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use rss::extension::{ExtensionBuilder, ExtensionMap};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use tracing::info;

use crate::sanitize::sanitize;
use crate::types::{AggregatorConfig, FeedItem, Result};

/// Namespace for the per-item organisation attribution element.
const ORG_NS_PREFIX: &str = "org";
const ORG_NS_URI: &str = "urn:community-feed:organisation";
const ATOM_NS_URI: &str = "http://www.w3.org/2005/Atom";

/// Newest first; undated items after all dated ones. The sort is stable, so
/// ties and undated items keep their collection order, and the cap keeps the
/// most recent `max_items`.
pub fn sort_and_cap(mut items: Vec<FeedItem>, max_items: usize) -> Vec<FeedItem> {
    items.sort_by(|a, b| match (&a.published_at, &b.published_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    items.truncate(max_items);
    items
}

/// Render the retained items as an RSS 2.0 channel.
pub fn build_channel(items: &[FeedItem], config: &AggregatorConfig) -> Channel {
    let rendered: Vec<Item> = items
        .iter()
        .map(|item| render_item(item, config.description_max_len))
        .collect();

    let mut namespaces = BTreeMap::new();
    namespaces.insert(ORG_NS_PREFIX.to_string(), ORG_NS_URI.to_string());
    namespaces.insert("atom".to_string(), ATOM_NS_URI.to_string());

    ChannelBuilder::default()
        .title(config.feed_title.clone())
        .link(config.site_url.clone())
        .description(config.feed_description.clone())
        .language(Some(config.feed_language.clone()))
        .namespaces(namespaces)
        .extensions(self_link(&config.feed_url))
        .items(rendered)
        .build()
}

fn render_item(item: &FeedItem, description_max_len: usize) -> Item {
    let organisation = ExtensionBuilder::default()
        .name(format!("{}:organisation", ORG_NS_PREFIX))
        .value(Some(item.organisation.clone()))
        .build();
    let mut extensions = ExtensionMap::default();
    extensions
        .entry(ORG_NS_PREFIX.to_string())
        .or_default()
        .insert("organisation".to_string(), vec![organisation]);

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(item.link.clone()))
        .description(Some(sanitize(&item.raw_description, description_max_len)))
        .guid(Some(
            GuidBuilder::default()
                .value(item.link.clone())
                .permalink(true)
                .build(),
        ))
        .pub_date(item.published_at.map(|dt| dt.to_rfc2822()))
        .extensions(extensions)
        .build()
}

/// `<atom:link rel="self">` channel element pointing at the feed itself.
fn self_link(feed_url: &str) -> ExtensionMap {
    let mut attrs = BTreeMap::new();
    attrs.insert("href".to_string(), feed_url.to_string());
    attrs.insert("rel".to_string(), "self".to_string());
    attrs.insert("type".to_string(), "application/rss+xml".to_string());
    let link = ExtensionBuilder::default()
        .name("atom:link".to_string())
        .attrs(attrs)
        .build();

    let mut extensions = ExtensionMap::default();
    extensions
        .entry("atom".to_string())
        .or_default()
        .insert("link".to_string(), vec![link]);
    extensions
}

/// Persist the rendered document, creating parent directories and fully
/// overwriting any previous artifact.
pub fn write_feed(channel: &Channel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    channel.pretty_write_to(BufWriter::new(file), b' ', 2)?;
    info!("Wrote feed to {}", path.display());
    Ok(())
}
