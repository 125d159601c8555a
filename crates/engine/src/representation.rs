//! Response documents
//!
//! The shapes a transport layer serializes to JSON. Field names and
//! presence follow the hub's public contract: a default channel document
//! has exactly nine top-level fields and four links.

use serde::Serialize;

use channelhub_core::{ChannelConfig, Item, StorageMode};

use crate::links::{ChannelLinks, ItemLinks};

/// `{"href": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Href {
    /// Target URI
    pub href: String,
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self {
            href: href.to_string(),
        }
    }
}

/// `_links` of a channel document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelLinksDocument {
    /// The channel
    #[serde(rename = "self")]
    pub self_link: Href,
    /// Newest item
    pub latest: Href,
    /// Oldest item
    pub earliest: Href,
    /// Live stream
    pub ws: Href,
}

impl From<&ChannelLinks> for ChannelLinksDocument {
    fn from(links: &ChannelLinks) -> Self {
        Self {
            self_link: links.self_uri.as_str().into(),
            latest: links.latest.as_str().into(),
            earliest: links.earliest.as_str().into(),
            ws: links.ws.as_str().into(),
        }
    }
}

/// Channel representation returned by create, get, update and list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDocument {
    /// Hypermedia links
    #[serde(rename = "_links")]
    pub links: ChannelLinksDocument,
    /// Channel name
    pub name: String,
    /// RFC3339 creation time
    pub creation_date: String,
    /// TTL in days, when it was expressed that way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_days: Option<u64>,
    /// Type hint (`null` when unset)
    #[serde(rename = "type")]
    pub channel_type: Option<String>,
    /// Item size hint
    #[serde(rename = "contentSizeKB")]
    pub content_size_kb: u64,
    /// Peak request rate hint
    pub peak_request_rate_seconds: u64,
    /// TTL in milliseconds
    pub ttl_millis: u64,
    /// Description (`null` when unset)
    pub description: Option<String>,
    /// Storage mode, only when the caller chose one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageMode>,
}

impl ChannelDocument {
    /// Build the document for a stored channel
    pub fn new(config: &ChannelConfig, links: &ChannelLinks) -> Self {
        Self {
            links: links.into(),
            name: config.name.to_string(),
            creation_date: config.creation_date.to_rfc3339(),
            ttl_days: config.ttl_days,
            channel_type: config.channel_type.clone(),
            content_size_kb: config.content_size_kb,
            peak_request_rate_seconds: config.peak_request_rate_seconds,
            ttl_millis: config.ttl_millis,
            description: config.description.clone(),
            storage: config.storage,
        }
    }

    /// Value for the `Location` header of a create response
    pub fn location(&self) -> &str {
        &self.links.self_link.href
    }
}

/// `_links` of an inserted item document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedItemLinks {
    /// Owning channel
    pub channel: Href,
    /// The new item
    #[serde(rename = "self")]
    pub self_link: Href,
}

/// Body returned by an append
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedItemDocument {
    /// Hypermedia links
    #[serde(rename = "_links")]
    pub links: InsertedItemLinks,
    /// RFC3339 insertion time
    pub timestamp: String,
}

impl InsertedItemDocument {
    /// Build the document for a freshly appended item
    pub fn new(item: &Item, channel_uri: &str, item_uri: &str) -> Self {
        Self {
            links: InsertedItemLinks {
                channel: channel_uri.into(),
                self_link: item_uri.into(),
            },
            timestamp: item.inserted_at().to_rfc3339(),
        }
    }

    /// URI of the new item
    pub fn location(&self) -> &str {
        &self.links.self_link.href
    }
}

/// `_links` of a page of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// The page itself
    #[serde(rename = "self")]
    pub self_link: Href,
    /// The page before this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Href>,
    /// The page after this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Href>,
    /// Item URIs, ascending
    pub uris: Vec<String>,
}

/// A page of items from a count or time query
///
/// Only the links are serialized; `items` carries the records for callers
/// that render bulk bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDocument {
    /// Hypermedia links and item URIs
    #[serde(rename = "_links")]
    pub links: PageLinks,
    /// The items, ascending
    #[serde(skip)]
    pub items: Vec<Item>,
}

impl PageDocument {
    /// URIs of the page's items, in order
    pub fn uris(&self) -> &[String] {
        &self.links.uris
    }

    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `next` href, if any
    pub fn next_uri(&self) -> Option<&str> {
        self.links.next.as_ref().map(|href| href.href.as_str())
    }

    /// `previous` href, if any
    pub fn previous_uri(&self) -> Option<&str> {
        self.links.previous.as_ref().map(|href| href.href.as_str())
    }
}

/// An item read back with its live links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResponse {
    /// The stored item
    pub item: Item,
    /// Links resolved at read time
    pub links: ItemLinks,
}

impl ItemResponse {
    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.item.payload
    }

    /// Content type recorded at append
    pub fn content_type(&self) -> &str {
        &self.item.content_type
    }

    /// `Link` header value
    pub fn link_header(&self) -> Option<String> {
        self.links.link_header()
    }
}
