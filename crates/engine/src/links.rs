//! Link resolution
//!
//! Links are never stored. Every call reads the sequencer's index as it is
//! now, so a `next` link appears as soon as a later item lands and a
//! `previous` link disappears as soon as the older item is evicted.
//!
//! ## URI layout
//!
//! ```text
//! {base}/channel/{name}
//! {base}/channel/{name}/latest
//! {base}/channel/{name}/earliest
//! ws://{host}/channel/{name}/ws
//! {base}/channel/{name}/{yyyy}/{MM}/{dd}/{HH}/{mm}/{ss}/{SSS}/{counter}
//! {item}/next/{count}
//! {item}/previous/{count}
//! {base}/channel/{name}/earliest/{count}
//! {base}/channel/{name}/latest/{count}
//! {base}/channel/{name}/{yyyy}/{MM}/{dd}[/{HH}[/{mm}[/{ss}]]]
//! ```

use std::sync::Arc;

use channelhub_core::{Direction, Item, Result, SequenceKey, TimeBucket};

use crate::sequencer::ItemSequencer;

/// Links of a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLinks {
    /// The channel itself
    pub self_uri: String,
    /// Redirects to the newest item
    pub latest: String,
    /// Redirects to the oldest surviving item
    pub earliest: String,
    /// Live item stream
    pub ws: String,
}

/// Links of one item, as of the moment they were resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLinks {
    /// The item itself
    pub self_uri: String,
    /// Strictly older neighbour
    pub previous: Option<String>,
    /// Strictly newer neighbour
    pub next: Option<String>,
    /// Newest item of the channel
    pub latest: String,
}

impl ItemLinks {
    /// `Link` header value, or `None` when the item has no neighbours
    pub fn link_header(&self) -> Option<String> {
        let parts: Vec<String> = [("previous", &self.previous), ("next", &self.next)]
            .into_iter()
            .filter_map(|(rel, uri)| uri.as_ref().map(|uri| format!("<{}>;rel=\"{}\"", uri, rel)))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Builds URIs and resolves item links against the live index
pub struct LinkResolver {
    base_uri: String,
    sequencer: Arc<ItemSequencer>,
}

impl LinkResolver {
    /// Create a resolver; a trailing slash on `base_uri` is ignored
    pub fn new(base_uri: &str, sequencer: Arc<ItemSequencer>) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            sequencer,
        }
    }

    /// Base URI without trailing slash
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `{base}/channel/{name}`
    pub fn channel_uri(&self, channel: &str) -> String {
        format!("{}/channel/{}", self.base_uri, channel)
    }

    /// URI of one item
    pub fn item_uri(&self, channel: &str, key: &SequenceKey) -> String {
        format!("{}/{}", self.channel_uri(channel), key.to_path())
    }

    /// `{channel}/latest`
    pub fn latest_uri(&self, channel: &str) -> String {
        format!("{}/latest", self.channel_uri(channel))
    }

    /// `{channel}/earliest`
    pub fn earliest_uri(&self, channel: &str) -> String {
        format!("{}/earliest", self.channel_uri(channel))
    }

    /// `{item}/next/{count}` or `{item}/previous/{count}`
    pub fn walk_uri(
        &self,
        channel: &str,
        key: &SequenceKey,
        direction: Direction,
        count: usize,
    ) -> String {
        let step = match direction {
            Direction::Next => "next",
            Direction::Previous => "previous",
        };
        format!("{}/{}/{}", self.item_uri(channel, key), step, count)
    }

    /// `{channel}/earliest/{count}`
    pub fn earliest_page_uri(&self, channel: &str, count: usize) -> String {
        format!("{}/{}", self.earliest_uri(channel), count)
    }

    /// `{channel}/latest/{count}`
    pub fn latest_page_uri(&self, channel: &str, count: usize) -> String {
        format!("{}/{}", self.latest_uri(channel), count)
    }

    /// `{channel}/{yyyy}/{MM}/{dd}...` down to the bucket's unit
    pub fn time_uri(&self, channel: &str, bucket: &TimeBucket) -> String {
        format!("{}/{}", self.channel_uri(channel), bucket.to_path())
    }

    /// WebSocket form of `{channel}/ws`
    pub fn ws_uri(&self, channel: &str) -> String {
        let http = format!("{}/ws", self.channel_uri(channel));
        if let Some(rest) = http.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = http.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            http
        }
    }

    /// All links of a channel
    pub fn channel_links(&self, channel: &str) -> ChannelLinks {
        ChannelLinks {
            self_uri: self.channel_uri(channel),
            latest: self.latest_uri(channel),
            earliest: self.earliest_uri(channel),
            ws: self.ws_uri(channel),
        }
    }

    /// Resolve self/previous/next/latest for `item`
    ///
    /// `latest` falls back to the channel's `/latest` URI if the log was
    /// emptied between the item read and this call.
    pub fn resolve(&self, item: &Item) -> Result<ItemLinks> {
        let channel = item.channel.as_str();
        let neighbour = |direction| -> Result<Option<String>> {
            Ok(self
                .sequencer
                .adjacent(channel, &item.key, direction)?
                .map(|found| self.item_uri(channel, &found.key)))
        };

        let latest = match self.sequencer.latest(channel)? {
            Some(newest) => self.item_uri(channel, &newest.key),
            None => self.latest_uri(channel),
        };

        Ok(ItemLinks {
            self_uri: self.item_uri(channel, &item.key),
            previous: neighbour(Direction::Previous)?,
            next: neighbour(Direction::Next)?,
            latest,
        })
    }
}
