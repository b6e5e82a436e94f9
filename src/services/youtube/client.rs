//! Minimal YouTube Data API v3 client.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::bot::error::Error;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// `liveBroadcastContent` of a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastStatus {
    #[default]
    None,
    Upcoming,
    Live,
}

impl BroadcastStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "upcoming" => BroadcastStatus::Upcoming,
            "live" => BroadcastStatus::Live,
            _ => BroadcastStatus::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastStatus::None => "none",
            BroadcastStatus::Upcoming => "upcoming",
            BroadcastStatus::Live => "live",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    live_broadcast_content: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    scheduled_start_time: Option<DateTime<Utc>>,
}

/// Newest video on a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVideo {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub status: BroadcastStatus,
}

impl LatestVideo {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Channel returned by a handle search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMatch {
    pub channel_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn search(&self, params: &[(&str, &str)]) -> Result<SearchResponse, Error> {
        let response = self
            .http
            .get(format!("{}/search", API_BASE))
            .query(&[("part", "snippet"), ("maxResults", "1"), ("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::YouTube(format!("search returned {}: {}", status, body)));
        }

        Ok(response.json().await?)
    }

    /// Most recent video uploaded or scheduled on a channel
    pub async fn latest_video(&self, channel_id: &str) -> Result<Option<LatestVideo>, Error> {
        let response = self
            .search(&[("channelId", channel_id), ("order", "date"), ("type", "video")])
            .await?;

        debug!("YouTube search for {} returned {} items", channel_id, response.items.len());
        Ok(parse_latest_video(response))
    }

    /// Scheduled start of an upcoming premiere or stream
    pub async fn scheduled_start(&self, video_id: &str) -> Result<Option<DateTime<Utc>>, Error> {
        let response = self
            .http
            .get(format!("{}/videos", API_BASE))
            .query(&[
                ("part", "liveStreamingDetails"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let videos: VideosResponse = response.json().await?;

        Ok(videos
            .items
            .into_iter()
            .next()
            .and_then(|item| item.live_streaming_details)
            .and_then(|details| details.scheduled_start_time))
    }

    /// Best channel match for a handle or custom name
    pub async fn find_channel(&self, query: &str) -> Result<Option<ChannelMatch>, Error> {
        let response = self.search(&[("q", query), ("type", "channel")]).await?;
        Ok(parse_channel_match(response))
    }
}

fn parse_latest_video(response: SearchResponse) -> Option<LatestVideo> {
    response.items.into_iter().find_map(|item| {
        let video_id = item.id.video_id?;
        Some(LatestVideo {
            video_id,
            title: item.snippet.title,
            channel_title: item.snippet.channel_title,
            status: item
                .snippet
                .live_broadcast_content
                .as_deref()
                .map(BroadcastStatus::parse)
                .unwrap_or_default(),
        })
    })
}

fn parse_channel_match(response: SearchResponse) -> Option<ChannelMatch> {
    response.items.into_iter().find_map(|item| {
        let channel_id = item.id.channel_id?;
        Some(ChannelMatch {
            channel_id,
            title: item.snippet.title,
            thumbnail_url: item
                .snippet
                .thumbnails
                .and_then(|t| t.default)
                .map(|t| t.url),
        })
    })
}
