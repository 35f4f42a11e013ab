//! HTTP track resolver
//!
//! Talks to a NeteaseCloudMusicApi-compatible server:
//! - `/song/url?id&br` - stream URL
//! - `/lyric?id` - primary, translated and romanized lyrics
//! - `/personal_fm` - personal radio batch
//! - `/fm_trash?id` - radio dislike
//! - `/song/detail?ids` - track metadata

use super::{LyricText, StreamInfo, TrackResolver};
use crate::error::{Error, Result};
use crate::track::{Album, Artist, Track, TrackId};
use async_trait::async_trait;
use nwp_common::{time, QualityTier};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// `/song/url` response
#[derive(Debug, Deserialize)]
struct SongUrlResponse {
    #[serde(default)]
    data: Vec<SongUrlEntry>,
}

#[derive(Debug, Deserialize)]
struct SongUrlEntry {
    url: Option<String>,
    br: Option<u32>,
}

/// `/lyric` response; each channel is optional
#[derive(Debug, Default, Deserialize)]
struct LyricResponse {
    lrc: Option<LyricChannel>,
    tlyric: Option<LyricChannel>,
    romalrc: Option<LyricChannel>,
}

#[derive(Debug, Deserialize)]
struct LyricChannel {
    lyric: Option<String>,
}

impl LyricResponse {
    fn into_text(self) -> Option<LyricText> {
        fn text(channel: Option<LyricChannel>) -> Option<String> {
            channel
                .and_then(|c| c.lyric)
                .filter(|l| !l.trim().is_empty())
        }

        let primary = text(self.lrc)?;
        Some(LyricText {
            primary,
            translated: text(self.tlyric),
            romanized: text(self.romalrc),
        })
    }
}

/// `/personal_fm` response
#[derive(Debug, Deserialize)]
struct RadioResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    data: Vec<RadioSong>,
}

#[derive(Debug, Deserialize)]
struct RadioSong {
    id: u64,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistDto>,
    album: Option<AlbumDto>,
    /// Milliseconds
    #[serde(default)]
    duration: u64,
}

/// `/song/detail` response
#[derive(Debug, Deserialize)]
struct SongDetailResponse {
    #[serde(default)]
    songs: Vec<SongDetail>,
}

#[derive(Debug, Deserialize)]
struct SongDetail {
    id: u64,
    name: String,
    #[serde(default)]
    ar: Vec<ArtistDto>,
    al: Option<AlbumDto>,
    /// Milliseconds
    #[serde(default)]
    dt: u64,
}

#[derive(Debug, Deserialize)]
struct ArtistDto {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumDto {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(rename = "picUrl")]
    pic_url: Option<String>,
}

impl From<ArtistDto> for Artist {
    fn from(dto: ArtistDto) -> Self {
        Artist {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<AlbumDto> for Album {
    fn from(dto: AlbumDto) -> Self {
        Album {
            id: dto.id,
            name: dto.name,
            artwork_url: dto.pic_url,
        }
    }
}

fn build_track(
    id: u64,
    title: String,
    artists: Vec<ArtistDto>,
    album: Option<AlbumDto>,
    duration_ms: u64,
) -> Track {
    let album: Album = album.map(Album::from).unwrap_or_default();
    Track {
        id,
        title,
        artists: artists.into_iter().map(Artist::from).collect(),
        artwork_url: album.artwork_url.clone(),
        album,
        duration_seconds: duration_ms as f64 / 1000.0,
    }
}

impl From<RadioSong> for Track {
    fn from(song: RadioSong) -> Self {
        build_track(song.id, song.name, song.artists, song.album, song.duration)
    }
}

impl From<SongDetail> for Track {
    fn from(song: SongDetail) -> Self {
        build_track(song.id, song.name, song.ar, song.al, song.dt)
    }
}

/// Resolver backed by the catalogue HTTP API
pub struct HttpTrackResolver {
    http_client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl HttpTrackResolver {
    pub fn new(base_url: impl Into<String>, cookie: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying catalogue API");

        let mut request = self.http_client.get(&url).query(query);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Http(format!(
                "{} returned {}: {}",
                path,
                status.as_u16(),
                error_text
            )));
        }

        Ok(response.json().await?)
    }
}

fn cache_buster() -> String {
    time::now().timestamp_millis().to_string()
}

#[async_trait]
impl TrackResolver for HttpTrackResolver {
    async fn resolve_stream(&self, id: TrackId, quality: QualityTier) -> Result<StreamInfo> {
        let response: SongUrlResponse = self
            .get(
                "/song/url",
                &[("id", id.to_string()), ("br", quality.bitrate().to_string())],
            )
            .await?;

        let entry = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::Resolution(format!("No stream entry for track {}", id)))?;

        match entry.url.filter(|u| !u.is_empty()) {
            Some(url) => {
                tracing::debug!(track_id = id, bitrate = ?entry.br, "Resolved stream URL");
                Ok(StreamInfo {
                    url,
                    bitrate: entry.br,
                })
            }
            None => Err(Error::Resolution(format!("No playable URL for track {}", id))),
        }
    }

    async fn fetch_lyrics(&self, id: TrackId) -> Result<Option<LyricText>> {
        let response: LyricResponse = self.get("/lyric", &[("id", id.to_string())]).await?;
        Ok(response.into_text())
    }

    async fn fetch_radio_batch(&self) -> Result<Vec<Track>> {
        let response: RadioResponse = self
            .get("/personal_fm", &[("timestamp", cache_buster())])
            .await?;
        if response.code != 200 && response.code != 0 {
            tracing::warn!(code = response.code, "Personal radio request rejected");
            return Ok(Vec::new());
        }
        Ok(response.data.into_iter().map(Track::from).collect())
    }

    async fn report_dislike(&self, id: TrackId) -> Result<()> {
        let _: serde_json::Value = self
            .get(
                "/fm_trash",
                &[("id", id.to_string()), ("timestamp", cache_buster())],
            )
            .await?;
        Ok(())
    }

    async fn fetch_track_detail(&self, id: TrackId) -> Result<Option<Track>> {
        let response: SongDetailResponse =
            self.get("/song/detail", &[("ids", id.to_string())]).await?;
        Ok(response.songs.into_iter().next().map(Track::from))
    }
}
