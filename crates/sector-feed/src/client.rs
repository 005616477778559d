//! Feed client for the traffic snapshot and sector boundaries.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use sector_core::{GroupConfig, SectorIndex, TrafficFeed};

use crate::source::Source;

const USER_AGENT: &str = concat!("sector-occupancy/", env!("CARGO_PKG_VERSION"));

/// Loads both feeds for one cycle.
pub struct FeedClient {
    client: Client,
    traffic: Source,
    sectors: Source,
}

impl FeedClient {
    pub fn new(traffic: Source, sectors: Source, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            traffic,
            sectors,
        })
    }

    pub fn traffic_source(&self) -> &Source {
        &self.traffic
    }

    pub fn sector_source(&self) -> &Source {
        &self.sectors
    }

    /// Fetch the live traffic snapshot. Malformed pilot records are skipped.
    pub async fn fetch_traffic(&self) -> Result<TrafficFeed> {
        let payload = self.traffic.load_json(&self.client).await?;
        if payload.get("pilots").is_none() {
            tracing::warn!("Traffic feed {} has no pilots list", self.traffic);
        }
        Ok(TrafficFeed::from_value(&payload))
    }

    /// Fetch and index the sector boundary collection.
    pub async fn fetch_sectors(&self, perimeter_designator: &str) -> Result<SectorIndex> {
        let payload = self.sectors.load_json(&self.client).await?;
        let index = SectorIndex::from_geojson(&payload, perimeter_designator)
            .with_context(|| format!("Invalid sector feed {}", self.sectors))?;
        if index.is_empty() {
            tracing::warn!(
                "Sector feed {} lists no sectors; every aircraft will be dropped",
                self.sectors
            );
        } else if index.perimeter_polygon().is_none() {
            tracing::warn!(
                "Sector feed has no usable `{}` perimeter; near-perimeter admission disabled",
                perimeter_designator
            );
        }
        Ok(index)
    }
}

/// Load a custom group file from disk.
pub async fn load_groups(path: &Path) -> Result<GroupConfig> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read group file {}", path.display()))?;
    GroupConfig::from_json_str(&raw)
        .with_context(|| format!("Invalid group file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_temp(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        tokio::fs::write(&path, body).await.unwrap();
        path
    }

    #[tokio::test]
    async fn loads_both_feeds_from_files() {
        let traffic = write_temp(
            "traffic.json",
            r#"{ "pilots": [
                { "callsign": "AAL1", "latitude": 29.5, "longitude": -95.5, "altitude": 30000, "heading": 90, "groundspeed": 450 },
                { "callsign": "BAD", "latitude": "nope" }
            ], "controllers": [ { "callsign": "HOU_48_CTR" } ] }"#,
        )
        .await;
        let sectors = write_temp(
            "sectors.json",
            r#"{ "features": [
                { "properties": { "sector": "ZHU", "specialty": "" },
                  "geometry": { "type": "Polygon", "coordinates": [[[-97,28],[-93,28],[-93,32],[-97,32],[-97,28]]] } },
                { "properties": { "sector": "46", "specialty": "LOW", "floor": 0, "ceiling": 40000 },
                  "geometry": { "type": "Polygon", "coordinates": [[[-96,29],[-95,29],[-95,30],[-96,30],[-96,29]]] } }
            ] }"#,
        )
        .await;

        let client = FeedClient::new(
            Source::File(traffic.clone()),
            Source::File(sectors.clone()),
            Duration::from_secs(5),
        )
        .unwrap();

        let feed = client.fetch_traffic().await.unwrap();
        assert_eq!(feed.pilots.len(), 1);
        assert_eq!(feed.enroute_controllers("HOU").len(), 1);

        let index = client.fetch_sectors("zhu").await.unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.perimeter_polygon().is_some());

        tokio::fs::remove_file(traffic).await.unwrap();
        tokio::fs::remove_file(sectors).await.unwrap();
    }

    #[tokio::test]
    async fn sector_feed_without_features_is_rejected() {
        let sectors = write_temp("no-features.json", r#"{ "type": "FeatureCollection" }"#).await;
        let client = FeedClient::new(
            Source::File(sectors.clone()),
            Source::File(sectors.clone()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.fetch_sectors("zhu").await.is_err());
        tokio::fs::remove_file(sectors).await.unwrap();
    }

    #[tokio::test]
    async fn empty_sector_feed_loads_as_empty_index() {
        let sectors = write_temp("empty-features.json", r#"{ "features": [] }"#).await;
        let client = FeedClient::new(
            Source::File(sectors.clone()),
            Source::File(sectors.clone()),
            Duration::from_secs(5),
        )
        .unwrap();
        let index = client.fetch_sectors("zhu").await.unwrap();
        assert!(index.is_empty());
        assert!(index.perimeter_polygon().is_none());
        tokio::fs::remove_file(sectors).await.unwrap();
    }

    #[tokio::test]
    async fn group_file_validation() {
        let good = write_temp("groups-good.json", r#"{ "West": ["46", "47"] }"#).await;
        let bad = write_temp("groups-bad.json", r#"{ "West": "46" }"#).await;

        let config = load_groups(&good).await.unwrap();
        assert_eq!(config.groups()[0].name, "West");
        assert!(load_groups(&bad).await.is_err());

        tokio::fs::remove_file(good).await.unwrap();
        tokio::fs::remove_file(bad).await.unwrap();
    }
}
