use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::{info, warn};

use super::BoardGateway;
use crate::config::LeanKitSettings;
use crate::error::GatewayError;
use crate::model::card::{BoardSummary, Card, LaneSummary, NamedRef};

pub struct LeanKitGateway {
    base_url: String,
    board_id: String,
    page_size: u32,
    auth_header: String,
    client: reqwest::Client,
}

impl LeanKitGateway {
    pub fn new(settings: LeanKitSettings) -> Self {
        let creds = format!("{}:{}", settings.username, settings.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: format!("https://{}.leankit.com/io", settings.host),
            board_id: settings.board_id,
            page_size: settings.page_size,
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("LeanKit API request failed")?
            .error_for_status()
            .context("LeanKit API returned an error")?;
        resp.json().await.context("Failed to parse LeanKit response")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Board {
    #[serde(default)]
    card_types: Vec<BoardCardType>,
    #[serde(default)]
    lanes: Vec<BoardLane>,
    #[serde(default)]
    users: Vec<BoardUser>,
}

#[derive(Deserialize)]
struct BoardCardType {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardLane {
    id: String,
    name: String,
    #[serde(default)]
    card_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardUser {
    id: String,
    full_name: String,
}

#[derive(Deserialize)]
struct CardPage {
    #[serde(rename = "pageMeta", default)]
    page_meta: Option<PageMeta>,
    cards: Vec<Card>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    #[serde(default)]
    total_records: usize,
}

impl CardPage {
    /// Number of board cards left out of this page, when the board reports a total.
    fn missing(&self) -> Option<usize> {
        let total = self.page_meta.as_ref()?.total_records;
        (total > self.cards.len()).then(|| total - self.cards.len())
    }

    fn into_cards(self) -> Vec<Card> {
        if let Some(missing) = self.missing() {
            warn!(
                returned = self.cards.len(),
                missing,
                "board has more cards than one page holds, raise leankit.page_size"
            );
        }
        self.cards
    }
}

impl From<Board> for BoardSummary {
    fn from(b: Board) -> Self {
        BoardSummary {
            card_types: b
                .card_types
                .into_iter()
                .map(|c| NamedRef { id: c.id, name: c.name })
                .collect(),
            lanes: b
                .lanes
                .into_iter()
                .map(|l| LaneSummary {
                    id: l.id,
                    name: l.name,
                    card_count: l.card_count,
                })
                .collect(),
            users: b
                .users
                .into_iter()
                .map(|u| NamedRef {
                    id: u.id,
                    name: u.full_name,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl BoardGateway for LeanKitGateway {
    async fn fetch_board_summary(&self) -> Result<BoardSummary, GatewayError> {
        info!("getting board info...");
        let url = format!("{}/board/{}", self.base_url, self.board_id);
        let board: Board = self
            .get(&url)
            .await
            .map_err(|e| GatewayError::read("fetch board", e))?;
        Ok(board.into())
    }

    async fn fetch_cards(&self) -> Result<Vec<Card>, GatewayError> {
        info!("getting cards...");
        let url = format!(
            "{}/board/{}/card?offset=0&limit={}",
            self.base_url, self.board_id, self.page_size
        );
        let page: CardPage = self
            .get(&url)
            .await
            .map_err(|e| GatewayError::read("fetch cards", e))?;
        Ok(page.into_cards())
    }
}
