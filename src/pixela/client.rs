// src/pixela/client.rs — Chart service client (Pixela-style REST API)
//
// Every mutating endpoint answers with an {"isSuccess": ..., "message": ...}
// envelope; a false isSuccess becomes HabitgramError::Service carrying the
// service's own message.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::infra::errors::{HabitgramError, Result};
use crate::pixela::types::{slug_id, Color, GraphDef, PixelEntry, Quantity, ValueKind};
use crate::pixela::ChartService;
use crate::util::date_to_token;

pub struct PixelaClient {
    client: Client,
    base_url: String,
    service_token: String,
    name_prefix: String,
}

impl PixelaClient {
    pub fn new(base_url: String, service_token: String, name_prefix: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token,
            name_prefix,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Remote username derived from the display name chosen in chat.
    fn remote_username(&self, name: &str) -> String {
        format!("{}{}", self.name_prefix, name.to_lowercase())
    }
}

// -- Wire types --

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "isSuccess", default)]
    is_success: bool,
    message: Option<String>,
}

impl ApiEnvelope {
    fn into_result(self) -> Result<()> {
        if self.is_success {
            Ok(())
        } else {
            Err(HabitgramError::Service(
                self.message.unwrap_or_else(|| "unknown service error".into()),
            ))
        }
    }
}

#[derive(Deserialize)]
struct WireGraph {
    id: String,
    name: String,
    unit: String,
    #[serde(rename = "type")]
    kind: String,
    color: String,
}

impl WireGraph {
    fn into_def(self) -> Result<GraphDef> {
        let value_kind = ValueKind::parse_wire(&self.kind).ok_or_else(|| {
            HabitgramError::Service(format!("unknown chart value type '{}'", self.kind))
        })?;
        let color = Color::parse_wire(&self.color).ok_or_else(|| {
            HabitgramError::Service(format!("unknown chart color '{}'", self.color))
        })?;
        Ok(GraphDef {
            id: self.id,
            name: self.name,
            unit: self.unit,
            value_kind,
            color,
        })
    }
}

#[derive(Deserialize)]
struct GraphsResponse {
    graphs: Option<Vec<WireGraph>>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct WirePixel {
    date: String,
    quantity: String,
}

#[derive(Deserialize)]
struct PixelsResponse {
    pixels: Option<Vec<WirePixel>>,
    message: Option<String>,
}

fn parse_pixel(wire: WirePixel) -> Result<PixelEntry> {
    let date = crate::util::token_to_date(&wire.date).ok_or_else(|| {
        HabitgramError::Service(format!("malformed entry date '{}'", wire.date))
    })?;
    let quantity = Quantity::parse(&wire.quantity).ok_or_else(|| {
        HabitgramError::Service(format!("malformed entry quantity '{}'", wire.quantity))
    })?;
    Ok(PixelEntry { date, quantity })
}

#[async_trait]
impl ChartService for PixelaClient {
    async fn create_user(&self, name: &str) -> Result<(String, String)> {
        let username = self.remote_username(name);
        let body = serde_json::json!({
            "token": self.service_token,
            "username": username,
            "agreeTermsOfService": "yes",
            "notMinor": "yes",
        });

        let resp: ApiEnvelope = self
            .client
            .post(self.url("users"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()?;
        Ok((self.service_token.clone(), username))
    }

    async fn delete_user(&self, token: &str, username: &str) -> Result<()> {
        let resp: ApiEnvelope = self
            .client
            .delete(self.url(&format!("users/{username}")))
            .header("X-USER-TOKEN", token)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    async fn create_chart(
        &self,
        token: &str,
        username: &str,
        name: &str,
        unit: &str,
        kind: ValueKind,
        color: Color,
    ) -> Result<String> {
        let id = slug_id(name);
        let body = serde_json::json!({
            "id": id,
            "name": name,
            "unit": unit,
            "type": kind.as_wire(),
            "color": color.as_wire(),
        });

        let resp: ApiEnvelope = self
            .client
            .post(self.url(&format!("users/{username}/graphs")))
            .header("X-USER-TOKEN", token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()?;
        Ok(id)
    }

    async fn get_chart(&self, token: &str, username: &str, chart: &str) -> Result<GraphDef> {
        let resp = self
            .client
            .get(self.url(&format!("users/{username}/graphs/{chart}/graph-def")))
            .header("X-USER-TOKEN", token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let envelope: ApiEnvelope = resp.json().await?;
            return Err(HabitgramError::Service(
                envelope
                    .message
                    .unwrap_or_else(|| "chart not found".into()),
            ));
        }
        let wire: WireGraph = resp.json().await?;
        wire.into_def()
    }

    async fn list_charts(&self, token: &str, username: &str) -> Result<Vec<GraphDef>> {
        let resp: GraphsResponse = self
            .client
            .get(self.url(&format!("users/{username}/graphs")))
            .header("X-USER-TOKEN", token)
            .send()
            .await?
            .json()
            .await?;

        match resp.graphs {
            Some(graphs) => graphs.into_iter().map(WireGraph::into_def).collect(),
            None => Err(HabitgramError::Service(
                resp.message.unwrap_or_else(|| "could not list charts".into()),
            )),
        }
    }

    async fn update_chart(&self, token: &str, username: &str, def: &GraphDef) -> Result<()> {
        let body = serde_json::json!({
            "name": def.name,
            "unit": def.unit,
            "type": def.value_kind.as_wire(),
            "color": def.color.as_wire(),
        });

        let resp: ApiEnvelope = self
            .client
            .put(self.url(&format!("users/{username}/graphs/{}", def.id)))
            .header("X-USER-TOKEN", token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    async fn delete_chart(&self, token: &str, username: &str, chart: &str) -> Result<()> {
        let resp: ApiEnvelope = self
            .client
            .delete(self.url(&format!("users/{username}/graphs/{chart}")))
            .header("X-USER-TOKEN", token)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    async fn chart_url(&self, username: &str, chart: &str) -> Result<String> {
        let url = self.url(&format!("users/{username}/graphs/{chart}.html?mode=simple"));
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            Ok(url)
        } else {
            Err(HabitgramError::Service(format!(
                "chart page unavailable ({})",
                resp.status()
            )))
        }
    }

    async fn list_entries(
        &self,
        token: &str,
        username: &str,
        chart: &str,
    ) -> Result<Vec<PixelEntry>> {
        let resp: PixelsResponse = self
            .client
            .get(self.url(&format!(
                "users/{username}/graphs/{chart}/pixels?withBody=true"
            )))
            .header("X-USER-TOKEN", token)
            .send()
            .await?
            .json()
            .await?;

        // An empty list is a valid answer; only a missing field is an error.
        match resp.pixels {
            Some(pixels) => pixels.into_iter().map(parse_pixel).collect(),
            None => Err(HabitgramError::Service(
                resp.message
                    .unwrap_or_else(|| "could not list entries".into()),
            )),
        }
    }

    async fn create_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()> {
        let body = serde_json::json!({
            "date": date_to_token(date),
            "quantity": quantity.to_string(),
        });

        let resp: ApiEnvelope = self
            .client
            .post(self.url(&format!("users/{username}/graphs/{chart}")))
            .header("X-USER-TOKEN", token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    async fn update_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()> {
        let body = serde_json::json!({
            "quantity": quantity.to_string(),
        });

        let resp: ApiEnvelope = self
            .client
            .put(self.url(&format!(
                "users/{username}/graphs/{chart}/{}",
                date_to_token(date)
            )))
            .header("X-USER-TOKEN", token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }

    async fn delete_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
    ) -> Result<()> {
        let resp: ApiEnvelope = self
            .client
            .delete(self.url(&format!(
                "users/{username}/graphs/{chart}/{}",
                date_to_token(date)
            )))
            .header("X-USER-TOKEN", token)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }
}
