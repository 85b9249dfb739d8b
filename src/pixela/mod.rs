// src/pixela/mod.rs — Chart service seam

pub mod client;
pub mod types;

pub use client::PixelaClient;
pub use types::{slug_id, Color, GraphDef, PixelEntry, Quantity, ValueKind};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::infra::errors::Result;

/// Remote habit-chart service. All persistence and rendering of charts
/// lives behind this seam; failures carry a human-readable message.
#[async_trait]
pub trait ChartService: Send + Sync {
    /// Create a remote profile. Returns (token, username).
    async fn create_user(&self, name: &str) -> Result<(String, String)>;

    /// Delete a remote profile and everything under it.
    async fn delete_user(&self, token: &str, username: &str) -> Result<()>;

    /// Create a chart; returns its id (derived from the name).
    async fn create_chart(
        &self,
        token: &str,
        username: &str,
        name: &str,
        unit: &str,
        kind: ValueKind,
        color: Color,
    ) -> Result<String>;

    async fn get_chart(&self, token: &str, username: &str, chart: &str) -> Result<GraphDef>;

    async fn list_charts(&self, token: &str, username: &str) -> Result<Vec<GraphDef>>;

    async fn update_chart(&self, token: &str, username: &str, def: &GraphDef) -> Result<()>;

    async fn delete_chart(&self, token: &str, username: &str, chart: &str) -> Result<()>;

    /// URL of the service-rendered chart image page.
    async fn chart_url(&self, username: &str, chart: &str) -> Result<String>;

    async fn list_entries(
        &self,
        token: &str,
        username: &str,
        chart: &str,
    ) -> Result<Vec<PixelEntry>>;

    async fn create_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()>;

    async fn update_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()>;

    async fn delete_entry(
        &self,
        token: &str,
        username: &str,
        chart: &str,
        date: NaiveDate,
    ) -> Result<()>;
}
