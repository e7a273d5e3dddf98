//! Handlers for `/reports/chart` — the admin analytics feeds.
//!
//! Each chart type maps to one aggregate query and is shaped for a
//! chart.js-style consumer: `{"labels": […], "datasets": [{…}]}`.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use dojang_core::store::ClubStore;

use crate::{AppState, auth::AdminPrincipal, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ChartParams {
  #[serde(rename = "type")]
  pub chart_type: String,
}

/// `GET /reports/chart?type=trainee_growth|belt_distribution|payment_status`
pub async fn chart<S>(
  State(state): State<AppState<S>>,
  _admin: AdminPrincipal,
  Query(params): Query<ChartParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: ClubStore + 'static,
{
  match params.chart_type.as_str() {
    "trainee_growth" => {
      let points = state
        .store
        .trainee_growth(Utc::now().date_naive())
        .await?;
      let labels: Vec<&str> =
        points.iter().map(|p| p.label.as_str()).collect();
      let data: Vec<u32> = points.iter().map(|p| p.count).collect();
      Ok(Json(json!({
        "labels": labels,
        "datasets": [{
          "label": "Total Trainees",
          "data": data,
          "fill": false,
        }],
      })))
    }
    "belt_distribution" => {
      let counts = state.store.belt_distribution().await?;
      let labels: Vec<&str> =
        counts.iter().map(|c| c.belt_name.as_str()).collect();
      let data: Vec<u32> = counts.iter().map(|c| c.count).collect();
      // Spread hues along the ladder like the reference dashboard.
      let colors: Vec<String> = counts
        .iter()
        .map(|c| format!("hsl({}, 70%, 50%)", c.order * 45 % 360))
        .collect();
      Ok(Json(json!({
        "labels": labels,
        "datasets": [{
          "label": "Trainees per Belt",
          "data": data,
          "backgroundColor": colors,
        }],
      })))
    }
    "payment_status" => {
      let counts = state.store.payment_status_counts().await?;
      Ok(Json(json!({
        "labels": ["Paid", "Pending"],
        "datasets": [{ "data": [counts.paid, counts.pending] }],
      })))
    }
    other => {
      Err(ApiError::BadRequest(format!("invalid chart type: {other:?}")))
    }
  }
}
