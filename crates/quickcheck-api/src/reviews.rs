//! Handlers for guest feedback.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/review-requests` | Most recent first |
//! | `GET`  | `/reviews` | |
//! | `POST` | `/reviews` | Body: [`NewReview`]; 422 for ratings outside 1 to 5 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quickcheck_core::{
  model::{NewReview, Review, ReviewRequest},
  notify::Notifier,
  store::LedgerStore,
};

use crate::{LedgerState, error::ApiError};

/// `GET /review-requests`
pub async fn list_requests<S, N>(
  State(ledger): LedgerState<S, N>,
) -> Result<Json<Vec<ReviewRequest>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.review_requests().await?))
}

/// `GET /reviews`
pub async fn list<S, N>(State(ledger): LedgerState<S, N>) -> Result<Json<Vec<Review>>, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  Ok(Json(ledger.reviews().await?))
}

/// `POST /reviews`
pub async fn submit<S, N>(
  State(ledger): LedgerState<S, N>,
  Json(body): Json<NewReview>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
  N: Notifier,
{
  let review = ledger.submit_review(body).await?;
  Ok((StatusCode::CREATED, Json(review)))
}
