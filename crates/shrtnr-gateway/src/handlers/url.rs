use crate::error::{AppError, Result};
use crate::model::{ShortenForm, ShortenResponse, StatsResponse};
use crate::state::AppState;
use crate::verify::{redirect_target, verify_url};
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use shrtnr_core::{ShortCode, ShortenParams};
use tracing::{debug, info, warn};

pub async fn shorten_handler(
    State(state): State<AppState>,
    Form(form): Form<ShortenForm>,
) -> Result<Json<ShortenResponse>> {
    let original_url = form.input_url;
    if original_url.is_empty() {
        debug!("rejecting empty url");
        return Err(AppError::EmptyUrl);
    }

    if let Err(e) = verify_url(&original_url) {
        debug!(url = %original_url, error = %e, "rejecting invalid url");
        return Err(e.into());
    }

    let params =
        ShortenParams::new(original_url.clone()).with_domain_tag(state.use_domain_tag());
    let code = state.shortener().shorten(params).await?;
    info!(code = %code, url = %original_url, "shortened url");

    // The count is informational; a failure is logged and reported as zero.
    let total_mappings = state
        .shortener()
        .total_mappings()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to count mappings");
            0
        });

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&code),
        short_code: code.to_string(),
        original_url,
        total_mappings,
    }))
}

pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let Ok(code) = ShortCode::new(&id) else {
        debug!(code = %id, "malformed short code");
        return Err(AppError::NotFound(id));
    };

    let url = state.shortener().resolve(&code).await.map_err(|e| {
        if e.is_not_found() {
            info!(code = %code, "short code not found");
        }
        AppError::from(e)
    })?;

    Ok(Redirect::permanent(&redirect_target(&url)))
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let total_mappings = state.shortener().total_mappings().await?;
    Ok(Json(StatsResponse { total_mappings }))
}
