//! HTTP handlers for rendered pages.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::AppState;
use crate::errors::Result;

/// Render the upload form landing page
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let template = state.templates.get_template("index.html")?;
    let page = template.render(minijinja::context! {})?;
    Ok(Html(page))
}
