//! Project API routes

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use sitelayer::{document::to_json, prelude::Page};
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::{ValidJson, ValidQuery};
use crate::filter::ProjectQuery;
use crate::model::Project;
use crate::state::AppState;

/// Create the projects router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_projects).post(create_project))
}

/// Store a new project and return it with its generated id
async fn create_project(
    State(state): State<AppState>,
    ValidJson(project): ValidJson<Project>,
) -> Result<Json<Value>> {
    project.validate()?;

    let created = state
        .store()
        .collection_for::<Project>()
        .create_typed(&project)
        .await?;

    info!(id = created.get_str("id").unwrap_or_default(), name = %project.name, "created project");
    Ok(Json(to_json(&created)?))
}

/// List one page of projects matching the query string
async fn list_projects(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ProjectQuery>,
) -> Result<Json<Page<Value>>> {
    let filter = params.filter();
    let pagination = params.pagination();
    debug!(?filter, page = pagination.page, page_size = pagination.page_size, "listing projects");

    let projects = state.store().collection_for::<Project>();
    let items = projects
        .list(filter.clone(), pagination.limit(), pagination.offset(), Vec::new())
        .await?;
    let total = projects.count(filter.as_ref()).await?;

    let page = Page::new(items, total, &pagination).try_map(|document| to_json(&document))?;
    Ok(Json(page))
}
