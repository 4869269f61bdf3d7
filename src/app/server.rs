use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, Json};
use axum::routing::get;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::cache::{Rendered, ResponseCache};
use crate::app::error::ApiError;
use crate::app::model::{InstitutionsResponse, ReloadResponse, ViewQuery};
use crate::app::snapshot::CatalogSnapshot;
use crate::catalog::{Catalog, Institution, Semester};
use crate::error::CatalogError;
use crate::query;
use crate::render::{self, HomeStatus};

#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<CatalogSnapshot>,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(snapshot: Arc<CatalogSnapshot>, cache: Arc<ResponseCache>) -> Self {
        Self { snapshot, cache }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/listar-ies", get(list_institutions))
        .route("/recarregar-dados", get(reload_page).post(reload_json))
        .route("/:institution", get(institution_content))
        .route("/:institution/:semester", get(semester_content))
        .fallback(|| async { ApiError::unknown_endpoint() })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let catalog = state.snapshot.current();
    if !catalog.is_empty() {
        return Html(render::home_page(&catalog, HomeStatus::Loaded));
    }

    let source = state.snapshot.source();
    let located = match source.locate().await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(?err, "workbook lookup failed");
            None
        }
    };
    let status = match &located {
        Some(path) => HomeStatus::WorkbookFound(path),
        None => HomeStatus::NoWorkbook {
            dir: source.location(),
        },
    };
    Html(render::home_page(&catalog, status))
}

async fn list_institutions(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Rendered, ApiError> {
    let key = cache_key(&uri);
    if let Some(hit) = state.cache.get(&key) {
        return Ok(hit);
    }

    let catalog = state.snapshot.current();
    if catalog.is_empty() {
        return Err(CatalogError::NoDataLoaded.into());
    }
    let rendered = to_json(&InstitutionsResponse {
        institutions: catalog.institution_names(),
    })?;

    state.cache.insert(key, rendered.clone());
    Ok(rendered)
}

async fn institution_content(
    State(state): State<AppState>,
    Path(institution): Path<String>,
    Query(view): Query<ViewQuery>,
    uri: Uri,
) -> Result<Rendered, ApiError> {
    let key = cache_key(&uri);
    if let Some(hit) = state.cache.get(&key) {
        return Ok(hit);
    }

    let catalog = state.snapshot.current();
    lookup_institution(&catalog, &institution)?;
    let projected = query::project(&catalog, Some(&institution), None);
    let rendered = if view.wants_html() {
        match projected.institution(&institution) {
            Some(found) => Rendered::Html(render::institution_page(&institution, found)),
            None => return Err(CatalogError::InstitutionNotFound(institution).into()),
        }
    } else {
        to_json(&projected)?
    };

    state.cache.insert(key, rendered.clone());
    Ok(rendered)
}

async fn semester_content(
    State(state): State<AppState>,
    Path((institution, semester)): Path<(String, String)>,
    Query(view): Query<ViewQuery>,
    uri: Uri,
) -> Result<Rendered, ApiError> {
    let key = cache_key(&uri);
    if let Some(hit) = state.cache.get(&key) {
        return Ok(hit);
    }

    let catalog = state.snapshot.current();
    lookup_semester(&catalog, &institution, &semester)?;
    let projected = query::project(&catalog, Some(&institution), Some(&semester));
    let rendered = if view.wants_html() {
        let subjects = projected
            .institution(&institution)
            .and_then(|i| i.semester(&semester))
            .map(|s| s.subjects.as_slice())
            .unwrap_or_default();
        Rendered::Html(render::semester_page(&institution, &semester, subjects))
    } else {
        to_json(&projected)?
    };

    state.cache.insert(key, rendered.clone());
    Ok(rendered)
}

async fn reload_json(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let report = state.snapshot.reload().await?;
    Ok(Json(report.into()))
}

async fn reload_page(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match state.snapshot.reload().await {
        Ok(report) => (
            StatusCode::OK,
            Html(render::reload_success_page(
                &report.workbook,
                &report.institutions,
            )),
        ),
        Err(err) => {
            let err = ApiError::from(err);
            (err.status(), Html(render::reload_error_page(err.message())))
        }
    }
}

fn lookup_institution<'a>(
    catalog: &'a Catalog,
    name: &str,
) -> Result<&'a Institution, CatalogError> {
    if catalog.is_empty() {
        return Err(CatalogError::NoDataLoaded);
    }
    catalog
        .institution(name)
        .ok_or_else(|| CatalogError::InstitutionNotFound(name.to_owned()))
}

fn lookup_semester<'a>(
    catalog: &'a Catalog,
    institution: &str,
    semester: &str,
) -> Result<&'a Semester, CatalogError> {
    lookup_institution(catalog, institution)?
        .semester(semester)
        .ok_or_else(|| CatalogError::SemesterNotFound {
            institution: institution.to_owned(),
            semester: semester.to_owned(),
        })
}

fn cache_key(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned())
}

fn to_json<T: Serialize>(value: &T) -> Result<Rendered, ApiError> {
    serde_json::to_string(value)
        .map(Rendered::Json)
        .map_err(|err| ApiError::internal(format!("serialize response: {err}")))
}
