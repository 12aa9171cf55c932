use crate::domain::lists::driven_ports::ListSource;
use crate::domain::owner::driven_ports::OwnerReader;
use crate::domain::public::driving_ports::PublicBrowsePort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_owner_driven_ports::DbOwnerStore;
use crate::persistence::wunderlist_driven_ports::WunderlistClient;
use crate::routing_utils::{BrowseErrorResponse, Json, Query};
use crate::{AppState, SharedData, domain, dto, views};
use axum::Router;
use axum::extract::{Path, State};
use axum::response::{ErrorResponse, Html};
use axum::routing::get;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi};

#[derive(OpenApi)]
#[openapi(paths(public_lists_json, tasks_json, task_info_json))]
/// Defines the OpenAPI spec for anonymous read-only endpoints
pub struct PublicApi;

/// Used to group public endpoints together in the OpenAPI documentation
pub const PUBLIC_API_GROUP: &str = "Public";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    /// Wunderlist id of the owner
    wid: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    wid: String,
    /// Id of one of the owner's lists
    lid: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    wid: String,
    lid: String,
    /// Id of a task on that list
    tid: String,
}

/// Routes anyone can visit. All of them 404 unless the owner made the list public.
pub fn public_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/user/:wid/lists",
            get(|State(app_state): AppState, Path(wid): Path<String>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let browse_service = domain::public::PublicBrowseService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                lists_page(&wid, &mut ext_cxn, &browse_service, &owner_store, &list_source).await
            }),
        )
        .route(
            "/user/:wid/lists/:lid",
            get(
                |State(app_state): AppState, Path((wid, lid)): Path<(String, String)>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let browse_service = domain::public::PublicBrowseService {};
                    let owner_store = DbOwnerStore {};
                    let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                    list_page(&wid, &lid, &mut ext_cxn, &browse_service, &owner_store, &list_source)
                        .await
                },
            ),
        )
        .route(
            "/user/:wid/lists/:lid/task/:tid",
            get(
                |State(app_state): AppState,
                 Path((wid, lid, tid)): Path<(String, String, String)>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let browse_service = domain::public::PublicBrowseService {};
                    let owner_store = DbOwnerStore {};
                    let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                    task_page(
                        &wid,
                        &lid,
                        &tid,
                        &mut ext_cxn,
                        &browse_service,
                        &owner_store,
                        &list_source,
                    )
                    .await
                },
            ),
        )
        .route(
            "/api/public_lists",
            get(|State(app_state): AppState, Query(query): Query<OwnerQuery>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let browse_service = domain::public::PublicBrowseService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                public_lists_json(&query.wid, &mut ext_cxn, &browse_service, &owner_store, &list_source)
                    .await
            }),
        )
        .route(
            "/api/tasks",
            get(|State(app_state): AppState, Query(query): Query<ListQuery>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let browse_service = domain::public::PublicBrowseService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                tasks_json(&query, &mut ext_cxn, &browse_service, &owner_store, &list_source).await
            }),
        )
        .route(
            "/api/task_info",
            get(|State(app_state): AppState, Query(query): Query<TaskQuery>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let browse_service = domain::public::PublicBrowseService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);

                task_info_json(&query, &mut ext_cxn, &browse_service, &owner_store, &list_source)
                    .await
            }),
        )
}

async fn lists_page(
    wid: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Html<String>, ErrorResponse> {
    info!("Public lists page for owner {wid}");
    let listing = browse
        .public_lists(wid, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Html(views::lists_page(wid, &listing)))
}

async fn list_page(
    wid: &str,
    list_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Html<String>, ErrorResponse> {
    info!("Public list page {list_id} for owner {wid}");
    let (owner_name, list_with_tasks) = browse
        .tasks(wid, list_id, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Html(views::list_page(wid, &owner_name, &list_with_tasks)))
}

async fn task_page(
    wid: &str,
    list_id: &str,
    task_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Html<String>, ErrorResponse> {
    info!("Public task page {task_id} on list {list_id} for owner {wid}");
    let detail = browse
        .task_detail(wid, list_id, task_id, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Html(views::task_page(wid, &detail)))
}

#[utoipa::path(
    get,
    path = "/api/public_lists",
    tag = PUBLIC_API_GROUP,
    params(OwnerQuery),
    responses(
        (status = 200, description = "The owner's name and their public lists", body = dto::owner::PublicListing),
        (status = 404, description = "Unknown owner", body = String, example = json!("list not found or not public")),
        (status = 500, description = "Upstream or store failure", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Only the lists an owner has flagged public
async fn public_lists_json(
    wid: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Json<dto::owner::PublicListing>, ErrorResponse> {
    info!("Public lists requested for owner {wid}");
    let listing = browse
        .public_lists(wid, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Json(listing.into()))
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = PUBLIC_API_GROUP,
    params(ListQuery),
    responses(
        (status = 200, description = "The list with its tasks, subtasks and notes", body = dto::owner::ListTasks),
        (status = 404, description = "List is missing or not public", body = String, example = json!("list not found or not public")),
        (status = 500, description = "Upstream or store failure", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Tasks of a public list
async fn tasks_json(
    query: &ListQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Json<dto::owner::ListTasks>, ErrorResponse> {
    info!("Tasks requested for list {} of owner {}", query.lid, query.wid);
    let (_, list_with_tasks) = browse
        .tasks(&query.wid, &query.lid, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Json(list_with_tasks.into()))
}

#[utoipa::path(
    get,
    path = "/api/task_info",
    tag = PUBLIC_API_GROUP,
    params(TaskQuery),
    responses(
        (status = 200, description = "The task with its subtasks and note", body = dto::owner::TaskInfo),
        (status = 404, description = "Task is missing, on another list, or not public", body = String, example = json!("list not found or not public")),
        (status = 500, description = "Upstream or store failure", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// A single task on a public list
async fn task_info_json(
    query: &TaskQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    browse: &impl PublicBrowsePort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Json<dto::owner::TaskInfo>, ErrorResponse> {
    info!(
        "Task {} requested on list {} of owner {}",
        query.tid, query.lid, query.wid
    );
    let task = browse
        .task_info(&query.wid, &query.lid, &query.tid, ext_cxn, owner_read, list_source)
        .await
        .map_err(BrowseErrorResponse::from)?;

    Ok(Json(dto::owner::TaskInfo { task: task.into() }))
}
