use crate::domain::lists::driven_ports::ListSource;
use crate::domain::owner::driven_ports::{OwnerReader, OwnerWriter};
use crate::domain::owner::driving_ports::{OwnerError, OwnerPort};
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_owner_driven_ports::DbOwnerStore;
use crate::persistence::wunderlist_driven_ports::WunderlistClient;
use crate::routing_utils::{
    Json, JsonErrorResponse, NoSessionResponse, OwnerErrorResponse, ValidationErrorResponse,
};
use crate::session::{self, Session};
use crate::{AppState, SharedData, domain, dto, views};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{ErrorResponse, Html};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(owner_lists, update_public_lists))]
/// Defines the OpenAPI spec for the signed-in owner's endpoints
pub struct SettingsApi;

/// Used to group owner endpoints together in the OpenAPI documentation
pub const SETTINGS_API_GROUP: &str = "Settings";

/// Routes for the home screen and everything the signed-in owner manages
pub fn settings_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState, jar: CookieJar| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let owner_service = domain::owner::OwnerService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);
                let current = session::current_session(&jar, &app_state.config.session_secret);

                home(current, &mut ext_cxn, &owner_service, &owner_store, &list_source).await
            }),
        )
        .route("/faq", get(|| async { Html(views::faq_page()) }))
        .route(
            "/api/lists",
            get(|State(app_state): AppState, jar: CookieJar| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let owner_service = domain::owner::OwnerService {};
                let owner_store = DbOwnerStore {};
                let list_source = WunderlistClient::new(&app_state.config.wunderlist);
                let current = session::current_session(&jar, &app_state.config.session_secret);

                owner_lists(current, &mut ext_cxn, &owner_service, &owner_store, &list_source).await
            }),
        )
        .route(
            "/update",
            post(
                |State(app_state): AppState,
                 jar: CookieJar,
                 body: Result<Json<dto::owner::UpdatePublicLists>, JsonErrorResponse>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService {};
                    let owner_store = DbOwnerStore {};
                    let current =
                        session::current_session(&jar, &app_state.config.session_secret);

                    let update = body.map(|Json(update)| update);

                    update_public_lists(current, update, &mut ext_cxn, &owner_service, &owner_store)
                        .await
                },
            ),
        )
}

/// Landing page for visitors, settings screen for a signed-in owner
async fn home(
    current: Option<Session>,
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Html<String> {
    let Some(current) = current else {
        return Html(views::landing_page());
    };

    info!("Rendering settings for owner {}", current.wid);
    match owner_service
        .settings(&current.wid, ext_cxn, owner_read, list_source)
        .await
    {
        Ok(settings) => Html(views::settings_page(&current.name, &current.wid, Some(&settings))),
        Err(OwnerError::OwnerDoesNotExist) => {
            info!("Session names unknown owner {}, showing landing page", current.wid);
            Html(views::landing_page())
        }
        Err(OwnerError::PortError(err)) => {
            error!("Could not load settings for owner {}: {err:#}", current.wid);
            Html(views::settings_page(&current.name, &current.wid, None))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/lists",
    tag = SETTINGS_API_GROUP,
    responses(
        (status = 200, description = "Every list of the signed-in owner and which are public", body = dto::owner::OwnerLists),
        (status = 401, description = "No session exists", body = crate::routing_utils::NoSessionBody),
        (status = 500, description = "Upstream or store failure", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Lists and folders of the signed-in owner along with their visibility map
async fn owner_lists(
    current: Option<Session>,
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
    owner_read: &impl OwnerReader,
    list_source: &impl ListSource,
) -> Result<Json<dto::owner::OwnerLists>, ErrorResponse> {
    let current = current.ok_or(NoSessionResponse)?;
    info!("Owner {} requested their lists", current.wid);

    let settings = owner_service
        .settings(&current.wid, ext_cxn, owner_read, list_source)
        .await
        .map_err(OwnerErrorResponse::from)?;

    Ok(Json(settings.into()))
}

#[utoipa::path(
    post,
    path = "/update",
    tag = SETTINGS_API_GROUP,
    request_body = dto::owner::UpdatePublicLists,
    responses(
        (status = 200, description = "Visibility map replaced"),
        (status = 400, description = "A list id isn't numeric or the body is malformed", body = crate::routing_utils::BasicErrorResponse),
        (status = 401, description = "No session exists", body = crate::routing_utils::NoSessionBody),
        (status = 500, description = "Store failure", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Replaces the signed-in owner's whole visibility map. The session is checked before the body.
async fn update_public_lists(
    current: Option<Session>,
    update: Result<dto::owner::UpdatePublicLists, JsonErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
    owner_write: &impl OwnerWriter,
) -> Result<StatusCode, ErrorResponse> {
    let current = current.ok_or(NoSessionResponse)?;
    info!("Owner {} is updating their public lists", current.wid);
    let update = update?;
    update.validate().map_err(ValidationErrorResponse::from)?;

    owner_service
        .update_public_lists(&current.wid, &update.public_lists, ext_cxn, owner_write)
        .await
        .map_err(OwnerErrorResponse::from)?;

    Ok(StatusCode::OK)
}
