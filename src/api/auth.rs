use crate::app_env::AppConfig;
use crate::domain::owner::driven_ports::{OwnerWriter, TokenExchange};
use crate::domain::owner::driving_ports::OwnerPort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_owner_driven_ports::DbOwnerStore;
use crate::persistence::wunderlist_driven_ports::WunderlistClient;
use crate::routing_utils::GenericErrorResponse;
use crate::{AppState, SharedData, domain, session};
use anyhow::anyhow;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{ErrorResponse, Redirect};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

/// Routes for signing owners in and out
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/login",
            get(|State(app_state): AppState| async move { login(&app_state.config) }),
        )
        .route(
            "/callback",
            get(
                |State(app_state): AppState, jar: CookieJar, Query(params): Query<CallbackParams>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let owner_service = domain::owner::OwnerService {};
                    let exchange = WunderlistClient::new(&app_state.config.wunderlist);
                    let owner_store = DbOwnerStore {};

                    callback(
                        params,
                        jar,
                        &app_state.config,
                        &mut ext_cxn,
                        &owner_service,
                        &exchange,
                        &owner_store,
                    )
                    .await
                },
            ),
        )
        .route("/logout", get(logout))
        .route(
            "/profile",
            get(|State(app_state): AppState, jar: CookieJar| async move {
                profile(&jar, &app_state.config)
            }),
        )
}

#[derive(Deserialize, Debug, Default)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Sends the owner to Wunderlist to authorize us. Outside production it skips straight to the
/// callback, which signs in the local owner.
fn login(config: &AppConfig) -> Result<Redirect, ErrorResponse> {
    if !config.production {
        info!("Development login requested");
        return Ok(Redirect::to("/callback"));
    }

    let Some(state) = config.oauth_state.as_deref() else {
        error!("Login requested but no OAuth state is configured");
        return Err(GenericErrorResponse(anyhow!("OAuth state is not configured")).into());
    };

    let authorize_url = WunderlistClient::new(&config.wunderlist)
        .authorize_url(&config.wunderlist.callback_url, state)
        .map_err(|err| GenericErrorResponse(anyhow!(err).context("building authorize URL")))?;

    info!("Redirecting to Wunderlist for authorization");
    Ok(Redirect::to(authorize_url.as_str()))
}

/// Completes a login. Only a matching state reaches the token exchange.
async fn callback(
    params: CallbackParams,
    jar: CookieJar,
    config: &AppConfig,
    ext_cxn: &mut impl ExternalConnectivity,
    owner_service: &impl OwnerPort,
    exchange: &impl TokenExchange,
    owner_write: &impl OwnerWriter,
) -> Result<(CookieJar, Redirect), ErrorResponse> {
    let state_matches = config.oauth_state.is_some() && params.state == config.oauth_state;

    let login_result = if state_matches {
        let code = params
            .code
            .ok_or_else(|| GenericErrorResponse(anyhow!("callback is missing the code")))?;
        info!("Completing Wunderlist login");
        owner_service
            .login(&code, &mut *ext_cxn, exchange, owner_write)
            .await
    } else if !config.production {
        info!("Logging in locally as {}", config.local_login);
        owner_service
            .login_locally(&config.local_login, &mut *ext_cxn, owner_write)
            .await
    } else {
        error!("OAuth state mismatch on callback");
        return Err(GenericErrorResponse(anyhow!("OAuth state did not match")).into());
    };

    let owner = login_result.map_err(|err| {
        error!("Login failed: {err:#}");
        GenericErrorResponse(err)
    })?;

    let jar = session::start_session(jar, &owner, config)
        .map_err(|err| GenericErrorResponse(anyhow!(err).context("starting session")))?;
    info!("Owner {} signed in", owner.wid);

    Ok((jar, Redirect::to("/")))
}

async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (session::end_session(jar), Redirect::to("/"))
}

/// The owner's own public page, or the login flow for anonymous visitors
fn profile(jar: &CookieJar, config: &AppConfig) -> Redirect {
    match session::current_session(jar, &config.session_secret) {
        Some(current) => Redirect::to(&format!("/user/{}/lists", current.wid)),
        None => Redirect::to("/login"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_env::test::test_config;
    use crate::domain::owner::driving_ports::OwnerError;
    use crate::domain::owner::test_util::{
        FakeTokenExchange, InMemoryOwnerPersistence, MockOwnerService, owner_login,
        owner_with_public,
    };
    use crate::external_connections::test_util::FakeExternalConnectivity;
    use crate::session::SESSION_COOKIE;
    use axum::http::StatusCode;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::response::{IntoResponse, Response};
    use speculoos::prelude::*;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    fn has_session_cookie(response: &Response) -> bool {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.starts_with(&format!("{SESSION_COOKIE}=")))
    }

    mod login {
        use super::*;

        #[test]
        fn production_redirects_to_wunderlist() {
            let response = login(&test_config(true)).into_response();

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location(&response))
                .starts_with("http://localhost:1/oauth/authorize?client_id=client-id");
            assert_that!(location(&response)).contains("state=expected-state");
        }

        #[test]
        fn development_goes_straight_to_callback() {
            let response = login(&test_config(false)).into_response();

            assert_eq!("/callback", location(&response));
        }

        #[test]
        fn production_without_state_fails() {
            let mut config = test_config(true);
            config.oauth_state = None;

            let response = login(&config).into_response();
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        }
    }

    mod callback {
        use super::*;

        fn params(code: &str, state: &str) -> CallbackParams {
            CallbackParams {
                code: Some(code.to_owned()),
                state: Some(state.to_owned()),
            }
        }

        #[tokio::test]
        async fn matching_state_logs_in_and_sets_session() {
            let mut owner_service_raw = MockOwnerService::new();
            owner_service_raw
                .login_result
                .set_returned_result(Ok(owner_with_public("42", &[])));
            let owner_service = std::sync::Mutex::new(owner_service_raw);
            let mut ext_cxn = FakeExternalConnectivity::new();

            let response = callback(
                params("the-code", "expected-state"),
                CookieJar::new(),
                &test_config(true),
                &mut ext_cxn,
                &owner_service,
                &FakeTokenExchange::accepting("the-code", owner_login("42")),
                &InMemoryOwnerPersistence::new_locked(),
            )
            .await
            .into_response();

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_eq!("/", location(&response));
            assert!(has_session_cookie(&response));

            let locked_service = owner_service.lock().expect("owner service mutex poisoned");
            assert_eq!(locked_service.login_result.calls(), ["the-code".to_owned()]);
        }

        #[tokio::test]
        async fn wrong_state_in_production_never_creates_session() {
            let owner_service = MockOwnerService::new_locked();
            let mut ext_cxn = FakeExternalConnectivity::new();

            let response = callback(
                params("the-code", "forged-state"),
                CookieJar::new(),
                &test_config(true),
                &mut ext_cxn,
                &owner_service,
                &FakeTokenExchange::accepting("the-code", owner_login("42")),
                &InMemoryOwnerPersistence::new_locked(),
            )
            .await
            .into_response();

            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
            assert!(!has_session_cookie(&response));

            let locked_service = owner_service.lock().expect("owner service mutex poisoned");
            assert!(locked_service.login_result.calls().is_empty());
            assert!(locked_service.login_locally_result.calls().is_empty());
        }

        #[tokio::test]
        async fn wrong_state_in_development_logs_in_locally() {
            let mut owner_service_raw = MockOwnerService::new();
            owner_service_raw
                .login_locally_result
                .set_returned_result(Ok(owner_with_public("local", &[])));
            let owner_service = std::sync::Mutex::new(owner_service_raw);
            let mut ext_cxn = FakeExternalConnectivity::new();
            let config = test_config(false);

            let response = callback(
                CallbackParams::default(),
                CookieJar::new(),
                &config,
                &mut ext_cxn,
                &owner_service,
                &FakeTokenExchange::accepting("the-code", owner_login("42")),
                &InMemoryOwnerPersistence::new_locked(),
            )
            .await
            .into_response();

            assert_eq!("/", location(&response));
            assert!(has_session_cookie(&response));

            let locked_service = owner_service.lock().expect("owner service mutex poisoned");
            assert_eq!(
                locked_service.login_locally_result.calls(),
                [config.local_login.clone()]
            );
        }

        #[tokio::test]
        async fn failed_exchange_sets_no_session() {
            let mut owner_service_raw = MockOwnerService::new();
            owner_service_raw
                .login_result
                .set_returned_result(Err(OwnerError::PortError(anyhow!("code rejected"))));
            let owner_service = std::sync::Mutex::new(owner_service_raw);
            let mut ext_cxn = FakeExternalConnectivity::new();

            let response = callback(
                params("bad-code", "expected-state"),
                CookieJar::new(),
                &test_config(true),
                &mut ext_cxn,
                &owner_service,
                &FakeTokenExchange::accepting("the-code", owner_login("42")),
                &InMemoryOwnerPersistence::new_locked(),
            )
            .await
            .into_response();

            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
            assert!(!has_session_cookie(&response));
        }

        #[tokio::test]
        async fn real_service_persists_the_owner() {
            let persistence = InMemoryOwnerPersistence::new_locked();
            let mut ext_cxn = FakeExternalConnectivity::new();

            let response = callback(
                params("the-code", "expected-state"),
                CookieJar::new(),
                &test_config(true),
                &mut ext_cxn,
                &domain::owner::OwnerService {},
                &FakeTokenExchange::accepting("the-code", owner_login("42")),
                &persistence,
            )
            .await
            .into_response();

            assert!(has_session_cookie(&response));
            let stored = persistence.read().expect("owner persistence rwlock poisoned");
            assert_that!(stored.owners).has_length(1);
            assert_eq!("42", stored.owners[0].wid);
        }
    }

    mod profile {
        use super::*;

        #[test]
        fn anonymous_visitor_goes_to_login() {
            let redirect = profile(&CookieJar::new(), &test_config(false)).into_response();

            assert_eq!("/login", location(&redirect));
        }

        #[test]
        fn owner_goes_to_their_public_page() {
            let config = test_config(false);
            let jar = session::start_session(CookieJar::new(), &owner_with_public("42", &[]), &config)
                .expect("session should start");

            let redirect = profile(&jar, &config).into_response();
            assert_eq!("/user/42/lists", location(&redirect));
        }
    }

    #[tokio::test]
    async fn logout_clears_the_session_cookie() {
        let config = test_config(false);
        let jar = session::start_session(CookieJar::new(), &owner_with_public("42", &[]), &config)
            .expect("session should start");

        let (jar, redirect) = logout(jar).await;
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert_eq!("/", location(&redirect.into_response()));
    }
}
