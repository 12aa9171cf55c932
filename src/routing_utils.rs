use crate::domain::owner::driving_ports::OwnerError;
use crate::domain::public::BrowseError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::Serialize;
use tracing::{error, info};
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToSchema, openapi};
use validator::ValidationErrors;

/// Body of every public 404, whether the owner, the list or the task is missing or hidden
pub const NOT_FOUND_TEXT: &str = "list not found or not public";

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
pub struct BasicErrorResponse {
    #[schema(example = "internal_error")]
    pub error_code: String,
    #[schema(example = "Could not retrieve data to complete your request")]
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response for anything that went wrong in a driven port. The full error chain goes back
/// to the caller as `extra_info`.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not retrieve data to complete your request".into(),
                extra_info: Some(ExtraInfo::Message(format!("{:#}", self.0))),
            }),
        )
            .into_response()
    }
}

/// Plain-text 404 for hidden or missing public content
pub struct NotFoundResponse;

impl IntoResponse for NotFoundResponse {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, NOT_FOUND_TEXT).into_response()
    }
}

/// Wrapper for [axum::extract::Query] where a missing or unreadable parameter is a plain 404,
/// the same as a list which isn't public
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(NotFoundResponse))]
pub struct Query<T>(pub T);

impl From<QueryRejection> for NotFoundResponse {
    fn from(value: QueryRejection) -> Self {
        info!("Rejected public query: {}", value.body_text());
        NotFoundResponse
    }
}

/// Returned when a route needs a session and the request has none
pub struct UnauthorizedResponse(pub &'static str);

impl IntoResponse for UnauthorizedResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(BasicErrorResponse {
                error_code: "unauthorized".into(),
                error_description: self.0.into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct NoSessionBody {
    #[schema(example = "No session exists")]
    pub message: String,
}

/// 401 for owner-only routes called without a valid session cookie
pub struct NoSessionResponse;

impl IntoResponse for NoSessionResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(NoSessionBody {
                message: "No session exists".into(),
            }),
        )
            .into_response()
    }
}

/// Turns the outcome of a public lookup into a 404 or a 500
pub struct BrowseErrorResponse(pub BrowseError);

impl IntoResponse for BrowseErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            BrowseError::NotFoundOrPrivate => NotFoundResponse.into_response(),
            BrowseError::PortError(err) => {
                error!("Public lookup failed: {err:#}");
                GenericErrorResponse(err).into_response()
            }
        }
    }
}

impl From<BrowseError> for BrowseErrorResponse {
    fn from(value: BrowseError) -> Self {
        Self(value)
    }
}

/// Owner operations only run for a signed-in session, so a missing owner means the session
/// is stale
pub struct OwnerErrorResponse(pub OwnerError);

impl IntoResponse for OwnerErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            OwnerError::OwnerDoesNotExist => {
                UnauthorizedResponse("Session refers to an unknown owner").into_response()
            }
            OwnerError::PortError(err) => {
                error!("Owner operation failed: {err:#}");
                GenericErrorResponse(err).into_response()
            }
        }
    }
}

impl From<OwnerError> for OwnerErrorResponse {
    fn from(value: OwnerError) -> Self {
        Self(value)
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
