use utoipa::OpenApi;

pub mod lists;
pub mod owner;

#[derive(OpenApi)]
#[openapi(components(schemas(
    lists::List,
    lists::Folder,
    lists::Task,
    lists::Subtask,
    owner::OwnerLists,
    owner::UpdatePublicLists,
    owner::PublicListing,
    owner::ListTasks,
    owner::TaskInfo,
    crate::routing_utils::BasicErrorResponse,
    crate::routing_utils::ExtraInfo,
    crate::routing_utils::ValidationErrorSchema,
    crate::routing_utils::NoSessionBody,
)))]
/// Captures OpenAPI schemas and canned responses defined in the DTO module
pub struct OpenApiSchemas;
