//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the task, chat and health endpoints, the error envelope
//! schemas and the bearer-token security scheme. The document is served by
//! Swagger UI in debug builds and printed by the `openapi-dump` binary.

use crate::inbound::http::chat::{
    ChatPayload, ChatResponse, MessageResponse, ToolCallResponse,
};
use crate::inbound::http::health::{HealthReport, Phase};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::tasks::{CompletionPayload, TaskPayload, TaskResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SECURITY_SCHEME: &str = "BearerToken";

/// Adds the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SECURITY_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 token whose `sub` claim is the owner id in the request path.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Taskflow API",
        description = "Owner-scoped task lists behind bearer-token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::list_tasks,
        crate::inbound::http::tasks::get_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::toggle_completion,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::chat::send_message,
        crate::inbound::http::chat::list_messages,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        TaskPayload,
        CompletionPayload,
        TaskResponse,
        ChatPayload,
        ChatResponse,
        MessageResponse,
        ToolCallResponse,
        HealthReport,
        Phase
    )),
    tags(
        (name = "tasks", description = "Create, read, update and delete an owner's tasks"),
        (name = "chat", description = "Rule-based assistant that manages tasks from chat messages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
