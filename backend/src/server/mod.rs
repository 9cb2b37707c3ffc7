//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
pub(crate) use metrics::build_metrics;
#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use taskflow::Trace;
use taskflow::domain::TRACE_ID_HEADER;
#[cfg(debug_assertions)]
use taskflow::doc::ApiDoc;
use taskflow::domain::chat::ChatService;
use taskflow::domain::ports::{ConversationRepository, TaskRepository};
use taskflow::domain::tasks::TaskService;
use taskflow::inbound::http::chat;
use taskflow::inbound::http::health::{HealthState, live, ready};
use taskflow::inbound::http::state::HttpState;
use taskflow::inbound::http::tasks::{self, query_config};
use taskflow::outbound::memory::{InMemoryConversationRepository, InMemoryTaskRepository};
use taskflow::outbound::persistence::{DieselConversationRepository, DieselTaskRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Pick the task store: PostgreSQL when a pool is configured, otherwise an
/// in-memory map that lives as long as the process. Conversations follow the
/// same choice.
fn build_task_repository(config: &ServerConfig) -> Arc<dyn TaskRepository> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => {
            info!("tasks are persisted in PostgreSQL");
            Arc::new(DieselTaskRepository::new(pool.clone(), clock))
        }
        None => {
            warn!("no database configured; tasks are kept in memory and lost on restart");
            Arc::new(InMemoryTaskRepository::new(clock))
        }
    }
}

fn build_conversation_repository(config: &ServerConfig) -> Arc<dyn ConversationRepository> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => Arc::new(DieselConversationRepository::new(pool.clone(), clock)),
        None => Arc::new(InMemoryConversationRepository::new(clock)),
    }
}

fn build_http_state(config: &ServerConfig) -> HttpState {
    let service = Arc::new(TaskService::new(build_task_repository(config)));
    let chat = Arc::new(ChatService::new(
        service.clone(),
        service.clone(),
        build_conversation_repository(config),
    ));
    HttpState::new(
        service.clone(),
        service,
        chat.clone(),
        chat,
        config.tokens.clone(),
    )
}

/// Credentialed CORS for the configured browser origins.
///
/// Wildcards are never used; the frontend sends bearer tokens and reads the
/// `Location` and trace headers.
fn build_cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION.as_str(), TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(3600)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors: Cors,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api")
        .configure(tasks::configure)
        .configure(chat::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(query_config())
        .wrap(cors)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        bind_addr,
        cors_origins,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(
            server_health_state.clone(),
            http_state.clone(),
            build_cors(&cors_origins),
        );

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, ORIGIN,
    };
    use actix_web::http::{Method, StatusCode};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;
    use taskflow::test_support::{bearer_for, test_tokens};

    fn in_memory_config() -> ServerConfig {
        let addr = "127.0.0.1:0".parse().expect("loopback address");
        ServerConfig::new(addr, test_tokens())
    }

    fn test_app(
        config: &ServerConfig,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let state = web::Data::new(build_http_state(config));
        build_app(health, state, build_cors(&config.cors_origins))
    }

    #[actix_web::test]
    async fn app_serves_tasks_and_health_checks() {
        let app = actix_test::init_service(test_app(&in_memory_config())).await;

        let create = actix_test::TestRequest::post()
            .uri("/api/alice/tasks")
            .insert_header((AUTHORIZATION, bearer_for(&test_tokens(), "alice")))
            .set_json(json!({ "title": "Buy groceries" }))
            .to_request();
        let created = actix_test::call_service(&app, create).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        assert!(created.headers().contains_key(TRACE_ID_HEADER));

        let ready_check = actix_test::TestRequest::get().uri("/health/ready").to_request();
        let readiness = actix_test::call_service(&app, ready_check).await;
        assert_eq!(readiness.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn app_serves_the_chat_assistant() {
        let app = actix_test::init_service(test_app(&in_memory_config())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/alice/chat")
            .insert_header((AUTHORIZATION, bearer_for(&test_tokens(), "alice")))
            .set_json(json!({ "message": "add task buy milk" }))
            .to_request();
        let reply: serde_json::Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            reply.get("response"),
            Some(&json!("Task 'buy milk' added successfully."))
        );

        let listing = actix_test::TestRequest::get()
            .uri("/api/alice/tasks")
            .insert_header((AUTHORIZATION, bearer_for(&test_tokens(), "alice")))
            .to_request();
        let tasks: serde_json::Value = actix_test::call_and_read_body_json(&app, listing).await;
        let title = tasks.get(0).and_then(|task| task.get("title"));
        assert_eq!(title, Some(&json!("buy milk")));
    }

    #[actix_web::test]
    async fn unknown_owner_paths_require_a_token() {
        let app = actix_test::init_service(test_app(&in_memory_config())).await;

        let request = actix_test::TestRequest::get().uri("/api/alice/tasks").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn preflight(origin: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/alice/tasks")
            .insert_header((ORIGIN, origin))
            .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "POST"))
    }

    #[rstest]
    #[case("http://localhost:3000")]
    #[case("https://todo.example.com")]
    #[actix_web::test]
    async fn preflight_from_allowed_origin_is_answered(#[case] origin: &str) {
        let config = in_memory_config().with_cors_origins(vec![
            "http://localhost:3000".to_owned(),
            "https://todo.example.com".to_owned(),
        ]);
        let app = actix_test::init_service(test_app(&config)).await;

        let response = actix_test::call_service(&app, preflight(origin).to_request()).await;
        assert!(response.status().is_success());
        let allowed = response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok());
        assert_eq!(allowed, Some(origin));
    }

    #[actix_web::test]
    async fn preflight_from_unknown_origin_gets_no_allow_header() {
        let app = actix_test::init_service(test_app(&in_memory_config())).await;

        let request = preflight("https://evil.example").to_request();
        let outcome = actix_test::try_call_service(&app, request).await;
        if let Ok(response) = outcome {
            assert!(!response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        }
    }
}
