//! Tests for the chat HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test as actix_test};
use chrono::{TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::*;
use crate::domain::{ErrorCode, OwnerId};
use crate::domain::chat::{ChatService, ChatServiceError, ConversationId};
use crate::domain::ports::{
    ChatReply, MockChatCommand, MockChatQuery, MockTaskCommand, MockTaskQuery,
};
use crate::domain::tasks::{TaskListFilter, TaskService};
use crate::outbound::memory::{InMemoryConversationRepository, InMemoryTaskRepository};
use crate::test_support::{MutableClock, bearer_for, test_tokens};

struct Reply {
    status: StatusCode,
    body: web::Bytes,
}

impl Reply {
    fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    fn error(&self) -> DomainError {
        self.json()
    }
}

#[fixture]
fn state() -> web::Data<HttpState> {
    let start = Utc
        .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(start));
    let tasks = Arc::new(TaskService::new(Arc::new(InMemoryTaskRepository::new(
        Arc::clone(&clock),
    ))));
    let assistant = Arc::new(ChatService::new(
        tasks.clone(),
        tasks.clone(),
        Arc::new(InMemoryConversationRepository::new(clock)),
    ));
    web::Data::new(HttpState::new(
        tasks.clone(),
        tasks,
        assistant.clone(),
        assistant,
        test_tokens(),
    ))
}

fn mocked_state(chat: MockChatCommand, chat_query: MockChatQuery) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(MockTaskCommand::new()),
        Arc::new(MockTaskQuery::new()),
        Arc::new(chat),
        Arc::new(chat_query),
        test_tokens(),
    ))
}

async fn send(state: &web::Data<HttpState>, request: actix_test::TestRequest) -> Reply {
    let app = actix_test::init_service(
        App::new()
            .app_data(state.clone())
            .service(web::scope("/api").configure(configure)),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    Reply { status, body }
}

fn as_owner(request: actix_test::TestRequest, owner: &str) -> actix_test::TestRequest {
    request.insert_header((AUTHORIZATION, bearer_for(&test_tokens(), owner)))
}

async fn chat(state: &web::Data<HttpState>, owner: &str, body: serde_json::Value) -> Reply {
    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/{owner}/chat"))
        .set_json(body);
    send(state, as_owner(request, owner)).await
}

async fn history(state: &web::Data<HttpState>, owner: &str, path: &str) -> Reply {
    let request = actix_test::TestRequest::get().uri(&format!("/api/{path}"));
    send(state, as_owner(request, owner)).await
}

#[rstest]
#[actix_web::test]
async fn a_conversation_is_started_and_continued(state: web::Data<HttpState>) {
    let first = chat(&state, "alice", json!({ "message": "add task buy milk" })).await;
    assert_eq!(first.status, StatusCode::OK);
    let started: ChatResponse = first.json();
    assert_eq!(started.response, "Task 'buy milk' added successfully.");

    let second = chat(
        &state,
        "alice",
        json!({ "message": "list tasks", "conversation_id": started.conversation_id }),
    )
    .await;
    let continued: ChatResponse = second.json();
    assert_eq!(continued.conversation_id, started.conversation_id);
    assert!(continued.response.contains("buy milk (pending)"));

    let replay = history(
        &state,
        "alice",
        &format!("alice/chat/{}", started.conversation_id),
    )
    .await;
    assert_eq!(replay.status, StatusCode::OK);
    let messages: Vec<MessageResponse> = replay.json();
    let senders: Vec<&str> = messages.iter().map(|message| message.sender.as_str()).collect();
    assert_eq!(senders, ["user", "model", "user", "model"]);
    let tool = messages
        .get(1)
        .and_then(|message| message.tool_call.as_ref())
        .map(|tool| tool.name.as_str());
    assert_eq!(tool, Some("add_task"));
    assert_eq!(messages.first().map(|message| message.tool_call.is_none()), Some(true));
}

#[rstest]
#[actix_web::test]
async fn chat_changes_are_visible_to_the_task_endpoints(state: web::Data<HttpState>) {
    let added: ChatResponse = chat(&state, "alice", json!({ "message": "add task walk dog" }))
        .await
        .json();
    let listed: ChatResponse = chat(
        &state,
        "alice",
        json!({ "message": "list tasks", "conversation_id": added.conversation_id }),
    )
    .await
    .json();
    assert!(listed.response.starts_with("Here are your tasks: "));

    let tasks = state
        .tasks_query
        .list_tasks(
            &OwnerId::new("alice").expect("valid owner"),
            TaskListFilter::default(),
        )
        .await
        .expect("list succeeds");
    assert_eq!(
        tasks.iter().map(|task| task.title()).collect::<Vec<_>>(),
        ["walk dog"]
    );
}

#[rstest]
#[case(json!({}), "message", "missing_field")]
#[case(json!({ "message": null }), "message", "missing_field")]
#[case(json!({ "message": "   " }), "message", "empty")]
#[case(json!({ "message": "x".repeat(2001) }), "message", "too_long")]
#[case(json!({ "message": "hi", "conversation_id": 0 }), "conversation_id", "invalid_conversation_id")]
#[actix_web::test]
async fn invalid_chat_bodies_are_field_errors(
    state: web::Data<HttpState>,
    #[case] body: serde_json::Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let reply = chat(&state, "alice", body).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let error = reply.error();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details(), Some(&json!({ "field": field, "code": code })));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_bad_request(state: web::Data<HttpState>) {
    let request = actix_test::TestRequest::post()
        .uri("/api/alice/chat")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{bad");
    let reply = send(&state, as_owner(request, "alice")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn other_owners_conversations_are_not_found(state: web::Data<HttpState>) {
    let alices: ChatResponse = chat(&state, "alice", json!({ "message": "list tasks" }))
        .await
        .json();

    let continued = chat(
        &state,
        "bob",
        json!({ "message": "list tasks", "conversation_id": alices.conversation_id }),
    )
    .await;
    assert_eq!(continued.status, StatusCode::NOT_FOUND);
    assert_eq!(
        continued.error().details(),
        Some(&json!({ "conversationId": alices.conversation_id }))
    );

    let replay = history(&state, "bob", &format!("bob/chat/{}", alices.conversation_id)).await;
    assert_eq!(replay.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("/api/alice/chat/0")]
#[case("/api/alice/chat/abc")]
#[actix_web::test]
async fn bad_conversation_paths_are_rejected(state: web::Data<HttpState>, #[case] uri: &str) {
    let request = actix_test::TestRequest::get().uri(uri);
    let reply = send(&state, as_owner(request, "alice")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn foreign_owner_paths_are_forbidden_before_the_body_is_read() {
    let mut command = MockChatCommand::new();
    command.expect_send_message().never();
    let mut query = MockChatQuery::new();
    query.expect_conversation_messages().never();
    let state = mocked_state(command, query);

    let request = actix_test::TestRequest::post()
        .uri("/api/bob/chat")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{bad");
    let posted = send(&state, as_owner(request, "alice")).await;
    assert_eq!(posted.status, StatusCode::FORBIDDEN);

    let read = history(&state, "alice", "bob/chat/1").await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn chat_requires_a_token(state: web::Data<HttpState>) {
    let request = actix_test::TestRequest::post()
        .uri("/api/alice/chat")
        .set_json(json!({ "message": "list tasks" }));
    let reply = send(&state, request).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn storage_outages_are_service_unavailable() {
    let mut command = MockChatCommand::new();
    command.expect_send_message().times(1).return_once(|_| {
        Err(ChatServiceError::Storage {
            message: "pool timed out".to_owned(),
            retryable: true,
        })
    });
    let state = mocked_state(command, MockChatQuery::new());

    let reply = chat(&state, "alice", json!({ "message": "list tasks" })).await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
#[actix_web::test]
async fn requests_reach_the_port_with_parsed_fields() {
    let mut command = MockChatCommand::new();
    command
        .expect_send_message()
        .withf(|request| {
            request.owner_id.as_str() == "alice"
                && request.conversation_id.map(ConversationId::get) == Some(9)
                && request.message == "  complete task 3 "
        })
        .times(1)
        .return_once(|request| {
            Ok(ChatReply {
                conversation_id: request
                    .conversation_id
                    .expect("conversation id forwarded"),
                response: "Task 3 marked as completed.".to_owned(),
            })
        });
    let state = mocked_state(command, MockChatQuery::new());

    let reply = chat(
        &state,
        "alice",
        json!({ "message": "  complete task 3 ", "conversation_id": 9 }),
    )
    .await;
    assert_eq!(
        reply.json::<ChatResponse>(),
        ChatResponse {
            response: "Task 3 marked as completed.".to_owned(),
            conversation_id: 9,
        }
    );
}
