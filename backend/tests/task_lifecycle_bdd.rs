//! Behaviour coverage for the owner-scoped task lifecycle over HTTP.
//!
//! Requests run against the real task service backed by the in-memory
//! repository and a settable clock, so timestamps are deterministic.

use std::future::Future;
use std::sync::{Arc, Mutex};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use taskflow::Trace;
use taskflow::domain::chat::ChatService;
use taskflow::domain::tasks::TaskService;
use taskflow::inbound::http::state::HttpState;
use taskflow::inbound::http::chat;
use taskflow::inbound::http::tasks::{self, query_config};
use taskflow::outbound::auth::JwtAccessTokens;
use taskflow::outbound::memory::{InMemoryConversationRepository, InMemoryTaskRepository};
use taskflow::test_support::{MutableClock, bearer_for, test_tokens};

const ALICE: &str = "alice";
const BOB: &str = "bob";

#[derive(Debug)]
struct Snapshot {
    status: u16,
    body: Option<Value>,
}

struct TaskWorld {
    state: web::Data<HttpState>,
    clock: Arc<MutableClock>,
    tokens: Arc<JwtAccessTokens>,
    alice: Option<String>,
    bob: Option<String>,
    task_id: Option<i64>,
    conversation_id: Option<i64>,
    created_updated_at: Option<String>,
    last: Option<Snapshot>,
}

impl TaskWorld {
    fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(start));
        let repo_clock: Arc<dyn Clock> = clock.clone();
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskRepository::new(
            Arc::clone(&repo_clock),
        ))));
        let conversations = Arc::new(InMemoryConversationRepository::new(Arc::clone(
            &repo_clock,
        )));
        let chat = Arc::new(ChatService::new(service.clone(), service.clone(), conversations));
        let tokens = test_tokens();
        let state = web::Data::new(HttpState::new(
            service.clone(),
            service,
            chat.clone(),
            chat,
            tokens.clone(),
        ));
        Self {
            state,
            clock,
            tokens,
            alice: None,
            bob: None,
            task_id: None,
            conversation_id: None,
            created_updated_at: None,
            last: None,
        }
    }

    fn bearer(&self, owner: &str) -> String {
        let token = match owner {
            ALICE => self.alice.as_ref(),
            BOB => self.bob.as_ref(),
            _ => None,
        };
        token.cloned().expect("owner holds a token")
    }

    fn task_id(&self) -> i64 {
        self.task_id.expect("a task was created")
    }

    fn last(&self) -> &Snapshot {
        self.last.as_ref().expect("a request was sent")
    }

    fn last_body(&self) -> &Value {
        self.last().body.as_ref().expect("response body")
    }

    fn send(&mut self, request: actix_test::TestRequest) {
        let state = self.state.clone();
        self.last = Some(run_async(execute(state, request)));
    }
}

fn run_async<T>(future: impl Future<Output = T>) -> T {
    tokio::runtime::Runtime::new()
        .expect("runtime")
        .block_on(future)
}

async fn execute(state: web::Data<HttpState>, request: actix_test::TestRequest) -> Snapshot {
    let app = actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(query_config())
            .wrap(Trace)
            .service(
                web::scope("/api")
                    .configure(tasks::configure)
                    .configure(chat::configure),
            ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status().as_u16();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).expect("json body"))
    };
    Snapshot { status, body }
}

fn parse_timestamp(value: &Value) -> DateTime<Utc> {
    let raw = value.as_str().expect("timestamp string");
    DateTime::parse_from_rfc3339(raw)
        .expect("RFC 3339 timestamp")
        .with_timezone(&Utc)
}

fn create_task(world: &Mutex<TaskWorld>, body: &Value) {
    let mut world = world.lock().expect("world lock");
    let request = actix_test::TestRequest::post()
        .uri("/api/alice/tasks")
        .insert_header((AUTHORIZATION, world.bearer(ALICE)))
        .set_json(body);
    world.send(request);
    if world.last().status == 201 {
        let body = world.last_body().clone();
        world.task_id = body.get("id").and_then(Value::as_i64);
        world.created_updated_at = body
            .get("updated_at")
            .and_then(Value::as_str)
            .map(str::to_owned);
    }
}

#[fixture]
fn world() -> Mutex<TaskWorld> {
    Mutex::new(TaskWorld::new())
}

#[given("alice holds a valid access token")]
fn alice_holds_a_valid_access_token(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    world.alice = Some(bearer_for(&world.tokens, ALICE));
}

#[given("bob holds a valid access token")]
fn bob_holds_a_valid_access_token(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    world.bob = Some(bearer_for(&world.tokens, BOB));
}

#[when("alice creates the task \"Buy groceries\" with description \"Milk, eggs\"")]
fn alice_creates_the_grocery_task(world: &Mutex<TaskWorld>) {
    create_task(
        world,
        &json!({ "title": "Buy groceries", "description": "Milk, eggs" }),
    );
}

#[when("alice creates a task with an empty title")]
fn alice_creates_a_task_with_an_empty_title(world: &Mutex<TaskWorld>) {
    create_task(world, &json!({ "title": "", "description": "" }));
}

#[when("a minute passes")]
fn a_minute_passes(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    world.clock.advance_seconds(60);
}

#[when("alice marks the task completed")]
fn alice_marks_the_task_completed(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let uri = format!("/api/alice/tasks/{}/complete", world.task_id());
    let request = actix_test::TestRequest::patch()
        .uri(&uri)
        .insert_header((AUTHORIZATION, world.bearer(ALICE)))
        .set_json(json!({ "completed": true }));
    world.send(request);
}

#[when("alice deletes the task")]
fn alice_deletes_the_task(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let uri = format!("/api/alice/tasks/{}", world.task_id());
    let request = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header((AUTHORIZATION, world.bearer(ALICE)));
    world.send(request);
}

#[when("alice fetches the task")]
fn alice_fetches_the_task(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let uri = format!("/api/alice/tasks/{}", world.task_id());
    let request = actix_test::TestRequest::get()
        .uri(&uri)
        .insert_header((AUTHORIZATION, world.bearer(ALICE)));
    world.send(request);
}

#[when("alice lists her tasks")]
fn alice_lists_her_tasks(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let request = actix_test::TestRequest::get()
        .uri("/api/alice/tasks")
        .insert_header((AUTHORIZATION, world.bearer(ALICE)));
    world.send(request);
}

#[when("bob fetches alice's task through his own path")]
fn bob_fetches_alices_task_through_his_own_path(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let uri = format!("/api/bob/tasks/{}", world.task_id());
    let request = actix_test::TestRequest::get()
        .uri(&uri)
        .insert_header((AUTHORIZATION, world.bearer(BOB)));
    world.send(request);
}

#[when("bob lists tasks under alice's path")]
fn bob_lists_tasks_under_alices_path(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let request = actix_test::TestRequest::get()
        .uri("/api/alice/tasks")
        .insert_header((AUTHORIZATION, world.bearer(BOB)));
    world.send(request);
}

#[when("alice tells the assistant \"add task Buy milk\"")]
fn alice_tells_the_assistant_to_add_a_task(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let request = actix_test::TestRequest::post()
        .uri("/api/alice/chat")
        .insert_header((AUTHORIZATION, world.bearer(ALICE)))
        .set_json(json!({ "message": "add task Buy milk" }));
    world.send(request);
    let conversation_id = world
        .last()
        .body
        .as_ref()
        .and_then(|body| body.get("conversation_id"))
        .and_then(Value::as_i64);
    world.conversation_id = conversation_id;
}

#[when("bob reads alice's conversation through his own path")]
fn bob_reads_alices_conversation(world: &Mutex<TaskWorld>) {
    let mut world = world.lock().expect("world lock");
    let conversation_id = world.conversation_id.expect("a conversation was started");
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/bob/chat/{conversation_id}"))
        .insert_header((AUTHORIZATION, world.bearer(BOB)));
    world.send(request);
}

#[then("the response status is 201")]
fn the_response_status_is_201(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 201, "body: {:?}", world.last().body);
}

#[then("the response status is 200")]
fn the_response_status_is_200(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 200, "body: {:?}", world.last().body);
}

#[then("the response status is 204")]
fn the_response_status_is_204(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 204);
    assert!(world.last().body.is_none());
}

#[then("the response status is 400")]
fn the_response_status_is_400(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 400);
}

#[then("the response status is 403")]
fn the_response_status_is_403(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 403);
    assert_eq!(
        world.last_body().get("code").and_then(Value::as_str),
        Some("forbidden")
    );
}

#[then("the response status is 404")]
fn the_response_status_is_404(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.last().status, 404);
    assert_eq!(
        world.last_body().get("code").and_then(Value::as_str),
        Some("not_found")
    );
}

#[then("the task is not completed")]
fn the_task_is_not_completed(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(
        world.last_body().get("completed").and_then(Value::as_bool),
        Some(false)
    );
}

#[then("the task is completed")]
fn the_task_is_completed(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(
        world.last_body().get("completed").and_then(Value::as_bool),
        Some(true)
    );
}

#[then("the task timestamps are equal")]
fn the_task_timestamps_are_equal(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    let body = world.last_body();
    assert_eq!(body.get("created_at"), body.get("updated_at"));
}

#[then("the task updated_at has advanced")]
fn the_task_updated_at_has_advanced(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    let created = world
        .created_updated_at
        .as_deref()
        .expect("creation timestamp");
    let before = parse_timestamp(&Value::from(created));
    let after = parse_timestamp(world.last_body().get("updated_at").expect("updated_at"));
    assert!(after > before, "{after} should follow {before}");
}

#[then("the error names the title field")]
fn the_error_names_the_title_field(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    let body = world.last_body();
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
    let details = body
        .get("details")
        .and_then(Value::as_object)
        .expect("details");
    assert_eq!(details.get("field").and_then(Value::as_str), Some("title"));
}

#[then("the assistant confirms the new task")]
fn the_assistant_confirms_the_new_task(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(
        world.last_body().get("response").and_then(Value::as_str),
        Some("Task 'Buy milk' added successfully.")
    );
}

#[then("the task list holds the assistant's task")]
fn the_task_list_holds_the_assistants_task(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    let titles: Vec<&str> = world
        .last_body()
        .as_array()
        .expect("task array")
        .iter()
        .filter_map(|task| task.get("title").and_then(Value::as_str))
        .collect();
    assert_eq!(titles, ["Buy milk"]);
}

#[then("the task list is empty")]
fn the_task_list_is_empty(world: &Mutex<TaskWorld>) {
    let world = world.lock().expect("world lock");
    let tasks = world.last_body().as_array().expect("task array");
    assert!(tasks.is_empty(), "unexpected tasks: {tasks:?}");
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "A task is created, completed and deleted"
)]
fn task_is_created_completed_and_deleted(world: Mutex<TaskWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "A blank title is rejected and nothing is stored"
)]
fn blank_title_is_rejected(world: Mutex<TaskWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Tasks are isolated between owners"
)]
fn tasks_are_isolated_between_owners(world: Mutex<TaskWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Completing a task twice is idempotent"
)]
fn completing_twice_is_idempotent(world: Mutex<TaskWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "The assistant manages tasks through chat"
)]
fn assistant_manages_tasks_through_chat(world: Mutex<TaskWorld>) {
    let _ = world;
}
