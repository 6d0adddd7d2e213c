use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    activity::{self, ActivityDay},
    assistant,
    chat::{ChatThreadStore, ReplyDelays},
    errors::{AppError, ErrorContext},
    feed::FeedAggregator,
    models::*,
    profile::ProfileService,
    quiz::{self, QuizService},
    storage::Storage,
    tasks::{self, TaskTracker},
    tutors::{self, TutorDirectory},
};

// Import logging macros
use crate::{log_api_start, log_api_success, log_api_warn};

#[derive(Clone)]
pub struct AppState {
    pub quiz: QuizService,
    pub tasks: TaskTracker,
    pub feed: FeedAggregator,
    pub chat: ChatThreadStore,
    pub profile: ProfileService,
    pub tutors: TutorDirectory,
}

impl AppState {
    pub fn new(storage: Storage, delays: ReplyDelays) -> Self {
        Self {
            quiz: QuizService::new(storage.clone()),
            tasks: TaskTracker::new(storage.clone()),
            feed: FeedAggregator::new(storage.clone()),
            chat: ChatThreadStore::new(storage.clone(), delays),
            profile: ProfileService::new(storage.clone()),
            tutors: TutorDirectory::new(storage),
        }
    }

    async fn focus(&self) -> Vec<String> {
        tasks::focus_topics(&self.quiz.weakness().await)
    }
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

fn reject(error: AppError, operation: &str, resource_type: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    error.to_response_with_context(ErrorContext::new(operation, resource_type))
}

fn reject_with_id(
    error: AppError,
    operation: &str,
    resource_type: &str,
    id: &str,
) -> (StatusCode, Json<ApiResponse<()>>) {
    error.to_response_with_context(ErrorContext::new(operation, resource_type).with_id(id))
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub role: Role,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct StreakResponse {
    pub streak: u32,
}

#[derive(Deserialize)]
pub struct SubjectsQuery {
    /// Comma separated subject names
    pub subjects: Option<String>,
}

#[derive(Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub topic: &'static str,
}

#[derive(Deserialize)]
pub struct SubmitQuizRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Raw selections; anything that is not a non-negative integer
    /// (`-1`, `null`, strings) counts as unanswered
    #[serde(default)]
    pub answers: Vec<Value>,
}

fn answer_index(raw: &Value) -> Option<usize> {
    raw.as_u64().and_then(|index| usize::try_from(index).ok())
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub name: String,
    pub focus: Vec<String>,
    pub streak: u32,
    pub tasks: TaskSummary,
}

#[derive(Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub percent: u8,
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub subject: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct TutorQuery {
    pub subject: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingRequest {
    pub slot: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct AssistantRequest {
    pub question: String,
    pub subject: Option<String>,
}

#[derive(Serialize)]
pub struct AssistantResponse {
    pub greeting: &'static str,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub kind: Option<ActivityKind>,
    pub subject: Option<String>,
}

// ============================================================================
// Profile endpoints
// ============================================================================

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    log_api_start!("login");
    match state
        .profile
        .login(request.role, &request.email, &request.password)
        .await
    {
        Ok(session) => {
            log_api_success!("login", "signed in");
            ok(session)
        }
        Err(e) => Err(reject(e, "login", "session")),
    }
}

pub async fn logout(State(state): State<AppState>) -> ApiResult<()> {
    state
        .profile
        .logout()
        .await
        .map_err(|e| reject(e, "logout", "session"))?;
    log_api_success!("logout", "signed out");
    ok(())
}

pub async fn get_auth(State(state): State<AppState>) -> ApiResult<Option<AuthSession>> {
    ok(state.profile.current().await)
}

pub async fn get_name(State(state): State<AppState>) -> ApiResult<String> {
    ok(state.profile.name().await)
}

pub async fn set_name(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> ApiResult<String> {
    let name = state
        .profile
        .set_name(&request.name)
        .await
        .map_err(|e| reject(e, "set_name", "profile"))?;
    ok(name)
}

pub async fn get_streak(State(state): State<AppState>) -> ApiResult<StreakResponse> {
    ok(StreakResponse {
        streak: state.profile.streak().await,
    })
}

pub async fn check_in(State(state): State<AppState>) -> ApiResult<StreakResponse> {
    let streak = state
        .profile
        .check_in()
        .await
        .map_err(|e| reject(e, "check_in", "streak"))?;
    ok(StreakResponse { streak })
}

pub async fn reset(State(state): State<AppState>) -> ApiResult<usize> {
    let removed = state
        .profile
        .reset_all()
        .await
        .map_err(|e| reject(e, "reset", "storage"))?;
    log_api_success!("reset", count = removed, "storage cleared");
    ok(removed)
}

// ============================================================================
// Quiz & dashboard endpoints
// ============================================================================

pub async fn quiz_questions(
    State(state): State<AppState>,
    Query(params): Query<SubjectsQuery>,
) -> ApiResult<Vec<QuestionView>> {
    let subjects: Vec<String> = params
        .subjects
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let questions = quiz::active_questions(state.quiz.questions(), &subjects)
        .into_iter()
        .map(|(index, q)| QuestionView {
            index,
            prompt: q.prompt,
            options: q.options,
            topic: q.topic,
        })
        .collect();
    ok(questions)
}

pub async fn submit_quiz(
    State(state): State<AppState>,
    Json(request): Json<SubmitQuizRequest>,
) -> ApiResult<QuizOutcome> {
    log_api_start!("submit_quiz");
    let name = match request.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => state.profile.name().await,
    };
    if request.answers.len() != state.quiz.questions().len() {
        log_api_warn!(
            "submit_quiz",
            format!(
                "{} answers for {} questions, aligning",
                request.answers.len(),
                state.quiz.questions().len()
            )
        );
    }

    let answers = request.answers.iter().map(answer_index).collect();
    let outcome = state
        .quiz
        .submit(&name, &request.subjects, answers)
        .await
        .map_err(|e| reject(e, "submit_quiz", "quiz"))?;
    ok(outcome)
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    let focus = state.focus().await.into_iter().take(3).collect();
    ok(DashboardResponse {
        name: state.profile.name().await,
        focus,
        streak: state.profile.streak().await,
        tasks: state.tasks.summary().await,
    })
}

// ============================================================================
// Task endpoints
// ============================================================================

pub async fn get_tasks(State(state): State<AppState>) -> ApiResult<TaskListResponse> {
    let focus = state.focus().await;
    let tasks = state
        .tasks
        .load(&focus)
        .await
        .map_err(|e| reject(e, "get_tasks", "task"))?;
    let percent = tasks::completion_percent(&tasks);
    log_api_success!("get_tasks", count = tasks.len(), "tasks loaded");
    ok(TaskListResponse { tasks, percent })
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    let focus = state.focus().await;
    let task = state
        .tasks
        .add(&request.title, request.subject.as_deref(), &focus)
        .await
        .map_err(|e| reject(e, "create_task", "task"))?;
    ok(task)
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    log_api_start!("toggle_task", resource_id = id);
    let task = state
        .tasks
        .toggle(&id)
        .await
        .map_err(|e| reject_with_id(e, "toggle_task", "task", &id))?;
    ok(task)
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state
        .tasks
        .remove(&id)
        .await
        .map_err(|e| reject_with_id(e, "delete_task", "task", &id))?;
    ok(())
}

pub async fn clear_completed(State(state): State<AppState>) -> ApiResult<usize> {
    let removed = state
        .tasks
        .clear_completed()
        .await
        .map_err(|e| reject(e, "clear_completed", "task"))?;
    ok(removed)
}

// ============================================================================
// Community endpoints
// ============================================================================

pub async fn get_feed(State(state): State<AppState>) -> ApiResult<Vec<FeedPost>> {
    ok(state.feed.read().await)
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Vec<FeedPost>> {
    let feed = state
        .feed
        .post(&request.content)
        .await
        .map_err(|e| reject(e, "create_post", "post"))?;
    ok(feed)
}

pub async fn get_suggestions(State(state): State<AppState>) -> ApiResult<Vec<Suggestion>> {
    ok(state.feed.suggestions().await)
}

pub async fn connect_suggestion(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Vec<FeedPost>> {
    let feed = state
        .feed
        .connect(id)
        .await
        .map_err(|e| reject_with_id(e, "connect_suggestion", "suggestion", &id.to_string()))?;
    ok(feed)
}

pub async fn dismiss_suggestion(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Vec<Suggestion>> {
    let remaining = state
        .feed
        .dismiss(id)
        .await
        .map_err(|e| reject_with_id(e, "dismiss_suggestion", "suggestion", &id.to_string()))?;
    ok(remaining)
}

// ============================================================================
// Tutor endpoints
// ============================================================================

pub async fn list_tutors(Query(params): Query<TutorQuery>) -> ApiResult<Vec<&'static Tutor>> {
    ok(tutors::filter_by_subject(params.subject.as_deref()))
}

pub async fn saved_tutors(State(state): State<AppState>) -> ApiResult<Vec<&'static Tutor>> {
    ok(state.tutors.saved().await)
}

pub async fn toggle_saved_tutor(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Value> {
    let saved = state
        .tutors
        .toggle_saved(id)
        .await
        .map_err(|e| reject_with_id(e, "toggle_saved_tutor", "tutor", &id.to_string()))?;
    ok(json!({ "tutor_id": id, "saved": saved }))
}

pub async fn book_tutor(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<Booking> {
    let booking = state
        .tutors
        .book(id, &request.slot)
        .map_err(|e| reject_with_id(e, "book_tutor", "tutor", &id.to_string()))?;
    ok(booking)
}

pub async fn tutor_videos(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<&'static [TutorVideo]> {
    let videos = state
        .tutors
        .videos(id)
        .map_err(|e| reject_with_id(e, "tutor_videos", "tutor", &id.to_string()))?;
    ok(videos)
}

// ============================================================================
// Chat endpoints
// ============================================================================

fn counterpart(kind: &str, id: u32) -> Result<Counterpart, (StatusCode, Json<ApiResponse<()>>)> {
    Counterpart::parse(kind, id).ok_or_else(|| {
        reject(
            AppError::BadRequest(format!("Unknown conversation kind '{}'", kind)),
            "resolve_counterpart",
            "thread",
        )
    })
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u32)>,
) -> ApiResult<Vec<ChatMessage>> {
    let counterpart = counterpart(&kind, id)?;
    let thread = state
        .chat
        .load(counterpart)
        .await
        .map_err(|e| reject_with_id(e, "get_thread", "thread", &counterpart.to_string()))?;
    ok(thread)
}

/// The HTTP surface has no view lifetime to tie the reply to, so the
/// scheduled reply is detached and lands on its own.
pub async fn send_message(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u32)>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Vec<ChatMessage>> {
    let counterpart = counterpart(&kind, id)?;
    log_api_start!("send_message", resource_id = counterpart);
    let (thread, reply) = state
        .chat
        .send(counterpart, &request.text)
        .await
        .map_err(|e| reject_with_id(e, "send_message", "thread", &counterpart.to_string()))?;
    reply.detach();
    ok(thread)
}

// ============================================================================
// Study helpers
// ============================================================================

pub async fn ask_assistant(Json(request): Json<AssistantRequest>) -> ApiResult<AssistantResponse> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(reject(
            AppError::validation("Question is required"),
            "ask_assistant",
            "assistant",
        ));
    }
    let subject = request.subject.as_deref();
    ok(AssistantResponse {
        greeting: assistant::greeting(subject),
        answer: assistant::answer(subject, question),
    })
}

pub async fn subjects(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let focus = state.focus().await;
    ok(activity::known_subjects(&focus))
}

pub async fn activities(Query(params): Query<ActivityQuery>) -> ApiResult<Vec<ActivityDay>> {
    let filtered = activity::filter(params.kind, params.subject.as_deref());
    ok(activity::group_by_date(filtered))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // profile
        .route("/api/auth", get(get_auth))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/profile/name", get(get_name).put(set_name))
        .route("/api/streak", get(get_streak))
        .route("/api/streak/check-in", post(check_in))
        .route("/api/reset", post(reset))
        // quiz & dashboard
        .route("/api/quiz/questions", get(quiz_questions))
        .route("/api/quiz/submit", post(submit_quiz))
        .route("/api/dashboard", get(dashboard))
        // tasks
        .route("/api/tasks", get(get_tasks).post(create_task))
        .route("/api/tasks/clear-completed", post(clear_completed))
        .route("/api/tasks/:id", delete(delete_task))
        .route("/api/tasks/:id/toggle", post(toggle_task))
        // community
        .route("/api/feed", get(get_feed).post(create_post))
        .route("/api/suggestions", get(get_suggestions))
        .route("/api/suggestions/:id/connect", post(connect_suggestion))
        .route("/api/suggestions/:id/dismiss", post(dismiss_suggestion))
        // tutors
        .route("/api/tutors", get(list_tutors))
        .route("/api/tutors/saved", get(saved_tutors))
        .route("/api/tutors/:id/save", post(toggle_saved_tutor))
        .route("/api/tutors/:id/book", post(book_tutor))
        .route("/api/tutors/:id/videos", get(tutor_videos))
        // chat
        .route("/api/threads/:kind/:id", get(get_thread).post(send_message))
        // study helpers
        .route("/api/assistant", post(ask_assistant))
        .route("/api/activities", get(activities))
        .route("/api/subjects", get(subjects))
        .with_state(state)
}
