use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::time::Duration;
use tutor_hub::{api::*, ReplyDelays, Storage};

fn fast_delays() -> ReplyDelays {
    ReplyDelays {
        tutor: Duration::from_millis(20),
        buddy: Duration::from_millis(20),
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::new(Storage::in_memory(), fast_delays());
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_and_logout() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "role": "tutor", "email": "ben@example.com", "password": "secret" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "tutor");

    let body: Value = server.get("/api/auth").await.json();
    assert_eq!(body["data"]["user"], "ben@example.com");

    server.post("/api/auth/logout").await.assert_status_ok();
    let body: Value = server.get("/api/auth").await.json();
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let server = create_test_server();
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "role": "student", "email": "", "password": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_quiz_submission_drives_dashboard_and_tasks() {
    let server = create_test_server();

    let questions: Value = server.get("/api/quiz/questions").await.json();
    assert_eq!(questions["data"].as_array().unwrap().len(), 3);
    assert!(questions["data"][0].get("correct_index").is_none());

    // Algebra wrong, the rest right: 2/3 rounds to 0.67
    let response = server
        .post("/api/quiz/submit")
        .json(&json!({ "name": "Sam", "subjects": [], "answers": [1, 2, 0] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["level"], "University");
    assert_eq!(body["data"]["weakness"], json!(["Algebra"]));
    assert_eq!(body["data"]["correct"], 2);

    let dashboard: Value = server.get("/api/dashboard").await.json();
    assert_eq!(dashboard["data"]["name"], "Sam");
    assert_eq!(dashboard["data"]["focus"], json!(["Algebra"]));

    let tasks: Value = server.get("/api/tasks").await.json();
    let list = tasks["data"]["tasks"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "30 min practice on Algebra");
    assert_eq!(tasks["data"]["percent"], 0);
}

#[tokio::test]
async fn test_quiz_treats_unusable_answers_as_unanswered() {
    let server = create_test_server();

    let response = server
        .post("/api/quiz/submit")
        .json(&json!({ "answers": [-1, 2, 0] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["correct"], 2);
    assert_eq!(body["data"]["weakness"], json!(["Algebra"]));

    let body: Value = server
        .post("/api/quiz/submit")
        .json(&json!({ "answers": ["0", 2.5, 99] }))
        .await
        .json();
    assert_eq!(body["data"]["correct"], 0);
    assert_eq!(body["data"]["level"], "Primary");
}

#[tokio::test]
async fn test_quiz_subject_filter() {
    let server = create_test_server();

    let questions: Value = server
        .get("/api/quiz/questions")
        .add_query_param("subjects", "Mathematics")
        .await
        .json();
    assert_eq!(questions["data"].as_array().unwrap().len(), 1);
    assert_eq!(questions["data"][0]["topic"], "Algebra");

    let body: Value = server
        .post("/api/quiz/submit")
        .json(&json!({ "subjects": ["Mathematics"], "answers": [null, null, null] }))
        .await
        .json();
    assert_eq!(body["data"]["level"], "Primary");
    assert_eq!(body["data"]["questions_used"], 1);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let server = create_test_server();

    // default focus seeds two tasks
    let tasks: Value = server.get("/api/tasks").await.json();
    assert_eq!(tasks["data"]["tasks"].as_array().unwrap().len(), 2);

    let created: Value = server
        .post("/api/tasks")
        .json(&json!({ "title": "Past paper 2019" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["subject"], "Algebra");
    assert_eq!(created["data"]["status"], "Planned");

    let toggled: Value = server
        .post(&format!("/api/tasks/{}/toggle", id))
        .await
        .json();
    assert_eq!(toggled["data"]["done"], true);
    assert_eq!(toggled["data"]["status"], "Done");

    let tasks: Value = server.get("/api/tasks").await.json();
    assert_eq!(tasks["data"]["tasks"][0]["id"], id.as_str());
    assert_eq!(tasks["data"]["percent"], 33);

    let cleared: Value = server.post("/api/tasks/clear-completed").await.json();
    assert_eq!(cleared["data"], 1);

    server
        .delete(&format!("/api/tasks/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_task_title_rejected() {
    let server = create_test_server();
    server
        .post("/api/tasks")
        .json(&json!({ "title": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feed_post_and_connect() {
    let server = create_test_server();

    let feed: Value = server.get("/api/feed").await.json();
    let ids: Vec<&str> = feed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["102", "101"]);

    let feed: Value = server
        .post("/api/feed")
        .json(&json!({ "content": "Finished my essay draft" }))
        .await
        .json();
    assert_eq!(feed["data"][0]["name"], "You");
    assert_eq!(feed["data"][0]["content"], "Finished my essay draft");
    assert!(feed["data"][0]["createdAt"].is_i64());

    let feed: Value = server.post("/api/suggestions/201/connect").await.json();
    assert_eq!(feed["data"][0]["content"], "connected with Nadia 🎉");
    assert_eq!(feed["data"].as_array().unwrap().len(), 4);

    let suggestions: Value = server.get("/api/suggestions").await.json();
    assert_eq!(suggestions["data"].as_array().unwrap().len(), 3);

    server
        .post("/api/suggestions/201/dismiss")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let remaining: Value = server.post("/api/suggestions/202/dismiss").await.json();
    assert_eq!(remaining["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tutor_directory() {
    let server = create_test_server();

    let tutors: Value = server
        .get("/api/tutors")
        .add_query_param("subject", "English")
        .await
        .json();
    assert_eq!(tutors["data"].as_array().unwrap().len(), 1);
    assert_eq!(tutors["data"][0]["name"], "Tutor Ben");

    let saved: Value = server.post("/api/tutors/2/save").await.json();
    assert_eq!(saved["data"]["saved"], true);
    let saved: Value = server.get("/api/tutors/saved").await.json();
    assert_eq!(saved["data"][0]["id"], 2);

    let booking: Value = server
        .post("/api/tutors/2/book")
        .json(&json!({ "slot": "Tue 8pm" }))
        .await
        .json();
    assert_eq!(booking["data"]["tutor_name"], "Tutor Ben");

    server
        .post("/api/tutors/2/book")
        .json(&json!({ "slot": "Sun 6am" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/api/tutors/99/videos")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_reply_arrives_after_delay() {
    let server = create_test_server();

    let thread: Value = server
        .post("/api/threads/tutor/1")
        .json(&json!({ "text": "Can you help with quadratics?" }))
        .await
        .json();
    let messages = thread["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["from"], "me");

    tokio::time::sleep(Duration::from_millis(150)).await;

    let thread: Value = server.get("/api/threads/tutor/1").await.json();
    let messages = thread["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["from"], "them");
    assert_eq!(
        messages[1]["text"],
        "Thanks for reaching out! I can help with Mathematics."
    );
}

#[tokio::test]
async fn test_buddy_thread_starts_with_greeting() {
    let server = create_test_server();

    let thread: Value = server.get("/api/threads/buddy/12").await.json();
    let messages = thread["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "Hey Mika! Want to revise Essay Writing later?");
}

#[tokio::test]
async fn test_chat_rejects_bad_targets() {
    let server = create_test_server();

    server
        .get("/api/threads/teacher/1")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/threads/tutor/77")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/threads/buddy/11")
        .json(&json!({ "text": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_streak_and_reset() {
    let server = create_test_server();

    server.post("/api/streak/check-in").await.assert_status_ok();
    let streak: Value = server.post("/api/streak/check-in").await.json();
    assert_eq!(streak["data"]["streak"], 2);

    server
        .put("/api/profile/name")
        .json(&json!({ "name": "Jo" }))
        .await
        .assert_status_ok();

    let removed: Value = server.post("/api/reset").await.json();
    assert_eq!(removed["data"], 2);

    let streak: Value = server.get("/api/streak").await.json();
    assert_eq!(streak["data"]["streak"], 0);
    let name: Value = server.get("/api/profile/name").await.json();
    assert_eq!(name["data"], "Alex");
}

#[tokio::test]
async fn test_assistant_and_activities() {
    let server = create_test_server();

    let reply: Value = server
        .post("/api/assistant")
        .json(&json!({ "question": "How do I write a thesis?" }))
        .await
        .json();
    assert!(reply["data"]["answer"]
        .as_str()
        .unwrap()
        .starts_with("Here's a quick structure"));

    server
        .post("/api/assistant")
        .json(&json!({ "question": " " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let days: Value = server
        .get("/api/activities")
        .add_query_param("kind", "video")
        .await
        .json();
    let total: usize = days["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["activities"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 2);

    let subjects: Value = server.get("/api/subjects").await.json();
    assert_eq!(subjects["data"][0], "Algebra");
}
