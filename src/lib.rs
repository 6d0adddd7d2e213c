pub mod activity;
pub mod api;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod database;
pub mod errors;
pub mod feed;
pub mod logging;
pub mod models;
pub mod profile;
pub mod quiz;
pub mod seed;
pub mod storage;
pub mod tasks;
pub mod tutors;

pub use api::{create_router, AppState};
pub use chat::{ChatSession, ChatThreadStore, PendingReply, ReplyDelays};
pub use config::Config;
pub use database::SqliteStore;
pub use errors::*;
pub use feed::FeedAggregator;
pub use models::*;
pub use profile::ProfileService;
pub use quiz::QuizService;
pub use storage::{KeyValueStore, MemoryStore, Storage};
pub use tasks::TaskTracker;
pub use tutors::TutorDirectory;
