use chrono::Utc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Task, TaskStatus, TaskSummary};
use crate::seed::FALLBACK_FOCUS;
use crate::storage::{keys, Storage};

// Import logging macros
use crate::{log_service_start, log_service_success, log_validation};

const MAX_SEEDED_TASKS: usize = 3;
const PREVIEW_LEN: usize = 3;

/// Weakness topics, or the default pair when the quiz found none
pub fn focus_topics(weakness: &[String]) -> Vec<String> {
    if weakness.is_empty() {
        FALLBACK_FOCUS.iter().map(|s| s.to_string()).collect()
    } else {
        weakness.to_vec()
    }
}

/// `round(100 * done / max(total, 1))`, so an empty list is 0%
pub fn completion_percent(tasks: &[Task]) -> u8 {
    let done = tasks.iter().filter(|t| t.done).count();
    let total = tasks.len().max(1);
    ((200 * done + total) / (2 * total)) as u8
}

pub fn seed_tasks(focus: &[String]) -> Vec<Task> {
    let now = Utc::now().timestamp_millis();
    focus
        .iter()
        .take(MAX_SEEDED_TASKS)
        .enumerate()
        .map(|(i, subject)| Task {
            id: format!("{}-{}", now, i),
            title: match i {
                0 => format!("30 min practice on {}", subject),
                1 => format!("Revise 1 chapter: {}", subject),
                _ => format!("1 quiz attempt: {}", subject),
            },
            subject: subject.clone(),
            done: false,
            status: TaskStatus::Planned,
        })
        .collect()
}

/// Today's task list, persisted under `tasks_today`
#[derive(Clone)]
pub struct TaskTracker {
    storage: Storage,
}

impl TaskTracker {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Stored tasks, or a freshly seeded list when nothing usable is stored
    pub async fn load(&self, focus: &[String]) -> AppResult<Vec<Task>> {
        if let Some(tasks) = self.storage.try_get::<Vec<Task>>(keys::TASKS_TODAY).await {
            return Ok(tasks.into_iter().map(Task::normalized).collect());
        }

        let seeded = seed_tasks(focus);
        self.storage.set(keys::TASKS_TODAY, &seeded).await?;
        log_service_success!("task_tracker", "seed", count = seeded.len(), "seeded default tasks");
        Ok(seeded)
    }

    /// Stored tasks without seeding, for read-only views
    pub async fn current(&self) -> Vec<Task> {
        self.storage
            .get_or::<Vec<Task>>(keys::TASKS_TODAY, Vec::new())
            .await
            .into_iter()
            .map(Task::normalized)
            .collect()
    }

    pub async fn add(
        &self,
        title: &str,
        subject: Option<&str>,
        focus: &[String],
    ) -> AppResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            log_validation!(failure, "task", error = "empty title");
            return Err(AppError::validation("Task title is required"));
        }

        let subject = subject
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| focus.first().cloned())
            .unwrap_or_else(|| "General".to_string());

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            subject,
            done: false,
            status: TaskStatus::Planned,
        };

        let seed_focus = focus.to_vec();
        let created = task.clone();
        self.storage
            .update(
                keys::TASKS_TODAY,
                || seed_tasks(&seed_focus),
                move |tasks: &mut Vec<Task>| {
                    tasks.insert(0, created);
                    Ok(())
                },
            )
            .await?;

        log_service_success!("task_tracker", "add", resource_id = task.id, "task added");
        Ok(task)
    }

    /// Flip `done`; status follows it (Done / Planned)
    pub async fn toggle(&self, id: &str) -> AppResult<Task> {
        log_service_start!("task_tracker", "toggle", resource_id = id);
        self.storage
            .update_existing(keys::TASKS_TODAY, |tasks: &mut Vec<Task>| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| AppError::not_found("task", id))?;
                task.done = !task.done;
                task.status = if task.done {
                    TaskStatus::Done
                } else {
                    TaskStatus::Planned
                };
                Ok(task.clone())
            })
            .await?
            .ok_or_else(|| AppError::not_found("task", id))
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.storage
            .update_existing(keys::TASKS_TODAY, |tasks: &mut Vec<Task>| {
                let before = tasks.len();
                tasks.retain(|t| t.id != id);
                if tasks.len() == before {
                    return Err(AppError::not_found("task", id));
                }
                Ok(())
            })
            .await?
            .ok_or_else(|| AppError::not_found("task", id))?;
        log_service_success!("task_tracker", "remove", resource_id = id, "task removed");
        Ok(())
    }

    /// Drop every completed task, returning how many were removed. A list
    /// that was never stored stays unstored so `load` can still seed it.
    pub async fn clear_completed(&self) -> AppResult<usize> {
        let removed = self
            .storage
            .update_existing(keys::TASKS_TODAY, |tasks: &mut Vec<Task>| {
                let before = tasks.len();
                tasks.retain(|t| !t.done);
                Ok(before - tasks.len())
            })
            .await?
            .unwrap_or(0);
        log_service_success!("task_tracker", "clear_completed", count = removed, "completed tasks cleared");
        Ok(removed)
    }

    /// Dashboard view: counts, percentage and the first few tasks
    pub async fn summary(&self) -> TaskSummary {
        let tasks = self.current().await;
        TaskSummary {
            done: tasks.iter().filter(|t| t.done).count(),
            total: tasks.len(),
            percent: completion_percent(&tasks),
            preview: tasks.iter().take(PREVIEW_LEN).cloned().collect(),
        }
    }
}
