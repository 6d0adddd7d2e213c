use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Activity, ActivityKind};
use crate::seed::ACTIVITIES;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityDay {
    pub date: &'static str,
    pub activities: Vec<&'static Activity>,
}

/// Study history filtered by kind and subject; `None` means no filter
pub fn filter(kind: Option<ActivityKind>, subject: Option<&str>) -> Vec<&'static Activity> {
    ACTIVITIES
        .iter()
        .filter(|a| kind.is_none_or(|k| a.kind == k))
        .filter(|a| subject.is_none_or(|s| s == "all" || a.subject == s))
        .collect()
}

/// Group by ISO date, newest day first. Order within a day is preserved.
pub fn group_by_date(activities: Vec<&'static Activity>) -> Vec<ActivityDay> {
    let mut days: BTreeMap<&'static str, Vec<&'static Activity>> = BTreeMap::new();
    for activity in activities {
        days.entry(activity.date).or_default().push(activity);
    }
    days.into_iter()
        .rev()
        .map(|(date, activities)| ActivityDay { date, activities })
        .collect()
}

/// Every subject mentioned by the focus topics, the history, or the
/// standard catalog, without duplicates and in first-seen order.
pub fn known_subjects(focus: &[String]) -> Vec<String> {
    let standard = [
        "Mathematics",
        "English",
        "Physics",
        "Chemistry",
        "Biology",
        "Essay Writing",
        "Algebra",
    ];
    let mut subjects: Vec<String> = Vec::new();
    let candidates = focus
        .iter()
        .map(String::as_str)
        .chain(ACTIVITIES.iter().map(|a| a.subject))
        .chain(standard);
    for subject in candidates {
        if !subjects.iter().any(|s| s == subject) {
            subjects.push(subject.to_string());
        }
    }
    subjects
}
