use crate::errors::{AppError, AppResult};
use crate::models::{Booking, Tutor, TutorVideo};
use crate::seed::{self, TUTORS};
use crate::storage::{keys, Storage};

// Import logging macros
use crate::log_service_success;

/// Tutors teaching `subject`; `None` or `"all"` lists everyone
pub fn filter_by_subject(subject: Option<&str>) -> Vec<&'static Tutor> {
    match subject {
        None | Some("all") => TUTORS.iter().collect(),
        Some(subject) => TUTORS.iter().filter(|t| t.subject == subject).collect(),
    }
}

#[derive(Clone)]
pub struct TutorDirectory {
    storage: Storage,
}

impl TutorDirectory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, id: u32) -> AppResult<&'static Tutor> {
        seed::tutor(id).ok_or_else(|| AppError::not_found("tutor", id))
    }

    pub async fn saved_ids(&self) -> Vec<u32> {
        self.storage.get_or(keys::SAVED_TUTORS, Vec::new()).await
    }

    /// Save or unsave a tutor. Newly saved ids go to the front.
    /// Returns whether the tutor is saved afterwards.
    pub async fn toggle_saved(&self, id: u32) -> AppResult<bool> {
        self.get(id)?;
        let saved = self
            .storage
            .update(keys::SAVED_TUTORS, Vec::new, |ids: &mut Vec<u32>| {
                if ids.contains(&id) {
                    ids.retain(|x| *x != id);
                    Ok(false)
                } else {
                    ids.insert(0, id);
                    Ok(true)
                }
            })
            .await?;
        log_service_success!(
            "tutors",
            "toggle_saved",
            resource_id = id,
            if saved { "saved" } else { "unsaved" }
        );
        Ok(saved)
    }

    /// Saved tutors in catalog order
    pub async fn saved(&self) -> Vec<&'static Tutor> {
        let ids = self.saved_ids().await;
        TUTORS.iter().filter(|t| ids.contains(&t.id)).collect()
    }

    /// Confirm a booking; the slot must be one the tutor offers
    pub fn book(&self, id: u32, slot: &str) -> AppResult<Booking> {
        let tutor = self.get(id)?;
        if !tutor.availability.iter().any(|s| *s == slot) {
            return Err(AppError::validation(format!(
                "{} is not available at '{}'",
                tutor.name, slot
            )));
        }
        log_service_success!("tutors", "book", resource_id = id, slot);
        Ok(Booking {
            tutor_id: tutor.id,
            tutor_name: tutor.name.to_string(),
            slot: slot.to_string(),
        })
    }

    pub fn videos(&self, id: u32) -> AppResult<&'static [TutorVideo]> {
        self.get(id)?;
        Ok(seed::tutor_videos(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_filter() {
        assert_eq!(filter_by_subject(None).len(), 3);
        assert_eq!(filter_by_subject(Some("all")).len(), 3);
        let physics = filter_by_subject(Some("Physics"));
        assert_eq!(physics.len(), 1);
        assert_eq!(physics[0].name, "Tutor Chen");
        assert!(filter_by_subject(Some("History")).is_empty());
    }

    #[tokio::test]
    async fn test_toggle_saved_prepends_and_removes() {
        let directory = TutorDirectory::new(Storage::in_memory());
        assert!(directory.toggle_saved(1).await.unwrap());
        assert!(directory.toggle_saved(3).await.unwrap());
        assert_eq!(directory.saved_ids().await, vec![3, 1]);

        let names: Vec<&str> = directory.saved().await.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Tutor Aisha", "Tutor Chen"]);

        assert!(!directory.toggle_saved(1).await.unwrap());
        assert_eq!(directory.saved_ids().await, vec![3]);

        assert!(matches!(
            directory.toggle_saved(42).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_booking_validates_slot() {
        let directory = TutorDirectory::new(Storage::in_memory());
        let booking = directory.book(2, "Thu 8pm").unwrap();
        assert_eq!(booking.tutor_name, "Tutor Ben");

        assert!(matches!(
            directory.book(2, "Mon 8pm"),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_videos_lookup() {
        let directory = TutorDirectory::new(Storage::in_memory());
        assert_eq!(directory.videos(3).unwrap().len(), 2);
        assert!(directory.videos(7).is_err());
    }
}
