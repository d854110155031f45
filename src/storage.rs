use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::models::{Activities, Activity};
use crate::seed;

/// Why a roster change was refused. A refused change never touches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("activity {0:?} not found")]
    ActivityNotFound(String),
    #[error("{email} is already signed up for {activity}")]
    AlreadyRegistered { activity: String, email: String },
    #[error("{email} is not signed up for {activity}")]
    NotRegistered { activity: String, email: String },
    #[error("{activity} is full")]
    ActivityFull { activity: String },
}

/// In-memory activity store shared between request handlers.
///
/// Cloning is cheap and every clone sees the same activities. Each signup or
/// unregister runs its check and its mutation under one write lock.
#[derive(Clone, Debug)]
pub struct ActivityStore {
    activities: Arc<RwLock<Activities>>,
    // Off unless configured; `max_participants` is informational by default.
    enforce_capacity: bool,
}

impl ActivityStore {
    pub fn new(activities: Activities) -> Self {
        Self {
            activities: Arc::new(RwLock::new(activities)),
            enforce_capacity: false,
        }
    }

    /// Store populated with the school's activity catalogue
    pub fn seeded() -> Self {
        Self::new(seed::activities())
    }

    pub fn with_capacity_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_capacity = enforce;
        self
    }

    pub fn enforces_capacity(&self) -> bool {
        self.enforce_capacity
    }

    /// Snapshot of every activity, in catalogue order
    pub fn list_activities(&self) -> Activities {
        self.activities.read().clone()
    }

    pub fn get(&self, name: &str) -> Option<Activity> {
        self.activities.read().get(name).cloned()
    }

    /// Append `email` to the roster of `activity_name`.
    pub fn signup(&self, activity_name: &str, email: &str) -> Result<String, RegistrationError> {
        let mut activities = self.activities.write();
        let activity = activities
            .get_mut(activity_name)
            .ok_or_else(|| RegistrationError::ActivityNotFound(activity_name.to_owned()))?;

        if activity.is_registered(email) {
            return Err(RegistrationError::AlreadyRegistered {
                activity: activity_name.to_owned(),
                email: email.to_owned(),
            });
        }
        if self.enforce_capacity && activity.is_full() {
            return Err(RegistrationError::ActivityFull {
                activity: activity_name.to_owned(),
            });
        }

        activity.participants.push(email.to_owned());
        debug!(
            activity = activity_name,
            roster = activity.participants.len(),
            "participant added"
        );
        Ok(format!("Signed up {} for {}", email, activity_name))
    }

    /// Remove `email` from the roster of `activity_name`.
    pub fn unregister(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<String, RegistrationError> {
        let mut activities = self.activities.write();
        let activity = activities
            .get_mut(activity_name)
            .ok_or_else(|| RegistrationError::ActivityNotFound(activity_name.to_owned()))?;

        let position = activity
            .participants
            .iter()
            .position(|p| p == email)
            .ok_or_else(|| RegistrationError::NotRegistered {
                activity: activity_name.to_owned(),
                email: email.to_owned(),
            })?;

        activity.participants.remove(position);
        debug!(
            activity = activity_name,
            roster = activity.participants.len(),
            "participant removed"
        );
        Ok(format!("Unregistered {} from {}", email, activity_name))
    }
}

impl Default for ActivityStore {
    fn default() -> Self {
        Self::seeded()
    }
}
