use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>, // emails, in signup order
}

impl Activity {
    pub fn new(
        description: &str,
        schedule: &str,
        max_participants: u32,
        participants: &[&str],
    ) -> Self {
        Self {
            description: description.to_owned(),
            schedule: schedule.to_owned(),
            max_participants,
            participants: participants.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    pub fn is_registered(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }
}

/// Activities keyed by name, kept in insertion order.
///
/// Serializes as a JSON object (`name -> activity`) without losing that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activities(Vec<(String, Activity)>);

impl Activities {
    pub fn new(entries: Vec<(String, Activity)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Activity> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Activities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, activity)| (name, activity)))
    }
}

/// Shape of the teachers credential file: `{"teachers": {"<username>": "<password>"}}`
#[derive(Deserialize, Debug, Clone)]
pub struct TeacherRoster {
    pub teachers: HashMap<String, String>,
}

/// Bearer token claims. Only the username is carried; there is no `exp`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthPayload {
    pub username: String,
}
