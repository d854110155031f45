//! Initial Mergington High School activity catalogue.
//!
//! The store is in-memory only, so every process start begins from this list.

use crate::models::{Activities, Activity};

pub fn activities() -> Activities {
    Activities::new(vec![
        (
            "Chess Club".to_string(),
            Activity::new(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        ),
        (
            "Programming Class".to_string(),
            Activity::new(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Gym Class".to_string(),
            Activity::new(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &["john@mergington.edu", "olivia@mergington.edu"],
            ),
        ),
        (
            "Soccer Team".to_string(),
            Activity::new(
                "Join the school soccer team and compete in matches",
                "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
                22,
                &["liam@mergington.edu", "noah@mergington.edu"],
            ),
        ),
        (
            "Basketball Team".to_string(),
            Activity::new(
                "Practice and play basketball with the school team",
                "Wednesdays and Fridays, 3:30 PM - 5:00 PM",
                15,
                &["ava@mergington.edu", "mia@mergington.edu"],
            ),
        ),
        (
            "Art Club".to_string(),
            Activity::new(
                "Explore your creativity through painting and drawing",
                "Thursdays, 3:30 PM - 5:00 PM",
                15,
                &["amelia@mergington.edu", "harper@mergington.edu"],
            ),
        ),
        (
            "Drama Club".to_string(),
            Activity::new(
                "Act, direct, and produce plays and performances",
                "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
                20,
                &["ella@mergington.edu", "scarlett@mergington.edu"],
            ),
        ),
        (
            "Math Club".to_string(),
            Activity::new(
                "Solve challenging problems and participate in math competitions",
                "Tuesdays, 3:30 PM - 4:30 PM",
                10,
                &["james@mergington.edu", "benjamin@mergington.edu"],
            ),
        ),
        (
            "Debate Team".to_string(),
            Activity::new(
                "Develop public speaking and argumentation skills",
                "Fridays, 4:00 PM - 5:30 PM",
                12,
                &["charlotte@mergington.edu", "henry@mergington.edu"],
            ),
        ),
    ])
}
