//! Course catalog entries.
//!
//! A course produces one [`Session`](super::Session) per weekly meeting.

use serde::{Deserialize, Serialize};

use super::{RoomType, TeacherId};

/// Special room requirement of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomRequirement {
    /// Any room will do.
    #[default]
    Any,
    /// Needs a laboratory.
    Lab,
    /// Needs a gymnasium.
    Gymnasium,
    /// Needs an auditorium.
    Auditorium,
}

impl RoomRequirement {
    /// Whether a room of `room_type` satisfies this requirement.
    pub fn is_met_by(self, room_type: &RoomType) -> bool {
        match self {
            RoomRequirement::Any => true,
            RoomRequirement::Lab => *room_type == RoomType::Lab,
            RoomRequirement::Gymnasium => *room_type == RoomType::Gymnasium,
            RoomRequirement::Auditorium => *room_type == RoomType::Auditorium,
        }
    }

    /// Human-readable label, `None` for [`RoomRequirement::Any`].
    pub fn label(self) -> Option<&'static str> {
        match self {
            RoomRequirement::Any => None,
            RoomRequirement::Lab => Some("lab"),
            RoomRequirement::Gymnasium => Some("gymnasium"),
            RoomRequirement::Auditorium => Some("auditorium"),
        }
    }
}

/// A course in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Short code (e.g., "MATH101").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Subject area.
    pub subject: String,
    /// Room requirement.
    pub room_requirement: RoomRequirement,
    /// Teachers qualified to teach this course.
    pub eligible_teachers: Vec<TeacherId>,
}

impl Course {
    /// Creates a course with no requirement and no eligible teachers.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            subject: String::new(),
            room_requirement: RoomRequirement::Any,
            eligible_teachers: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the room requirement.
    pub fn with_room_requirement(mut self, requirement: RoomRequirement) -> Self {
        self.room_requirement = requirement;
        self
    }

    /// Adds a qualified teacher.
    pub fn with_teacher(mut self, teacher: TeacherId) -> Self {
        self.eligible_teachers.push(teacher);
        self
    }

    /// Whether `teacher` is qualified for this course.
    pub fn is_eligible(&self, teacher: TeacherId) -> bool {
        self.eligible_teachers.contains(&teacher)
    }
}
