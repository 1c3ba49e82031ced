//! Resource models: teachers and rooms.
//!
//! Both are immutable problem facts. A run reads them through
//! [`ProblemFacts`](super::ProblemFacts) and never mutates them.

use serde::{Deserialize, Serialize};

/// A teacher who can be assigned to sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Display name.
    pub name: String,
    /// Department or subject area.
    pub department: String,
    /// Maximum number of sessions per week. `None` = unlimited.
    pub max_sessions: Option<u32>,
    /// Inactive teachers are never proposed as alternatives.
    pub active: bool,
}

/// Room classification.
///
/// Used to match courses with special requirements (labs, gymnasiums,
/// auditoriums) against the room inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Regular classroom.
    Classroom,
    /// Science or computer laboratory.
    Lab,
    /// Gymnasium (physical education).
    Gymnasium,
    /// Auditorium or lecture hall.
    Auditorium,
    /// Anything else.
    Other(String),
}

/// A room that can host sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room number or label.
    pub name: String,
    /// Seats available. `None` = unknown, never treated as overflow.
    pub capacity: Option<u32>,
    /// Room classification.
    pub room_type: RoomType,
    /// Rooms marked unavailable are excluded from construction and suggestions.
    pub available: bool,
}

impl Teacher {
    /// Creates an active teacher with no weekly limit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: String::new(),
            max_sessions: None,
            active: true,
        }
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the weekly session limit.
    pub fn with_max_sessions(mut self, max_sessions: u32) -> Self {
        self.max_sessions = Some(max_sessions);
        self
    }

    /// Marks the teacher inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether `load` sessions already saturate this teacher.
    #[inline]
    pub fn is_at_capacity(&self, load: u32) -> bool {
        self.max_sessions.is_some_and(|max| load >= max)
    }
}

impl Room {
    /// Creates an available room of the given type with unknown capacity.
    pub fn new(name: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            name: name.into(),
            capacity: None,
            room_type,
            available: true,
        }
    }

    /// Creates a regular classroom.
    pub fn classroom(name: impl Into<String>) -> Self {
        Self::new(name, RoomType::Classroom)
    }

    /// Creates a laboratory.
    pub fn lab(name: impl Into<String>) -> Self {
        Self::new(name, RoomType::Lab)
    }

    /// Creates a gymnasium.
    pub fn gymnasium(name: impl Into<String>) -> Self {
        Self::new(name, RoomType::Gymnasium)
    }

    /// Sets the seat capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Marks the room unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Whether `students` fit. Unknown capacity always fits.
    #[inline]
    pub fn fits(&self, students: u32) -> bool {
        self.capacity.map_or(true, |cap| students <= cap)
    }

    /// Number of students above capacity (0 if it fits).
    #[inline]
    pub fn overflow(&self, students: u32) -> u32 {
        self.capacity.map_or(0, |cap| students.saturating_sub(cap))
    }
}
