//! Session model.
//!
//! A session is one weekly occurrence of a course. It owns its current
//! [`Assignment`], whose fields stay `None` until a construction heuristic
//! or the search fills them.

use serde::{Deserialize, Serialize};

use super::{CourseId, RoomId, TeacherId, TimeSlotId};

/// The (teacher, room, time slot) triple bound to a session.
///
/// Each field is independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned teacher.
    pub teacher: Option<TeacherId>,
    /// Assigned room.
    pub room: Option<RoomId>,
    /// Assigned time slot.
    pub time_slot: Option<TimeSlotId>,
}

impl Assignment {
    /// Creates a fully specified assignment.
    pub fn new(teacher: TeacherId, room: RoomId, time_slot: TimeSlotId) -> Self {
        Self {
            teacher: Some(teacher),
            room: Some(room),
            time_slot: Some(time_slot),
        }
    }

    /// Whether teacher, room, and time slot are all present.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.teacher.is_some() && self.room.is_some() && self.time_slot.is_some()
    }
}

/// One weekly meeting of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Course this session belongs to. `None` only for malformed input.
    pub course: Option<CourseId>,
    /// Enrolled students.
    pub roster_size: u32,
    /// Pinned sessions are never moved by the search.
    pub pinned: bool,
    /// Required period for lunch sessions.
    pub lunch_period: Option<u32>,
    /// Current assignment.
    pub assignment: Assignment,
}

impl Session {
    /// Creates an unassigned session of `course`.
    pub fn new(id: impl Into<String>, course: CourseId) -> Self {
        Self {
            id: id.into(),
            course: Some(course),
            roster_size: 0,
            pinned: false,
            lunch_period: None,
            assignment: Assignment::default(),
        }
    }

    /// Creates a session that has lost its course reference.
    pub fn orphan(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            course: None,
            roster_size: 0,
            pinned: false,
            lunch_period: None,
            assignment: Assignment::default(),
        }
    }

    /// Sets the roster size.
    pub fn with_roster(mut self, roster_size: u32) -> Self {
        self.roster_size = roster_size;
        self
    }

    /// Pins the session in place.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Marks this as a lunch session that must sit in `period`.
    pub fn with_lunch_period(mut self, period: u32) -> Self {
        self.lunch_period = Some(period);
        self
    }

    /// Sets the assignment.
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = assignment;
        self
    }

    /// Shorthand for a fully specified assignment.
    pub fn assigned(self, teacher: TeacherId, room: RoomId, time_slot: TimeSlotId) -> Self {
        self.with_assignment(Assignment::new(teacher, room, time_slot))
    }

    /// Whether teacher, room, and time slot are all present.
    #[inline]
    pub fn is_fully_assigned(&self) -> bool {
        self.assignment.is_complete()
    }

    /// Whether the search may move this session.
    #[inline]
    pub fn is_movable(&self) -> bool {
        !self.pinned
    }
}
