//! Conflict diagnosis for partial or infeasible timetables.
//!
//! A [`Conflict`] explains one unmet or under-met rule: what kind it is, how
//! severe, which sessions and resources are involved, and what a scheduler
//! can do about it. Conflicts are produced fresh on every analysis and are
//! never stored by this crate.
//!
//! # Severity scale
//!
//! | Severity | Priority | Blocks publication | Immediate action |
//! |----------|----------|--------------------|------------------|
//! | Critical | 100 | yes | yes |
//! | High | 75 | no | yes |
//! | Medium | 50 | no | no |
//! | Low | 25 | no | no |
//! | Info | 0 | no | no |

mod analyzer;

pub use analyzer::{completion_percentage, ConflictAnalyzer};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{CourseId, RoomId, TeacherId, TimeSlotId};

/// How urgent a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictSeverity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl ConflictSeverity {
    /// Sort key; higher is more urgent.
    pub fn priority_score(self) -> u32 {
        match self {
            ConflictSeverity::Critical => 100,
            ConflictSeverity::High => 75,
            ConflictSeverity::Medium => 50,
            ConflictSeverity::Low => 25,
            ConflictSeverity::Info => 0,
        }
    }

    /// Whether the timetable may not be published while this is open.
    pub fn blocks_publication(self) -> bool {
        self == ConflictSeverity::Critical
    }

    pub fn requires_immediate_action(self) -> bool {
        matches!(self, ConflictSeverity::Critical | ConflictSeverity::High)
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictSeverity::Critical => "CRITICAL",
            ConflictSeverity::High => "HIGH",
            ConflictSeverity::Medium => "MEDIUM",
            ConflictSeverity::Low => "LOW",
            ConflictSeverity::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// Broad area a conflict belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictCategory {
    Time,
    Room,
    Teacher,
    Course,
    /// Malformed input rather than a scheduling problem.
    Data,
}

/// Specific conflict kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// A teacher holds more than one session in the same period.
    TeacherDoubleBooking,
    /// A room hosts more than one session in the same period.
    RoomDoubleBooking,
    /// The course has no eligible teacher at all.
    TeacherUnassigned,
    /// Every eligible teacher is at their session limit.
    TeacherOverload,
    /// Eligible teachers have capacity but none was placed.
    TeacherUnavailable,
    /// The course needs a special room type.
    RoomTypeMismatch,
    /// The roster does not fit the room.
    RoomCapacityExceeded,
    /// Suitable rooms exist but all are taken.
    RoomUnavailable,
    /// No time slot could be found.
    TimeSlotsExhausted,
    /// A lunch session sits outside its lunch period.
    LunchPeriodMismatch,
    /// The session has no course.
    MissingCourse,
    /// The session points at a resource that doesn't exist.
    DanglingReference,
}

impl ConflictType {
    pub fn category(self) -> ConflictCategory {
        match self {
            ConflictType::TeacherDoubleBooking
            | ConflictType::TeacherUnassigned
            | ConflictType::TeacherOverload
            | ConflictType::TeacherUnavailable => ConflictCategory::Teacher,
            ConflictType::RoomDoubleBooking
            | ConflictType::RoomTypeMismatch
            | ConflictType::RoomCapacityExceeded
            | ConflictType::RoomUnavailable => ConflictCategory::Room,
            ConflictType::TimeSlotsExhausted | ConflictType::LunchPeriodMismatch => {
                ConflictCategory::Time
            }
            ConflictType::MissingCourse => ConflictCategory::Course,
            ConflictType::DanglingReference => ConflictCategory::Data,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConflictType::TeacherDoubleBooking => "Teacher Double Booking",
            ConflictType::RoomDoubleBooking => "Room Double Booking",
            ConflictType::TeacherUnassigned => "No Teacher Assigned",
            ConflictType::TeacherOverload => "Teacher Overload",
            ConflictType::TeacherUnavailable => "Teacher Unavailable",
            ConflictType::RoomTypeMismatch => "Room Type Mismatch",
            ConflictType::RoomCapacityExceeded => "Room Capacity Exceeded",
            ConflictType::RoomUnavailable => "Room Unavailable",
            ConflictType::TimeSlotsExhausted => "Time Slots Exhausted",
            ConflictType::LunchPeriodMismatch => "Lunch Period Mismatch",
            ConflictType::MissingCourse => "Missing Course",
            ConflictType::DanglingReference => "Dangling Reference",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resource implicated in a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceRef {
    Teacher(TeacherId),
    Room(RoomId),
    TimeSlot(TimeSlotId),
    Course(CourseId),
}

/// A manual action that bypasses the violated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideAction {
    /// Button text.
    pub label: String,
    /// Machine-readable action code (e.g., `ASSIGN_ANY_TEACHER`).
    pub action: String,
    /// Shown before the user confirms.
    pub warning: String,
    pub requires_confirmation: bool,
}

impl OverrideAction {
    /// An override that must be confirmed.
    pub fn confirmed(
        label: impl Into<String>,
        action: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            warning: warning.into(),
            requires_confirmation: true,
        }
    }
}

/// A structured explanation of one conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    /// Every session involved.
    pub session_ids: Vec<String>,
    pub resources: Vec<ResourceRef>,
    /// Plain-language cause.
    pub description: String,
    /// The rule that is not met.
    pub violated_rule: String,
    pub estimated_fix_minutes: u32,
    /// Suggestions, most promising first.
    pub remediations: Vec<String>,
    pub overrides: Vec<OverrideAction>,
    /// Whether the conflict prevents a valid timetable.
    pub blocking: bool,
    pub students_affected: u32,
}

impl Conflict {
    /// Creates a conflict with no sessions, resources, or suggestions yet.
    pub fn new(
        conflict_type: ConflictType,
        severity: ConflictSeverity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            conflict_type,
            severity,
            session_ids: Vec::new(),
            resources: Vec::new(),
            description: description.into(),
            violated_rule: String::new(),
            estimated_fix_minutes: 0,
            remediations: Vec::new(),
            overrides: Vec::new(),
            blocking: false,
            students_affected: 0,
        }
    }

    pub fn with_session(mut self, id: impl Into<String>) -> Self {
        self.session_ids.push(id.into());
        self
    }

    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.violated_rule = rule.into();
        self
    }

    pub fn with_fix_minutes(mut self, minutes: u32) -> Self {
        self.estimated_fix_minutes = minutes;
        self
    }

    pub fn with_remediations<I, S>(mut self, remediations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remediations.extend(remediations.into_iter().map(Into::into));
        self
    }

    pub fn with_override(mut self, action: OverrideAction) -> Self {
        self.overrides.push(action);
        self
    }

    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    pub fn with_students_affected(mut self, students: u32) -> Self {
        self.students_affected = students;
        self
    }

    #[inline]
    pub fn category(&self) -> ConflictCategory {
        self.conflict_type.category()
    }

    #[inline]
    pub fn priority_score(&self) -> u32 {
        self.severity.priority_score()
    }
}
