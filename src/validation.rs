//! Input validation for timetabling problems.
//!
//! Checks structural integrity of the resource pools and of a solution
//! before any search state is created. Detects:
//! - Duplicate identifiers (session ids, course codes, room names, slots)
//! - Ids that point outside their pool
//! - Malformed time slots
//! - Pinned sessions with nothing to pin
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::models::{ProblemFacts, Solution};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identifier.
    DuplicateId,
    /// A session or course references a teacher that doesn't exist.
    InvalidTeacherReference,
    /// A session references a room that doesn't exist.
    InvalidRoomReference,
    /// A session references a time slot that doesn't exist.
    InvalidTimeSlotReference,
    /// A session references a course that doesn't exist.
    InvalidCourseReference,
    /// A time slot ends at or before its start.
    InvalidTimeSlot,
    /// A pinned session has no time slot to stay in.
    PinnedWithoutTimeSlot,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the resource pools.
///
/// Checks:
/// 1. No duplicate course codes
/// 2. No duplicate room names
/// 3. No two slots at the same (day, start)
/// 4. Every slot ends after it starts
/// 5. Every eligible-teacher id of every course exists
pub fn validate_problem(facts: &ProblemFacts) -> ValidationResult {
    let mut errors = Vec::new();

    let mut codes = HashSet::new();
    for course in &facts.courses {
        if !codes.insert(course.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course code: {}", course.code),
            ));
        }
        for t in &course.eligible_teachers {
            if facts.teacher(*t).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTeacherReference,
                    format!("Course '{}' lists unknown {t}", course.code),
                ));
            }
        }
    }

    let mut room_names = HashSet::new();
    for room in &facts.rooms {
        if !room_names.insert(room.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room name: {}", room.name),
            ));
        }
    }

    let mut slot_keys = HashSet::new();
    for (i, slot) in facts.time_slots.iter().enumerate() {
        if slot.end_min <= slot.start_min {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("Time slot {i} ends at or before its start ({slot})"),
            ));
        }
        if !slot_keys.insert((slot.day, slot.start_min)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate time slot: {slot}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a solution together with its resource pools.
///
/// Runs [`validate_problem`] first, then checks:
/// 1. No duplicate session ids
/// 2. Every course, teacher, room, and time slot id a session holds exists
/// 3. Every pinned session has a time slot
///
/// Sessions without a course are allowed; the conflict analyzer reports them.
pub fn validate_solution(solution: &Solution) -> ValidationResult {
    let facts = &solution.facts;
    let mut errors = match validate_problem(facts) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    let mut ids = HashSet::new();
    for session in &solution.sessions {
        if !ids.insert(session.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate session ID: {}", session.id),
            ));
        }

        if let Some(c) = session.course {
            if facts.course(c).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCourseReference,
                    format!("Session '{}' references unknown {c}", session.id),
                ));
            }
        }

        let a = &session.assignment;
        if let Some(t) = a.teacher {
            if facts.teacher(t).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTeacherReference,
                    format!("Session '{}' references unknown {t}", session.id),
                ));
            }
        }
        if let Some(r) = a.room {
            if facts.room(r).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!("Session '{}' references unknown {r}", session.id),
                ));
            }
        }
        match a.time_slot {
            Some(ts) if facts.time_slot(ts).is_none() => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeSlotReference,
                    format!("Session '{}' references unknown {ts}", session.id),
                ));
            }
            None if session.pinned => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PinnedWithoutTimeSlot,
                    format!("Pinned session '{}' has no time slot", session.id),
                ));
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Course, CourseId, Day, Room, RoomId, Session, Teacher, TeacherId, TimeSlot, TimeSlotId,
    };
    use std::sync::Arc;

    fn facts() -> ProblemFacts {
        let mut f = ProblemFacts::new();
        let t = f.add_teacher(Teacher::new("Kim"));
        f.add_room(Room::classroom("101"));
        for slot in TimeSlot::weekly_grid(&[Day::Monday], 3, 480, 45, 5) {
            f.add_time_slot(slot);
        }
        f.add_course(Course::new("MATH1").with_teacher(t));
        f
    }

    #[test]
    fn test_valid_input() {
        let f = Arc::new(facts());
        let sol = Solution::new(
            f,
            vec![Session::new("S1", CourseId(0)).assigned(TeacherId(0), RoomId(0), TimeSlotId(0))],
        );
        assert!(validate_solution(&sol).is_ok());
    }

    #[test]
    fn test_problem_errors() {
        let mut f = facts();
        f.add_course(Course::new("MATH1").with_teacher(TeacherId(9)));
        f.add_room(Room::classroom("101"));
        f.add_time_slot(TimeSlot::new(Day::Monday, 480, 480, 9));

        let errs = validate_problem(&f).unwrap_err();
        let kinds: Vec<_> = errs.iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::InvalidTeacherReference));
        assert!(kinds.contains(&ValidationErrorKind::InvalidTimeSlot));
        // course code, room name, slot (MON 480)
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == ValidationErrorKind::DuplicateId)
                .count(),
            3
        );
    }

    #[test]
    fn test_solution_errors_are_all_collected() {
        let f = Arc::new(facts());
        let mut dangling = Session::new("S2", CourseId(7));
        dangling.assignment.teacher = Some(TeacherId(3));
        dangling.assignment.room = Some(RoomId(3));
        dangling.assignment.time_slot = Some(TimeSlotId(30));

        let sol = Solution::new(
            f,
            vec![
                Session::new("S1", CourseId(0)),
                Session::new("S1", CourseId(0)),
                dangling,
                Session::new("LUNCH", CourseId(0)).pinned(),
            ],
        );
        let errs = validate_solution(&sol).unwrap_err();
        assert_eq!(errs.len(), 6);
        assert!(errs.iter().any(|e| e.kind == ValidationErrorKind::PinnedWithoutTimeSlot));
        assert!(errs.iter().any(|e| e.kind == ValidationErrorKind::InvalidCourseReference));
    }

    #[test]
    fn test_orphan_session_is_allowed() {
        let sol = Solution::new(Arc::new(facts()), vec![Session::orphan("X")]);
        assert!(validate_solution(&sol).is_ok());
    }
}
