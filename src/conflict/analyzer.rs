//! Post-hoc conflict analysis.
//!
//! # Per-session pass
//!
//! A session without a full assignment is classified by the first missing
//! field:
//!
//! 1. **Teacher**: no eligible teacher at all, every eligible teacher at
//!    their limit, or eligible teachers free but not placed.
//! 2. **Room**: special room type missing, no room large enough, or every
//!    suitable room taken.
//! 3. **Time slot**: slots exhausted.
//!
//! A fully assigned session is re-checked for capacity overflow, room type,
//! and lunch period.
//!
//! # Cross-session pass
//!
//! Sessions are grouped by `(day, period)`. Any teacher or room shared by
//! more than one session of a group yields one blocking conflict naming all
//! of them.
//!
//! Missing or dangling references are reported as low-severity conflicts and
//! never abort the analysis. Results are sorted by descending priority.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{Conflict, ConflictSeverity, ConflictType, OverrideAction, ResourceRef};
use crate::models::{
    Course, CourseId, Day, ProblemFacts, RoomId, RoomRequirement, Session, Solution, TeacherId,
};

const MAX_SUGGESTIONS: usize = 3;

/// Percentage of sessions with teacher, room, and time slot.
///
/// Returns `0.0` for an empty solution.
pub fn completion_percentage(solution: &Solution) -> f64 {
    if solution.is_empty() {
        return 0.0;
    }
    solution.fully_assigned_count() as f64 * 100.0 / solution.len() as f64
}

/// Stateless conflict analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictAnalyzer;

impl ConflictAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Diagnoses every conflict in `solution`, most urgent first.
    pub fn analyze(&self, solution: &Solution) -> Vec<Conflict> {
        let loads = solution.teacher_loads();
        let mut conflicts = Vec::new();

        for session in &solution.sessions {
            self.analyze_session(session, &solution.facts, &loads, &mut conflicts);
        }
        conflicts.extend(self.double_bookings(solution));

        conflicts.sort_by(|a, b| b.priority_score().cmp(&a.priority_score()));

        debug!(
            sessions = solution.len(),
            conflicts = conflicts.len(),
            blocking = conflicts.iter().filter(|c| c.blocking).count(),
            "conflict analysis finished"
        );
        conflicts
    }

    /// See [`completion_percentage`].
    pub fn completion_percentage(&self, solution: &Solution) -> f64 {
        completion_percentage(solution)
    }

    fn analyze_session(
        &self,
        session: &Session,
        facts: &ProblemFacts,
        loads: &HashMap<TeacherId, u32>,
        out: &mut Vec<Conflict>,
    ) {
        let course = match session.course {
            None => {
                out.push(
                    Conflict::new(
                        ConflictType::MissingCourse,
                        ConflictSeverity::Low,
                        format!("Session {} has no course", session.id),
                    )
                    .with_session(&session.id)
                    .with_rule("Every session belongs to a course")
                    .with_fix_minutes(5)
                    .with_remediations(["Link the session to its course or delete it"]),
                );
                None
            }
            Some(id) => match facts.course(id) {
                Some(course) => Some((id, course)),
                None => {
                    out.push(dangling(session, format!("{id}")));
                    return;
                }
            },
        };

        let a = &session.assignment;
        let mut broken = false;
        if let Some(t) = a.teacher.filter(|&t| facts.teacher(t).is_none()) {
            out.push(dangling(session, format!("{t}")));
            broken = true;
        }
        if let Some(r) = a.room.filter(|&r| facts.room(r).is_none()) {
            out.push(dangling(session, format!("{r}")));
            broken = true;
        }
        if let Some(ts) = a.time_slot.filter(|&ts| facts.time_slot(ts).is_none()) {
            out.push(dangling(session, format!("{ts}")));
            broken = true;
        }
        if broken {
            return;
        }

        if session.is_fully_assigned() {
            self.check_assigned(session, course.map(|(_, c)| c), facts, out);
            return;
        }

        let Some((course_id, course)) = course else {
            return;
        };
        let conflict = if a.teacher.is_none() {
            self.teacher_conflict(course, facts, loads)
        } else if a.room.is_none() {
            self.room_conflict(session, course, facts)
        } else {
            self.time_conflict()
        };
        out.push(
            conflict
                .with_session(&session.id)
                .with_resource(ResourceRef::Course(course_id))
                .blocking(),
        );
    }

    fn teacher_conflict(
        &self,
        course: &Course,
        facts: &ProblemFacts,
        loads: &HashMap<TeacherId, u32>,
    ) -> Conflict {
        let load = |t: TeacherId| loads.get(&t).copied().unwrap_or(0);
        let eligible: Vec<TeacherId> = course
            .eligible_teachers
            .iter()
            .copied()
            .filter(|&t| facts.teacher(t).is_some_and(|teacher| teacher.active))
            .collect();

        if eligible.is_empty() {
            return Conflict::new(
                ConflictType::TeacherUnassigned,
                ConflictSeverity::Critical,
                format!("Course {} has no teacher assigned", course.code),
            )
            .with_rule("Course requires an assigned teacher")
            .with_fix_minutes(5)
            .with_remediations([
                format!("Assign a qualified teacher to {}", course.code),
                "Import teachers with course assignments".to_string(),
                format!("Reactivate a teacher who can cover {}", course.code),
            ])
            .with_override(OverrideAction::confirmed(
                "Assign any available teacher",
                "ASSIGN_ANY_TEACHER",
                "Teacher may not be qualified for this subject",
            ));
        }

        let free: Vec<TeacherId> = eligible
            .iter()
            .copied()
            .filter(|&t| {
                facts
                    .teacher(t)
                    .is_some_and(|teacher| !teacher.is_at_capacity(load(t)))
            })
            .collect();

        if free.is_empty() {
            let alternatives: Vec<&str> = facts
                .teachers
                .iter()
                .enumerate()
                .filter(|&(i, t)| {
                    let id = TeacherId(i);
                    t.active && !eligible.contains(&id) && !t.is_at_capacity(load(id))
                })
                .map(|(_, t)| t.name.as_str())
                .take(MAX_SUGGESTIONS)
                .collect();
            let severity = if alternatives.is_empty() {
                ConflictSeverity::Critical
            } else {
                ConflictSeverity::High
            };
            let subject = if course.subject.is_empty() {
                &course.code
            } else {
                &course.subject
            };
            let last = if alternatives.is_empty() {
                "Add teachers to the system".to_string()
            } else {
                format!("Consider assigning to: {}", alternatives.join(", "))
            };

            let mut conflict = Conflict::new(
                ConflictType::TeacherOverload,
                severity,
                "All qualified teachers are at maximum capacity",
            )
            .with_rule("Teacher session limit reached")
            .with_fix_minutes(10)
            .with_remediations([
                format!("Hire additional {subject} teachers"),
                "Increase the session limit of existing teachers".to_string(),
                "Reduce the number of course sections".to_string(),
                last,
            ]);
            for t in eligible {
                conflict = conflict.with_resource(ResourceRef::Teacher(t));
            }
            return conflict;
        }

        let names: Vec<&str> = free
            .iter()
            .filter_map(|&t| facts.teacher(t))
            .map(|t| t.name.as_str())
            .take(MAX_SUGGESTIONS)
            .collect();
        let mut conflict = Conflict::new(
            ConflictType::TeacherUnavailable,
            ConflictSeverity::High,
            "Qualified teachers have capacity but none is free in a usable period",
        )
        .with_rule("Teacher can only teach one class at a time")
        .with_fix_minutes(5)
        .with_remediations([
            format!("Assign manually: {}", names.join(", ")),
            "Move a conflicting session to free a period".to_string(),
            "Extend school hours to create more time slots".to_string(),
        ]);
        for t in free.into_iter().take(MAX_SUGGESTIONS) {
            conflict = conflict.with_resource(ResourceRef::Teacher(t));
        }
        conflict
    }

    fn room_conflict(&self, session: &Session, course: &Course, facts: &ProblemFacts) -> Conflict {
        let requirement = course.room_requirement;
        let students = session.roster_size;

        if let Some(label) = requirement.label() {
            let exists = facts
                .rooms
                .iter()
                .any(|r| r.available && requirement.is_met_by(&r.room_type));
            if !exists {
                let (override_label, action, warning, minutes) = match requirement {
                    RoomRequirement::Gymnasium => (
                        "Schedule in regular classroom",
                        "OVERRIDE_GYM_REQUIREMENT",
                        "PE classes typically require a gymnasium for proper instruction",
                        10,
                    ),
                    RoomRequirement::Auditorium => (
                        "Schedule in a large classroom",
                        "OVERRIDE_AUDITORIUM_REQUIREMENT",
                        "Seating and stage equipment may be insufficient",
                        10,
                    ),
                    _ => (
                        "Schedule in regular classroom anyway",
                        "OVERRIDE_LAB_REQUIREMENT",
                        "This course requires lab equipment which may not be available \
                         in a regular classroom",
                        15,
                    ),
                };
                return Conflict::new(
                    ConflictType::RoomTypeMismatch,
                    ConflictSeverity::Critical,
                    format!(
                        "Course {} requires a {label} but no {label} rooms are available",
                        course.code
                    ),
                )
                .with_rule(format!("Course requires a {label} room"))
                .with_fix_minutes(minutes)
                .with_remediations([
                    format!("Add a {label} room"),
                    format!("Convert an existing room to a {label}"),
                    format!("Mark {} as not requiring a {label} (if incorrect)", course.code),
                ])
                .with_override(OverrideAction::confirmed(override_label, action, warning))
                .with_students_affected(students);
            }
        }

        let suitable: Vec<RoomId> = facts
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| r.available && requirement.is_met_by(&r.room_type) && r.fits(students))
            .map(|(i, _)| RoomId(i))
            .collect();

        if suitable.is_empty() {
            return Conflict::new(
                ConflictType::RoomCapacityExceeded,
                ConflictSeverity::High,
                format!("No room large enough for {students} students"),
            )
            .with_rule("Room capacity must accommodate all enrolled students")
            .with_fix_minutes(10)
            .with_remediations([
                format!("Add a larger room (capacity: {students}+)"),
                "Split course into multiple sections".to_string(),
                "Reduce course enrollment".to_string(),
                "Increase capacity of existing rooms".to_string(),
            ])
            .with_students_affected(students);
        }

        let names: Vec<&str> = suitable
            .iter()
            .filter_map(|&r| facts.room(r))
            .map(|r| r.name.as_str())
            .take(MAX_SUGGESTIONS)
            .collect();
        let mut conflict = Conflict::new(
            ConflictType::RoomUnavailable,
            ConflictSeverity::High,
            "All suitable rooms are occupied at available time slots",
        )
        .with_rule("Room availability exhausted")
        .with_fix_minutes(5)
        .with_remediations([
            "Add more rooms to the system".to_string(),
            "Extend school hours to create more time slots".to_string(),
            format!("Consider using: {}", names.join(", ")),
        ]);
        for r in suitable.into_iter().take(MAX_SUGGESTIONS) {
            conflict = conflict.with_resource(ResourceRef::Room(r));
        }
        conflict
    }

    fn time_conflict(&self) -> Conflict {
        Conflict::new(
            ConflictType::TimeSlotsExhausted,
            ConflictSeverity::High,
            "All available time slots have been exhausted",
        )
        .with_rule("No available time slots remain")
        .with_fix_minutes(5)
        .with_remediations([
            "Extend school hours (add periods to start/end of day)",
            "Reduce number of course sections",
            "Enable lunch period scheduling",
            "Add more rooms to increase capacity",
        ])
    }

    /// Soft re-checks of a fully assigned session with valid references.
    fn check_assigned(
        &self,
        session: &Session,
        course: Option<&Course>,
        facts: &ProblemFacts,
        out: &mut Vec<Conflict>,
    ) {
        let a = &session.assignment;
        let (Some(room_id), Some(slot_id)) = (a.room, a.time_slot) else {
            return;
        };
        let (Some(room), Some(slot)) = (facts.room(room_id), facts.time_slot(slot_id)) else {
            return;
        };

        let overflow = room.overflow(session.roster_size);
        if overflow > 0 {
            out.push(
                Conflict::new(
                    ConflictType::RoomCapacityExceeded,
                    ConflictSeverity::Medium,
                    format!("Room {} capacity exceeded by {overflow} students", room.name),
                )
                .with_session(&session.id)
                .with_resource(ResourceRef::Room(room_id))
                .with_rule("Room capacity must accommodate all enrolled students")
                .with_fix_minutes(5)
                .with_remediations([
                    "Move the session to a larger room",
                    "Split the section",
                    "Reduce enrollment",
                ])
                .with_students_affected(overflow),
            );
        }

        if let Some(course) = course {
            let requirement = course.room_requirement;
            if let Some(label) = requirement.label() {
                if !requirement.is_met_by(&room.room_type) {
                    out.push(
                        Conflict::new(
                            ConflictType::RoomTypeMismatch,
                            ConflictSeverity::Medium,
                            format!(
                                "Course {} requires a {label} but is placed in {}",
                                course.code, room.name
                            ),
                        )
                        .with_session(&session.id)
                        .with_resource(ResourceRef::Room(room_id))
                        .with_rule(format!("Course requires a {label} room"))
                        .with_fix_minutes(10)
                        .with_remediations([format!("Move the session to a {label}")])
                        .with_students_affected(session.roster_size),
                    );
                }
            }
        }

        if let Some(period) = session.lunch_period {
            if slot.period != period {
                out.push(
                    Conflict::new(
                        ConflictType::LunchPeriodMismatch,
                        ConflictSeverity::High,
                        format!(
                            "Lunch session {} is in period {} instead of period {period}",
                            session.id, slot.period
                        ),
                    )
                    .with_session(&session.id)
                    .with_resource(ResourceRef::TimeSlot(slot_id))
                    .with_rule("Lunch sessions must sit in their lunch period")
                    .with_fix_minutes(5)
                    .with_remediations([
                        format!("Move the session to period {period}"),
                        "Reassign the lunch wave".to_string(),
                    ])
                    .with_students_affected(session.roster_size)
                    .blocking(),
                );
            }
        }
    }

    fn double_bookings(&self, solution: &Solution) -> Vec<Conflict> {
        let facts = &solution.facts;
        let mut by_period: BTreeMap<(Day, u32), Vec<usize>> = BTreeMap::new();
        for i in 0..solution.len() {
            if let Some(slot) = solution.time_slot_of(i) {
                by_period.entry((slot.day, slot.period)).or_default().push(i);
            }
        }

        let mut conflicts = Vec::new();
        for ((day, period), members) in by_period {
            let mut teachers: BTreeMap<TeacherId, Vec<usize>> = BTreeMap::new();
            let mut rooms: BTreeMap<RoomId, Vec<usize>> = BTreeMap::new();
            for &i in &members {
                let a = &solution.sessions[i].assignment;
                if let Some(t) = a.teacher {
                    teachers.entry(t).or_default().push(i);
                }
                if let Some(r) = a.room {
                    rooms.entry(r).or_default().push(i);
                }
            }

            for (t, group) in teachers.into_iter().filter(|(_, g)| g.len() > 1) {
                let name = facts.teacher(t).map_or("Unknown", |t| t.name.as_str());
                let conflict = Conflict::new(
                    ConflictType::TeacherDoubleBooking,
                    ConflictSeverity::Critical,
                    format!(
                        "Teacher {name} is assigned to {} classes at the same time \
                         ({day} P{period}: {})",
                        group.len(),
                        course_codes(solution, &group)
                    ),
                )
                .with_resource(ResourceRef::Teacher(t))
                .with_rule("Teacher can only teach one class at a time")
                .with_fix_minutes(10)
                .with_remediations([
                    "Reassign one of these courses to a different teacher",
                    "Move one course to a different time slot",
                    "Cancel or combine duplicate sections",
                ]);
                conflicts.push(group_conflict(conflict, solution, &group));
            }

            for (r, group) in rooms.into_iter().filter(|(_, g)| g.len() > 1) {
                let name = facts.room(r).map_or("Unknown", |r| r.name.as_str());
                let conflict = Conflict::new(
                    ConflictType::RoomDoubleBooking,
                    ConflictSeverity::Critical,
                    format!(
                        "Room {name} is assigned to {} classes at the same time \
                         ({day} P{period}: {})",
                        group.len(),
                        course_codes(solution, &group)
                    ),
                )
                .with_resource(ResourceRef::Room(r))
                .with_rule("Room can only host one class at a time")
                .with_fix_minutes(5)
                .with_remediations([
                    "Move one course to a different room",
                    "Move one course to a different time slot",
                    "Add more rooms to the system",
                ]);
                conflicts.push(group_conflict(conflict, solution, &group));
            }
        }
        conflicts
    }
}

fn dangling(session: &Session, target: String) -> Conflict {
    Conflict::new(
        ConflictType::DanglingReference,
        ConflictSeverity::Low,
        format!("Session {} references missing {target}", session.id),
    )
    .with_session(&session.id)
    .with_rule("References must point at existing records")
    .with_fix_minutes(5)
    .with_remediations(["Re-import the resource catalog", "Clear the stale reference"])
}

/// Attaches sessions, time slots, and the student count of a double booking.
fn group_conflict(mut conflict: Conflict, solution: &Solution, group: &[usize]) -> Conflict {
    let mut students = 0u32;
    for &i in group {
        let session = &solution.sessions[i];
        students = students.saturating_add(session.roster_size);
        conflict = conflict.with_session(&session.id);
        if let Some(ts) = session.assignment.time_slot {
            conflict = conflict.with_resource(ResourceRef::TimeSlot(ts));
        }
    }
    conflict.with_students_affected(students).blocking()
}

fn course_codes(solution: &Solution, group: &[usize]) -> String {
    group
        .iter()
        .map(|&i| {
            solution.sessions[i]
                .course
                .and_then(|c: CourseId| solution.facts.course(c))
                .map_or("Unknown", |c| c.code.as_str())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
