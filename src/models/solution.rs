//! Problem facts, solution container, and score.
//!
//! [`ProblemFacts`] holds the read-only resource pools and is shared through
//! an `Arc`, so every candidate solution a strategy clones copies only its
//! session list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{
    Course, CourseId, Day, Room, RoomId, Session, Teacher, TeacherId, TimeSlot, TimeSlotId,
};

/// Weight of one hard violation in [`Score::energy`].
pub const HARD_WEIGHT: f64 = 100.0;

/// Weight of the soft penalty in [`Score::energy`].
pub const SOFT_WEIGHT: f64 = 10.0;

/// Immutable resource pools for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemFacts {
    /// Teachers, indexed by [`TeacherId`].
    pub teachers: Vec<Teacher>,
    /// Rooms, indexed by [`RoomId`].
    pub rooms: Vec<Room>,
    /// Time slots, indexed by [`TimeSlotId`].
    pub time_slots: Vec<TimeSlot>,
    /// Courses, indexed by [`CourseId`].
    pub courses: Vec<Course>,
}

impl ProblemFacts {
    /// Creates empty pools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher and returns its id.
    pub fn add_teacher(&mut self, teacher: Teacher) -> TeacherId {
        self.teachers.push(teacher);
        TeacherId(self.teachers.len() - 1)
    }

    /// Adds a room and returns its id.
    pub fn add_room(&mut self, room: Room) -> RoomId {
        self.rooms.push(room);
        RoomId(self.rooms.len() - 1)
    }

    /// Adds a time slot and returns its id.
    pub fn add_time_slot(&mut self, slot: TimeSlot) -> TimeSlotId {
        self.time_slots.push(slot);
        TimeSlotId(self.time_slots.len() - 1)
    }

    /// Adds a course and returns its id.
    pub fn add_course(&mut self, course: Course) -> CourseId {
        self.courses.push(course);
        CourseId(self.courses.len() - 1)
    }

    #[inline]
    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(id.0)
    }

    #[inline]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    #[inline]
    pub fn time_slot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.time_slots.get(id.0)
    }

    #[inline]
    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(id.0)
    }

    /// Ids of all time slots on `day`.
    pub fn slots_on_day(&self, day: Day) -> Vec<TimeSlotId> {
        self.time_slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.day == day)
            .map(|(i, _)| TimeSlotId(i))
            .collect()
    }

    /// Distinct days that have at least one time slot, in slot order.
    pub fn days(&self) -> Vec<Day> {
        let mut days = Vec::new();
        for slot in &self.time_slots {
            if !days.contains(&slot.day) {
                days.push(slot.day);
            }
        }
        days
    }
}

/// Score of a solution. Lower is better in both components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Number of hard rule breaks (double-booking, capacity, lunch).
    pub hard_penalty: u32,
    /// Soft quality penalty (workload imbalance).
    pub soft_penalty: f64,
}

impl Score {
    /// Creates a score.
    pub fn new(hard_penalty: u32, soft_penalty: f64) -> Self {
        Self {
            hard_penalty,
            soft_penalty,
        }
    }

    /// Weighted total, always minimized.
    #[inline]
    pub fn energy(&self) -> f64 {
        self.hard_penalty as f64 * HARD_WEIGHT + self.soft_penalty * SOFT_WEIGHT
    }

    /// Zero hard violations.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard_penalty == 0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{:.3}soft", self.hard_penalty, self.soft_penalty)
    }
}

/// Sessions with their current assignments plus the shared pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Sessions in a fixed order. Strategies rely on this order staying stable.
    pub sessions: Vec<Session>,
    /// Shared read-only resource pools.
    pub facts: Arc<ProblemFacts>,
    /// Last computed score, if any.
    pub score: Option<Score>,
}

impl Solution {
    /// Creates an unscored solution.
    pub fn new(facts: Arc<ProblemFacts>, sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            facts,
            score: None,
        }
    }

    /// Number of sessions.
    #[inline]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Indices of sessions the search may move.
    pub fn movable_indices(&self) -> Vec<usize> {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_movable())
            .map(|(i, _)| i)
            .collect()
    }

    /// Time slot of the session at `index`, if assigned and known.
    pub fn time_slot_of(&self, index: usize) -> Option<&TimeSlot> {
        self.sessions
            .get(index)
            .and_then(|s| s.assignment.time_slot)
            .and_then(|id| self.facts.time_slot(id))
    }

    /// Sessions per teacher, counting only teachers with at least one session.
    pub fn teacher_loads(&self) -> HashMap<TeacherId, u32> {
        let mut loads = HashMap::new();
        for session in &self.sessions {
            if let Some(t) = session.assignment.teacher {
                *loads.entry(t).or_insert(0) += 1;
            }
        }
        loads
    }

    /// Number of sessions with teacher, room, and time slot.
    pub fn fully_assigned_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_fully_assigned()).count()
    }

    /// Whether `other` has the same session ids in the same order.
    pub fn same_shape(&self, other: &Solution) -> bool {
        self.sessions.len() == other.sessions.len()
            && self
                .sessions
                .iter()
                .zip(&other.sessions)
                .all(|(a, b)| a.id == b.id)
    }

    /// Sets the cached score.
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Assignment;

    fn facts() -> Arc<ProblemFacts> {
        let mut f = ProblemFacts::new();
        let t0 = f.add_teacher(Teacher::new("T0"));
        f.add_teacher(Teacher::new("T1"));
        f.add_room(Room::classroom("R0"));
        for slot in TimeSlot::weekly_grid(&[Day::Monday, Day::Tuesday], 3, 480, 45, 5) {
            f.add_time_slot(slot);
        }
        f.add_course(crate::models::Course::new("C0").with_teacher(t0));
        Arc::new(f)
    }

    #[test]
    fn test_fact_ids_are_sequential() {
        let mut f = ProblemFacts::new();
        assert_eq!(f.add_teacher(Teacher::new("A")), TeacherId(0));
        assert_eq!(f.add_teacher(Teacher::new("B")), TeacherId(1));
        assert_eq!(f.add_room(Room::classroom("R")), RoomId(0));
        assert!(f.teacher(TeacherId(5)).is_none());
    }

    #[test]
    fn test_slots_on_day_and_days() {
        let f = facts();
        assert_eq!(f.slots_on_day(Day::Tuesday).len(), 3);
        assert!(f.slots_on_day(Day::Friday).is_empty());
        assert_eq!(f.days(), vec![Day::Monday, Day::Tuesday]);
    }

    #[test]
    fn test_score_energy() {
        let s = Score::new(2, 0.5);
        assert!((s.energy() - 205.0).abs() < 1e-10);
        assert!(!s.is_feasible());
        assert!(Score::new(0, 3.0).is_feasible());
        assert_eq!(Score::new(1, 0.25).to_string(), "1hard/0.250soft");
    }

    #[test]
    fn test_solution_queries() {
        let f = facts();
        let sessions = vec![
            Session::new("A", CourseId(0)).assigned(TeacherId(0), RoomId(0), TimeSlotId(0)),
            Session::new("B", CourseId(0))
                .pinned()
                .assigned(TeacherId(0), RoomId(0), TimeSlotId(4)),
            Session::new("C", CourseId(0)).with_assignment(Assignment {
                teacher: Some(TeacherId(1)),
                room: None,
                time_slot: None,
            }),
        ];
        let sol = Solution::new(f, sessions);

        assert_eq!(sol.len(), 3);
        assert_eq!(sol.movable_indices(), vec![0, 2]);
        assert_eq!(sol.time_slot_of(1).map(|s| s.day), Some(Day::Tuesday));
        assert!(sol.time_slot_of(2).is_none());
        assert_eq!(sol.fully_assigned_count(), 2);

        let loads = sol.teacher_loads();
        assert_eq!(loads[&TeacherId(0)], 2);
        assert_eq!(loads[&TeacherId(1)], 1);
    }

    #[test]
    fn test_same_shape() {
        let f = facts();
        let a = Solution::new(f.clone(), vec![Session::new("A", CourseId(0))]);
        let b = Solution::new(f.clone(), vec![Session::new("A", CourseId(0)).with_roster(3)]);
        let c = Solution::new(f, vec![Session::new("Z", CourseId(0))]);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }
}
