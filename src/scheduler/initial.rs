//! Initial timetable construction.
//!
//! # Algorithms
//!
//! - **Round-robin**: the k-th movable session gets teacher `k mod |T|`,
//!   room `k mod |R|`, slot `k mod |S|`. Ignores eligibility and clashes;
//!   the search is expected to repair it.
//! - **Greedy first-fit**: sessions in order; least-loaded eligible teacher
//!   with spare capacity, then the first (slot, room) pair where teacher and
//!   room are both free and the room matches type and size. Whatever cannot
//!   be filled stays `None`.
//!
//! Pinned sessions are copied through unchanged and their resources count
//! as busy for the greedy pass.
//!
//! # Complexity
//! Greedy: O(n * t * s * r) for n sessions, t eligible teachers, s slots,
//! r rooms.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::models::{Assignment, RoomId, Session, Solution, TeacherId, TimeSlotId};

/// Builds starting assignments for the search.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialAssigner;

impl InitialAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Cycles teachers, rooms, and slots over the movable sessions.
    ///
    /// An empty pool leaves the corresponding field `None`.
    pub fn round_robin(&self, solution: &Solution) -> Solution {
        let facts = &solution.facts;
        let (nt, nr, ns) = (facts.teachers.len(), facts.rooms.len(), facts.time_slots.len());
        let mut out = solution.clone();
        out.score = None;

        for (k, index) in solution.movable_indices().into_iter().enumerate() {
            out.sessions[index].assignment = Assignment {
                teacher: (nt > 0).then(|| TeacherId(k % nt)),
                room: (nr > 0).then(|| RoomId(k % nr)),
                time_slot: (ns > 0).then(|| TimeSlotId(k % ns)),
            };
        }

        info!(
            sessions = out.len(),
            assigned = out.fully_assigned_count(),
            "round-robin construction finished"
        );
        out
    }

    /// Greedy first-fit construction.
    pub fn greedy(&self, solution: &Solution) -> Solution {
        let facts = &solution.facts;
        let mut out = solution.clone();
        out.score = None;

        let mut loads: HashMap<TeacherId, u32> = HashMap::new();
        let mut teacher_busy: HashSet<(TeacherId, TimeSlotId)> = HashSet::new();
        let mut room_busy: HashSet<(RoomId, TimeSlotId)> = HashSet::new();
        for session in solution.sessions.iter().filter(|s| !s.is_movable()) {
            let a = &session.assignment;
            if let Some(t) = a.teacher {
                *loads.entry(t).or_insert(0) += 1;
                if let Some(ts) = a.time_slot {
                    teacher_busy.insert((t, ts));
                }
            }
            if let (Some(r), Some(ts)) = (a.room, a.time_slot) {
                room_busy.insert((r, ts));
            }
        }

        for index in solution.movable_indices() {
            let assignment = self.place(
                &out.sessions[index],
                solution,
                &loads,
                &teacher_busy,
                &room_busy,
            );
            if let Some(t) = assignment.teacher {
                *loads.entry(t).or_insert(0) += 1;
                if let Some(ts) = assignment.time_slot {
                    teacher_busy.insert((t, ts));
                }
            }
            if let (Some(r), Some(ts)) = (assignment.room, assignment.time_slot) {
                room_busy.insert((r, ts));
            }
            out.sessions[index].assignment = assignment;
        }

        info!(
            sessions = out.len(),
            assigned = out.fully_assigned_count(),
            teachers = facts.teachers.len(),
            rooms = facts.rooms.len(),
            slots = facts.time_slots.len(),
            "greedy construction finished"
        );
        out
    }

    fn place(
        &self,
        session: &Session,
        solution: &Solution,
        loads: &HashMap<TeacherId, u32>,
        teacher_busy: &HashSet<(TeacherId, TimeSlotId)>,
        room_busy: &HashSet<(RoomId, TimeSlotId)>,
    ) -> Assignment {
        let facts = &solution.facts;
        let Some(course) = session.course.and_then(|c| facts.course(c)) else {
            return Assignment::default();
        };
        let load = |t: TeacherId| loads.get(&t).copied().unwrap_or(0);

        let mut teachers: Vec<TeacherId> = course
            .eligible_teachers
            .iter()
            .copied()
            .filter(|&t| {
                facts
                    .teacher(t)
                    .is_some_and(|teacher| teacher.active && !teacher.is_at_capacity(load(t)))
            })
            .collect();
        teachers.sort_by_key(|&t| (load(t), t));
        teachers.dedup();
        let Some(&first_teacher) = teachers.first() else {
            return Assignment::default();
        };

        let rooms: Vec<RoomId> = facts
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.available
                    && course.room_requirement.is_met_by(&r.room_type)
                    && r.fits(session.roster_size)
            })
            .map(|(i, _)| RoomId(i))
            .collect();
        let Some(&first_room) = rooms.first() else {
            return Assignment {
                teacher: Some(first_teacher),
                ..Assignment::default()
            };
        };

        for &teacher in &teachers {
            for ts in (0..facts.time_slots.len()).map(TimeSlotId) {
                if teacher_busy.contains(&(teacher, ts)) {
                    continue;
                }
                if let Some(&room) = rooms.iter().find(|&&r| !room_busy.contains(&(r, ts))) {
                    return Assignment::new(teacher, room, ts);
                }
            }
        }

        Assignment {
            teacher: Some(first_teacher),
            room: Some(first_room),
            time_slot: None,
        }
    }
}
