//! Timetable quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Completion | Fully assigned sessions / sessions, in percent |
//! | Hard violations | Same count the evaluator uses |
//! | Teacher load | Sessions per teacher |
//! | Load std dev | Population standard deviation of teacher load |
//! | Room utilization | Sessions in the room / time slots |
//! | Seat utilization | Mean roster / capacity over rooms with known capacity |

use std::collections::BTreeMap;

use crate::conflict::completion_percentage;
use crate::models::{RoomId, Solution, TeacherId};
use crate::score::Evaluator;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Percentage of fully assigned sessions (0..100).
    pub completion_percentage: f64,
    pub hard_violations: u32,
    /// Sessions per teacher, teachers without sessions omitted.
    pub teacher_loads: BTreeMap<TeacherId, u32>,
    pub load_std_dev: f64,
    /// Per-room share of the weekly slots in use (0.0..1.0).
    pub utilization_by_room: BTreeMap<RoomId, f64>,
    /// Mean over all rooms in the pool.
    pub avg_room_utilization: f64,
    /// Mean roster/capacity of placed sessions. `0.0` if none qualifies.
    pub avg_seat_utilization: f64,
}

impl TimetableKpi {
    /// Computes KPIs for a solution.
    pub fn calculate(solution: &Solution) -> Self {
        let evaluator = Evaluator::new();
        let facts = &solution.facts;
        let slots = facts.time_slots.len();

        let mut room_sessions: BTreeMap<RoomId, usize> =
            (0..facts.rooms.len()).map(|i| (RoomId(i), 0)).collect();
        let mut seat_sum = 0.0;
        let mut seat_count = 0usize;
        for session in solution.sessions.iter().filter(|s| s.is_fully_assigned()) {
            let Some(r) = session.assignment.room else {
                continue;
            };
            if let Some(count) = room_sessions.get_mut(&r) {
                *count += 1;
            }
            if let Some(capacity) = facts.room(r).and_then(|room| room.capacity) {
                if capacity > 0 {
                    seat_sum += session.roster_size as f64 / capacity as f64;
                    seat_count += 1;
                }
            }
        }

        let utilization_by_room: BTreeMap<RoomId, f64> = room_sessions
            .into_iter()
            .map(|(r, n)| {
                let u = if slots == 0 { 0.0 } else { n as f64 / slots as f64 };
                (r, u)
            })
            .collect();
        let avg_room_utilization = if utilization_by_room.is_empty() {
            0.0
        } else {
            utilization_by_room.values().sum::<f64>() / utilization_by_room.len() as f64
        };

        Self {
            completion_percentage: completion_percentage(solution),
            hard_violations: evaluator.hard_violations(solution),
            teacher_loads: solution.teacher_loads().into_iter().collect(),
            load_std_dev: evaluator.workload_deviation(solution),
            utilization_by_room,
            avg_room_utilization,
            avg_seat_utilization: if seat_count == 0 {
                0.0
            } else {
                seat_sum / seat_count as f64
            },
        }
    }

    /// Whether the timetable is complete and clash-free.
    pub fn is_publishable(&self) -> bool {
        self.hard_violations == 0 && self.completion_percentage >= 100.0
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_hard_violations: u32, min_completion: f64) -> bool {
        self.hard_violations <= max_hard_violations && self.completion_percentage >= min_completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Course, CourseId, Day, ProblemFacts, Room, Session, Teacher, TimeSlot, TimeSlotId,
    };
    use std::sync::Arc;

    fn facts() -> Arc<ProblemFacts> {
        let mut f = ProblemFacts::new();
        f.add_teacher(Teacher::new("A"));
        f.add_teacher(Teacher::new("B"));
        f.add_room(Room::classroom("101").with_capacity(30));
        f.add_room(Room::classroom("102"));
        for slot in TimeSlot::weekly_grid(&[Day::Monday], 4, 480, 45, 5) {
            f.add_time_slot(slot);
        }
        f.add_course(Course::new("MATH1"));
        Arc::new(f)
    }

    #[test]
    fn test_kpi_basic() {
        let sessions = vec![
            Session::new("S0", CourseId(0))
                .with_roster(15)
                .assigned(TeacherId(0), RoomId(0), TimeSlotId(0)),
            Session::new("S1", CourseId(0))
                .with_roster(30)
                .assigned(TeacherId(0), RoomId(0), TimeSlotId(1)),
            Session::new("S2", CourseId(0))
                .with_roster(10)
                .assigned(TeacherId(1), RoomId(1), TimeSlotId(0)),
            Session::new("S3", CourseId(0)),
        ];
        let kpi = TimetableKpi::calculate(&Solution::new(facts(), sessions));

        assert!((kpi.completion_percentage - 75.0).abs() < 1e-10);
        assert_eq!(kpi.hard_violations, 0);
        assert_eq!(kpi.teacher_loads[&TeacherId(0)], 2);
        assert_eq!(kpi.teacher_loads[&TeacherId(1)], 1);
        assert!((kpi.load_std_dev - 0.5).abs() < 1e-10);
        assert!((kpi.utilization_by_room[&RoomId(0)] - 0.5).abs() < 1e-10);
        assert!((kpi.utilization_by_room[&RoomId(1)] - 0.25).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 0.375).abs() < 1e-10);
        // 102 has no capacity: (0.5 + 1.0) / 2
        assert!((kpi.avg_seat_utilization - 0.75).abs() < 1e-10);
        assert!(!kpi.is_publishable());
        assert!(kpi.meets_thresholds(0, 75.0));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&Solution::new(facts(), Vec::new()));
        assert_eq!(kpi.completion_percentage, 0.0);
        assert!(kpi.teacher_loads.is_empty());
        assert_eq!(kpi.avg_room_utilization, 0.0);
        assert_eq!(kpi.avg_seat_utilization, 0.0);
    }
}
