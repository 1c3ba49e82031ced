//! Shared test problems.

use std::sync::Arc;

use crate::models::{
    Course, CourseId, Day, ProblemFacts, Room, RoomId, Session, Solution, Teacher, TeacherId,
    TimeSlot, TimeSlotId,
};

/// `sessions` sessions stacked on slot 0, teacher and room `i % pool`.
///
/// The calendar has `days × periods` slots, so any `sessions` up to
/// `pool × days × periods` admits a conflict-free timetable.
pub(crate) fn stacked(sessions: usize, pool: usize, days: usize, periods: u32) -> Solution {
    let mut facts = ProblemFacts::new();
    for i in 0..pool {
        facts.add_teacher(Teacher::new(format!("T{i}")));
        facts.add_room(Room::classroom(format!("R{i}")).with_capacity(30));
    }
    for slot in TimeSlot::weekly_grid(&Day::WEEKDAYS[..days], periods, 480, 45, 5) {
        facts.add_time_slot(slot);
    }
    let mut course = Course::new("GEN");
    for i in 0..pool {
        course = course.with_teacher(TeacherId(i));
    }
    facts.add_course(course);

    let sessions = (0..sessions)
        .map(|i| {
            Session::new(format!("S{i}"), CourseId(0))
                .with_roster(20)
                .assigned(TeacherId(i % pool), RoomId(i % pool), TimeSlotId(0))
        })
        .collect();
    Solution::new(Arc::new(facts), sessions)
}

/// The 8-session, 2-teacher, 2-day × 4-period problem most search tests use.
pub(crate) fn toy() -> Solution {
    stacked(8, 2, 2, 4)
}
