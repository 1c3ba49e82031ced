//! Timetabling domain models.
//!
//! Resources (teachers, rooms, time slots, courses) live in flat arenas inside
//! [`ProblemFacts`] and are referenced by typed ids. Sessions carry their
//! current [`Assignment`] and are the only thing the search mutates.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | Generic scheduling |
//! |-------------|--------|--------------------|
//! | Session | Weekly class meeting | Activity |
//! | Teacher / Room | Staff / Classroom | Resource |
//! | TimeSlot | Period on a weekday | Time bucket |
//! | Solution | Draft timetable | Schedule |

mod calendar;
mod course;
mod ids;
mod resource;
mod session;
mod solution;

pub use calendar::{Day, TimeSlot};
pub use course::{Course, RoomRequirement};
pub use ids::{CourseId, RoomId, TeacherId, TimeSlotId};
pub use resource::{Room, RoomType, Teacher};
pub use session::{Assignment, Session};
pub use solution::{ProblemFacts, Score, Solution, HARD_WEIGHT, SOFT_WEIGHT};
