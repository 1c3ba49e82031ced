//! Typed indices into the problem-fact arenas.
//!
//! Resources are stored in flat `Vec`s inside [`ProblemFacts`](super::ProblemFacts)
//! and sessions refer to them by index. Nothing points back from a resource to
//! its sessions, so cloning a solution is a plain `Vec` copy.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Creates an id from a raw arena index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw arena index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

typed_id!(
    /// Index into [`ProblemFacts::teachers`](super::ProblemFacts::teachers).
    TeacherId,
    "Teacher"
);
typed_id!(
    /// Index into [`ProblemFacts::rooms`](super::ProblemFacts::rooms).
    RoomId,
    "Room"
);
typed_id!(
    /// Index into [`ProblemFacts::time_slots`](super::ProblemFacts::time_slots).
    TimeSlotId,
    "TimeSlot"
);
typed_id!(
    /// Index into [`ProblemFacts::courses`](super::ProblemFacts::courses).
    CourseId,
    "Course"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let t = TeacherId::new(3);
        assert_eq!(t.index(), 3);
        assert_eq!(TeacherId::from(3), t);
        assert_eq!(t.to_string(), "Teacher(3)");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&RoomId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RoomId(7));
    }
}
