use serde::{Deserialize, Serialize};

pub const PRESENT_SHIFTS: &str = "presentShifts";
pub const ABSENT_SHIFTS: &str = "absentShifts";

/// Attendance mark for one staff member on one shift.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    /// (present, absent) shift counts contributed by one mark.
    pub fn shift_counts(self) -> (f64, f64) {
        match self {
            AttendanceStatus::Present => (1.0, 0.0),
            AttendanceStatus::Absent => (0.0, 1.0),
        }
    }
}
