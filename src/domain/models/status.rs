use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state shared by bookings and their jobs. Stored as the variant
/// name (TEXT) in both backends.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Scheduled,
    CheckedIn,
    ServiceInProgress,
    QualityCheck,
    ReadyForPickup,
    IssueReported,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "Scheduled",
            BookingStatus::CheckedIn => "CheckedIn",
            BookingStatus::ServiceInProgress => "ServiceInProgress",
            BookingStatus::QualityCheck => "QualityCheck",
            BookingStatus::ReadyForPickup => "ReadyForPickup",
            BookingStatus::IssueReported => "IssueReported",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal outgoing transitions per state. Total: every state has an arm,
/// terminal states map to the empty set. Self-transitions are never legal.
pub fn allowed_from(from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;
    match from {
        Scheduled => &[CheckedIn, Cancelled],
        CheckedIn => &[ServiceInProgress, Cancelled],
        ServiceInProgress => &[QualityCheck, IssueReported, Cancelled],
        QualityCheck => &[ReadyForPickup, ServiceInProgress, IssueReported],
        ReadyForPickup => &[Completed],
        IssueReported => &[ServiceInProgress, Cancelled],
        Completed => &[],
        Cancelled => &[],
    }
}

pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    allowed_from(from).contains(&to)
}
