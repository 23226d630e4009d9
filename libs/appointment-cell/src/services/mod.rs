pub mod booking;
pub mod confirmation;
pub mod conflict;
pub mod lifecycle;
pub mod lock;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use confirmation::{generate_confirmation_id, is_valid_confirmation_id, CONFIRMATION_PREFIX};
pub use conflict::ConflictDetectionService;
pub use lifecycle::AppointmentLifecycleService;
pub use lock::DoctorLocks;
