pub mod appointment;
pub mod error;

pub use appointment::{intervals_overlap, Appointment, AppointmentStatus, NewAppointment, PatientRef};
pub use error::AppError;
