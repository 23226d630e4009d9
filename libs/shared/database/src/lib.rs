pub mod appointments;
pub mod error;
pub mod memory;
pub mod supabase;

pub use appointments::{AppointmentRepository, SupabaseAppointmentRepository};
pub use error::DbError;
pub use memory::InMemoryAppointmentRepository;
pub use supabase::SupabaseClient;

#[cfg(feature = "mocks")]
pub use appointments::MockAppointmentRepository;
