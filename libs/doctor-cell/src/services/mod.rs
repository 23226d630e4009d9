pub mod availability;
pub mod directory;
pub mod repository;
pub mod slots;

pub use availability::AvailabilityService;
pub use directory::DirectoryService;
pub use repository::{DoctorRepository, InMemoryDoctorRepository, SupabaseDoctorRepository};
pub use slots::SlotGenerator;
