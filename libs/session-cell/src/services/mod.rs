pub mod session;

pub use session::{session_key, BookingSessionService};
