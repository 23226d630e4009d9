pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod store;

pub use error::{SessionError, StoreError};
pub use models::*;
pub use router::session_routes;
pub use services::BookingSessionService;
pub use state::SessionState;
pub use store::{InMemoryStore, KeyValueStore, RedisStore};
