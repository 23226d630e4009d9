use std::sync::Arc;

use tracing::{info, warn};

use doctor_cell::{DoctorRepository, InMemoryDoctorRepository, SupabaseDoctorRepository};
use patient_cell::{InMemoryPatientRepository, PatientRepository, SupabasePatientRepository};
use session_cell::{InMemoryStore, KeyValueStore, RedisStore};
use shared_config::AppConfig;
use shared_database::{
    AppointmentRepository, InMemoryAppointmentRepository, SupabaseAppointmentRepository, SupabaseClient,
};

/// Storage handles shared by every cell.
#[derive(Clone)]
pub struct AppBackends {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub sessions: Arc<dyn KeyValueStore>,
}

impl AppBackends {
    /// Supabase when configured, otherwise process-local tables. Redis when
    /// configured and reachable, otherwise an in-memory session store.
    pub async fn from_config(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let (doctors, patients, appointments) = relational_backends(&config);
        let sessions = session_backend(&config).await;

        Self {
            config,
            doctors,
            patients,
            appointments,
            sessions,
        }
    }

    #[cfg(test)]
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            doctors: Arc::new(InMemoryDoctorRepository::new()),
            patients: Arc::new(InMemoryPatientRepository::new()),
            appointments: Arc::new(InMemoryAppointmentRepository::new()),
            sessions: Arc::new(InMemoryStore::new()),
        }
    }
}

fn relational_backends(
    config: &AppConfig,
) -> (
    Arc<dyn DoctorRepository>,
    Arc<dyn PatientRepository>,
    Arc<dyn AppointmentRepository>,
) {
    if !config.is_configured() {
        warn!("Supabase not configured, doctors, patients and appointments are kept in memory");
        return (
            Arc::new(InMemoryDoctorRepository::new()),
            Arc::new(InMemoryPatientRepository::new()),
            Arc::new(InMemoryAppointmentRepository::new()),
        );
    }

    info!("Using Supabase at {}", config.supabase_url);
    let supabase = Arc::new(SupabaseClient::new(config));
    (
        Arc::new(SupabaseDoctorRepository::new(supabase.clone())),
        Arc::new(SupabasePatientRepository::new(supabase.clone())),
        Arc::new(SupabaseAppointmentRepository::new(supabase)),
    )
}

async fn session_backend(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let Some(redis_url) = config.redis_url.as_deref().filter(|_| config.is_session_store_configured()) else {
        return Arc::new(InMemoryStore::new());
    };

    match RedisStore::connect(redis_url).await {
        Ok(store) => {
            info!("Booking sessions stored in Redis");
            Arc::new(store)
        }
        Err(e) => {
            warn!("Redis unavailable ({}), keeping booking sessions in memory", e);
            Arc::new(InMemoryStore::new())
        }
    }
}
