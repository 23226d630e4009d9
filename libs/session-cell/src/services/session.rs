use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use patient_cell::{PatientRepository, PatientService};
use shared_models::PatientRef;

use crate::error::SessionError;
use crate::models::{
    BookingSessionStatus, BookingState, BookingStateUpdate, ConfirmationDetails, SessionStatus,
};
use crate::state::SessionState;
use crate::store::KeyValueStore;

pub fn session_key(session_id: &str) -> String {
    format!("booking_session:{}", session_id)
}

pub struct BookingSessionService {
    store: Arc<dyn KeyValueStore>,
    patients: PatientService,
    ttl_seconds: u64,
}

impl BookingSessionService {
    pub fn new(state: &SessionState) -> Self {
        Self::with_parts(
            state.store.clone(),
            state.patients.clone(),
            state.config.session_ttl_seconds,
        )
    }

    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        patients: Arc<dyn PatientRepository>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            patients: PatientService::new(patients),
            ttl_seconds,
        }
    }

    pub async fn create_session(&self, user_id: i64) -> Result<BookingState, SessionError> {
        self.patients.get_active_user(user_id).await?;

        let state = BookingState::new(Uuid::new_v4().to_string(), user_id, Utc::now());
        self.save(&state).await?;

        info!("Created booking session {} for user {}", state.session_id, user_id);
        Ok(state)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<BookingState, SessionError> {
        let raw = self
            .store
            .get(&session_key(session_id))
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        Ok(serde_json::from_str(&raw)?)
    }

    /// Merges the update into the stored state and refreshes its lifetime.
    pub async fn update_state(
        &self,
        session_id: &str,
        update: BookingStateUpdate,
    ) -> Result<BookingState, SessionError> {
        let mut state = self.open_session(session_id).await?;

        let explicit_status = update.status.is_some();
        state.apply(update);
        if !explicit_status && state.status == BookingSessionStatus::Initialized {
            state.status = BookingSessionStatus::InProgress;
        }
        state.updated_at = Utc::now();

        self.save(&state).await?;
        debug!("Updated booking session {}", session_id);
        Ok(state)
    }

    /// Sets who the appointment is for. The patient must be the session's
    /// user or one of their authorized family members.
    pub async fn select_patient(
        &self,
        session_id: &str,
        patient: PatientRef,
    ) -> Result<BookingState, SessionError> {
        let mut state = self.open_session(session_id).await?;
        let resolved = self.patients.resolve_for_user(state.user_id, patient).await?;

        state.patient = Some(patient);
        state.is_self_booking = Some(matches!(patient, PatientRef::User(_)));
        state.patient_name = Some(resolved.name);
        state.patient_dob = resolved.date_of_birth;
        if state.status == BookingSessionStatus::Initialized {
            state.status = BookingSessionStatus::InProgress;
        }
        state.updated_at = Utc::now();

        self.save(&state).await?;
        info!("Session {} selected patient {}", session_id, patient);
        Ok(state)
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus, SessionError> {
        let key = session_key(session_id);
        let ttl_seconds = self.store.ttl(&key).await?;

        let status = match ttl_seconds {
            Some(_) => match self.get_session(session_id).await {
                Ok(state) => Some(state.status),
                Err(SessionError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(SessionStatus {
            session_id: session_id.to_string(),
            valid: status.is_some(),
            ttl_seconds: ttl_seconds.filter(|_| status.is_some()),
            status,
        })
    }

    /// Restarts the session's lifetime without touching its state.
    pub async fn keep_alive(&self, session_id: &str) -> Result<SessionStatus, SessionError> {
        if !self.store.expire(&session_key(session_id), self.ttl_seconds).await? {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        self.session_status(session_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), SessionError> {
        if !self.store.delete(&session_key(session_id)).await? {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        info!("Deleted booking session {}", session_id);
        Ok(())
    }

    /// Checks that a booking for `patient` may be recorded in the session:
    /// the session is still open and the patient is the one it selected or
    /// someone its user may book for.
    pub async fn authorize_booking(
        &self,
        session_id: &str,
        patient: PatientRef,
    ) -> Result<BookingState, SessionError> {
        let state = self.open_session(session_id).await?;
        if state.patient != Some(patient) {
            if let Err(e) = self.patients.resolve_for_user(state.user_id, patient).await {
                warn!("Session {} of user {} may not book for {}", session_id, state.user_id, patient);
                return Err(e.into());
            }
        }
        Ok(state)
    }

    /// Marks the session completed with the booked appointment.
    pub async fn record_confirmation(
        &self,
        session_id: &str,
        details: ConfirmationDetails,
    ) -> Result<BookingState, SessionError> {
        let mut state = self.get_session(session_id).await?;

        state.confirmation = Some(details);
        state.status = BookingSessionStatus::Completed;
        state.error_message = None;
        state.updated_at = Utc::now();

        self.save(&state).await?;
        info!("Session {} completed", session_id);
        Ok(state)
    }

    async fn open_session(&self, session_id: &str) -> Result<BookingState, SessionError> {
        let state = self.get_session(session_id).await?;
        if state.status.is_closed() {
            warn!("Rejected update of closed session {}", session_id);
            return Err(SessionError::Closed(session_id.to_string()));
        }
        Ok(state)
    }

    async fn save(&self, state: &BookingState) -> Result<(), SessionError> {
        let value = serde_json::to_string(state)?;
        self.store
            .set(&session_key(&state.session_id), &value, self.ttl_seconds)
            .await?;
        Ok(())
    }
}
