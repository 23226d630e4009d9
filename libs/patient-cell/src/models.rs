use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_models::PatientRef;

// ==============================================================================
// ACCOUNT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// The account holder booking for themselves.
    #[serde(rename = "SELF")]
    Myself,
    Child,
    Spouse,
    Parent,
    Sibling,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub relation_type: RelationshipType,
    #[serde(default = "default_true")]
    pub is_authorized: bool,
}

fn default_true() -> bool {
    true
}

// ==============================================================================
// PATIENT SELECTION
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserContext {
    pub user_id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub family_members: Vec<FamilyMember>,
}

/// One entry of the "who is this appointment for" choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientOption {
    pub id: i64,
    pub name: String,
    pub relationship: RelationshipType,
    pub date_of_birth: Option<NaiveDate>,
    pub patient: PatientRef,
}

/// A patient reference checked against the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPatient {
    pub patient: PatientRef,
    /// Account that owns the record: the user itself or the family member's user.
    pub account_user_id: i64,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("User not found")]
    UserNotFound,

    #[error("Family member not found or not authorized")]
    FamilyMemberNotFound,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for PatientError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Unavailable(msg) => PatientError::StorageUnavailable(msg),
            other => PatientError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::UserNotFound | PatientError::FamilyMemberNotFound => AppError::NotFound(err.to_string()),
            PatientError::StorageUnavailable(msg) => AppError::StorageUnavailable(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
