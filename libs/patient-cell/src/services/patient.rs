use std::sync::Arc;
use tracing::{debug, warn};

use shared_models::PatientRef;

use crate::models::{PatientError, PatientOption, RelationshipType, ResolvedPatient, User, UserContext};
use crate::services::repository::PatientRepository;

pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientRepository>) -> Self {
        Self { patients }
    }

    /// Active user by id.
    pub async fn get_active_user(&self, user_id: i64) -> Result<User, PatientError> {
        self.patients
            .get_user(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(PatientError::UserNotFound)
    }

    /// Checks that the reference points at an active user, or at an
    /// authorized family member of an active user.
    pub async fn resolve(&self, patient: PatientRef) -> Result<ResolvedPatient, PatientError> {
        match patient {
            PatientRef::User(user_id) => {
                let user = self.get_active_user(user_id).await?;
                Ok(ResolvedPatient {
                    patient,
                    account_user_id: user.id,
                    name: user.full_name,
                    date_of_birth: user.date_of_birth,
                })
            }
            PatientRef::FamilyMember(member_id) => {
                let member = self
                    .patients
                    .get_family_member(member_id)
                    .await?
                    .filter(|m| m.is_authorized)
                    .ok_or(PatientError::FamilyMemberNotFound)?;

                self.get_active_user(member.user_id).await?;

                Ok(ResolvedPatient {
                    patient,
                    account_user_id: member.user_id,
                    name: member.full_name,
                    date_of_birth: member.date_of_birth,
                })
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but the patient must belong to `user_id`.
    pub async fn resolve_for_user(&self, user_id: i64, patient: PatientRef) -> Result<ResolvedPatient, PatientError> {
        let resolved = self.resolve(patient).await?;

        if resolved.account_user_id != user_id {
            warn!("User {} tried to select patient {} of another account", user_id, patient);
            return Err(match patient {
                PatientRef::User(_) => PatientError::UserNotFound,
                PatientRef::FamilyMember(_) => PatientError::FamilyMemberNotFound,
            });
        }

        Ok(resolved)
    }

    pub async fn user_context(&self, user_id: i64) -> Result<UserContext, PatientError> {
        let user = self.get_active_user(user_id).await?;
        let family_members = self.patients.list_authorized_family_members(user_id).await?;

        Ok(UserContext {
            user_id: user.id,
            full_name: user.full_name,
            date_of_birth: user.date_of_birth,
            family_members,
        })
    }

    /// The user first, then each authorized family member.
    pub async fn patient_options(&self, user_id: i64) -> Result<Vec<PatientOption>, PatientError> {
        let context = self.user_context(user_id).await?;
        debug!(
            "User {} can book for {} family members",
            user_id,
            context.family_members.len()
        );

        let mut options = vec![PatientOption {
            id: context.user_id,
            name: context.full_name,
            relationship: RelationshipType::Myself,
            date_of_birth: context.date_of_birth,
            patient: PatientRef::User(context.user_id),
        }];

        options.extend(context.family_members.into_iter().map(|member| PatientOption {
            id: member.id,
            name: member.full_name,
            relationship: member.relation_type,
            date_of_birth: member.date_of_birth,
            patient: PatientRef::FamilyMember(member.id),
        }));

        Ok(options)
    }
}
