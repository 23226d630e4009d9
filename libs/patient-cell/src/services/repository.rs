use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use shared_database::{DbError, SupabaseClient};

use crate::models::{FamilyMember, User};

const USER_COLUMNS: &str = "id,username,email,full_name,date_of_birth,phone_number,address,is_active";

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, DbError>;

    async fn get_family_member(&self, member_id: i64) -> Result<Option<FamilyMember>, DbError>;

    /// Family members the user may book for, ordered by id.
    async fn list_authorized_family_members(&self, user_id: i64) -> Result<Vec<FamilyMember>, DbError>;
}

pub struct SupabasePatientRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, DbError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| DbError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PatientRepository for SupabasePatientRepository {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, DbError> {
        let path = format!("/rest/v1/users?id=eq.{}&select={}", user_id, USER_COLUMNS);
        Ok(self.fetch::<User>(&path).await?.into_iter().next())
    }

    async fn get_family_member(&self, member_id: i64) -> Result<Option<FamilyMember>, DbError> {
        let path = format!("/rest/v1/family_members?id=eq.{}", member_id);
        Ok(self.fetch::<FamilyMember>(&path).await?.into_iter().next())
    }

    async fn list_authorized_family_members(&self, user_id: i64) -> Result<Vec<FamilyMember>, DbError> {
        let path = format!(
            "/rest/v1/family_members?user_id=eq.{}&is_authorized=eq.true&order=id.asc",
            user_id
        );
        self.fetch(&path).await
    }
}

#[derive(Default)]
pub struct InMemoryPatientRepository {
    users: RwLock<Vec<User>>,
    family_members: RwLock<Vec<FamilyMember>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    pub async fn add_family_member(&self, member: FamilyMember) {
        self.family_members.write().await.push(member);
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, DbError> {
        Ok(self.users.read().await.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_family_member(&self, member_id: i64) -> Result<Option<FamilyMember>, DbError> {
        Ok(self
            .family_members
            .read()
            .await
            .iter()
            .find(|m| m.id == member_id)
            .cloned())
    }

    async fn list_authorized_family_members(&self, user_id: i64) -> Result<Vec<FamilyMember>, DbError> {
        let mut found: Vec<FamilyMember> = self
            .family_members
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user_id && m.is_authorized)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }
}
