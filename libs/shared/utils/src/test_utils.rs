use std::sync::Arc;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub slot_minutes: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            slot_minutes: 30,
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            slot_minutes: self.slot_minutes,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// First date on or after `from` that falls on `weekday`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from + Duration::days(ahead)
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(id: i64, full_name: &str, specialty: &str, location: &str) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": full_name,
            "specialty": specialty,
            "location_id": 1,
            "is_active": true,
            "location": {
                "id": 1,
                "name": location,
                "address": "1 Main Street",
                "phone": null,
                "is_active": true
            }
        })
    }

    pub fn schedule_response(id: i64, doctor_id: i64, day_of_week: i16, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "day_of_week": day_of_week,
            "start_time": start,
            "end_time": end,
            "is_available": true
        })
    }

    pub fn user_response(id: i64, full_name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "username": format!("user{}", id),
            "email": format!("user{}@example.com", id),
            "full_name": full_name,
            "date_of_birth": "1985-04-12",
            "phone_number": null,
            "address": null,
            "is_active": true
        })
    }

    pub fn family_member_response(id: i64, user_id: i64, full_name: &str, relation: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "full_name": full_name,
            "date_of_birth": "2015-06-01",
            "relation_type": relation,
            "is_authorized": true
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
