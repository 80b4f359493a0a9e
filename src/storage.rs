use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

/// Keys used in the client-side key-value store. These mirror the browser
/// localStorage keys of the web client, so a cached plan written by either
/// side stays readable by the other.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const USER_DATA: &str = "user_data";
    pub const DIET_PLAN: &str = "generatedDietPlan";
    pub const DIET_PLAN_SYNC_DATE: &str = "dietPlanSyncDate";
}

/// Port over the local key-value store (browser localStorage in the web
/// client). Injected so tests can substitute an in-memory fake.
pub trait StorageClient: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// In-memory store. The default backend for the CLI driver and for tests.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageClient for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.lock().expect("storage lock").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .lock()
            .expect("storage lock")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items.lock().expect("storage lock").remove(key);
    }

    fn clear(&self) {
        self.items.lock().expect("storage lock").clear();
    }
}

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Shape of the `user_data` blob persisted at login by the web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub last_checkup_date: Option<Date>,
}

/// Read and decode `user_data`. A corrupt blob is treated as absent.
pub fn load_user_data(storage: &dyn StorageClient) -> Option<UserData> {
    let raw = storage.get(keys::USER_DATA)?;
    match serde_json::from_str(&raw) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(error = %e, "user_data blob is unreadable; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn set_get_remove_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);

        storage.set(keys::AUTH_TOKEN, "tok-123");
        assert_eq!(storage.get(keys::AUTH_TOKEN).as_deref(), Some("tok-123"));

        storage.remove(keys::AUTH_TOKEN);
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);
    }

    #[test]
    fn clear_wipes_all_keys() {
        let storage = MemoryStorage::new();
        storage.set("a", "1");
        storage.set("b", "2");
        storage.clear();
        assert_eq!(storage.get("a"), None);
        assert_eq!(storage.get("b"), None);
    }

    #[test]
    fn user_data_parses_dates() {
        let storage = MemoryStorage::new();
        storage.set(
            keys::USER_DATA,
            r#"{"userId":"u1","dueDate":"2026-11-02","lastCheckupDate":"2026-08-10"}"#,
        );
        let data = load_user_data(&storage).expect("user data");
        assert_eq!(data.user_id, "u1");
        assert_eq!(data.due_date, Some(date!(2026 - 11 - 02)));
        assert_eq!(data.last_checkup_date, Some(date!(2026 - 08 - 10)));
    }

    #[test]
    fn corrupt_user_data_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(keys::USER_DATA, "{not json");
        assert!(load_user_data(&storage).is_none());
    }
}
