//! The `users/{uid}/userinfo` node.
//!
//! Authentication itself happens elsewhere and hands back an opaque user ID;
//! this module only manages the general info stored under it.

use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::paths;
use crate::traits::DataStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
}

/// Create the user's info node. Called once, right after sign-up
pub async fn create_user_node<S: DataStore>(store: &S, user_id: &str, info: &UserInfo) -> Result<(), Box<dyn Error>> {
    store
        .set(&paths::userinfo(user_id), serde_json::to_value(info)?)
        .await
}

pub async fn load_user_info<S: DataStore>(store: &S, user_id: &str) -> Result<Option<UserInfo>, Box<dyn Error>> {
    match store.get(&paths::userinfo(user_id)).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
