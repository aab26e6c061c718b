//! User Model

use serde::{Deserialize, Serialize};

/// User entity from the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}
