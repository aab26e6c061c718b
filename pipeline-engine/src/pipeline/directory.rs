//! Directory service seams
//!
//! The engine reads products and users by reference id and never mutates
//! them; the surrounding application owns these directories. The in-memory
//! implementation is the stand-in used by tests and by deployments without
//! an external directory.

use std::collections::HashMap;

use shared::models::{Product, User};

/// Read-only product lookups by reference id
pub trait ProductDirectory: Send + Sync {
    fn resolve_product(&self, product_ref: &str) -> Option<Product>;
}

/// Read-only user lookups by reference id
pub trait UserDirectory: Send + Sync {
    fn resolve_user(&self, user_ref: &str) -> Option<User>;
}

/// In-memory directory backing both seams
///
/// Populated up front by the application layer, then shared immutably with
/// the engine.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    products: HashMap<String, Product>,
    users: HashMap<String, User>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }
}

impl ProductDirectory for InMemoryDirectory {
    fn resolve_product(&self, product_ref: &str) -> Option<Product> {
        self.products.get(product_ref).cloned()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn resolve_user(&self, user_ref: &str) -> Option<User> {
        self.users.get(user_ref).cloned()
    }
}
