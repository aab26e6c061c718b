//! Directory entities
//!
//! Read-only collaborators resolved by reference id. The engine never
//! mutates these; they are owned by the surrounding application.

pub mod product;
pub mod user;

pub use product::Product;
pub use user::User;
