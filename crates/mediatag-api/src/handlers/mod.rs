pub mod delete;
pub mod files;
pub mod health;
pub mod search;
pub mod upload;
