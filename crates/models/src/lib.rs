pub mod errors;
pub mod db;
pub mod validate;

pub mod tenant;
pub mod user;
pub mod user_credentials;
pub mod role;
pub mod role_permission;
pub mod user_role;
pub mod team;
pub mod user_team;
pub mod person;
pub mod project;
pub mod project_duty;
pub mod timeline;
pub mod timeline_phase;
pub mod milestone;
pub mod document;
pub mod comment;
pub mod activity_log;
pub mod notification;

#[cfg(test)]
mod tests;
