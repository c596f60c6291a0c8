pub mod accounts;
pub mod admin_home;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod establishments;
pub mod history;
pub mod notifications;
pub mod profile;
pub mod super_admin_home;
pub mod user_home;
