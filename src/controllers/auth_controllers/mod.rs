pub mod auth_finish;
pub mod auth_start;
pub mod logout;
pub mod models;
pub mod profile;
pub mod register_finish;
pub mod register_start;
