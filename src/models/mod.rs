pub mod passkey_models;
pub mod poll_models;
pub mod user_models;
