use std::sync::Arc;

use webauthn_rs::prelude::Webauthn;

use crate::db::{AccountStore, PollStore};
use crate::utils::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub polls: Arc<dyn PollStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub webauthn: Arc<Webauthn>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        polls: Arc<dyn PollStore>,
        accounts: Arc<dyn AccountStore>,
        webauthn: Arc<Webauthn>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            polls,
            accounts,
            webauthn,
            config,
        }
    }
}
