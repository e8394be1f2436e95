use std::sync::Arc;

use webauthn_rs::prelude::*;

use crate::utils::config::Config;
use crate::utils::error::{AppError, AppResult};

pub fn init_webauthn(config: &Config) -> AppResult<Arc<Webauthn>> {
    let rp_origin = Url::parse(&config.rp_origin)
        .map_err(|e| AppError::InternalError(format!("Invalid RP_ORIGIN: {e}")))?;

    let mut builder = WebauthnBuilder::new(&config.rp_id, &rp_origin)
        .map_err(|e| AppError::WebauthnError(format!("Invalid relying party: {e}")))?
        .rp_name(&config.rp_name)
        .allow_subdomains(false);

    if cfg!(debug_assertions) {
        builder = builder.allow_any_port(true);
    }

    let webauthn = builder
        .build()
        .map_err(|e| AppError::WebauthnError(format!("Failed to build Webauthn: {e}")))?;

    Ok(Arc::new(webauthn))
}
