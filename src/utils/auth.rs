use crate::models::poll_models::Question;
use crate::utils::error::{AppError, AppResult};
use crate::utils::session::CurrentUser;

/// Result of the ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

pub fn authorize_owner(question: &Question, user: &CurrentUser) -> Access {
    if question.owner_id == user.id {
        Access::Granted
    } else {
        Access::Denied
    }
}

/// Turns a denied check into a `Forbidden` error naming the action.
pub fn require_owner(question: &Question, user: &CurrentUser, action: &str) -> AppResult<()> {
    match authorize_owner(question, user) {
        Access::Granted => Ok(()),
        Access::Denied => Err(AppError::Forbidden(format!(
            "Only the owner of this poll is allowed to {action} it"
        ))),
    }
}
