use std::sync::Arc;

use crate::auth::{repo::AuthRepository, services::AuthService};
use crate::config::AppConfig;
use crate::mail::Mailer;
use crate::users::{repo::UserRepository, services::UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub users: UserService,
}

impl AppState {
    pub fn from_parts(
        config: Arc<AppConfig>,
        auth_repo: Arc<dyn AuthRepository>,
        user_repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            auth: AuthService::new(auth_repo, mailer),
            users: UserService::new(user_repo),
        }
    }
}
