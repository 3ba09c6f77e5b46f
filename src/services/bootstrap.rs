use tracing::{info, warn};

use crate::config::BootstrapConfig;
use crate::database::models::User;
use crate::services::user_service::{UserError, UserService};

#[derive(Debug)]
pub enum BootstrapOutcome {
    Created(User),
    AlreadyExists(String),
}

/// Create the configured superuser unless a user with that name already exists.
pub async fn init_admin(users: &UserService, cfg: &BootstrapConfig) -> Result<BootstrapOutcome, UserError> {
    let username = cfg.superuser_username.as_str();
    if users.exists(username).await? {
        info!("Superuser {} already exists", username);
        return Ok(BootstrapOutcome::AlreadyExists(username.to_string()));
    }

    if !crate::is_development!() && cfg.superuser_password == crate::config::DEFAULT_SUPERUSER_PASSWORD {
        warn!("Creating superuser {} with the default password; set SUPERUSER_PASSWORD", username);
    }
    info!("Creating superuser {}", username);
    match users.create_superuser(username, &cfg.superuser_email, &cfg.superuser_password).await {
        Ok(user) => Ok(BootstrapOutcome::Created(user)),
        // Lost a race with a concurrent bootstrap.
        Err(UserError::AlreadyExists(name)) => Ok(BootstrapOutcome::AlreadyExists(name)),
        Err(e) => Err(e),
    }
}
