//! Start-up wiring.
//!
//! [`LmsContext`] is built once from configuration, a storage backend and a
//! navigator. It owns the gateway and the access guard and hands out
//! resource clients that borrow them.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::guard::AccessGuard;
use crate::models::{Credentials, Identity};
use crate::navigation::Navigator;
use crate::resources::{AccountFamily, Accounts, Courses, Enrollments, Quizzes, Support};
use crate::session::{SessionStore, Storage};

/// Everything a front-end needs to talk to the backend.
#[derive(Debug, Clone)]
pub struct LmsContext {
    config: Config,
    gateway: Gateway,
    guard: AccessGuard,
}

impl LmsContext {
    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::ConfigValidationError` if `config` is invalid.
    pub fn init(
        config: Config,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let session = SessionStore::new(storage);
        let gateway = Gateway::new(&config, session.clone(), navigator)?;
        let guard = AccessGuard::new(session, &config);
        Ok(Self {
            config,
            gateway,
            guard,
        })
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The shared gateway.
    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The persisted session.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    /// Page access checks.
    #[must_use]
    pub const fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Student accounts.
    #[must_use]
    pub const fn customers(&self) -> Accounts<'_> {
        Accounts::new(&self.gateway, AccountFamily::Customers)
    }

    /// Administrator accounts.
    #[must_use]
    pub const fn admins(&self) -> Accounts<'_> {
        Accounts::new(&self.gateway, AccountFamily::Admins)
    }

    /// Accounts of either family.
    #[must_use]
    pub const fn accounts(&self, family: AccountFamily) -> Accounts<'_> {
        Accounts::new(&self.gateway, family)
    }

    /// Course catalogue.
    #[must_use]
    pub const fn courses(&self) -> Courses<'_> {
        Courses::new(&self.gateway)
    }

    /// Enrollment workflow.
    #[must_use]
    pub const fn enrollments(&self) -> Enrollments<'_> {
        Enrollments::new(&self.gateway)
    }

    /// Backend quizzes.
    #[must_use]
    pub const fn quizzes(&self) -> Quizzes<'_> {
        Quizzes::new(&self.gateway)
    }

    /// Support messages.
    #[must_use]
    pub const fn support(&self) -> Support<'_> {
        Support::new(&self.gateway)
    }

    /// Logs in through `family`'s portal and persists the session.
    ///
    /// The stored role is the portal's, not anything the backend reports.
    pub async fn login(&self, family: AccountFamily, credentials: &Credentials) -> Result<Identity> {
        let response = self.accounts(family).login(credentials).await?;
        let identity = response.identity(family.role());
        self.session().save(&identity, &response.token)?;
        info!(email = %identity.email, role = %identity.role, "Logged in");
        Ok(identity)
    }

    /// Clears the session and returns to the login page.
    pub fn logout(&self) -> Result<()> {
        self.session().clear()?;
        self.gateway.navigator().navigate(self.gateway.login_path());
        info!("Logged out");
        Ok(())
    }
}
