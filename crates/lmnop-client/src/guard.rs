//! Role-based page access.
//!
//! The guard is advisory: it decides whether a page may be shown, but
//! resource clients called directly are never blocked. Authorization proper
//! is the backend's job.

use std::fmt;

use tracing::debug;

use crate::config::Config;
use crate::models::Role;
use crate::navigation::Navigator;
use crate::session::SessionStore;

// ============================================================================
// Pages
// ============================================================================

/// Every page the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Sign-in form.
    Login,
    /// Student sign-up form.
    Register,
    /// Administrator sign-up form.
    AdminRegister,
    /// Student landing page.
    StudentDashboard,
    /// Administrator landing page.
    AdminDashboard,
    /// Course catalogue.
    Courses,
    /// Course edit form.
    CourseUpdate(u64),
    /// Enrollment form.
    Enroll,
    /// Account administration.
    UserManagement,
    /// Quiz catalogue.
    Quizzes,
    /// One quiz from the catalogue, numbered from 1.
    Quiz(usize),
    /// Contact form.
    Support,
    /// Support messages received.
    SupportInbox,
}

impl Page {
    /// Route of the page.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::AdminRegister => "/admin-register".to_string(),
            Self::StudentDashboard | Self::AdminDashboard => "/".to_string(),
            Self::Courses => "/courses".to_string(),
            Self::CourseUpdate(id) => format!("/course/update/{id}"),
            Self::Enroll => "/enroll".to_string(),
            Self::UserManagement => "/admin/users".to_string(),
            Self::Quizzes => "/quizzes".to_string(),
            Self::Quiz(n) => format!("/quiz{n}"),
            Self::Support => "/support".to_string(),
            Self::SupportInbox => "/admin/support".to_string(),
        }
    }

    /// Role a user must hold, or `None` when any signed-in user may enter.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::AdminDashboard
            | Self::CourseUpdate(_)
            | Self::UserManagement
            | Self::SupportInbox => Some(Role::Admin),
            Self::Enroll => Some(Role::User),
            _ => None,
        }
    }

    /// Pages shown only to visitors who are not signed in.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register | Self::AdminRegister)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No active session.
    Unauthenticated,
    /// Signed in, but without the page's required role.
    AuthenticatedWrongRole,
    /// The page may be shown.
    Authorized,
    /// Signed in and asking for a sign-in or sign-up page.
    AlreadyAuthenticated,
}

/// What the front-end should do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the page.
    Render,
    /// Go elsewhere instead.
    Redirect(String),
}

impl Navigation {
    /// True when the page should be shown.
    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

// ============================================================================
// Guard
// ============================================================================

/// Checks navigation attempts against the current session.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    session: SessionStore,
    login_path: String,
    landing_path: String,
}

impl AccessGuard {
    /// Creates a guard over `session` using the configured redirect targets.
    #[must_use]
    pub fn new(session: SessionStore, config: &Config) -> Self {
        Self {
            session,
            login_path: config.login_path.clone(),
            landing_path: config.landing_path.clone(),
        }
    }

    /// Decides whether `page` may be shown.
    #[must_use]
    pub fn check(&self, page: Page) -> Access {
        let identity = self.session.load().map(|session| session.identity);

        if page.is_public() {
            return if identity.is_some() {
                Access::AlreadyAuthenticated
            } else {
                Access::Authorized
            };
        }

        match (identity, page.required_role()) {
            (None, _) => Access::Unauthenticated,
            (Some(identity), Some(required)) if identity.role != required => {
                Access::AuthenticatedWrongRole
            }
            (Some(_), _) => Access::Authorized,
        }
    }

    /// Maps the access decision for `page` to a navigation outcome.
    #[must_use]
    pub fn navigate(&self, page: Page) -> Navigation {
        let access = self.check(page);
        debug!(page = %page, ?access, "Access checked");
        match access {
            Access::Authorized => Navigation::Render,
            Access::Unauthenticated => Navigation::Redirect(self.login_path.clone()),
            Access::AuthenticatedWrongRole | Access::AlreadyAuthenticated => {
                Navigation::Redirect(self.landing_path.clone())
            }
        }
    }

    /// Like [`navigate`](Self::navigate), but performs any redirect on
    /// `navigator`.
    pub fn enter(&self, page: Page, navigator: &dyn Navigator) -> Navigation {
        let navigation = self.navigate(page);
        if let Navigation::Redirect(path) = &navigation {
            navigator.navigate(path);
        }
        navigation
    }

    /// Landing page for a signed-in role.
    #[must_use]
    pub const fn dashboard_for(role: Role) -> Page {
        match role {
            Role::Admin => Page::AdminDashboard,
            Role::User => Page::StudentDashboard,
        }
    }
}
