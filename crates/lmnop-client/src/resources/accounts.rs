//! Customer and admin accounts.
//!
//! Both families expose the same verbs under different path prefixes.

use reqwest::Method;
use tracing::instrument;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::{Account, Credentials, LoginResponse, Role};

/// Which account family a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountFamily {
    /// Students, under `/customers`.
    Customers,
    /// Administrators, under `/admins`.
    Admins,
}

impl AccountFamily {
    /// Path prefix of the family.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Customers => "/customers",
            Self::Admins => "/admins",
        }
    }

    /// Role stamped on identities that log in through this family.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Customers => Role::User,
            Self::Admins => Role::Admin,
        }
    }

    /// Family whose login portal grants `role`.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::User => Self::Customers,
            Role::Admin => Self::Admins,
        }
    }
}

/// Account endpoints of one family.
#[derive(Debug, Clone, Copy)]
pub struct Accounts<'a> {
    gateway: &'a Gateway,
    family: AccountFamily,
}

impl<'a> Accounts<'a> {
    /// Creates a client for `family`.
    #[must_use]
    pub const fn new(gateway: &'a Gateway, family: AccountFamily) -> Self {
        Self { gateway, family }
    }

    /// The family this client talks to.
    #[must_use]
    pub const fn family(&self) -> AccountFamily {
        self.family
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.family.prefix())
    }

    /// `POST /<family>/register`
    #[instrument(skip(self, account), fields(family = self.family.prefix()))]
    pub async fn register(&self, account: &Account) -> Result<Account> {
        self.gateway
            .send_json(Method::POST, &self.path("/register"), account)
            .await
    }

    /// `POST /<family>/login`
    #[instrument(skip(self, credentials), fields(family = self.family.prefix()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.gateway
            .send_json(Method::POST, &self.path("/login"), credentials)
            .await
    }

    /// `GET /<family>/all`
    pub async fn all(&self) -> Result<Vec<Account>> {
        self.gateway.get(&self.path("/all")).await
    }

    /// `GET /<family>/read/:id`
    pub async fn read(&self, id: u64) -> Result<Account> {
        self.gateway.get(&self.path(&format!("/read/{id}"))).await
    }

    /// `PUT /<family>/update`
    pub async fn update(&self, account: &Account) -> Result<Account> {
        self.gateway
            .send_json(Method::PUT, &self.path("/update"), account)
            .await
    }

    /// `DELETE /<family>/delete/:id`
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.gateway
            .send_discarding(Method::DELETE, &self.path(&format!("/delete/{id}")))
            .await
    }

    /// `GET /<family>/profile`: the account behind the current credential.
    pub async fn profile(&self) -> Result<Account> {
        self.gateway.get(&self.path("/profile")).await
    }
}
