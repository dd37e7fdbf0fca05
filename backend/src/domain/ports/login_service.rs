//! Driving port for login/authentication use-cases.
//!
//! Identity is owned by an external provider; this port is the seam where
//! it plugs in. The fixture implementation backs development and tests with
//! a small set of demo accounts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DisplayName, Error, LoginCredentials, User, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// A demo account accepted by [`FixtureLoginService`].
#[derive(Debug, Clone, Copy)]
pub struct FixtureAccount {
    pub username: &'static str,
    pub user_id: Uuid,
    pub display_name: &'static str,
}

/// Password shared by every demo account.
pub const FIXTURE_PASSWORD: &str = "password";

/// Demo accounts available in development builds.
pub const FIXTURE_ACCOUNTS: [FixtureAccount; 4] = [
    FixtureAccount {
        username: "admin",
        user_id: Uuid::from_u128(0x123e_4567_e89b_12d3_a456_4266_1417_4000),
        display_name: "Cafe Admin",
    },
    FixtureAccount {
        username: "ada",
        user_id: Uuid::from_u128(0x3fa8_5f64_5717_4562_b3fc_2c96_3f66_afa6),
        display_name: "Ada Lovelace",
    },
    FixtureAccount {
        username: "grace",
        user_id: Uuid::from_u128(0x8c1e_0b4e_7a52_4d1f_9f6b_1d3c_5e7a_9b20),
        display_name: "Grace Hopper",
    },
    FixtureAccount {
        username: "alan",
        user_id: Uuid::from_u128(0xd2b4_6f80_3c1a_4e9d_8a7b_6c5d_4e3f_2a10),
        display_name: "Alan Turing",
    },
];

/// Profiles for every demo account, for seeding the users table.
pub fn fixture_users() -> Result<Vec<User>, Error> {
    FIXTURE_ACCOUNTS
        .iter()
        .map(|account| {
            let name = DisplayName::new(account.display_name)
                .map_err(|err| Error::internal(format!("invalid fixture display name: {err}")))?;
            Ok(User::new(UserId::from_uuid(account.user_id), name))
        })
        .collect()
}

/// Authenticator over [`FIXTURE_ACCOUNTS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        FIXTURE_ACCOUNTS
            .iter()
            .find(|account| account.username == credentials.username())
            .filter(|_| credentials.password() == FIXTURE_PASSWORD)
            .map(|account| UserId::from_uuid(account.user_id))
            .ok_or_else(|| Error::unauthorized("invalid credentials"))
    }
}
