use anyhow::Context as _;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use parklot_auth_types::token::{SessionKey, issue_session_token};
use parklot_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ParkingServiceError;

/// Username of the account seeded at startup.
pub const ADMIN_USERNAME: &str = "admin";

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

pub struct RegisterUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUseCase<R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ParkingServiceError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(ParkingServiceError::MissingData);
        }
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(ParkingServiceError::UsernameTaken);
        }

        let password_hash = hash_password(&input.password).await?;
        let user = self
            .repo
            .create(username, &password_hash, UserRole::User)
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginOutput {
    pub user: User,
    pub token: String,
    pub expires_at: u64,
}

pub struct LoginUseCase<R: UserRepository> {
    pub repo: R,
    pub session_key: SessionKey,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ParkingServiceError> {
        let user = self
            .repo
            .find_by_username(input.username.trim())
            .await?
            .ok_or(ParkingServiceError::InvalidCredentials)?;
        verify_password(&input.password, &user.password_hash).await?;

        let (token, expires_at) = issue_session_token(user.id, user.role, &self.session_key)
            .context("issue session token")?;
        tracing::debug!(user_id = user.id, role = %user.role, "session issued");
        Ok(LoginOutput {
            user,
            token,
            expires_at,
        })
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Option<User>, ParkingServiceError> {
        self.repo.find_by_id(id).await
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    /// Regular (non-admin) accounts.
    pub async fn execute(&self) -> Result<Vec<User>, ParkingServiceError> {
        self.repo.list_by_role(UserRole::User).await
    }
}

// ── BootstrapAdmin ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum BootstrapOutcome {
    Created(User),
    AlreadyPresent,
}

pub struct BootstrapAdminUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> BootstrapAdminUseCase<R> {
    /// Seed the admin account unless one already exists.
    pub async fn execute(&self, password: &str) -> Result<BootstrapOutcome, ParkingServiceError> {
        if self.repo.exists_with_role(UserRole::Admin).await? {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }
        if self.repo.find_by_username(ADMIN_USERNAME).await?.is_some() {
            return Err(anyhow::anyhow!(
                "username {ADMIN_USERNAME:?} is held by a non-admin account"
            )
            .into());
        }
        if password.is_empty() {
            return Err(ParkingServiceError::MissingData);
        }

        let password_hash = hash_password(password).await?;
        let admin = self
            .repo
            .create(ADMIN_USERNAME, &password_hash, UserRole::Admin)
            .await?;
        tracing::info!(user_id = admin.id, "admin account seeded");
        Ok(BootstrapOutcome::Created(admin))
    }
}

// ── Password hashing ─────────────────────────────────────────────────────────

/// Hash a password using Argon2id on the blocking pool.
async fn hash_password(password: &str) -> Result<String, ParkingServiceError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .context("join password hashing task")?
}

/// Verify a password against a stored hash on the blocking pool.
async fn verify_password(password: &str, hash: &str) -> Result<(), ParkingServiceError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .context("join password verification task")?
}

fn hash_password_blocking(password: &str) -> Result<String, ParkingServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {e}").into())
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<(), ParkingServiceError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| ParkingServiceError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ParkingServiceError::InvalidCredentials)
}
