use serde::Deserialize;

use parklot_core::config::Config;

/// Parking service configuration loaded from environment variables.
#[derive(Deserialize)]
pub struct ParkingConfig {
    /// sea-orm connection URL. Env var: `DATABASE_URL`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// TCP port for the HTTP server (default 3000). Env var: `PARKING_PORT`.
    #[serde(default = "default_parking_port")]
    pub parking_port: u16,
    /// HMAC key for session tokens. Env var: `SESSION_SECRET`.
    pub session_secret: String,
    /// Password given to the seeded `admin` account. Env var: `ADMIN_PASSWORD`.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Mark the session cookie `Secure`. Env var: `COOKIE_SECURE`.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Config for ParkingConfig {}

fn default_database_url() -> String {
    "sqlite://parking.db?mode=rwc".to_owned()
}

fn default_parking_port() -> u16 {
    3000
}

fn default_admin_password() -> String {
    "admin".to_owned()
}

impl std::fmt::Debug for ParkingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingConfig")
            .field("database_url", &self.database_url)
            .field("parking_port", &self.parking_port)
            .field("session_secret", &"..")
            .field("admin_password", &"..")
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}
