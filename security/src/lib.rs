// security/src/lib.rs
//
// Two authentication paths: the privileged admin login (email + password
// against stored bcrypt hashes, JWT session) and the resident portal login
// (exact email + phone match, no password). Resident login must refuse
// ambiguity: more than one matching row is a duplicate-account error, never
// a silent pick.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use lib::gateway::HostelGateway;
use models::errors::{AuthFailure, HostelError};
use models::{AdminAccount, Resident, ResidentStatus};

/// Admin session lifetime: 24 hours.
const TOKEN_TTL_SECS: u64 = 60 * 60 * 24;

/// JWT session claims for the privileged role.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin email.
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub role: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResidentLogin {
    pub email: String,
    pub phone: String,
}

fn unix_now() -> Result<u64, HostelError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| HostelError::Gateway(format!("system time error: {}", e)))
}

/// Issues a session token for either role; `sub` is the account email.
pub fn issue_session_token(sub: &str, role: &str, secret: &[u8]) -> Result<String, HostelError> {
    let now = unix_now()?;
    let claims = Claims {
        sub: sub.to_string(),
        exp: now + TOKEN_TTL_SECS,
        iat: now,
        role: role.to_string(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthFailure::TokenInvalid(format!("failed to encode JWT: {}", e)).into())
}

/// Decodes and validates an admin session token.
pub fn validate_token(token: &str, secret: &[u8]) -> Result<Claims, HostelError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthFailure::TokenInvalid(e.to_string()).into())
}

/// Privileged login: bcrypt verification against the stored admin row, JWT
/// on success. Unknown email and wrong password are indistinguishable to
/// the caller.
pub async fn login_admin(
    gateway: &dyn HostelGateway,
    login: &AdminLogin,
    secret: &[u8],
) -> Result<String, HostelError> {
    let admin = gateway
        .find_admin_by_email(&login.email)
        .await?
        .ok_or(AuthFailure::InvalidCredentials)?;

    let verified = AdminAccount::verify_password(&login.password, &admin.password_hash)?;
    if !verified {
        return Err(AuthFailure::InvalidCredentials.into());
    }
    info!(email = %admin.email, "admin login");
    issue_session_token(&admin.email, "admin", secret)
}

/// Portal login: exact match on stored email + phone. Zero matches is an
/// invalid-credentials refusal, more than one is a duplicate-account
/// refusal, and a matched but non-Active resident is deactivated.
pub async fn login_resident(
    gateway: &dyn HostelGateway,
    login: &ResidentLogin,
) -> Result<Resident, HostelError> {
    let matches = gateway
        .find_residents_by_login(login.email.trim(), login.phone.trim())
        .await?;

    match matches.as_slice() {
        [] => Err(AuthFailure::InvalidCredentials.into()),
        [resident] => {
            if resident.status != ResidentStatus::Active {
                return Err(AuthFailure::AccountDeactivated.into());
            }
            info!(resident = resident.id, "resident portal login");
            Ok(resident.clone())
        }
        _ => Err(AuthFailure::DuplicateAccount.into()),
    }
}

/// Seeds the configured admin account when the collection is empty, so a
/// fresh install has a working login.
pub async fn seed_admin(
    gateway: &dyn HostelGateway,
    email: &str,
    password: &str,
) -> Result<(), HostelError> {
    if gateway.count_admins().await? > 0 {
        return Ok(());
    }
    let password_hash = AdminAccount::hash_password(password)?;
    gateway
        .insert_admin(email.to_string(), password_hash)
        .await?;
    info!(%email, "seeded initial admin account");
    Ok(())
}
