use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;
use uuid::Uuid;

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

fn argon2_instance() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
            .map_err(argon2::password_hash::Error::from)?,
    ))
}

/// Fresh random salt per call, so two hashes of the same password differ.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2_instance()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verification delegates to the argon2 crate, which compares digests in
/// constant time. A malformed stored hash is an error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match argon2_instance()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Opaque session token. All authority lives server-side in the session
/// store, so the token carries no claims and needs no signature.
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}
