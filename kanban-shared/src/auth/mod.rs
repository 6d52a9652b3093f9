/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: bearer token issuance and verification
/// - [`middleware`]: request authentication and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: the ownership check shared by every service
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, self-describing PHC strings, constant-time verify
/// - **JWT Tokens**: HS256 only, no clock leeway
///
/// # Example
///
/// ```
/// use kanban_shared::auth::password::{hash_password, verify_password};
/// use kanban_shared::auth::jwt::{JwtKeys, TokenKind};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let keys = JwtKeys::new("secret-key");
/// let token = keys.issue(Uuid::new_v4(), TokenKind::Access)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
