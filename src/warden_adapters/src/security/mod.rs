pub mod argon2_hasher;
pub mod jwt_issuer;

pub use argon2_hasher::{Argon2Hasher, secure_compare};
pub use jwt_issuer::JwtTokenIssuer;
