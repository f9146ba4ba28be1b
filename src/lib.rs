//! # Warden - Credential Issuance & Verification Library
//!
//! This is a facade crate that re-exports the public APIs of the warden
//! service components. Use this crate to get access to the whole credential
//! engine in one place.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `OtpCode`, `OtpPurpose`, etc.
//! - **Port traits**: `CredentialStore`, `RateLimiter`, `SecretHasher`,
//!   `TokenIssuer`, `EmailClient`
//! - **Engine**: `AuthEngine` - the seven credential operations
//! - **Adapters**: `PostgresCredentialStore`, `InMemoryCredentialStore`,
//!   `LocalRateLimiter`, `PostgresRateLimiter`, `Argon2Hasher`,
//!   `JwtTokenIssuer`, `PostmarkEmailClient`, etc.
//! - **Service**: `AuthService` - the assembled HTTP surface

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use warden_core::*;
}

// Re-export most commonly used core types at the root level
pub use warden_core::{
    Account, AppMode, AuditEvent, AuthError, AuthErrorKind, Email, LoginFailureReason, OtpCode,
    OtpPurpose, OtpRecord, Password, RequestOrigin, Session, TokenClass,
};

// ============================================================================
// Port Traits
// ============================================================================

/// Port trait definitions
pub mod ports {
    pub use warden_core::ports::repositories::*;
    pub use warden_core::ports::services::*;
}

// Re-export port traits at root level
pub use warden_core::{
    Clock, CodeSource, CredentialStore, CredentialTx, EmailClient, RateLimiter, SecretHasher,
    StoreError, TokenIssuer,
};

// ============================================================================
// Engine (Application Layer)
// ============================================================================

/// The credential engine and its request/outcome types
pub mod engine {
    pub use warden_application::*;
}

// Re-export the engine at root level
pub use warden_application::{AuthEngine, EngineConfig};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use warden_adapters::persistence::*;
    }

    /// Rate limiter strategies
    pub mod rate_limit {
        pub use warden_adapters::rate_limit::*;
    }

    /// Hashing and token signing
    pub mod security {
        pub use warden_adapters::security::*;
    }

    /// Email client implementations
    pub mod email {
        pub use warden_adapters::email::*;
    }

    /// Clock and code-source implementations
    pub mod runtime {
        pub use warden_adapters::runtime::*;
    }

    /// Configuration
    pub mod config {
        pub use warden_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use warden_adapters::{
    Argon2Hasher, InMemoryCredentialStore, JwtTokenIssuer, LocalRateLimiter, LogEmailClient,
    PostgresCredentialStore, PostgresRateLimiter, PostmarkEmailClient, RandomCodeSource, Settings,
    SystemClock,
};

// ============================================================================
// HTTP Layer
// ============================================================================

/// Axum route handlers and error mapping
pub mod http {
    pub use warden_axum::*;
}

// ============================================================================
// Auth Service (Main Entry Point)
// ============================================================================

/// Main auth service
pub use warden_auth_service::AuthService;

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use axum;
