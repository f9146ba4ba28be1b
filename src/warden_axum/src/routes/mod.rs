//! Axum-specific route handlers.
//!
//! These handlers extract and validate the wire shapes, hand the request to
//! the engine, and convert outcomes back to JSON. Anything rejected here
//! never reaches the core.

pub mod login;
pub mod password_reset_confirm;
pub mod password_reset_request;
pub mod refresh;
pub mod register;
pub mod send_otp;
pub mod verify_otp;

pub use login::login;
pub use password_reset_confirm::reset_password;
pub use password_reset_request::request_password_reset;
pub use refresh::refresh;
pub use register::register;
pub use send_otp::send_otp;
pub use verify_otp::verify_otp;
