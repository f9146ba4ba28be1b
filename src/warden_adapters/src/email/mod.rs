pub mod log_email_client;
pub mod postmark_email_client;
pub mod recording_email_client;

pub use log_email_client::LogEmailClient;
pub use postmark_email_client::PostmarkEmailClient;
pub use recording_email_client::{RecordingEmailClient, SentEmail};
