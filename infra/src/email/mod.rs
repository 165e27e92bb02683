//! Email Module
//!
//! Outbound notification delivery. The bundled sender writes each message to
//! the log instead of handing it to a mail provider.

pub mod logging_email;

pub use logging_email::LoggingEmailSender;
