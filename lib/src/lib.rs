//! SparkPost transport for normalized mail messages.
//!
//! A `MailMessage` is turned into a SparkPost transmission, sent through a
//! `TransmissionClient` and the provider's answer is reduced to a
//! `SendResult`.

pub mod api;
pub mod config;
pub mod email;
pub mod error;
pub mod sparkpost;
pub mod transport;

pub use error::Error;
pub use transport::SparkPostTransport;
