//! AWS SDK client initialisation for the key-management service.

pub mod clients;

pub use clients::AwsClients;
