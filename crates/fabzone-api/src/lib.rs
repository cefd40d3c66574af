// fabzone-api: Async Rust client for the Brocade FOS REST API zoning resources

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod zoning;

pub use client::FosClient;
pub use error::Error;
pub use models::{
    AliasEntry, AliasMembers, CfgEntry, CfgMembers, DefaultZoneAccess, DefinedConfiguration,
    EffectiveConfiguration, ZoneAction, ZoneEntry, ZoneMembers, ZoningSnapshot,
};
pub use transport::{TlsMode, TransportConfig};
