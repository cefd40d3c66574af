//! Zoning engine between `fabzone-api` and the CLI.
//!
//! This crate owns the domain model and business logic for Fibre Channel
//! zoning on Brocade FOS switches:
//!
//! - **[`Fabric`]**: in-memory model of one logical switch's zoning
//!   (aliases, zones, zone configurations, the effective configuration).
//!   Captured from the switch with [`Fabric::from_snapshot`].
//!
//! - **Operations** ([`OperationRequest`] / [`OperationKind`]): the
//!   seventeen zoning commands (`alias-create`, `zone-add`, `cfg-enable`,
//!   and so on). [`handlers::dispatch`] validates each one, applies it to
//!   the switch, then mirrors it into the model.
//!
//! - **[`run_batch`] / [`send_zoning`]**: the transaction driver. Runs a
//!   batch fail-fast, reports unsaved changes, and always releases the
//!   switch's zoning transaction at the end. In bulk mode the whole model
//!   is pushed in one replace ([`sync::replace_zoning`]).
//!
//! - **[`Session`]**: a logged-in connection to one switch, with
//!   [`Session::oneshot()`] for single CLI invocations.
//!
//! - **[`ZoningRemote`]**: the seam between the engine and the REST
//!   client, so handlers can run against a fake switch in tests.

pub mod config;
pub mod context;
pub mod convert;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod model;
pub mod operation;
pub mod remote;
pub mod session;
pub mod sync;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Security, SessionConfig};
pub use context::{BatchContext, BatchOptions};
pub use driver::{BatchReport, BatchRequest, BatchSummary, run_batch, send_zoning};
pub use error::{CoreError, ZoneError, ZoneErrorKind};
pub use operation::{OpOutcome, OpResult, OperationKind, OperationRequest};
pub use remote::ZoningRemote;
pub use session::Session;

pub use fabzone_api::DefaultZoneAccess;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alias, EFFECTIVE_CFG_MARKER, Fabric, Member, ModelError, ObjectKind, Wwn, Zone, ZoneConfig,
    ZoneType,
};
