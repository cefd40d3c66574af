// ── Zoning domain model ──
//
// Canonical types for one fabric's zoning database. Built from switch
// captures in `convert`, mutated only by the operation handlers.

pub mod fabric;
pub mod member;
pub mod zoning;

pub use fabric::{Fabric, ModelError};
pub use member::{Member, Wwn, is_address, is_valid_zone_name, is_zone_member, normalize_member};
pub use zoning::{Alias, EFFECTIVE_CFG_MARKER, ObjectKind, Zone, ZoneConfig, ZoneType};
