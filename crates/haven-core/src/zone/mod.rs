//! Spawn zones: 2D shapes in one world with per-zone capability ACLs

mod acl;
mod shape;
mod spawn_zone;

pub use acl::{allowed, Acl, AclMode, Capability, Toggle};
pub use shape::{Circle, Point, Polygon, Rect, Shape, ShapeType, MAX_RADIUS};
pub use spawn_zone::SpawnZone;
