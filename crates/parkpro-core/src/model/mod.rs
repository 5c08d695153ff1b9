// ── Domain model ──
//
// Canonical parking types shared by every front end. Wire records from
// `parkpro_api` are converted into these in `crate::convert`.

pub mod session;
pub mod slot;
pub mod timestamp;
pub mod vehicle;

pub use session::{ParkingSession, SessionId};
pub use slot::{ParkingSlot, ParseSlotError};
pub use timestamp::Timestamp;
pub use vehicle::VehicleType;
