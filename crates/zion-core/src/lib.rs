pub mod clock;
pub mod config;
pub mod error;
pub mod money;
pub mod portal;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ZionConfig;
pub use error::{Result, ZionError};
pub use money::Money;
pub use portal::{Portal, PortalId};
pub use types::*;
