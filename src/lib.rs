pub mod clock;
pub mod commands;
pub mod config;
pub mod encoder;
pub mod error;
pub mod identity;
pub mod model;
pub mod registry;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{ConfigError, LinkError};
pub use identity::{IdentityProvider, Owner, SessionIdentity};
pub use model::{Link, LinkStatus};
pub use registry::LinkRegistry;
