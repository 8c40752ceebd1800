pub mod config;
pub mod error;
pub mod modulation;
pub mod record;
pub mod sweep;

pub use config::*;
pub use error::*;
pub use modulation::*;
pub use record::*;
pub use sweep::*;
