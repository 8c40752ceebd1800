pub mod analysis;
pub mod config;
pub mod error;
pub mod events;
pub mod gain;
pub mod metrics;
pub mod modulation;
pub mod scan_loop;
pub mod selector;
pub mod stop;
pub mod sweep;

pub use analysis::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use gain::*;
pub use metrics::*;
pub use modulation::*;
pub use scan_loop::*;
pub use selector::*;
pub use stop::*;
pub use sweep::*;
