pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod process;
pub mod synthetic;
pub mod weather;

pub use error::NormalizeError;
pub use process::canonical::CanonicalTable;
pub use process::normalize::{normalize, NegativeDurationPolicy, NormalizeOptions};
pub use process::raw_table::RawTable;
pub use weather::{join_weather, DailyView, WeatherTable};
