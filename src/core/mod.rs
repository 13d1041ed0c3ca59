pub mod capabilities;
pub mod config;
pub mod driver;

pub use capabilities::Capabilities;
pub use config::{Config, Endpoint};
pub use driver::RemoteDriver;
