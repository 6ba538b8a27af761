pub mod config;
pub mod dispatcher;
pub mod error;
pub mod rng;
pub mod scheduler;
pub mod store;

pub use config::ShopConfig;
pub use dispatcher::{Dispatcher, ShopSnapshot};
pub use error::{DispatchError, Result};
