mod config_handler;
mod upload_handler;

pub use config_handler::*;
pub use upload_handler::*;
