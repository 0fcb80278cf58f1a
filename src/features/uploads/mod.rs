pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::routes;
pub use state::UploadState;
