pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::CurrentUser;
pub use services::{AuthService, TokenService};
