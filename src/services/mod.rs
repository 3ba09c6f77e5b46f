pub mod bootstrap;
pub mod request_service;
pub mod user_service;

pub use bootstrap::{init_admin, BootstrapOutcome};
pub use request_service::{CreateRequest, DeleteResult, RequestError, RequestService, RequestsQuery, UpdateRequest};
pub use user_service::{CreateUser, UpdateUser, UserError, UserService, UsersQuery};
