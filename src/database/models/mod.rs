pub mod request;
pub mod user;

pub use request::{InvalidStatus, Request, RequestStatus};
pub use user::User;
