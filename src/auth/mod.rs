pub mod password;

pub use password::{hash_password, PasswordError};
