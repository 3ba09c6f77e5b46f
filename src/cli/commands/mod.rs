pub mod init_admin;
pub mod migrate;
pub mod requests;
pub mod users;
