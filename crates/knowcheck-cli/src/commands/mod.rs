pub mod compare;
pub mod init;
pub mod take;
pub mod validate;
