pub mod library;
pub mod notification;
