pub mod hunt;
pub mod messages;
