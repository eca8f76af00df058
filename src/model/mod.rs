pub mod request;
pub mod team;
