pub mod email;
pub mod gateway;
