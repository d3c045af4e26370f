pub mod health_check;
pub mod submissions;
