pub mod enable_signal;
pub mod logger;
