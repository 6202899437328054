pub mod motion_command;
pub mod session;
