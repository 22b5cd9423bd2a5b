pub mod init;
pub mod predict;
pub mod print_config;
pub mod run;
