pub mod cancel;
pub mod config;
pub mod db;
pub mod fix;
pub mod init;
pub mod job;
pub mod log;
pub mod mode;
pub mod records;
pub mod status;
pub mod stop;
pub mod sweep;
pub mod watch;
