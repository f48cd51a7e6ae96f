pub mod config;
pub mod debounce;
pub mod engine;
pub mod fulfiller;
pub mod geo;
pub mod jobs;
pub mod log;
pub mod manual;
pub mod mode;
pub mod notifier;
pub mod outcome;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod worker;
