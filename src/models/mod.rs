pub mod action_kind;
pub mod audit;
pub mod fix;
pub mod job;
pub mod mode;
pub mod pending_action;
pub mod runtime_state;
pub mod session;
pub mod work_record;
