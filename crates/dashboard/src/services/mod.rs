pub mod global_poller;
pub mod signal_poller;
