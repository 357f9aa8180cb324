pub mod http;
pub mod reaper;
