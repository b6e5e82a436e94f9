pub mod announcer;
pub mod client;
pub mod poller;
