pub mod detector;
pub mod poller;
pub mod worker;
