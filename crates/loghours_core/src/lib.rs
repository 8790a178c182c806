pub mod block;
pub mod memory;
pub mod message;
pub mod month;
pub mod notify;
pub mod request;
pub mod sheet;
pub mod updater;
