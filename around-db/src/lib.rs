pub mod client;
pub mod elastic;
pub mod memory;
pub mod record;
pub mod store;
