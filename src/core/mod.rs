pub(crate) mod config;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod session;
pub(crate) mod state;
pub(crate) mod store;
