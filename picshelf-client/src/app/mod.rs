//! Application shell wiring the domains to one transport.

mod shell;

pub use shell::App;
