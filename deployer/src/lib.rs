pub mod backend;
pub mod cli;
pub mod env;
pub mod procedure;
pub mod record;
