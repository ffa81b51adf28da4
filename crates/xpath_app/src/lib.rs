//! XPath browser application: CLI, configuration and the job controller.
pub mod cli;
pub mod platform;
