pub mod list_protocols;
pub mod run;
pub mod validate;
