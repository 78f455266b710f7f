pub mod auth;
pub mod debtor;
pub mod group;
pub mod message;
