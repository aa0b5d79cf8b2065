pub mod auth;
pub mod posts;
pub mod root;
pub mod stocks;
pub mod teams;
pub mod transactions;
pub mod users;
