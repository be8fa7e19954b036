//! Community interaction service: optimistic toggle stores (likes,
//! bookmarks, hashtag follows) over a remote row store, headless widget
//! state machines, and the REST surface that backs them.

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod interaction;
pub mod kv;
pub mod models;
pub mod notify;
pub mod payments;
pub mod remote;
pub mod routes;
pub mod session;
pub mod states;
pub mod widgets;

pub use states::AppState;
