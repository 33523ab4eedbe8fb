//! HTTP infrastructure module

pub mod handlers;
pub mod models;
pub mod responses;
pub mod routes;
pub mod server;

pub use server::{AppContext, HttpServer};
