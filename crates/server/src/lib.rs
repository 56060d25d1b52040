//! Sift HTTP service.
//!
//! Exposes the conversational web-RAG pipeline over HTTP:
//! - `POST /query` answers a query for a session, or resets it
//! - `GET /health` reports liveness and version

pub mod gateway;
pub mod routes;

#[cfg(test)]
mod testing;

pub use gateway::{Gateway, RESET_ACK};
pub use routes::{create_router, ApiError, QueryRequest, QueryResponse, SESSION_HEADER};
