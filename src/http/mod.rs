//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, peer address via ConnectInfo)
//!     → Engine::dispatch (throttle, blacklist, select, forward)
//!     → response or mapped EngineError
//!     → Send to client
//! ```

pub mod server;

pub use server::{router, serve};
