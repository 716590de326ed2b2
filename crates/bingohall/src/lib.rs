//! # Bingohall
//!
//! Real-time multiplayer bingo session server.
//!
//! A host registers a room and draws numbers; players join by room code,
//! mark their cards locally, and race to claim a win. The server is the
//! authority for draws and for adjudicating the first claim.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bingohall::BingohallServer;
//!
//! # async fn run() -> Result<(), bingohall::BingoError> {
//! let server = BingohallServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BingoError;
pub use server::{BingohallServer, BingohallServerBuilder};
