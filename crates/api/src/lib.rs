//! Backend access for the LMS client.
//!
//! The crate is split along one seam: [`backend`] defines what the server
//! can do (per-concern traits plus the `Backend` aggregate and an in-memory
//! double), [`client`] implements those contracts over HTTP, and [`session`]
//! holds the bearer token both sides share.

#![forbid(unsafe_code)]

pub mod backend;
pub mod client;
pub mod error;
pub mod schema;
pub mod session;

pub use backend::{AdminApi, AuthApi, Backend, CourseApi, InMemoryBackend, ProgressApi, QuizApi, ResourceApi};
pub use client::{ApiConfig, HttpBackend};
pub use error::ApiError;
pub use session::{AuthSession, SessionHandle};
