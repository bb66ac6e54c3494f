//! Typed HTTP client for the Jellyfish Warning System API.
//!
//! Wraps the six server endpoints behind async methods that attach the
//! bearer token, unwrap the `{code, message, data}` response envelope, and
//! convert every failure into a user-facing notice at this boundary. Calling
//! views never re-report errors; they only stop their loading indicators.
//!
//! An authorization failure from a data endpoint tears the session down
//! exactly once per invalidation, however many requests were in flight when
//! the token died. A 401 from the login endpoint itself just means bad
//! credentials and leaves the session machinery alone.

pub mod client;
pub mod error;
pub mod notice;

pub use client::{resolve_server, MonitorClient, DEFAULT_SERVER, REQUEST_TIMEOUT, SERVER_ENV};
pub use error::ClientError;
pub use notice::{LogSink, Notice, NoticeSink};
