//! Exploration and chat over remote repositories.
//!
//! [`Explorer`] walks a repository in a few planned rounds, indexing what it
//! reads into a session's hybrid index and streaming progress events.
//! [`ChatService`] answers questions from that index and pulls in files the
//! model asks for.

pub mod chat;
pub mod config;
pub mod error;
pub mod explore;
pub mod github;
pub mod ingest;
pub mod prompt;
pub mod source;

pub use chat::{ChatService, Reply, ReplySniffer, parse_reply};
pub use config::Config;
pub use error::{CoreError, Result};
pub use explore::{ExploreEvent, ExploreSummary, Explorer, Step};
pub use github::GitHubSource;
pub use source::{FileSource, MemorySource};
