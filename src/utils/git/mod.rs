//! Git plumbing for the publish workflow.
//!
//! `git` itself performs every change (see [`Git`]); `gix` answers questions
//! about the repository (see [`Repository`]).

mod command;
pub mod ignore;
mod remote;
mod repo;

pub use command::Git;
pub use ignore::{IgnoreUpdate, ensure_pattern};
pub use remote::{ORIGIN, Remote, RemoteChange, is_missing_remote_ref};
pub use repo::Repository;
#[cfg(test)]
pub use repo::PLACEHOLDER_MESSAGE;
