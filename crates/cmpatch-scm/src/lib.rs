//! Plastic SCM adapter for cmpatch.
//!
//! Wraps the `cm` command-line client: install checks, workspace and
//! repository discovery, listing the changes of a changeset or branch in
//! the record format [`cmpatch_core`] parses, and byte-exact content
//! retrieval.
//!
//! # Modules
//!
//! - [`client`] -- [`CmClient`] and [`RepositoryInfo`]
//! - [`retriever`] -- [`CmRetriever`], the `cm cat` [`ContentRetriever`](cmpatch_core::ContentRetriever)
//! - [`target`] -- [`DiffTarget`] argument parsing
//! - [`error`] -- [`ScmError`]

pub mod client;
pub mod error;
pub mod retriever;
pub mod target;

pub use client::{CmClient, RepositoryInfo, CHANGE_FORMAT};
pub use error::{ScmError, ScmResult};
pub use retriever::CmRetriever;
pub use target::DiffTarget;
