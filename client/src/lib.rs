#![forbid(unsafe_code)]
//! Client-side collaborators for case study accounts: an account source, a
//! skip-and-log gallery, token gating, cluster configuration and JSON views.

pub mod config;
pub mod gallery;
pub mod source;
pub mod token_gate;
pub mod view;

pub use config::{require_allowlisted_deployment, ClientConfig, ConfigError, TrustedDeployment};
pub use gallery::{Gallery, GalleryEntry, GalleryQuery, SkippedAccount};
pub use source::{AccountSource, RawAccount, SizeFilter, SourceError, StaticAccountSource};
pub use token_gate::{ensure_token_creatable, ensure_token_creatable_by, TokenGateError};
pub use view::{render_eligibility, render_gallery, render_layout, render_record};

/// The record codec and validation model this crate builds on
pub use dbc_case_study as case_study;
