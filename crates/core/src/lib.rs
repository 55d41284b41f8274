//! Frame-accurate timecode engine and NLE marker export for SmoTree.
//!
//! Everything here is pure and synchronous. Persistence lives in
//! `smotree-db`; orchestration and file output live in `smotree-cli`.

pub mod error;
pub mod export;
pub mod format;
pub mod framerate;
pub mod naming;
pub mod review;
pub mod status;
pub mod timecode;
pub mod types;
