//! gretch-rest - reqwest-backed [`Transport`](gretch_core::Transport)
//! implementation for Gerrit servers.

mod client;

pub use client::{RestClient, decode_body};
