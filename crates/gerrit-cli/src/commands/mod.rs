//! Command implementations.

pub mod anonymize;
pub mod fetch;
pub mod list;
pub mod reviewers;

use anyhow::{Context, Result};

use gretch_core::{Credentials, GerritUrl};
use gretch_rest::RestClient;

/// Build a REST client, authenticated when both credentials are given.
pub(crate) fn client_for(
    url: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<RestClient> {
    let base = GerritUrl::new(url).context("Invalid Gerrit URL")?;

    Ok(match (username, password) {
        (Some(user), Some(pass)) => {
            RestClient::with_credentials(base, Credentials::new(user, pass))
        }
        _ => RestClient::new(base),
    })
}
