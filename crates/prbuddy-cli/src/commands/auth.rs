// SPDX-License-Identifier: Apache-2.0

//! Authentication status command.

use prbuddy_core::AppConfig;
use prbuddy_core::auth::TokenProvider;
use prbuddy_core::github::auth;
use tracing::debug;

use super::types::AuthStatusResult;
use crate::provider::CliTokenProvider;

/// Run the status command - show current authentication state.
pub async fn run_status(config: &AppConfig) -> AuthStatusResult {
    let gemini_key_set = CliTokenProvider.gemini_key().is_some();

    match auth::resolve_token() {
        Some((token, source)) => {
            let username =
                match auth::create_client_with_token(&token, config.github.api_timeout_seconds) {
                    Ok(client) => match client.current().user().await {
                        Ok(user) => Some(user.login),
                        Err(e) => {
                            debug!(error = %e, "Could not look up the authenticated user");
                            None
                        }
                    },
                    Err(_) => None,
                };

            AuthStatusResult {
                authenticated: true,
                method: Some(source),
                username,
                gemini_key_set,
            }
        }
        None => AuthStatusResult {
            authenticated: false,
            method: None,
            username: None,
            gemini_key_set,
        },
    }
}
