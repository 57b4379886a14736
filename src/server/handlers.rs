use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::player::Player;
use crate::server::state::AppState;

pub const LAUNCHED: &str = "Media player launched";
pub const MISSING_PARAMETERS: &str = "Launch request is missing required parameters";
pub const UNSUPPORTED_PLAYER: &str =
    "Invalid media player specified. Only Media Player Classic and VLC are supported.";
pub const PATH_NOT_CONFIGURED: &str = "Media player paths are not configured in windows helper app";
pub const NOT_FOUND: &str = "Not Found";

/// Query string of `/launch`; values arrive percent-decoded
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LaunchParams {
    pub player: Option<String>,
    pub media_url: Option<String>,
}

impl LaunchParams {
    /// Pick `player` and `media_url` from raw pairs; the first occurrence wins
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "player" => &mut params.player,
                "media_url" => &mut params.media_url,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: String,
    pub version: String,
}

/// GET /launch?player=<mpc|vlc>&media_url=<url>
pub async fn launch(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = LaunchParams::from_pairs(pairs);
    let player = params.player.unwrap_or_default();
    let media_url = params.media_url.unwrap_or_default();
    if player.is_empty() || media_url.is_empty() {
        return (StatusCode::BAD_REQUEST, MISSING_PARAMETERS).into_response();
    }

    let Ok(player) = player.parse::<Player>() else {
        debug!("Rejected launch for unsupported player '{}'", player);
        return (StatusCode::BAD_REQUEST, UNSUPPORTED_PLAYER).into_response();
    };

    // Snapshot so the read lock is not held while spawning.
    let config = state.config.snapshot();
    let Some(program) = player.configured_path(&config) else {
        return (StatusCode::BAD_REQUEST, PATH_NOT_CONFIGURED).into_response();
    };

    match state.launcher.launch(program, &media_url) {
        Ok(_) => (StatusCode::OK, LAUNCHED).into_response(),
        Err(e) => {
            error!("Error launching media player: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /status
pub async fn status() -> Json<StatusBody> {
    Json(StatusBody {
        status: "running".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Any other route
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = LaunchParams::from_pairs(pairs(&[
            ("player", "vlc"),
            ("media_url", "a"),
            ("player", "mpc"),
            ("media_url", "b"),
        ]));
        assert_eq!(params.player.as_deref(), Some("vlc"));
        assert_eq!(params.media_url.as_deref(), Some("a"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = LaunchParams::from_pairs(pairs(&[("media_url", "a"), ("t", "12")]));
        assert_eq!(
            params,
            LaunchParams {
                player: None,
                media_url: Some("a".to_string()),
            }
        );
    }
}
