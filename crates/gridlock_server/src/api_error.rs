//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use derive_more::Display;
use gridlock_engine::{GameError, MatchId};
use serde::Serialize;
use tracing::warn;

/// Failure of an HTTP request.
#[derive(Debug, Display)]
pub enum ApiError {
    /// No match with this id.
    #[display("Match {_0} not found")]
    MatchNotFound(MatchId),

    /// The request body could not be used.
    #[display("Invalid request body: {_0}")]
    InvalidBody(String),

    /// The engine rejected the operation.
    #[display("{_0}")]
    Game(GameError),
}

impl std::error::Error for ApiError {}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        ApiError::Game(error)
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Game(
                GameError::InvalidCoordinate(_)
                | GameError::NotACellSlot(_)
                | GameError::InvalidConfig(_)
                | GameError::DimensionMismatch,
            ) => StatusCode::BAD_REQUEST,
            ApiError::Game(_) => StatusCode::CONFLICT,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MatchNotFound(_) => "match_not_found",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::Game(error) => error.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = %status, code = self.code(), error = %self, "Request failed");
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_engine::{Color, Coord};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MatchNotFound(MatchId::new("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(GameError::InvalidCoordinate(Coord::new(0, 0))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GameError::WallBudgetExceeded(Color::Red)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(GameError::DiceNotRolled).code(),
            "dice_not_rolled"
        );
    }
}
