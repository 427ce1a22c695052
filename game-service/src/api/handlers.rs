use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use shared::{Result, ServiceError};

use crate::api::dto::{
    AuthResponse, GlobalStatsResponse, HealthResponse, LeaderboardQuery, LeaderboardResponse,
    LoginRequest, RegisterRequest, SubmitScoreRequest, SubmitScoreResponse, UserInfo,
    UserStatsResponse,
};
use crate::api::AppState;

/// Pulls the token out of a `Bearer` authorization header. Token
/// verification itself happens in the service layer.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("Malformed authorization header".to_string()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(ServiceError::Unauthorized(
            "Malformed authorization header".to_string(),
        )),
    }
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "Tap Game API",
        timestamp: Utc::now(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse {
        user: UserInfo::from(&user),
        token,
    }))
}

pub async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;

    let game_id = state
        .game
        .submit_score(token, req.score, req.taps, req.duration)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitScoreResponse {
            game_id: game_id.to_string(),
            score: req.score,
            taps: req.taps,
        }),
    ))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;

    let (leaderboard, cached) = state.game.get_leaderboard(token, query.limit).await?;

    Ok(Json(LeaderboardResponse {
        leaderboard,
        cached,
    }))
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;

    let (stats, cached) = state.stats.get_user_stats(token).await?;

    Ok(Json(UserStatsResponse { stats, cached }))
}

pub async fn get_global_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;

    let stats = state.stats.get_global_stats(token).await?;

    Ok(Json(GlobalStatsResponse {
        total_games: stats.total_games,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token(&headers_with("bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        let result = bearer_token(&headers);
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn test_bearer_token_malformed_header() {
        for value in ["abc.def.ghi", "Basic abc", "Bearer ", "Bearer"] {
            let headers = headers_with(value);
            let result = bearer_token(&headers);
            assert!(matches!(result, Err(ServiceError::Unauthorized(_))), "{}", value);
        }
    }
}
