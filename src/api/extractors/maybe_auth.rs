use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::User;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

/// Optional actor: guests come through as `None` instead of a rejection.
/// Used by the public booking-creation and tracking endpoints.
pub struct MaybeAuthUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let Some(access_cookie) = cookies.get("access_token") else {
            return Ok(MaybeAuthUser(None));
        };
        let access_token = access_cookie.value().to_string();

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&["washbooking-frontend"]);

        let token_data = match decode::<Claims>(&access_token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                debug!("Ignoring invalid access token on optional-auth route: {}", e);
                return Ok(MaybeAuthUser(None));
            }
        };

        let user = User {
            id: token_data.claims.sub.clone(),
            username: "from_jwt".to_string(),
            password_hash: String::new(),
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
            role: token_data.claims.role,
            is_active: true,
            created_at: chrono::Utc::now(),
        };

        Ok(MaybeAuthUser(Some(user)))
    }
}
