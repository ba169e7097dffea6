//! [`AuthBackend`] over the Cuisine HTTP API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AuthBackend, AuthSession, SessionError};
use crate::models::auth::User;
use crate::models::favorites::FavoriteEntry;

#[derive(Deserialize)]
struct TokenBody {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct UserBody {
    user: User,
}

#[derive(Deserialize)]
struct FavoritesBody {
    favorites: Vec<FavoriteEntry>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFavoriteBody<'a> {
    meal_id: &'a str,
    meal_data: &'a Value,
}

/// HTTP client for the auth and favorites endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /favorites`
    pub async fn list_favorites(&self, token: &str) -> Result<Vec<FavoriteEntry>, SessionError> {
        let body: FavoritesBody =
            send(self.client.get(self.url("/favorites")).bearer_auth(token)).await?;
        Ok(body.favorites)
    }

    /// `POST /favorites`
    pub async fn add_favorite(
        &self,
        token: &str,
        meal_id: &str,
        meal_data: &Value,
    ) -> Result<(), SessionError> {
        let _: Value = send(
            self.client
                .post(self.url("/favorites"))
                .bearer_auth(token)
                .json(&AddFavoriteBody { meal_id, meal_data }),
        )
        .await?;
        Ok(())
    }

    /// `DELETE /favorites?mealId=..`
    pub async fn remove_favorite(&self, token: &str, meal_id: &str) -> Result<(), SessionError> {
        let _: Value = send(
            self.client
                .delete(self.url("/favorites"))
                .bearer_auth(token)
                .query(&[("mealId", meal_id)]),
        )
        .await?;
        Ok(())
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SessionError> {
    let resp = request
        .send()
        .await
        .map_err(|e| SessionError::Transport(e.to_string()))?;
    parse(resp).await
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, SessionError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json()
            .await
            .map_err(|e| SessionError::Transport(format!("response parse error: {e}")));
    }

    let message = resp
        .json::<ErrorBody>()
        .await
        .map(|b| b.message)
        .unwrap_or_else(|_| status.to_string());
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SessionError::Unauthorized(message));
    }
    Err(SessionError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn verify(&self, token: &str) -> Result<User, SessionError> {
        let body: UserBody = send(self.client.get(self.url("/verify")).bearer_auth(token)).await?;
        Ok(body.user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
        let body: TokenBody = send(
            self.client
                .post(self.url("/login"))
                .json(&LoginBody { email, password }),
        )
        .await?;
        Ok(AuthSession {
            token: body.token,
            user: body.user,
        })
    }

    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SessionError> {
        let body: TokenBody = send(
            self.client
                .post(self.url("/signup"))
                .json(&SignupBody {
                    username,
                    email,
                    password,
                }),
        )
        .await?;
        Ok(AuthSession {
            token: body.token,
            user: body.user,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::session::{MemoryTokenStorage, SessionController, SessionState, TokenStorage};

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "username": "chef1",
            "email": "chef1@x.com",
            "avatar": "https://api.dicebear.com/7.x/avataaars/svg?seed=chef1"
        })
    }

    #[tokio::test]
    async fn login_parses_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"email": "chef1@x.com", "password": "pw12345"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "t1", "user": user_json()})),
            )
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(Client::new(), server.uri());
        let session = backend.login("chef1@x.com", "pw12345").await.unwrap();
        assert_eq!(session.token, "t1");
        assert_eq!(
            session.user.avatar_url,
            "https://api.dicebear.com/7.x/avataaars/svg?seed=chef1"
        );
    }

    #[tokio::test]
    async fn unauthorized_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"error": "unauthorized", "message": "Invalid or expired token"}),
            ))
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(Client::new(), server.uri());
        match backend.verify("stale").await {
            Err(SessionError::Unauthorized(message)) => {
                assert_eq!(message, "Invalid or expired token")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn controller_discards_token_rejected_by_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let storage = MemoryTokenStorage::default();
        storage.save("stale").unwrap();
        let mut session =
            SessionController::new(HttpAuthBackend::new(Client::new(), server.uri()), storage);
        assert_eq!(session.initialize().await, &SessionState::Unauthenticated);
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn favorites_calls_attach_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favorites"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "favorites": [{
                    "mealId": "52771",
                    "strMeal": "Spicy Arrabiata Penne",
                    "addedAt": "2024-05-01T10:00:00Z"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/favorites"))
            .and(query_param("mealId", "52771"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpAuthBackend::new(Client::new(), server.uri());
        let favorites = backend.list_favorites("t1").await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].meal_id, "52771");
        backend.remove_favorite("t1", "52771").await.unwrap();
    }
}
