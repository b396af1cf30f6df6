use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{value::RawValue, Map, Value};

use super::{User, UserGroupListResponse, UserProvider};
use crate::{
    error::{ProviderError, Result},
    init::InitError,
    rest::RestClient,
};

/// User provider backed by an external identity service.
#[derive(Debug, Clone)]
pub struct RestUserProvider {
    client: RestClient,
}

#[derive(Serialize)]
struct IdentifyUserRequest<'a> {
    filters: &'a Map<String, Value>,
}

#[derive(Deserialize)]
struct IdentifyUserResponse {
    #[serde(rename = "userID")]
    user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    user_type: &'a str,
    organization_unit: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a RawValue>,
}

impl RestUserProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> std::result::Result<Self, InitError> {
        Ok(Self { client: RestClient::new(base_url, api_key, timeout)? })
    }

    pub fn timeout(&self) -> Duration {
        self.client.timeout()
    }
}

#[async_trait]
impl UserProvider for RestUserProvider {
    async fn identify_user(&self, filters: &Map<String, Value>) -> Result<String> {
        let url = self.client.endpoint(&["identify"])?;
        let request = self.client.json_request(Method::POST, url, &IdentifyUserRequest { filters })?;

        let response: IdentifyUserResponse = self.client.call(request, &[StatusCode::OK]).await?;
        if response.user_id.is_empty() {
            return Err(ProviderError::system("Failed to decode response", "response carried an empty userID"));
        }

        Ok(response.user_id)
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let url = self.client.endpoint(&["users", user_id])?;
        let request = self.client.request(Method::GET, url);

        self.client.call(request, &[StatusCode::OK]).await
    }

    async fn get_user_groups(&self, user_id: &str, limit: i64, offset: i64) -> Result<UserGroupListResponse> {
        let url = self.client.endpoint(&["users", user_id, "groups"])?;
        let request = self.client.request(Method::GET, url).query(&[("limit", limit), ("offset", offset)]);

        self.client.call(request, &[StatusCode::OK]).await
    }

    async fn update_user(&self, user_id: &str, user: &User) -> Result<User> {
        let url = self.client.endpoint(&["users", user_id])?;
        let request = self.client.json_request(Method::PUT, url, user)?;

        self.client.call(request, &[StatusCode::OK]).await
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        let url = self.client.endpoint(&["users"])?;
        let body = CreateUserRequest {
            user_type: &user.user_type,
            organization_unit: &user.organization_unit,
            attributes: user.attributes.as_deref(),
        };
        let request = self.client.json_request(Method::POST, url, &body)?;

        self.client.call(request, &[StatusCode::CREATED, StatusCode::OK]).await
    }

    async fn update_user_credentials(&self, user_id: &str, credentials: &RawValue) -> Result<()> {
        let url = self.client.endpoint(&["users", user_id, "credentials"])?;
        let request = self.client.raw_json_request(Method::PUT, url, credentials.get().to_owned());

        self.client.call_without_body(request, &[StatusCode::OK]).await
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use axum::{
        extract::Path,
        http::{Method, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, value::RawValue, Map, Value};

    use super::RestUserProvider;
    use crate::{
        error::ErrorCode,
        test_utils::{serve, unreachable_url, StubServer, TEST_API_KEY},
        user::{User, UserProvider},
    };

    fn provider(url: &str) -> RestUserProvider {
        RestUserProvider::new(url, TEST_API_KEY, Duration::from_secs(1)).expect("creating provider should be successful")
    }

    fn raw(json: &str) -> Box<RawValue> {
        RawValue::from_string(json.to_owned()).expect("test payload should be json")
    }

    #[tokio::test]
    async fn when_backend_identifies_user_then_identify_user_returns_its_id() {
        let server = StubServer::start(StatusCode::OK, r#"{"userID":"user123"}"#).await;
        let filters = json!({ "email": "test@test.com", "tenant": { "id": 7, "tags": ["a", null] } });
        let Value::Object(filters) = filters else { unreachable!() };

        let user_id = provider(&server.url).identify_user(&filters).await.expect("identify should be successful");

        assert_eq!(user_id, "user123");
        let request = server.single_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/identify");
        assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));
        assert_eq!(request.json()["filters"], Value::Object(filters));
    }

    #[tokio::test]
    async fn when_backend_reports_business_code_then_identify_user_passes_it_through() {
        let server = StubServer::start(StatusCode::NOT_FOUND, r#"{"code":"USER-1001"}"#).await;

        let error = provider(&server.url).identify_user(&Map::new()).await.expect_err("identify should fail");

        assert_eq!(error.code.as_str(), "USER-1001");
    }

    #[tokio::test]
    async fn when_backend_reports_not_found_then_identify_user_keeps_the_code() {
        let server = StubServer::start(StatusCode::NOT_FOUND, r#"{"code":"USER_NOT_FOUND","message":"Not Found"}"#).await;

        let error = provider(&server.url).identify_user(&Map::new()).await.expect_err("identify should fail");

        assert_eq!(error.code, ErrorCode::UserNotFound);
        assert_eq!(error.message, "Not Found");
    }

    #[tokio::test]
    async fn when_error_body_has_null_text_then_identify_user_keeps_the_backend_code() {
        let server =
            StubServer::start(StatusCode::NOT_FOUND, r#"{"code":"USER-1001","message":null,"description":null}"#).await;

        let error = provider(&server.url).identify_user(&Map::new()).await.expect_err("identify should fail");

        assert_eq!(error.code.as_str(), "USER-1001");
        assert!(error.message.is_empty());
        assert!(error.description.is_empty());
    }

    #[tokio::test]
    async fn when_identified_user_id_is_empty_then_identify_user_returns_system_error() {
        let server = StubServer::start(StatusCode::OK, r#"{"userID":""}"#).await;

        let error = provider(&server.url).identify_user(&Map::new()).await.expect_err("identify should fail");

        assert_eq!(error.code, ErrorCode::SystemError);
    }

    #[tokio::test]
    async fn when_user_exists_then_get_user_returns_record_with_attributes_untouched() {
        let server = StubServer::start(
            StatusCode::OK,
            r#"{"userID":"user123","userType":"customer","organizationUnit":"ou1","attributes":{"b":1,  "a":[true]}}"#,
        )
        .await;

        let user = provider(&server.url).get_user("user123").await.expect("get user should be successful");

        assert_eq!(user.user_id, "user123");
        assert_eq!(user.user_type, "customer");
        assert_eq!(user.organization_unit, "ou1");
        assert_eq!(user.attributes.expect("attributes should be present").get(), r#"{"b":1,  "a":[true]}"#);

        let request = server.single_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/users/user123");
        assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));
    }

    #[tokio::test]
    async fn when_record_fields_are_null_then_get_user_reads_them_as_empty() {
        let server = StubServer::start(
            StatusCode::OK,
            r#"{"userID":"user123","userType":null,"organizationUnit":null,"attributes":null}"#,
        )
        .await;

        let user = provider(&server.url).get_user("user123").await.expect("get user should be successful");

        assert_eq!(user.user_id, "user123");
        assert_eq!(user.user_type, "");
        assert_eq!(user.organization_unit, "");
        assert!(user.attributes.is_none());
    }

    #[tokio::test]
    async fn when_group_page_fields_are_null_then_get_user_groups_reads_them_as_empty() {
        let server = StubServer::start(
            StatusCode::OK,
            r#"{"total":null,"limit":null,"offset":null,"groups":[{"id":"g1","name":null}]}"#,
        )
        .await;

        let response =
            provider(&server.url).get_user_groups("user123", 10, 0).await.expect("get groups should be successful");

        assert_eq!(response.total, 0);
        assert_eq!(response.groups[0].id, "g1");
        assert_eq!(response.groups[0].name, "");
    }

    #[tokio::test]
    async fn when_backend_fails_then_get_user_returns_its_error() {
        let server = StubServer::start(StatusCode::INTERNAL_SERVER_ERROR, r#"{"code":"SYSTEM_ERROR"}"#).await;

        let error = provider(&server.url).get_user("user123").await.expect_err("get user should fail");

        assert_eq!(error.code, ErrorCode::SystemError);
    }

    #[tokio::test]
    async fn when_groups_are_requested_then_limit_and_offset_are_sent_verbatim() {
        let server = StubServer::start(
            StatusCode::OK,
            r#"{"total":1,"limit":10,"offset":5,"groups":[{"id":"g1","name":"admins"}]}"#,
        )
        .await;

        let response =
            provider(&server.url).get_user_groups("user123", 10, 5).await.expect("get groups should be successful");

        assert_eq!(response.groups.len(), 1);
        assert_eq!(response.groups[0].id, "g1");
        assert_eq!(response.total, 1);

        let request = server.single_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/users/user123/groups");
        assert_eq!(request.query.as_deref(), Some("limit=10&offset=5"));
        assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));
    }

    #[tokio::test]
    async fn when_paging_values_are_negative_or_large_then_they_are_not_clamped() {
        let server = StubServer::start(StatusCode::OK, r#"{"groups":[]}"#).await;

        provider(&server.url)
            .get_user_groups("user123", -1, i64::MAX)
            .await
            .expect("get groups should be successful");

        assert_eq!(server.single_request().query.as_deref(), Some("limit=-1&offset=9223372036854775807"));
    }

    #[tokio::test]
    async fn when_user_is_updated_then_full_record_is_sent_and_backend_record_returned() {
        let server = StubServer::start(
            StatusCode::OK,
            r#"{"userID":"user123","userType":"updated","organizationUnit":"ou2","attributes":{"x":1}}"#,
        )
        .await;
        let user = User {
            user_id: "user123".to_owned(),
            user_type: "updated".to_owned(),
            organization_unit: "ou1".to_owned(),
            attributes: Some(raw(r#"{"x":0}"#)),
        };

        let updated = provider(&server.url).update_user("user123", &user).await.expect("update should be successful");

        assert_eq!(updated.user_type, "updated");
        assert_eq!(updated.organization_unit, "ou2");

        let request = server.single_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/users/user123");
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            request.json(),
            json!({ "userID": "user123", "userType": "updated", "organizationUnit": "ou1", "attributes": { "x": 0 } })
        );
    }

    #[tokio::test]
    async fn when_backend_answers_created_or_ok_then_create_user_decodes_both() {
        const BODY: &str = r#"{"userID":"created","userType":"new"}"#;

        for status in [StatusCode::CREATED, StatusCode::OK] {
            let server = StubServer::start(status, BODY).await;
            let user = User { user_type: "new".to_owned(), ..Default::default() };

            let created = provider(&server.url).create_user(&user).await.expect("create should be successful");

            assert_eq!(created.user_id, "created");
            assert_eq!(created.user_type, "new");

            let request = server.single_request();
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.path, "/users");
            assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));
        }
    }

    #[tokio::test]
    async fn when_user_is_created_then_body_carries_no_id() {
        let server = StubServer::start(StatusCode::CREATED, r#"{"userID":"created"}"#).await;
        let user = User {
            user_id: "client-chosen".to_owned(),
            user_type: "new".to_owned(),
            organization_unit: "ou1".to_owned(),
            attributes: Some(raw(r#"{"email":"a@b.c"}"#)),
        };

        provider(&server.url).create_user(&user).await.expect("create should be successful");

        assert_eq!(
            server.single_request().json(),
            json!({ "userType": "new", "organizationUnit": "ou1", "attributes": { "email": "a@b.c" } })
        );
    }

    #[tokio::test]
    async fn when_creation_conflicts_then_create_user_returns_backend_error() {
        let server = StubServer::start(StatusCode::CONFLICT, r#"{"code":"USER-1004","message":"exists"}"#).await;

        let error = provider(&server.url).create_user(&User::default()).await.expect_err("create should fail");

        assert_eq!(error.code.as_str(), "USER-1004");
    }

    #[tokio::test]
    async fn when_credentials_are_accepted_then_update_user_credentials_returns_ok() {
        let server = StubServer::start(StatusCode::OK, "").await;

        provider(&server.url)
            .update_user_credentials("user123", &raw(r#"{"password":"n3w"}"#))
            .await
            .expect("credential update should be successful");

        let request = server.single_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/users/user123/credentials");
        assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert_eq!(&request.body[..], br#"{"password":"n3w"}"#);
    }

    #[tokio::test]
    async fn when_credentials_are_rejected_then_update_user_credentials_returns_that_code() {
        let server = StubServer::start(StatusCode::BAD_REQUEST, r#"{"code":"INVALID_REQUEST"}"#).await;

        let error = provider(&server.url)
            .update_user_credentials("user123", &raw("{}"))
            .await
            .expect_err("credential update should fail");

        assert_eq!(error.code.as_str(), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn when_backend_is_unreachable_then_every_operation_returns_system_error() {
        let provider = provider(&unreachable_url());
        let credentials = raw("{}");

        let errors = vec![
            provider.identify_user(&Map::new()).await.expect_err("identify should fail"),
            provider.get_user("user123").await.expect_err("get user should fail"),
            provider.get_user_groups("user123", 10, 0).await.expect_err("get groups should fail"),
            provider.update_user("user123", &User::default()).await.expect_err("update should fail"),
            provider.create_user(&User::default()).await.expect_err("create should fail"),
            provider.update_user_credentials("user123", &credentials).await.expect_err("credential update should fail"),
        ];

        for error in errors {
            assert_eq!(error.code, ErrorCode::SystemError);
            assert_eq!(error.message, "Failed to send request");
            assert!(!error.description.is_empty());
        }
    }

    #[tokio::test]
    async fn when_backend_is_slower_than_timeout_then_call_returns_system_error() {
        let router = Router::new().route(
            "/users/:user_id",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "userID": "late" }))
            }),
        );
        let url = serve(router).await;
        let provider = RestUserProvider::new(&url, TEST_API_KEY, Duration::from_millis(100))
            .expect("creating provider should be successful");

        let error = provider.get_user("user123").await.expect_err("get user should time out");

        assert_eq!(error.code, ErrorCode::SystemError);
    }

    #[tokio::test]
    async fn when_timeout_is_zero_then_a_backend_slower_than_a_short_timeout_still_answers() {
        let router = Router::new().route(
            "/users/:user_id",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({ "userID": "patient" }))
            }),
        );
        let url = serve(router).await;
        let short = RestUserProvider::new(&url, TEST_API_KEY, Duration::from_millis(100))
            .expect("creating provider should be successful");
        let defaulted =
            RestUserProvider::new(&url, TEST_API_KEY, Duration::ZERO).expect("creating provider should be successful");

        let error = short.get_user("user123").await.expect_err("short timeout should elapse");
        let user = defaulted.get_user("user123").await.expect("default timeout should not elapse");

        assert_eq!(error.code, ErrorCode::SystemError);
        assert_eq!(user.user_id, "patient");
    }

    #[tokio::test]
    async fn when_calls_run_concurrently_then_each_gets_its_own_response() {
        let router = Router::new().route(
            "/users/:user_id",
            get(|Path(user_id): Path<String>| async move {
                Json(json!({ "userID": user_id, "userType": format!("type-of-{user_id}") }))
            }),
        );
        let provider = Arc::new(provider(&serve(router).await));

        let handles = (0..32)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let user_id = format!("user-{i}");
                    let user = provider.get_user(&user_id).await.expect("get user should be successful");
                    (user_id, user)
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let (user_id, user) = handle.await.expect("task should not panic");
            assert_eq!(user.user_type, format!("type-of-{user_id}"));
            assert_eq!(user.user_id, user_id);
        }
    }
}
