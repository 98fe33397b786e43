use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::store::{DocumentStore, StoreError, StorePath, StoreResult, object_children};

/// Firebase Realtime Database accessed through its REST interface.
///
/// Each node is addressed as `{base}/{path}.json`; the optional auth token
/// is sent as the `auth` query parameter on every request.
pub struct FirebaseStore {
    base_url: Url,
    auth_token: Option<String>,
    client: reqwest::Client,
}

/// Marker in the 400 body returned for a query on a field without an
/// `.indexOn` rule.
const INDEX_NOT_DEFINED: &str = "Index not defined";

/// Body returned by `POST` requests.
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseStore {
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidPath(format!("invalid database url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(format!(
                "database url cannot be a base: {base_url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client,
        })
    }

    /// REST endpoint of the node at `path`.
    pub fn endpoint(&self, path: &StorePath) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidPath(self.base_url.to_string()))?;
            segments.pop_if_empty();
            if let Some((last, parents)) = path.segments().split_last() {
                segments.extend(parents);
                segments.push(&format!("{last}.json"));
            } else {
                segments.push(".json");
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    /// Endpoint of an equality query on `child` below `path`. Both query
    /// parameters are JSON-encoded, as the REST interface expects.
    pub fn query_endpoint(&self, path: &StorePath, child: &str, value: &Value) -> StoreResult<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("orderBy", &Value::String(child.to_string()).to_string())
            .append_pair("equalTo", &value.to_string());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::PermissionDenied(body))
            }
            _ => Err(StoreError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn read_json(&self, url: Url) -> StoreResult<Option<Value>> {
        let response = self.send(self.client.get(url)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        match serde_json::from_slice::<Value>(&body)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}

#[async_trait]
impl DocumentStore for FirebaseStore {
    fn backend_tag(&self) -> &'static str {
        "firebase"
    }

    async fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        self.read_json(self.endpoint(path)?).await
    }

    async fn children(&self, path: &StorePath) -> StoreResult<Vec<(String, Value)>> {
        Ok(object_children(self.read_json(self.endpoint(path)?).await?))
    }

    async fn set(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        let url = self.endpoint(path)?;
        self.send(self.client.put(url).json(&value)).await?;
        Ok(())
    }

    async fn push(&self, path: &StorePath, value: Value) -> StoreResult<String> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.post(url).json(&value)).await?;
        let pushed: PushResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(pushed.name)
    }

    async fn remove(&self, path: &StorePath) -> StoreResult<()> {
        let url = self.endpoint(path)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn query_equal(
        &self,
        path: &StorePath,
        child: &str,
        value: &Value,
    ) -> StoreResult<Vec<(String, Value)>> {
        let url = self.query_endpoint(path, child, value)?;
        match self.read_json(url).await {
            Ok(node) => Ok(object_children(node)),
            Err(StoreError::Status { status: 400, body }) if body.contains(INDEX_NOT_DEFINED) => {
                log::warn!(
                    "No index on '{child}' for '{path}', filtering the whole collection instead"
                );
                let mut matches = self.children(path).await?;
                matches.retain(|(_, node)| node.get(child) == Some(value));
                Ok(matches)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(token: Option<&str>) -> FirebaseStore {
        FirebaseStore::new(
            "https://demo.firebaseio.com/",
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn builds_node_endpoints() {
        let path = StorePath::parse("listings/-Nabc").unwrap();
        let url = store(None).endpoint(&path).unwrap();
        assert_eq!(url.as_str(), "https://demo.firebaseio.com/listings/-Nabc.json");
    }

    #[test]
    fn appends_auth_token() {
        let path = StorePath::collection("categories").unwrap();
        let url = store(Some("secret")).endpoint(&path).unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.firebaseio.com/categories.json?auth=secret"
        );
    }

    #[test]
    fn encodes_equality_query_parameters_as_json() {
        let path = StorePath::collection("listings").unwrap();
        let url = store(None)
            .query_endpoint(&path, "categoryId", &json!("c1"))
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("orderBy".to_string(), "\"categoryId\"".to_string()),
                ("equalTo".to_string(), "\"c1\"".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unusable_database_urls() {
        assert!(FirebaseStore::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(FirebaseStore::new("mailto:x@y.z", None, Duration::from_secs(1)).is_err());
    }

    fn store_at(server: &MockServer) -> FirebaseStore {
        FirebaseStore::new(&server.uri(), None, Duration::from_secs(5)).unwrap()
    }

    fn node(p: &str) -> StorePath {
        StorePath::parse(p).unwrap()
    }

    #[actix_web::test]
    async fn reads_nodes_and_treats_null_as_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/categories/c1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Cars"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/categories/c2.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/listings.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        let store = store_at(&server);

        let found = store.get(&node("categories/c1")).await.unwrap();
        assert_eq!(found, Some(json!({"name": "Cars"})));
        assert_eq!(store.get(&node("categories/c2")).await.unwrap(), None);
        assert!(store.children(&node("listings")).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn children_come_back_ordered_by_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/categories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "b": {"name": "Cars"},
                "a": {"name": "Books"}
            })))
            .mount(&server)
            .await;

        let children = store_at(&server)
            .children(&node("categories"))
            .await
            .unwrap();
        let keys: Vec<&str> = children.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[actix_web::test]
    async fn push_returns_the_generated_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/listings.json"))
            .and(body_json(json!({"title": "Phone"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "-Nabc"})))
            .expect(1)
            .mount(&server)
            .await;

        let key = store_at(&server)
            .push(&node("listings"), json!({"title": "Phone"}))
            .await
            .unwrap();
        assert_eq!(key, "-Nabc");
    }

    #[actix_web::test]
    async fn set_and_remove_use_put_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(url_path("/categories/c1.json"))
            .and(body_json(json!({"name": "Cars"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Cars"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(url_path("/listings/l1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;
        let store = store_at(&server);

        store
            .set(&node("categories/c1"), json!({"name": "Cars"}))
            .await
            .unwrap();
        store.remove(&node("listings/l1")).await.unwrap();
    }

    #[actix_web::test]
    async fn sends_the_auth_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/categories.json"))
            .and(query_param("auth", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        let store =
            FirebaseStore::new(&server.uri(), Some("secret".into()), Duration::from_secs(5))
                .unwrap();
        assert!(store.children(&node("categories")).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn maps_rejected_credentials_to_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/categories.json"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized request."))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(url_path("/categories/c1.json"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
            .mount(&server)
            .await;
        let store = store_at(&server);

        assert_eq!(
            store.children(&node("categories")).await.unwrap_err(),
            StoreError::PermissionDenied("Unauthorized request.".into())
        );
        assert_eq!(
            store
                .set(&node("categories/c1"), json!({"name": "Cars"}))
                .await
                .unwrap_err(),
            StoreError::PermissionDenied("Permission denied".into())
        );
    }

    #[actix_web::test]
    async fn maps_other_failures_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(url_path("/listings/l1.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = store_at(&server)
            .remove(&node("listings/l1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Status {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[actix_web::test]
    async fn undecodable_bodies_are_serialization_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/categories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/listings.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "-Nabc"})))
            .mount(&server)
            .await;
        let store = store_at(&server);

        assert!(matches!(
            store.children(&node("categories")).await,
            Err(StoreError::Serialization(_))
        ));
        assert!(matches!(
            store.push(&node("listings"), json!({})).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[actix_web::test]
    async fn unreachable_host_is_a_transport_error() {
        let store =
            FirebaseStore::new("http://127.0.0.1:1", None, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            store.get(&node("categories")).await,
            Err(StoreError::Transport(_))
        ));
    }

    #[actix_web::test]
    async fn equality_query_uses_the_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/listings.json"))
            .and(query_param("orderBy", "\"categoryId\""))
            .and(query_param("equalTo", "\"c1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "l1": {"categoryId": "c1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let matches = store_at(&server)
            .query_equal(&node("listings"), "categoryId", &json!("c1"))
            .await
            .unwrap();
        assert_eq!(matches, vec![("l1".to_string(), json!({"categoryId": "c1"}))]);
    }

    #[actix_web::test]
    async fn equality_query_without_index_filters_the_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/listings.json"))
            .and(query_param("orderBy", "\"categoryId\""))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "Index not defined, add \".indexOn\": \"categoryId\", for path \"/listings\", to the rules"
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/listings.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "l1": {"categoryId": "c1"},
                "l2": {"categoryId": "c2"},
                "l3": {"categoryId": "c1"},
                "l4": {"title": "no category"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let matches = store_at(&server)
            .query_equal(&node("listings"), "categoryId", &json!("c1"))
            .await
            .unwrap();
        let keys: Vec<&str> = matches.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["l1", "l3"]);
    }

    #[actix_web::test]
    async fn other_bad_requests_are_not_retried_as_scans() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/listings.json"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid token in path"))
            .expect(1)
            .mount(&server)
            .await;

        let err = store_at(&server)
            .query_equal(&node("listings"), "categoryId", &json!("c1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Status {
                status: 400,
                body: "Invalid token in path".into()
            }
        );
    }
}
