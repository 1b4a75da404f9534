use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sweetshop_auth::{JwtClaims, PrincipalId, Role};
use sweetshop_infra::AppConfig;

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        sweetshop_observability::init_for_tests();

        // Same router as prod, in-memory store, ephemeral port.
        let app = sweetshop_api::app::build_app(AppConfig::in_memory(SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_sweet(&self, token: &str, name: &str, price: i64, quantity: i64) -> Value {
        let res = self
            .client
            .post(self.url("/sweets"))
            .bearer_auth(token)
            .json(&json!({
                "name": name,
                "category": "sweets",
                "price": price,
                "quantity": quantity,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt_for(sub: PrincipalId, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn mint_jwt(roles: Vec<Role>) -> String {
    mint_jwt_for(PrincipalId::new(), roles)
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.client.get(srv.url("/purchases")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/whoami"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lapsed_token_still_browses_the_catalog() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    let created = srv.create_sweet(&admin, "Kaju Katli", 600, 4).await;
    let id = created["id"].as_str().unwrap();

    let issued = Utc::now() - ChronoDuration::hours(2);
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &JwtClaims {
            sub: PrincipalId::new(),
            roles: vec![Role::customer()],
            issued_at: issued,
            expires_at: issued + ChronoDuration::minutes(10),
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    for path in ["/health".to_string(), "/sweets".to_string(), format!("/sweets/{id}")] {
        let res = srv
            .client
            .get(srv.url(&path))
            .bearer_auth(&expired)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }

    // Identity-bound routes still refuse it.
    let res = srv
        .client
        .post(srv.url(&format!("/sweets/{id}/purchase")))
        .bearer_auth(&expired)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let sub = PrincipalId::new();
    let token = mint_jwt_for(sub, vec![Role::admin()]);

    let res = srv
        .client
        .get(srv.url("/whoami"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["principal_id"].as_str().unwrap(), sub.to_string());
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn customers_cannot_manage_the_catalog() {
    let srv = TestServer::spawn().await;
    let customer = mint_jwt(vec![]);

    let res = srv
        .client
        .post(srv.url("/sweets"))
        .bearer_auth(&customer)
        .json(&json!({ "name": "Jalebi", "category": "sweets", "price": 250, "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = mint_jwt(vec![Role::admin()]);
    let created = srv.create_sweet(&admin, "Jalebi", 250, 5).await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url(&format!("/sweets/{id}/restock")))
        .bearer_auth(&customer)
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn purchase_then_restock_lifecycle() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    let customer = mint_jwt(vec![Role::customer()]);

    let created = srv.create_sweet(&admin, "Ajmeera Kalakandh", 450, 10).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["quantity"], 10);

    // Buy 3 of 10.
    let res = srv
        .client
        .post(srv.url(&format!("/sweets/{id}/purchase")))
        .bearer_auth(&customer)
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let purchase: Value = res.json().await.unwrap();
    assert_eq!(purchase["quantity"], 3);
    assert_eq!(purchase["total_price"], "1350");
    assert_eq!(purchase["sweet"]["quantity"], 7);

    // Asking for more than is left fails and reports what is available.
    let res = srv
        .client
        .post(srv.url("/purchases"))
        .bearer_auth(&customer)
        .json(&json!({ "sweet_id": id, "quantity": 8 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_stock");
    assert_eq!(err["available"], 7);

    // Restock and read back publicly.
    let res = srv
        .client
        .post(srv.url(&format!("/sweets/{id}/restock")))
        .bearer_auth(&admin)
        .json(&json!({ "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let item: Value = srv
        .client
        .get(srv.url(&format!("/sweets/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"], 17);

    // History shows the single successful purchase with its sweet.
    let res = srv
        .client
        .get(srv.url("/purchases"))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history: Value = res.json().await.unwrap();
    let items = history["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["sweet"]["name"], "Ajmeera Kalakandh");
}

#[tokio::test]
async fn invalid_quantities_are_validation_errors() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    let created = srv.create_sweet(&admin, "Kalakand", 380, 5).await;
    let id = created["id"].as_str().unwrap();

    for path in ["purchase", "restock"] {
        let res = srv
            .client
            .post(srv.url(&format!("/sweets/{id}/{path}")))
            .bearer_auth(&admin)
            .json(&json!({ "quantity": 0 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        let err: Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error");
    }
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/sweets/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::now_v7();
    let res = srv
        .client
        .get(srv.url(&format!("/sweets/{missing}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let admin = mint_jwt(vec![Role::admin()]);
    let res = srv
        .client
        .delete(srv.url(&format!("/sweets/{missing}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deleted"], false);
}

#[tokio::test]
async fn listing_filters_and_orders_newest_first() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);

    let res = srv
        .client
        .post(srv.url("/sweets/seed"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let seeded: Value = res.json().await.unwrap();
    assert_eq!(seeded["seeded"], 21);

    let all: Value = srv
        .client
        .get(srv.url("/sweets?category=all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["items"].as_array().unwrap().len(), 21);

    let res = srv
        .client
        .get(srv.url("/sweets?search=LADOO&minPrice=300&maxPrice=500"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let mut names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Basen Ladoo", "Gond Ke Ladoo"]);

    // Unknown categories are not an error, they just match nothing.
    let res = srv
        .client
        .get(srv.url("/sweets?category=cakes"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    srv.create_sweet(&admin, "Til Patti", 200, 20).await;

    let res = srv
        .client
        .post(srv.url("/sweets"))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Til Patti", "category": "snacks", "price": 10, "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn purchases_are_private_to_their_buyer() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    let alice = mint_jwt(vec![]);
    let bob = mint_jwt(vec![]);

    let created = srv.create_sweet(&admin, "Rasmalai", 450, 12).await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url("/purchases"))
        .bearer_auth(&alice)
        .json(&json!({ "sweet_id": id, "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let purchase: Value = res.json().await.unwrap();
    let purchase_id = purchase["id"].as_str().unwrap();

    let res = srv
        .client
        .get(srv.url(&format!("/purchases/{purchase_id}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .get(srv.url(&format!("/purchases/{purchase_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::admin()]);
    let created = srv.create_sweet(&admin, "Shahi Tukra", 380, 10).await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/sweets/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "price": 400 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["price"], "400");
    assert_eq!(updated["name"], "Shahi Tukra");
    assert_eq!(updated["quantity"], 10);

    let res = srv
        .client
        .put(srv.url(&format!("/sweets/{id}")))
        .bearer_auth(&admin)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
