//! The users controller and its in-memory store.

use ferrule::middleware::stages::{RateLimit, RequireHeader};
use ferrule::prelude::*;
use http::{HeaderName, StatusCode};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

// =============================================================================
// Types
// =============================================================================

/// A stored user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
struct UsersResponse {
    users: Vec<User>,
    total: usize,
}

// =============================================================================
// Store
// =============================================================================

/// Process-wide user storage.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl UserStore {
    /// Returns the shared store.
    pub fn global() -> &'static Self {
        static STORE: OnceLock<UserStore> = OnceLock::new();
        STORE.get_or_init(Self::default)
    }

    fn insert(&self, name: String, email: String) -> User {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let user = User {
            id,
            name,
            email,
            avatar: None,
        };
        self.users.write().insert(id, user.clone());
        user
    }

    fn get(&self, id: i64) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    fn update(&self, id: i64, f: impl FnOnce(&mut User)) -> Option<User> {
        let mut users = self.users.write();
        let user = users.get_mut(&id)?;
        f(user);
        Some(user.clone())
    }

    fn remove(&self, id: i64) -> Option<User> {
        self.users.write().remove(&id)
    }

    fn all(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }
}

fn user_not_found(id: i64) -> ActionError {
    HttpFault::not_found(format!("User {id} not found")).into()
}

// =============================================================================
// Controller
// =============================================================================

/// Users API.
#[derive(Default)]
pub struct UsersController;

impl UsersController {
    fn list(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        let users = UserStore::global().all();
        let total = users.len();
        Ok(Some(ActionResult::json(&UsersResponse { users, total })?))
    }

    fn find(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let id: i64 = args.take("id")?;
        let user = UserStore::global().get(id).ok_or_else(|| user_not_found(id))?;
        Ok(Some(ActionResult::json(&user)?))
    }

    fn create(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let request: CreateUserRequest = args
            .take_model("user")?
            .ok_or_else(|| HttpFault::bad_request("A user document is required"))?;
        if request.name.trim().is_empty() {
            return Err(HttpFault::bad_request("name must not be empty").into());
        }
        if !request.email.contains('@') {
            return Err(HttpFault::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("'{}' is not an email address", request.email),
            )
            .into());
        }

        let user = UserStore::global().insert(request.name, request.email);
        info!(user.id = user.id, "User created");
        Ok(Some(ActionResult::json(&user)?))
    }

    fn rename(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let id: i64 = args.take("id")?;
        let name: String = args.take("name")?;
        let user = UserStore::global()
            .update(id, |user| user.name = name)
            .ok_or_else(|| user_not_found(id))?;
        Ok(Some(ActionResult::text(format!("Renamed to {}", user.name))))
    }

    fn avatar(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let id: i64 = args.take("id")?;
        let avatar: FilePart = args.take("avatar")?;
        let file_name = avatar.file_name().unwrap_or("avatar").to_string();

        UserStore::global()
            .update(id, |user| user.avatar = Some(file_name.clone()))
            .ok_or_else(|| user_not_found(id))?;
        Ok(Some(ActionResult::Json(serde_json::json!({
            "id": id,
            "file": file_name,
            "size": avatar.data().len(),
        }))))
    }

    fn login(&mut self, ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let name: String = args.take("name")?;
        ctx.set_cookie("user", name);
        Ok(Some(ActionResult::redirect("/users")))
    }

    fn remove(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let id: i64 = args.take("id")?;
        let user = UserStore::global().remove(id).ok_or_else(|| user_not_found(id))?;
        info!(user.id = user.id, "User removed");
        Ok(Some(ActionResult::text(format!("Removed {}", user.name))))
    }
}

impl Controller for UsersController {
    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::action("list", Self::list).get("/users"),
            MethodDecl::action("find", Self::find)
                .get("/users/find")
                .param(ParameterSpec::int("id")),
            MethodDecl::action("create", Self::create)
                .post("/users")
                .consumes(SupportedContentType::Json)
                .param(ParameterSpec::model::<CreateUserRequest>("user").from_body()),
            MethodDecl::action("rename", Self::rename)
                .post("/users/rename")
                .consumes(SupportedContentType::FormUrlEncoded)
                .param(ParameterSpec::int("id"))
                .param(ParameterSpec::string("name")),
            MethodDecl::action("avatar", Self::avatar)
                .post("/users/avatar")
                .consumes(SupportedContentType::Multipart)
                .param(ParameterSpec::int("id"))
                .param(ParameterSpec::file("avatar")),
            MethodDecl::action("login", Self::login)
                .post("/login")
                .intercept(RateLimit::new(20, Duration::from_secs(60)))
                .param(ParameterSpec::string("name")),
            MethodDecl::action("remove", Self::remove)
                .post("/users/remove")
                .intercept(
                    RequireHeader::new(HeaderName::from_static("x-admin-token"))
                        .redirect_to("/login"),
                )
                .param(ParameterSpec::int("id")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_test::{MultipartForm, TestClient};
    use serde_json::json;

    fn client() -> TestClient {
        let registry = RegistryBuilder::new()
            .controller::<UsersController>()
            .build()
            .unwrap();
        TestClient::new(Dispatcher::new(registry))
    }

    async fn create(client: &TestClient, name: &str) -> User {
        client
            .post("/users")
            .json(&json!({"name": name, "email": format!("{name}@example.com")}))
            .send()
            .await
            .assert_status(StatusCode::OK)
            .json()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let client = client();
        let created = create(&client, "ada").await;

        let found: User = client
            .get("/users/find")
            .query("id", created.id)
            .send()
            .await
            .assert_status(StatusCode::OK)
            .json()
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_invalid_email_is_422() {
        client()
            .post("/users")
            .json(&json!({"name": "bob", "email": "nope"}))
            .send()
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
            .assert_body_contains("not an email address");
    }

    #[tokio::test]
    async fn test_missing_user_is_404() {
        client()
            .get("/users/find")
            .query("id", -1)
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_body_eq("User -1 not found");
    }

    #[tokio::test]
    async fn test_rename_with_form() {
        let client = client();
        let created = create(&client, "grace").await;

        client
            .post("/users/rename")
            .form(&[("id", created.id.to_string()), ("name", "Grace Hopper".to_string())])
            .send()
            .await
            .assert_body_eq("Renamed to Grace Hopper");
    }

    #[tokio::test]
    async fn test_avatar_upload() {
        let client = client();
        let created = create(&client, "linus").await;

        client
            .post("/users/avatar")
            .multipart(
                MultipartForm::new()
                    .text("id", created.id.to_string())
                    .file("avatar", "penguin.png", "image/png", vec![0_u8; 16]),
            )
            .send()
            .await
            .assert_json_eq(&json!({"id": created.id, "file": "penguin.png", "size": 16}));
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects() {
        let response = client()
            .post("/login")
            .form(&[("name", "ada")])
            .send()
            .await;

        response.assert_redirect("/users");
        assert_eq!(response.cookie("user"), Some("ada"));
    }

    #[tokio::test]
    async fn test_remove_requires_admin_token() {
        let client = client();
        let created = create(&client, "mallory").await;

        client
            .post("/users/remove")
            .query("id", created.id)
            .send()
            .await
            .assert_redirect("/login");

        client
            .post("/users/remove")
            .query("id", created.id)
            .header("x-admin-token", "secret")
            .send()
            .await
            .assert_body_eq("Removed mallory");
    }
}
