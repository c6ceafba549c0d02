//! End-to-end dispatch through routing, binding, invocation and rendering.

use bytes::Bytes;
use ferrule_core::{
    ActionContext, ActionResult, ActionReturn, ConnectionInfo, FilePart, HttpFault,
    IncomingRequest, MultipartBody, RequestBody,
};
use ferrule_extract::{Arguments, BinderOptions, ParameterSpec, SupportedContentType};
use ferrule_middleware::stages::RequireHeader;
use ferrule_router::{Controller, MethodDecl, RegistryBuilder};
use ferrule_server::{Dispatcher, Hooks, WireResponse};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// =============================================================================
// Controllers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NewUser {
    name: String,
    email: String,
    tags: Vec<String>,
}

#[derive(Default)]
struct UsersController;

impl UsersController {
    fn get_user(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let id: i64 = args.take("id")?;
        Ok(Some(ActionResult::Json(
            json!({ "id": id, "name": format!("user-{id}") }),
        )))
    }

    fn create_user(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let user: Option<NewUser> = args.take_model("user")?;
        match user {
            Some(user) => Ok(Some(ActionResult::json(&user)?)),
            None => Err(HttpFault::bad_request("a user is required").into()),
        }
    }

    fn login(&mut self, ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let name: String = args.take("name")?;
        ctx.set_cookie("session", format!("s-{name}"));
        ctx.set_cookie("theme", "dark");
        Ok(Some(ActionResult::redirect("/home")))
    }

    fn whoami(&mut self, ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        let session = ctx
            .request_cookie("session")
            .unwrap_or_else(|| "anonymous".to_string());
        Ok(Some(ActionResult::text(session)))
    }

    fn conflict(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Err(HttpFault::new(StatusCode::CONFLICT, "user already exists").into())
    }

    fn crash(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Err(ferrule_core::ActionError::unhandled(anyhow::anyhow!(
            "connection refused: db.internal:5432"
        )))
    }

    fn explode(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        panic!("index out of range");
    }

    fn nothing(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Ok(None)
    }

    fn admin(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Ok(Some(ActionResult::text("admin panel")))
    }

    fn greet(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Ok(Some(ActionResult::Json(json!({ "greeting": "Grüße, 世界 😀" }))))
    }
}

impl Controller for UsersController {
    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::action("get_user", Self::get_user)
                .get("/users")
                .param(ParameterSpec::int("id")),
            MethodDecl::action("create_user", Self::create_user)
                .post("/users")
                .consumes(SupportedContentType::Json)
                .param(ParameterSpec::model::<NewUser>("user")),
            MethodDecl::action("login", Self::login)
                .post("/login")
                .param(ParameterSpec::string("name")),
            MethodDecl::action("whoami", Self::whoami).get("/whoami"),
            MethodDecl::action("conflict", Self::conflict).post("/conflict"),
            MethodDecl::action("crash", Self::crash).get("/crash"),
            MethodDecl::action("explode", Self::explode).get("/explode"),
            MethodDecl::action("nothing", Self::nothing).get("/nothing"),
            MethodDecl::action("admin", Self::admin)
                .get("/admin")
                .intercept(
                    RequireHeader::new(HeaderName::from_static("x-api-key"))
                        .redirect_to("/login"),
                ),
            MethodDecl::action("greet", Self::greet).get("/greet"),
        ]
    }
}

#[derive(Default)]
struct FilesController;

impl FilesController {
    fn upload(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let file: FilePart = args.take("file")?;
        Ok(Some(ActionResult::Json(json!({
            "name": file.name(),
            "file_name": file.file_name(),
            "size": file.data().len(),
            "text": file.text(),
        }))))
    }

    fn upload_many(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let files: Vec<FilePart> = args.take("files")?;
        let names: Vec<&str> = files.iter().map(FilePart::name).collect();
        Ok(Some(ActionResult::text(names.join(","))))
    }

    fn upload_bytes(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let data: Vec<u8> = args.take("document")?;
        Ok(Some(ActionResult::text(format!("{} bytes", data.len()))))
    }

    fn echo(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let data: Bytes = args.take("payload")?;
        Ok(Some(ActionResult::text(String::from_utf8_lossy(&data))))
    }
}

impl Controller for FilesController {
    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::action("upload", Self::upload)
                .post("/upload")
                .consumes(SupportedContentType::Multipart)
                .param(ParameterSpec::file("file")),
            MethodDecl::action("upload_many", Self::upload_many)
                .post("/upload/many")
                .param(ParameterSpec::files("files")),
            MethodDecl::action("upload_bytes", Self::upload_bytes)
                .post("/upload/bytes")
                .param(ParameterSpec::bytes("document")),
            MethodDecl::action("echo", Self::echo)
                .post("/echo")
                .param(ParameterSpec::bytes("payload")),
        ]
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn registry() -> ferrule_router::ActionRegistry {
    RegistryBuilder::new()
        .controller::<UsersController>()
        .controller::<FilesController>()
        .build()
        .unwrap()
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(registry())
}

fn send(dispatcher: &Dispatcher, request: &IncomingRequest) -> WireResponse {
    dispatcher.dispatch(request, &ConnectionInfo::default())
}

fn with_type(request: IncomingRequest, content_type: &'static str) -> IncomingRequest {
    request.with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
}

fn json_post(path: &str, body: &str) -> IncomingRequest {
    with_type(IncomingRequest::new(Method::POST, path), "application/json")
        .with_body(RequestBody::Raw(Bytes::copy_from_slice(body.as_bytes())))
}

fn multipart_post(path: &str, parts: MultipartBody) -> IncomingRequest {
    with_type(
        IncomingRequest::new(Method::POST, path),
        "multipart/form-data; boundary=XyZ",
    )
    .with_body(RequestBody::Multipart(parts))
}

fn body_json(response: &WireResponse) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn get_with_query_returns_json() {
    let request = IncomingRequest::new(Method::GET, "/users").with_query_string("id=5");
    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.header("server"), Some("Ferrule"));
    assert_eq!(body_json(&response), json!({"id": 5, "name": "user-5"}));
}

#[test]
fn multipart_file_reaches_the_action_intact() {
    let part = FilePart::new("file", "hello, upload")
        .with_file_name("note.txt")
        .with_content_type("text/plain");
    let request = multipart_post("/upload", MultipartBody::new().with_file(part));

    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(&response),
        json!({
            "name": "file",
            "file_name": "note.txt",
            "size": 13,
            "text": "hello, upload",
        })
    );
}

#[test]
fn unsupported_content_type_binds_raw_bytes() {
    let request = with_type(IncomingRequest::new(Method::POST, "/echo"), "text/csv")
        .with_body(RequestBody::Raw(Bytes::from_static(b"a,b\n1,2\n")));

    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "a,b\n1,2\n");
}

// =============================================================================
// Routing and negotiation
// =============================================================================

#[test]
fn unknown_route_is_404_with_or_without_body() {
    let dispatcher = dispatcher();

    let bare = IncomingRequest::new(Method::GET, "/nowhere");
    let response = send(&dispatcher, &bare);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Action or content GET /nowhere not found");

    let with_body = json_post("/nowhere", "{}");
    assert_eq!(send(&dispatcher, &with_body).status(), StatusCode::NOT_FOUND);

    let wrong_verb = IncomingRequest::new(Method::DELETE, "/users");
    assert_eq!(send(&dispatcher, &wrong_verb).status(), StatusCode::NOT_FOUND);
}

#[test]
fn body_without_content_type_is_415() {
    let request = IncomingRequest::new(Method::POST, "/echo")
        .with_body(RequestBody::Raw(Bytes::from_static(b"data")));

    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(!response.text().is_empty());
}

#[test]
fn declared_content_type_is_a_prefix_match() {
    let dispatcher = dispatcher();
    let body = r#"{"name":"Ada","email":"ada@example.com","tags":[]}"#;

    let accepted = with_type(
        IncomingRequest::new(Method::POST, "/users"),
        "application/json; charset=utf-8",
    )
    .with_body(RequestBody::Raw(Bytes::copy_from_slice(body.as_bytes())));
    assert_eq!(send(&dispatcher, &accepted).status(), StatusCode::OK);

    let rejected = with_type(IncomingRequest::new(Method::POST, "/users"), "text/plain")
        .with_body(RequestBody::Raw(Bytes::copy_from_slice(body.as_bytes())));
    assert_eq!(
        send(&dispatcher, &rejected).status(),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    );
}

// =============================================================================
// Binding
// =============================================================================

#[test]
fn json_model_round_trips() {
    let user = NewUser {
        name: "Zoë Ångström".to_string(),
        email: "zoe@example.com".to_string(),
        tags: vec!["admin".to_string(), "ops".to_string()],
    };
    let request = json_post("/users", &serde_json::to_string(&user).unwrap());

    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::OK);
    let echoed: NewUser = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(echoed, user);
}

#[test]
fn malformed_json_is_400_with_diagnostic() {
    let response = send(&dispatcher(), &json_post("/users", r#"{"name": "Ada""#));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!response.text().is_empty());
}

#[test]
fn unconvertible_query_value_is_400() {
    let request = IncomingRequest::new(Method::GET, "/users").with_query_string("id=five");
    assert_eq!(send(&dispatcher(), &request).status(), StatusCode::BAD_REQUEST);
}

#[test]
fn query_names_are_case_insensitive() {
    let request = IncomingRequest::new(Method::GET, "/users").with_query_string("ID=9");
    let response = send(&dispatcher(), &request);
    assert_eq!(body_json(&response)["id"], json!(9));
}

#[test]
fn form_body_overwrites_query_value() {
    let request = with_type(
        IncomingRequest::new(Method::POST, "/login").with_query_string("name=query"),
        "application/x-www-form-urlencoded",
    )
    .with_body(RequestBody::Form(vec![(
        "name".to_string(),
        "form".to_string(),
    )]));

    let response = send(&dispatcher(), &request);

    assert_eq!(response.header("set-cookie"), Some("session=s-form"));
}

#[test]
fn file_collection_gets_the_single_part() {
    let parts = MultipartBody::new().with_file(FilePart::new("files", "x").with_file_name("a.bin"));
    let response = send(&dispatcher(), &multipart_post("/upload/many", parts));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "files");
}

#[test]
fn bytes_parameter_gets_the_named_part() {
    let parts = MultipartBody::new()
        .with_file(FilePart::new("document", vec![0_u8, 1, 2, 3]).with_file_name("d.bin"));
    let response = send(&dispatcher(), &multipart_post("/upload/bytes", parts));

    assert_eq!(response.text(), "4 bytes");
}

#[test]
fn sole_file_part_fallback_is_opt_in() {
    let parts =
        || MultipartBody::new().with_file(FilePart::new("upload", "abc").with_file_name("a.txt"));

    let strict = dispatcher();
    let response = send(&strict, &multipart_post("/upload/bytes", parts()));
    assert_eq!(response.text(), "0 bytes");

    let lenient = Dispatcher::builder(registry())
        .binder_options(BinderOptions {
            sole_file_part_fallback: true,
        })
        .build()
        .unwrap();
    let response = send(&lenient, &multipart_post("/upload/bytes", parts()));
    assert_eq!(response.text(), "3 bytes");
}

// =============================================================================
// Results
// =============================================================================

#[test]
fn redirect_is_302_with_cookies() {
    let request = IncomingRequest::new(Method::POST, "/login").with_query_string("name=ada");
    let response = send(&dispatcher(), &request);

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.header("location"), Some("/home"));
    assert!(response.body().is_empty());

    let cookies: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(cookies, vec!["session=s-ada", "theme=dark"]);
}

#[test]
fn request_cookies_are_readable() {
    let request = IncomingRequest::new(Method::GET, "/whoami")
        .with_header(COOKIE, HeaderValue::from_static("theme=dark; session=s-42"));
    assert_eq!(send(&dispatcher(), &request).text(), "s-42");
}

#[test]
fn json_output_is_ascii() {
    let response = send(&dispatcher(), &IncomingRequest::new(Method::GET, "/greet"));

    assert!(response.body().is_ascii());
    assert_eq!(
        body_json(&response),
        json!({ "greeting": "Grüße, 世界 😀" })
    );
}

// =============================================================================
// Interceptors
// =============================================================================

#[test]
fn interceptor_short_circuits_before_binding() {
    let dispatcher = dispatcher();

    let blocked = send(&dispatcher, &IncomingRequest::new(Method::GET, "/admin"));
    assert_eq!(blocked.status(), StatusCode::FOUND);
    assert_eq!(blocked.header("location"), Some("/login"));

    let allowed = IncomingRequest::new(Method::GET, "/admin")
        .with_header("x-api-key", HeaderValue::from_static("k"));
    let response = send(&dispatcher, &allowed);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "admin panel");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn action_fault_keeps_its_status() {
    let response = send(&dispatcher(), &IncomingRequest::new(Method::POST, "/conflict"));

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.text(), "user already exists");
}

#[test]
fn unhandled_failures_are_hidden_from_the_client() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let dispatcher = Dispatcher::builder(registry())
        .hooks(Hooks::new().on_exception(move |err| sink.lock().unwrap().push(err.to_string())))
        .build()
        .unwrap();

    for path in ["/crash", "/explode", "/nothing"] {
        let response = send(&dispatcher, &IncomingRequest::new(Method::GET, path));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(response.text(), "Something went wrong");
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[0].contains("db.internal"));
    assert!(seen[1].contains("index out of range"));
    assert!(seen[2].contains("returned no result"));
}

#[test]
fn hooks_observe_every_dispatch() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (start, end, sent) = (
        Arc::clone(&events),
        Arc::clone(&events),
        Arc::clone(&events),
    );
    let hooks = Hooks::new()
        .on_request_start(move |req, _| start.lock().unwrap().push(format!("start {}", req.path())))
        .on_request_end(move |_, res, _| end.lock().unwrap().push(format!("end {}", res.status().as_u16())))
        .on_send(move |res| sent.lock().unwrap().push(format!("send {}", res.status().as_u16())))
        .on_http_error(|req, message| {
            ActionResult::Json(json!({ "path": req.path(), "error": message }))
        });
    let dispatcher = Dispatcher::builder(registry())
        .hooks(hooks)
        .server_name("Users/1.0")
        .build()
        .unwrap();

    let response = send(&dispatcher, &IncomingRequest::new(Method::GET, "/missing"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.header("server"), Some("Users/1.0"));
    assert_eq!(
        body_json(&response),
        json!({ "path": "/missing", "error": "Action or content GET /missing not found" })
    );
    assert_eq!(
        *events.lock().unwrap(),
        vec!["start /missing", "send 404", "end 404"]
    );
}
