//! Wiring a dispatcher from configuration.

use ferrule::config::{BindingSettings, ServerSettings};
use ferrule::prelude::*;
use ferrule_test::{MultipartForm, TestClient};
use http::StatusCode;

#[derive(Default)]
struct AvatarController;

impl AvatarController {
    fn upload(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
        let avatar: FilePart = args.take("avatar")?;
        Ok(Some(ActionResult::text(format!("{} bytes", avatar.data().len()))))
    }
}

impl Controller for AvatarController {
    fn methods() -> Vec<MethodDecl<Self>> {
        vec![MethodDecl::action("upload", Self::upload)
            .post("/avatar")
            .consumes(SupportedContentType::Multipart)
            .param(ParameterSpec::file("avatar"))]
    }
}

fn registry() -> ferrule::router::ActionRegistry {
    RegistryBuilder::new()
        .controller::<AvatarController>()
        .build()
        .unwrap()
}

fn config(fallback: bool) -> FerruleConfig {
    FerruleConfig::builder()
        .server(ServerSettings {
            server_name: "Gallery".to_string(),
            ..ServerSettings::default()
        })
        .binding(BindingSettings {
            sole_file_part_fallback: fallback,
        })
        .build()
}

fn upload_form() -> MultipartForm {
    MultipartForm::new().file("picture", "me.png", "image/png", vec![1_u8, 2, 3, 4])
}

#[tokio::test]
async fn server_name_comes_from_config() {
    let dispatcher = ferrule::dispatcher_from_config(registry(), &config(false), Hooks::default())
        .unwrap();
    let client = TestClient::new(dispatcher);

    client
        .get("/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_header("server", "Gallery");
}

#[tokio::test]
async fn binding_section_enables_sole_file_fallback() {
    let lenient = TestClient::new(
        ferrule::dispatcher_from_config(registry(), &config(true), Hooks::default()).unwrap(),
    );
    lenient
        .post("/avatar")
        .multipart(upload_form())
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_body_eq("4 bytes");

    let strict = TestClient::new(
        ferrule::dispatcher_from_config(registry(), &config(false), Hooks::default()).unwrap(),
    );
    strict
        .post("/avatar")
        .multipart(upload_form())
        .send()
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn server_from_config_uses_server_section() {
    let mut config = config(false);
    config.server.max_body_bytes = 2048;

    let server = ferrule::server_from_config(registry(), &config, Hooks::default()).unwrap();
    assert_eq!(server.config().max_body_bytes(), 2048);
    assert_eq!(server.dispatcher().registry().len(), 1);
}
