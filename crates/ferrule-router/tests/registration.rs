//! Registry validation and lookup.

use ferrule_core::{
    ActionContext, ActionResult, ActionReturn, ConnectionInfo, IncomingRequest, RequestId,
};
use ferrule_extract::{Arguments, ParameterSpec, SupportedContentType};
use ferrule_middleware::FnInterceptor;
use ferrule_router::{Controller, MethodDecl, RegistrationFault, RegistryBuilder, Visibility};
use http::Method;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct UsersController {
    calls: u32,
}

impl UsersController {
    fn list(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        self.calls += 1;
        Ok(Some(ActionResult::text(format!("calls={}", self.calls))))
    }

    fn create(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
        Ok(Some(ActionResult::text("created")))
    }
}

impl Controller for UsersController {
    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::action("list", Self::list)
                .get("/users")
                .param(ParameterSpec::int("page").with_default(1)),
            MethodDecl::action("create", Self::create)
                .post("/users")
                .consumes(SupportedContentType::Json)
                .intercept(FnInterceptor::new("noop", |_| None)),
            MethodDecl::helper("normalize_email"),
        ]
    }
}

macro_rules! faulty_controller {
    ($name:ident, $decl:expr) => {
        #[derive(Default)]
        struct $name;

        impl Controller for $name {
            fn methods() -> Vec<MethodDecl<Self>> {
                vec![$decl]
            }
        }
    };
}

fn ok<C>(_: &mut C, _: &mut ActionContext<'_>, _: Arguments) -> ActionReturn {
    Ok(Some(ActionResult::text("ok")))
}

faulty_controller!(
    RoutedHelperController,
    MethodDecl::helper("export").get("/export")
);
faulty_controller!(
    UnroutedActionController,
    MethodDecl::action("orphan", ok::<UnroutedActionController>)
);
faulty_controller!(
    PrivateActionController,
    MethodDecl::action("secret", ok::<PrivateActionController>)
        .get("/secret")
        .private()
);
faulty_controller!(
    DuplicateUsersController,
    MethodDecl::action("list_again", ok::<DuplicateUsersController>).get("/users")
);

// =============================================================================
// Classification
// =============================================================================

#[test]
fn valid_controller_registers_routed_actions_only() {
    let registry = RegistryBuilder::new()
        .controller::<UsersController>()
        .build()
        .unwrap();

    assert_eq!(registry.len(), 2);
    let routes: Vec<String> = registry.routes().map(ToString::to_string).collect();
    assert_eq!(routes, vec!["GET /users", "POST /users"]);

    let create = registry.find(&Method::POST, "/users").unwrap();
    assert_eq!(create.qualified_name(), "UsersController::create");
    assert_eq!(create.content_type(), Some(SupportedContentType::Json));
    assert_eq!(create.interceptors().len(), 1);

    let list = registry.find(&Method::GET, "/users").unwrap();
    assert_eq!(list.params().len(), 1);
    assert_eq!(list.verb(), &Method::GET);
    assert_eq!(list.path(), "/users");
}

#[test]
fn routed_method_without_action_result_is_rejected() {
    let err = RegistryBuilder::new()
        .controller::<RoutedHelperController>()
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationFault::RouteWithoutActionResult {
            controller: "RoutedHelperController".into(),
            method: "export".into(),
        }
    );
}

#[test]
fn action_result_without_route_is_rejected() {
    let err = RegistryBuilder::new()
        .controller::<UnroutedActionController>()
        .build()
        .unwrap_err();

    assert!(matches!(err, RegistrationFault::ActionResultWithoutRoute { .. }));
    assert!(err.to_string().contains("orphan"));
    assert!(err.to_string().contains("UnroutedActionController"));
}

#[test]
fn private_routed_action_is_rejected() {
    let err = RegistryBuilder::new()
        .controller::<UsersController>()
        .controller::<PrivateActionController>()
        .build()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Action secret in controller PrivateActionController is not public"
    );
}

#[test]
fn duplicate_route_is_rejected() {
    let err = RegistryBuilder::new()
        .controller::<UsersController>()
        .controller::<DuplicateUsersController>()
        .build()
        .unwrap_err();

    match err {
        RegistrationFault::DuplicateRoute {
            route, existing, ..
        } => {
            assert_eq!(route, "GET /users");
            assert_eq!(existing, "UsersController::list");
        }
        other => panic!("unexpected fault: {other}"),
    }
}

#[test]
fn declarations_expose_their_shape() {
    let decls = UsersController::methods();
    assert!(decls[0].returns_action_result());
    assert_eq!(decls[0].visibility(), Visibility::Public);
    assert_eq!(decls[0].route_decl().map(ToString::to_string).as_deref(), Some("GET /users"));
    assert!(!decls[2].returns_action_result());
    assert!(decls[2].route_decl().is_none());
}

// =============================================================================
// Lookup and invocation
// =============================================================================

#[test]
fn lookup_is_exact() {
    let registry = RegistryBuilder::new()
        .controller::<UsersController>()
        .build()
        .unwrap();

    assert!(registry.find(&Method::GET, "/users/").is_none());
    assert!(registry.find(&Method::GET, "/Users").is_none());
    assert!(registry.find(&Method::PUT, "/users").is_none());
    assert!(registry.find(&Method::GET, "/users").is_some());
}

#[test]
fn every_invocation_gets_a_fresh_controller() {
    let registry = RegistryBuilder::new()
        .controller::<UsersController>()
        .build()
        .unwrap();
    let action = registry.find(&Method::GET, "/users").unwrap();

    let request = IncomingRequest::new(Method::GET, "/users");
    let connection = ConnectionInfo::default();
    for _ in 0..3 {
        let mut ctx = ActionContext::new(RequestId::new(), &request, &connection);
        let result = action.invoke(&mut ctx, Arguments::new()).unwrap();
        assert_eq!(result, Some(ActionResult::text("calls=1")));
    }
}

#[test]
fn empty_registry() {
    let registry = RegistryBuilder::new().build().unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.iter().count(), 0);
}
