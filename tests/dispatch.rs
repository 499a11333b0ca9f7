//! End-to-end routing behavior through the public API.

use std::sync::Arc;
use std::thread;

use axum::http::Method;
use route_engine::routing::{GroupAttributes, Route, RouteError, RouteLookup, Router};

mod common;
use common::{request, router_from_toml};

#[test]
fn test_static_template_matches_only_itself() {
    let mut router = Router::new();
    router.get("about/team", "about");

    assert!(router.dispatch(&request(Method::GET, "/about/team")).unwrap().matched().is_some());
    for path in ["/about", "/about/team/extra", "/about/teams", "/xabout/team"] {
        let lookup = router.dispatch(&request(Method::GET, path)).unwrap();
        assert!(lookup.is_not_found(), "{path}");
    }
}

#[test]
fn test_required_parameter() {
    let mut router = Router::new();
    router.get("/users/{id}", "users.show");

    let bound = router
        .dispatch(&request(Method::GET, "/users/42"))
        .unwrap()
        .matched()
        .unwrap();
    assert_eq!(bound.parameter("id"), Some("42"));

    // The trailing slash is trimmed, leaving no id.
    assert!(router.dispatch(&request(Method::GET, "/users/")).unwrap().is_not_found());
}

#[test]
fn test_optional_parameter_with_default() {
    let mut router = Router::new();
    router.get("/users/{id?}", "users").default("id", "");

    let bound = router.dispatch(&request(Method::GET, "/users")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("id"), Some(""));

    let bound = router.dispatch(&request(Method::GET, "/users/42")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("id"), Some("42"));
}

#[test]
fn test_explicit_default_makes_trailing_parameter_optional() {
    let mut router = Router::new();
    router.get("users/{id}", "users.show").default("id", "5");

    let bound = router.dispatch(&request(Method::GET, "/users")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("id"), Some("5"));

    let bound = router.dispatch(&request(Method::GET, "/users/8")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("id"), Some("8"));
}

#[test]
fn test_default_on_inner_parameter_keeps_it_required() {
    let mut router = Router::new();
    router
        .get("teams/{team}/members/{member}", "members.show")
        .default("team", "core");

    assert!(router.dispatch(&request(Method::GET, "/teams/members/4")).unwrap().is_not_found());
    let bound = router
        .dispatch(&request(Method::GET, "/teams/infra/members/4"))
        .unwrap()
        .matched()
        .unwrap();
    assert_eq!(bound.parameter("team"), Some("infra"));
}

#[test]
fn test_method_not_allowed_lists_head() {
    let mut router = Router::new();
    router.get("/widgets", "widgets");

    match router.dispatch(&request(Method::POST, "/widgets")).unwrap() {
        RouteLookup::MethodNotAllowed { allowed } => {
            assert_eq!(allowed.methods(), &[Method::GET, Method::HEAD]);
        }
        other => panic!("expected 405, got {other:?}"),
    }
}

#[test]
fn test_unknown_path_is_not_found_for_every_verb() {
    let mut router = Router::new();
    router.get("/widgets", "widgets");
    router.post("/widgets", "widgets.store");

    for method in route_engine::routing::VERBS {
        let lookup = router.dispatch(&request(method.clone(), "/gizmos")).unwrap();
        assert!(lookup.is_not_found(), "{method}");
    }
}

#[test]
fn test_requirement_filters_values() {
    let mut router = Router::new();
    router.get("/users/{id}", "users.show").where_("id", r"\d+");

    assert!(router.dispatch(&request(Method::GET, "/users/abc")).unwrap().is_not_found());
    let bound = router.dispatch(&request(Method::GET, "/users/7")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("id"), Some("7"));
}

#[test]
fn test_duplicate_variable_rejected() {
    let route = Route::new(["GET"], "/a/{x}/{x}");
    assert!(matches!(
        route.compile(),
        Err(RouteError::DuplicateVariable { ref name, .. }) if name == "x"
    ));
}

#[test]
fn test_group_prefixes_merge() {
    let mut router = Router::new();
    router.group(GroupAttributes::new().prefix("/api"), |router| {
        router.group(GroupAttributes::new().prefix("v1"), |router| {
            router.get("/users", "users.index");
        });
    });

    assert_eq!(router.routes().routes()[0].uri(), "api/v1/users");
    assert!(router
        .dispatch(&request(Method::GET, "/api/v1/users"))
        .unwrap()
        .matched()
        .is_some());
}

#[test]
fn test_recompile_after_requirement_change() {
    let mut route = Route::new(["GET"], "/users/{id}");
    let first = route.compile().unwrap();
    let again = route.compile().unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    route.where_("id", "[a-z]+");
    let changed = route.compile().unwrap();
    assert_ne!(first.regex().as_str(), changed.regex().as_str());
    assert!(changed.regex().is_match("/users/abc"));
    assert!(!changed.regex().is_match("/users/123"));
}

#[test]
fn test_options_request_gets_allowed_verbs() {
    let mut router = Router::new();
    router.get("/items", "items.index");
    router.post("/items", "items.store");

    match router.dispatch(&request(Method::OPTIONS, "/items")).unwrap() {
        RouteLookup::Options { allowed } => assert_eq!(allowed.header_value(), "GET, HEAD, POST"),
        other => panic!("expected options, got {other:?}"),
    }
}

#[test]
fn test_host_routes() {
    let mut router = Router::new();
    router.group(GroupAttributes::new().domain("{account}.example.com"), |router| {
        router.get("/dashboard", "tenant.dashboard");
    });
    router.get("/dashboard", "dashboard");

    let tenant = request(Method::GET, "/dashboard").with_host("Acme.Example.com");
    let bound = router.dispatch(&tenant).unwrap().matched().unwrap();
    assert_eq!(bound.route().action(), Some("tenant.dashboard"));
    assert_eq!(bound.parameter("account"), Some("acme"));

    let other = request(Method::GET, "/dashboard").with_host("localhost");
    let bound = router.dispatch(&other).unwrap().matched().unwrap();
    assert_eq!(bound.route().action(), Some("dashboard"));
}

#[test]
fn test_optional_suffix_chain() {
    let mut router = Router::new();
    router.get("/archive/{year?}/{month?}", "archive");

    let bound = router.dispatch(&request(Method::GET, "/archive")).unwrap().matched().unwrap();
    assert_eq!(bound.parameter("year"), Some(""));
    assert_eq!(bound.parameter("month"), Some(""));

    let bound = router
        .dispatch(&request(Method::GET, "/archive/2024/05"))
        .unwrap()
        .matched()
        .unwrap();
    assert_eq!(bound.parameter("year"), Some("2024"));
    assert_eq!(bound.parameter("month"), Some("05"));
}

#[test]
fn test_concurrent_dispatch_compiles_once() {
    let mut router = Router::new();
    for i in 0..50 {
        router.get(&format!("/section{i}/{{page}}"), &format!("section{i}"));
    }
    assert!(router.routes().routes().iter().all(|r| !r.is_compiled()));

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for i in 0..50 {
                    let path = format!("/section{i}/3");
                    let bound = router
                        .dispatch(&request(Method::GET, &path))
                        .unwrap()
                        .matched()
                        .unwrap();
                    assert_eq!(bound.parameter("page"), Some("3"));
                }
            });
        }
    });

    let routes = router.routes().routes();
    assert!(routes.iter().all(|r| r.is_compiled()));
    for route in routes {
        let cached = Arc::clone(route.compiled().unwrap());
        assert!(Arc::ptr_eq(&cached, &route.compile().unwrap()));
    }
}

#[test]
fn test_config_table() {
    let (_, router) = router_from_toml(
        r#"
        [[routes]]
        methods = ["GET", "POST"]
        uri = "contact"
        action = "contact"

        [[groups]]
        prefix = "admin"
        as = "admin."
        middleware = ["auth"]

        [[groups.routes]]
        uri = "reports/{year?2024}"
        name = "reports"
        action = "admin.reports"

        [fallback]
        action = "missing"
        "#,
    );

    let bound = router
        .dispatch(&request(Method::GET, "/admin/reports"))
        .unwrap()
        .matched()
        .unwrap();
    assert_eq!(bound.route().route_name(), Some("admin.reports"));
    assert_eq!(bound.route().middlewares(), &["auth"]);
    assert_eq!(bound.parameter("year"), Some("2024"));

    match router.dispatch(&request(Method::DELETE, "/contact")).unwrap() {
        RouteLookup::MethodNotAllowed { allowed } => {
            assert_eq!(allowed.header_value(), "GET, HEAD, POST");
        }
        other => panic!("expected 405, got {other:?}"),
    }

    let bound = router.dispatch(&request(Method::GET, "/nowhere")).unwrap().matched().unwrap();
    assert_eq!(bound.route().action(), Some("missing"));
}
