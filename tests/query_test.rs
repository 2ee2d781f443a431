use openapi_docs_mcp::converter::Layer;
use openapi_docs_mcp::document::{ParsedDocument, parse_modules};
use openapi_docs_mcp::query::scorer::{Field, THRESHOLD, field_score, weighted_score};
use openapi_docs_mcp::query::{DEFAULT_LIMIT, DisplayMode, QueryOutcome, Strategy, query_apis};

const MARKDOWN: &str = "# Shop\n\n\
## UserModule\n\n\
### CreateUser\n\n```http\nPOST /users\n```\n\nCreates a user.\n\n\
### GetUser\n\n```http\nGET /users/{userId}\n```\n\n\
## OrderModule\n\n\
### ListOrders\n\n```http\nGET /orders\n```\n\n\
### GetOrder\n\n```http\nGET /orders/{id}\n```\n";

fn documents() -> Vec<ParsedDocument> {
    vec![ParsedDocument {
        source: "shop.json".to_string(),
        markdown: MARKDOWN.to_string(),
        modules: parse_modules(MARKDOWN),
        layer: Layer::Standard,
    }]
}

fn hit_names(outcome: &QueryOutcome) -> Vec<String> {
    match outcome {
        QueryOutcome::Summary { hits } => hits.iter().map(|h| h.api.clone()).collect(),
        QueryOutcome::Detail { hit, .. } => vec![hit.api.clone()],
        QueryOutcome::NoResults => Vec::new(),
    }
}

#[test]
fn test_module_api_direct_match() {
    let docs = documents();
    let result = query_apis(&docs, "UserModule::CreateUser", DEFAULT_LIMIT, DisplayMode::Auto);

    assert_eq!(result.strategy, Strategy::ModuleApi);
    match result.outcome {
        QueryOutcome::Detail { hit, section } => {
            assert_eq!(hit.module, "UserModule");
            assert_eq!(hit.api, "CreateUser");
            assert_eq!(hit.method, "POST");
            assert_eq!(hit.path, "/users");
            assert!(section.starts_with("### CreateUser"));
            assert!(section.contains("Creates a user."));
            assert!(!section.contains("GetUser"));
        }
        other => panic!("expected detail, got {other:?}"),
    }
}

#[test]
fn test_module_api_match_ignores_case_and_spacing() {
    let docs = documents();
    let result = query_apis(&docs, " usermodule :: getuser ", DEFAULT_LIMIT, DisplayMode::Summary);

    assert_eq!(result.strategy, Strategy::ModuleApi);
    assert_eq!(hit_names(&result.outcome), vec!["GetUser"]);
}

#[test]
fn test_method_path_direct_match() {
    let docs = documents();

    let result = query_apis(&docs, "get /orders", DEFAULT_LIMIT, DisplayMode::Auto);
    assert_eq!(result.strategy, Strategy::MethodPath);
    assert_eq!(hit_names(&result.outcome), vec!["ListOrders"]);

    // path comparison is exact
    let result = query_apis(&docs, "GET /Orders", DEFAULT_LIMIT, DisplayMode::Auto);
    assert_eq!(result.strategy, Strategy::Fuzzy);
}

#[test]
fn test_direct_pattern_without_match_falls_back_to_fuzzy() {
    let docs = documents();

    let result = query_apis(&docs, "GET /users/{id}", DEFAULT_LIMIT, DisplayMode::Auto);
    assert_eq!(result.strategy, Strategy::Fuzzy);

    let result = query_apis(&docs, "Nope::creat user", DEFAULT_LIMIT, DisplayMode::Auto);
    assert_eq!(result.strategy, Strategy::Fuzzy);
}

#[test]
fn test_fuzzy_ranking_best_first() {
    let docs = documents();
    let result = query_apis(&docs, "getuser", DEFAULT_LIMIT, DisplayMode::Auto);

    assert_eq!(result.strategy, Strategy::Fuzzy);
    // GetUser is an exact substring; CreateUser only a near match
    assert_eq!(hit_names(&result.outcome), vec!["GetUser", "CreateUser"]);
}

#[test]
fn test_fuzzy_ties_keep_index_order() {
    let docs = documents();
    let result = query_apis(&docs, "order", DEFAULT_LIMIT, DisplayMode::Auto);

    assert_eq!(hit_names(&result.outcome), vec!["ListOrders", "GetOrder"]);
    match result.outcome {
        QueryOutcome::Summary { hits } => {
            assert_eq!(hits[0].query, "OrderModule::ListOrders");
            assert_eq!(hits[1].path, "/orders/{id}");
        }
        other => panic!("expected summary, got {other:?}"),
    }
}

#[test]
fn test_auto_mode_single_fuzzy_match_is_detailed() {
    let docs = documents();
    let result = query_apis(&docs, "creat user", DEFAULT_LIMIT, DisplayMode::Auto);

    match result.outcome {
        QueryOutcome::Detail { hit, section } => {
            assert_eq!(hit.api, "CreateUser");
            assert!(section.contains("POST /users"));
        }
        other => panic!("expected detail, got {other:?}"),
    }
}

#[test]
fn test_summary_mode_single_match_is_a_list() {
    let docs = documents();
    let result = query_apis(&docs, "UserModule::CreateUser", DEFAULT_LIMIT, DisplayMode::Summary);

    match result.outcome {
        QueryOutcome::Summary { hits } => {
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].query, "UserModule::CreateUser");
        }
        other => panic!("expected summary, got {other:?}"),
    }
}

#[test]
fn test_full_mode_details_first_of_many() {
    let docs = documents();
    let result = query_apis(&docs, "order", DEFAULT_LIMIT, DisplayMode::Full);

    match result.outcome {
        QueryOutcome::Detail { hit, section } => {
            assert_eq!(hit.api, "ListOrders");
            assert!(section.starts_with("### ListOrders"));
            assert!(!section.contains("GetOrder"));
        }
        other => panic!("expected detail, got {other:?}"),
    }
}

#[test]
fn test_limit_truncates() {
    let docs = documents();
    let result = query_apis(&docs, "order", 1, DisplayMode::Summary);
    assert_eq!(hit_names(&result.outcome), vec!["ListOrders"]);
}

#[test]
fn test_no_results_in_every_mode() {
    let docs = documents();
    for mode in [DisplayMode::Full, DisplayMode::Summary, DisplayMode::Auto] {
        assert_eq!(
            query_apis(&docs, "zzzzqqq", DEFAULT_LIMIT, mode).outcome,
            QueryOutcome::NoResults
        );
        assert_eq!(
            query_apis(&docs, "   ", DEFAULT_LIMIT, mode).outcome,
            QueryOutcome::NoResults
        );
    }
    assert_eq!(
        query_apis(&[], "order", DEFAULT_LIMIT, DisplayMode::Auto).outcome,
        QueryOutcome::NoResults
    );
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn test_field_score_threshold() {
    assert_eq!(field_score(&chars("user"), "Get User"), Some(0.0));
    assert_eq!(field_score(&chars("usr"), "getuser"), Some(1.0 / 3.0));
    assert_eq!(field_score(&chars("usera"), "users"), Some(0.2));
    // two edits in three characters is beyond the threshold
    assert_eq!(field_score(&chars("uxx"), "user"), None);
    assert!(1.0 / 3.0 <= THRESHOLD);
}

#[test]
fn test_heavier_field_ranks_better() {
    let api_hit = weighted_score(
        "orders",
        &[
            Field { text: "List Orders", weight: 0.5 },
            Field { text: "Shop", weight: 0.15 },
        ],
    )
    .unwrap();
    let module_hit = weighted_score(
        "orders",
        &[
            Field { text: "List Items", weight: 0.5 },
            Field { text: "Orders", weight: 0.15 },
        ],
    )
    .unwrap();

    assert!(api_hit < module_hit);
    assert_eq!(weighted_score("orders", &[Field { text: "Shop", weight: 1.0 }]), None);
}
