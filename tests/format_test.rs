use openapi_docs_mcp::document::parse_modules;
use openapi_docs_mcp::query::{ApiHit, QueryOutcome};
use openapi_docs_mcp::server::format;
use openapi_docs_mcp::storage::ApiQuery;

const MARKDOWN: &str = "## Pets\n\nPet operations.\n\n### List Pets\n\n```http\nGET /pets\n```\n\n## Misc\n\n### Ping\n";

#[test]
fn test_docs_list_block() {
    let modules = parse_modules(MARKDOWN);
    let refs: Vec<_> = modules.iter().collect();

    let text = format::docs_list(&refs).unwrap();

    assert!(text.starts_with("[docs list start]\n"));
    assert!(text.ends_with("\n[docs list end]"));
    assert!(text.contains("name: Pets"));
    assert!(text.contains("description: Pet operations."));
    assert!(text.contains("api_count: 1"));
}

#[test]
fn test_api_details_block() {
    let modules = parse_modules(MARKDOWN);
    let found = ApiQuery::new("Pets", "List Pets");
    let missing = ApiQuery::new("Pets", "Feed Pet");
    let ping = ApiQuery::new("Misc", "Ping");
    let sections = vec![
        (&found, &modules[0].apis[0], Some("### List Pets\n\nbody\n")),
        (&ping, &modules[1].apis[0], None),
    ];

    let text = format::api_details(&sections, &[missing]);

    assert!(text.starts_with("[multi-api details start]\n# Pets::List Pets\n\n### List Pets"));
    assert!(text.contains("```http\nUnknown Unknown\n```"));
    assert!(text.contains("Not found:\n- Pets::Feed Pet"));
    assert!(text.ends_with("[multi-api details end]"));
}

#[test]
fn test_api_query_blocks() {
    let text = format::api_query("nothing", &QueryOutcome::NoResults).unwrap();
    assert_eq!(
        text,
        "[api query start]\nNo results for query: nothing\n[api query end]"
    );

    let hit = ApiHit {
        module: "Pets".to_string(),
        api: "List Pets".to_string(),
        method: "GET".to_string(),
        path: "/pets".to_string(),
        query: "Pets::List Pets".to_string(),
        document: 0,
    };
    let text = format::api_query("pets", &QueryOutcome::Summary { hits: vec![hit] }).unwrap();
    assert!(text.starts_with("[api query start]\nmatches:"));
    assert!(text.contains("query: Pets::List Pets"));
    assert!(!text.contains("document"));
}
