//! End-to-end scenarios mirroring the system's own worked examples: index a
//! small mixed TypeScript/Python project, edit it incrementally, delete a
//! file, and exercise the Markov chains and path resolver against known
//! inputs with known expected outputs.

use codeindex::config::IndexConfig;
use codeindex::model::{ReferenceKind, RelationshipKind, SymbolKind};
use codeindex::query::{QueryApi, TraceDirection, TraceLevel};
use codeindex::{SymbolDatabase, SyncOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn open_workspace(root: &Path) -> QueryApi {
    let config = IndexConfig::for_root(root.canonicalize().unwrap());
    QueryApi::open(config).unwrap()
}

/// S1: index a 2-file project, search a function by name, and trace a call
/// edge crossing a conditional branch.
#[tokio::test]
async fn indexes_two_file_project_and_traces_calls() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/svc.ts",
        "export class UserService {\n  async findById(id: string): Promise<User|null> { return null; }\n}\nexport function validateEmail(e: string): boolean { return e.includes('@'); }\n",
    );
    write(
        dir.path(),
        "lib/calc.py",
        "def add(a, b):\n    return a + b\n\nclass Calculator:\n    def calculate(self, op, a, b):\n        if op == 'add':\n            return add(a, b)\n",
    );

    let api = open_workspace(dir.path());
    let summary = api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();
    assert_eq!(summary.removed, 0);
    assert!(summary.reindexed >= 2);

    let found = api.search_symbols("validateEmail", None, 10).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].symbol.kind(), SymbolKind::Function);
    assert_eq!(found[0].symbol.location().file_path, "src/svc.ts");

    let add_symbol = api
        .database()
        .find_by_name("add", Some(SymbolKind::Function))
        .unwrap()
        .into_iter()
        .next()
        .expect("add function indexed");
    let callers = api.database().edges_to_callee(add_symbol.id()).unwrap();
    assert_eq!(callers.len(), 1);
    assert_eq!(callers[0].caller_name, "calculate");
    assert!(callers[0].is_conditional);

    let trace = api.trace_calls("add", TraceDirection::Callers, 1).unwrap();
    let TraceLevel { edges, .. } = trace.into_iter().next().expect("one level of callers");
    assert_eq!(edges.len(), 1);

    let hierarchy = api
        .trace_types(
            "UserService",
            codeindex::query::TypeTraceMode::Hierarchy,
            codeindex::query::TypeTraceDirection::Both,
            10,
        )
        .unwrap();
    assert!(hierarchy.is_empty());
}

/// S2: appending a function to an already-indexed file triggers exactly one
/// reindex and leaves the other file unchanged.
#[tokio::test]
async fn incremental_edit_reindexes_only_changed_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/svc.ts", "export function existing(): void {}\n");
    write(dir.path(), "src/other.ts", "export function other(): void {}\n");

    let api = open_workspace(dir.path());
    api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();

    write(
        dir.path(),
        "src/svc.ts",
        "export function existing(): void {}\nexport function newFn(){}\n",
    );

    let summary = api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();
    assert_eq!(summary.reindexed, 1);
    assert_eq!(summary.unchanged, 1);

    let found = api.search_symbols("newFn", None, 10).unwrap();
    assert_eq!(found.len(), 1);
}

/// S3: deleting a file and targeting it in a sync call removes its symbols.
#[tokio::test]
async fn targeted_sync_removes_deleted_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/calc.py", "def add(a, b):\n    return a + b\n");

    let api = open_workspace(dir.path());
    api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();
    assert_eq!(api.search_symbols("add", None, 10).unwrap().len(), 1);

    fs::remove_file(dir.path().join("lib/calc.py")).unwrap();
    let summary = api
        .sync_index(SyncOptions { files: Some(vec!["lib/calc.py".to_string()]), rebuild_chains: false, cancel: None })
        .await
        .unwrap();
    assert_eq!(summary.removed, 1);
    assert!(api.search_symbols("add", None, 10).unwrap().is_empty());
}

/// S4: a caller with fan-out across three callees links them to each other
/// in the call_flow chain, and querying one callee surfaces the others.
#[test]
fn call_flow_links_co_callees_of_a_shared_caller() {
    use codeindex::markov;
    use codeindex::model::{CallGraphEdge, FileRecord, ParseResult, ParseStatus};

    let db = SymbolDatabase::open_in_memory().unwrap();
    db.save_file(
        &FileRecord {
            absolute_path: "/repo/main.ts".to_string(),
            relative_path: "main.ts".to_string(),
            language: "typescript".to_string(),
            checksum: "x".to_string(),
            line_count: 1,
            parse_status: ParseStatus::Complete,
            parse_warnings: Vec::new(),
            summary: String::new(),
        },
        "",
        &ParseResult::default(),
    )
    .unwrap();
    db.insert_call_edges(&[
        CallGraphEdge {
            id: "e-a".to_string(),
            caller_symbol_id: "main".to_string(),
            caller_name: "main".to_string(),
            callee_symbol_id: Some("A".to_string()),
            callee_name: "A".to_string(),
            call_count: 1,
            is_async: false,
            is_conditional: false,
        },
        CallGraphEdge {
            id: "e-b".to_string(),
            caller_symbol_id: "main".to_string(),
            caller_name: "main".to_string(),
            callee_symbol_id: Some("B".to_string()),
            callee_name: "B".to_string(),
            call_count: 1,
            is_async: false,
            is_conditional: false,
        },
        CallGraphEdge {
            id: "e-c".to_string(),
            caller_symbol_id: "main".to_string(),
            caller_name: "main".to_string(),
            callee_symbol_id: Some("C".to_string()),
            callee_name: "C".to_string(),
            call_count: 1,
            is_async: false,
            is_conditional: false,
        },
    ])
    .unwrap();

    markov::rebuild_all(&db, &codeindex::config::MarkovConfig::default()).unwrap();

    let weights = codeindex::config::ChainWeights::default();
    let options = markov::MarkovQueryOptions { chain_types: vec!["call_flow".to_string()], ..Default::default() };
    let result = markov::query(&db, "A", &weights, &options).unwrap();

    assert_eq!(result.chains_used, vec!["call_flow".to_string()]);
    let related: Vec<&str> = result.suggestions.iter().map(|s| s.symbol_id.as_str()).collect();
    assert!(related.contains(&"B"));
    assert!(related.contains(&"C"));
    for suggestion in &result.suggestions {
        assert_eq!(suggestion.path[0], "A");
        assert_eq!(suggestion.path.len(), 2);
    }
}

/// S5: Viterbi-style BFS keeps the higher-probability path to a state even
/// when a longer path's raw edge weights would otherwise look competitive.
#[test]
fn bfs_keeps_highest_probability_path_over_a_longer_route() {
    use codeindex::markov;

    let db = SymbolDatabase::open_in_memory().unwrap();
    db.insert_markov_edge("call_flow", "A", "B", 0.5).unwrap();
    db.insert_markov_edge("call_flow", "A", "X", 0.9).unwrap();
    db.insert_markov_edge("call_flow", "X", "B", 0.3).unwrap();

    let weights = codeindex::config::ChainWeights { call_flow: 1.0, cooccurrence: 0.0, type_affinity: 0.0, import_cluster: 0.0 };
    let options = markov::MarkovQueryOptions {
        chain_types: vec!["call_flow".to_string()],
        depth: 3,
        min_probability: 0.0,
        max_results: 10,
        decay_factor: 0.7,
        explain: false,
    };

    let result = markov::query(&db, "A", &weights, &options).unwrap();
    let to_b = result.suggestions.iter().find(|s| s.symbol_id == "B").expect("B reachable");
    assert_eq!(to_b.path, vec!["A".to_string(), "B".to_string()]);
}

/// S6: an ambiguous basename resolves to a `Failure` listing both matches;
/// a more specific suffix resolves uniquely.
#[test]
fn resolver_disambiguates_by_suffix_specificity() {
    use codeindex::model::{FileRecord, ParseStatus};
    use codeindex::resolver;

    let db = SymbolDatabase::open_in_memory().unwrap();
    for relative in ["src/utils/index.ts", "src/server/index.ts"] {
        db.upsert_file(
            &FileRecord {
                absolute_path: format!("/repo/{relative}"),
                relative_path: relative.to_string(),
                language: "typescript".to_string(),
                checksum: "x".to_string(),
                line_count: 1,
                parse_status: ParseStatus::Complete,
                parse_warnings: Vec::new(),
                summary: String::new(),
            },
            "",
        )
        .unwrap();
    }

    let root = Path::new("/repo");
    let ambiguous = resolver::resolve(&db, root, "index.ts").unwrap().unwrap_err();
    assert_eq!(ambiguous.kind, resolver::ResolutionFailureKind::Ambiguous);
    let mut suggestions = ambiguous.suggestions.clone();
    suggestions.sort();
    assert_eq!(suggestions, vec!["src/server/index.ts".to_string(), "src/utils/index.ts".to_string()]);

    let resolved = resolver::resolve(&db, root, "utils/index.ts").unwrap().unwrap();
    assert_eq!(resolved.relative_path, "src/utils/index.ts");
    assert!(resolved.resolved_path.ends_with("src/utils/index.ts"));
}

/// A file with a syntax error is indexed as partial/failed rather than
/// aborting the whole sync, and the error never surfaces as a hard
/// `CodeIndexError`.
#[tokio::test]
async fn syntax_error_does_not_abort_the_sync() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/broken.ts", "export function broken( {{{ not valid typescript\n");
    write(dir.path(), "src/ok.ts", "export function fine(): void {}\n");

    let api = open_workspace(dir.path());
    let summary = api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();
    assert!(api.search_symbols("fine", None, 10).unwrap().len() == 1);
    let _ = summary;
}

/// A `rebuild_chains` sync reports all four chain types as rebuilt; a plain
/// sync reports none.
#[tokio::test]
async fn sync_reports_rebuilt_chain_ids_only_when_requested() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.ts", "export function a(): void {}\n");

    let api = open_workspace(dir.path());
    let plain = api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();
    assert!(plain.chain_ids.is_empty());

    let rebuilt = api.sync_index(SyncOptions { files: None, rebuild_chains: true, cancel: None }).await.unwrap();
    assert_eq!(rebuilt.chain_ids.len(), 4);
}

/// Reverse dependency lookup and import self-overlap detection on the
/// module dependency view.
#[tokio::test]
async fn module_dependencies_report_importers_when_requested() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.ts", "import { b } from './b';\nexport function a(): void { b(); }\n");
    write(dir.path(), "src/b.ts", "export function b(): void {}\n");

    let api = open_workspace(dir.path());
    api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();

    let deps = api.get_module_dependencies("src/b.ts", true).unwrap();
    assert!(deps.importers.iter().any(|i| i == "src/a.ts"));

    let references = api.find_references("b", Some("src/a.ts"), 10).unwrap();
    assert!(references.iter().any(|r| r.reference_kind == ReferenceKind::Call));
}

/// Type relationships surface `extends` edges in both directions.
#[tokio::test]
async fn type_hierarchy_traces_extends_relationship() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/shapes.ts",
        "export class Shape {}\nexport class Circle extends Shape {}\n",
    );

    let api = open_workspace(dir.path());
    api.sync_index(SyncOptions { files: None, rebuild_chains: false, cancel: None }).await.unwrap();

    let parents = api
        .trace_types(
            "Circle",
            codeindex::query::TypeTraceMode::Hierarchy,
            codeindex::query::TypeTraceDirection::Up,
            10,
        )
        .unwrap();
    assert!(parents.iter().any(|r| r.relationship_kind == RelationshipKind::Extends && r.target_name == "Shape"));
}
