use node_weave::catalog::entry::{Catalog, CatalogEntry};
use node_weave::catalog::registry::{MenuPlacement, NodeType, NodeTypeId, NodeTypeRegistry};
use node_weave::graph_utils::graph::{GraphDocument, GridPos};
use node_weave::menu::search::search;
use node_weave::menu::session::{PaletteItem, PaletteSession, Selection};
use node_weave::menu::tree::{MenuTree, MenuTreeError};
use node_weave::persistence::persist::{self, AppStateFile};
use node_weave::persistence::settings::AppSettings;

fn entry(id: &str, path: &str, tags: &[&str]) -> CatalogEntry {
    CatalogEntry {
        type_id: NodeTypeId::from(id),
        display_path: path.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

// The worked example from the palette design notes: two math nodes and a
// logic node, one carrying an extra search tag.
fn example_catalog() -> Catalog {
    Catalog::from_entries(vec![
        entry("T1", "Math/Add", &[]),
        entry("T2", "Math/Subtract", &["arith"]),
        entry("T3", "Logic/And", &[]),
    ])
}

fn ids(results: &[&CatalogEntry]) -> Vec<String> {
    results.iter().map(|e| e.type_id.to_string()).collect()
}

#[test]
fn every_leaf_reachable_by_path_carries_its_type() {
    let registry = NodeTypeRegistry::builtin();
    let catalog = Catalog::from_registry(&registry);
    let tree = MenuTree::build(&catalog).expect("builtin catalog should build");
    for e in catalog.entries() {
        let segments: Vec<&str> = e.path_segments().collect();
        let leaf = tree
            .descend(segments.iter().copied())
            .unwrap_or_else(|| panic!("no leaf for path {}", e.display_path));
        assert!(tree.is_leaf(leaf), "{} should be a leaf", e.display_path);
        assert_eq!(tree.type_id(leaf), Some(&e.type_id));
    }
}

#[test]
fn empty_query_passes_catalog_through_in_order() {
    let catalog = example_catalog();
    let all = search("", &catalog);
    assert_eq!(ids(&all), vec!["T1", "T2", "T3"]);
}

#[test]
fn search_is_idempotent_and_order_preserving() {
    let catalog = example_catalog();
    let first = ids(&search("a", &catalog));
    let second = ids(&search("a", &catalog));
    assert_eq!(first, second);
    // order must follow catalog order, never the match order
    let catalog_order: Vec<String> = catalog
        .entries()
        .iter()
        .map(|e| e.type_id.to_string())
        .filter(|id| first.contains(id))
        .collect();
    assert_eq!(first, catalog_order);
}

#[test]
fn multi_token_queries_are_conjunctive() {
    let catalog = Catalog::from_entries(vec![
        entry("T1", "Math/Add", &["sum", "plus"]),
        entry("T2", "Math/Subtract", &["minus"]),
        entry("T3", "Logic/And", &["boolean", "plus-ish"]),
    ]);
    let a = ids(&search("plus", &catalog));
    let b = ids(&search("bool", &catalog));
    let both = ids(&search("plus bool", &catalog));
    // exactly the intersection of the single-token filters
    let expected: Vec<String> = a.iter().filter(|id| b.contains(id)).cloned().collect();
    assert_eq!(both, expected);
    assert_eq!(both, vec!["T3"]);
}

#[test]
fn duplicate_tokens_do_not_change_results() {
    let catalog = example_catalog();
    assert_eq!(ids(&search("arith arith", &catalog)), ids(&search("arith", &catalog)));
}

#[test]
fn matching_is_case_insensitive() {
    let catalog = Catalog::from_entries(vec![entry("T1", "Misc/Thing", &["Foo"])]);
    assert_eq!(ids(&search("FOO", &catalog)), vec!["T1"]);
    assert_eq!(ids(&search("foo", &catalog)), ids(&search("FOO", &catalog)));
}

#[test]
fn interior_path_segments_are_not_searchable() {
    let catalog = example_catalog();
    // "arith" is a declared tag of T2
    assert_eq!(ids(&search("arith", &catalog)), vec!["T2"]);
    // "math" only appears as a folder segment, never as a tag or leaf name
    assert!(search("math", &catalog).is_empty());
    // leaf names are searchable
    assert_eq!(ids(&search("add", &catalog)), vec!["T1"]);
}

#[test]
fn session_folder_navigation_and_creation_flow() {
    let mut session = PaletteSession::new(example_catalog());
    assert!(session.at_root());

    let top = session.items().unwrap();
    let labels: Vec<&str> = top.iter().map(|i| i.label()).collect();
    assert_eq!(labels, vec!["Math", "Logic"]);
    assert!(top.iter().all(|i| i.is_folder()));

    // descend into Math
    let math = top[0].clone();
    assert_eq!(session.select(&math), Selection::Descend);
    assert!(!session.at_root());
    assert_eq!(session.current_path(), "Math");

    let children = session.items().unwrap();
    let labels: Vec<&str> = children.iter().map(|i| i.label()).collect();
    assert_eq!(labels, vec!["Add", "Subtract"]);
    assert!(children.iter().all(|i| !i.is_folder()));

    // selecting the Add leaf surfaces its type for instantiation
    match session.select(&children[0]) {
        Selection::Create(type_id) => assert_eq!(type_id, NodeTypeId::from("T1")),
        other => panic!("expected Create, got {:?}", other),
    }
}

#[test]
fn back_returns_to_root_and_is_a_noop_there() {
    let mut session = PaletteSession::new(example_catalog());
    let top = session.items().unwrap();
    session.select(&top[0]);
    assert!(!session.at_root());

    session.back();
    assert!(session.at_root());
    // back at the root must not error or move anywhere
    session.back();
    assert!(session.at_root());
    // and also before the tree has ever been built
    let mut fresh = PaletteSession::new(example_catalog());
    fresh.back();
    assert!(fresh.at_root());
}

#[test]
fn session_search_rows_use_leaf_labels() {
    let mut session = PaletteSession::new(example_catalog());
    session.set_query("arith");
    assert!(session.is_searching());
    let rows = session.items().unwrap();
    assert_eq!(rows.len(), 1);
    match &rows[0] {
        PaletteItem::Leaf { label, type_id } => {
            assert_eq!(label, "Subtract");
            assert_eq!(type_id, &NodeTypeId::from("T2"));
        }
        other => panic!("expected leaf row, got {:?}", other),
    }
    // clearing the query falls back to tree navigation
    session.set_query("");
    assert!(!session.is_searching());
    assert_eq!(session.items().unwrap().len(), 2);
}

#[test]
fn sessions_over_different_catalogs_are_independent() {
    let mut a = PaletteSession::new(example_catalog());
    let mut b = PaletteSession::new(Catalog::from_entries(vec![entry("X1", "Only/Here", &[])]));

    let top_a = a.items().unwrap();
    a.select(&top_a[0]);
    assert_eq!(a.current_path(), "Math");

    // navigating `a` must not move `b`
    assert!(b.at_root());
    let top_b = b.items().unwrap();
    assert_eq!(top_b.len(), 1);
    assert_eq!(top_b[0].label(), "Only");
    assert!(b.at_root());
}

#[test]
fn conflicting_menu_paths_fail_the_build() {
    // leaf "A" then folder "A/B"
    let catalog = Catalog::from_entries(vec![entry("T1", "A", &[]), entry("T2", "A/B", &[])]);
    assert!(matches!(
        MenuTree::build(&catalog),
        Err(MenuTreeError::ConflictingPath { .. })
    ));

    // the session surfaces the same failure from its folder listing
    let mut session = PaletteSession::new(Catalog::from_entries(vec![
        entry("T1", "A", &[]),
        entry("T2", "A/B", &[]),
    ]));
    assert!(session.items().is_err());
    // search does not touch the tree, so it still works on a broken catalog
    session.set_query("a");
    assert!(session.items().is_ok());
}

#[test]
fn derived_placement_resolves_through_nicify() {
    let mut registry = NodeTypeRegistry::new();
    registry.register(NodeType::new("t", "weave.string.ConcatStrings"));
    let catalog = Catalog::from_registry(&registry);
    assert_eq!(catalog.entries()[0].display_path, "Weave/String/Concat Strings");

    let tree = MenuTree::build(&catalog).unwrap();
    let leaf = tree.descend(["Weave", "String", "Concat Strings"]).unwrap();
    assert_eq!(tree.type_id(leaf), Some(&NodeTypeId::from("t")));
}

#[test]
fn graphdoc_create_node_copies_ports_and_position() {
    let registry = NodeTypeRegistry::builtin();
    let mut doc = GraphDocument::new();
    let add_ty = registry.get(&NodeTypeId::from("math.add")).unwrap();

    let handle = doc.create_node(add_ty, GridPos::new(10.0, -4.0));
    let node = doc.get_node(handle).expect("node should exist");
    assert_eq!(node.type_id, NodeTypeId::from("math.add"));
    assert_eq!(node.title, "Add");
    assert_eq!(node.position, GridPos::new(10.0, -4.0));
    assert_eq!(node.inputs, vec!["a", "b"]);
    assert_eq!(node.outputs, vec!["result"]);
}

#[test]
fn graphdoc_connect_validates_endpoints_and_ports() {
    let registry = NodeTypeRegistry::builtin();
    let mut doc = GraphDocument::new();
    let add = doc.create_node(
        registry.get(&NodeTypeId::from("math.add")).unwrap(),
        GridPos::default(),
    );
    let out = doc.create_node(
        registry.get(&NodeTypeId::from("io.output")).unwrap(),
        GridPos::default(),
    );

    // valid: add.result -> output.value
    let cid = doc.connect(add, "result", out, "value").expect("should connect");
    assert!(doc.get_connection(cid).is_some());

    // wrong port names fail
    assert!(doc.connect(add, "nope", out, "value").is_none());
    assert!(doc.connect(add, "result", out, "nope").is_none());
    // missing endpoint fails
    assert!(doc.connect(add, "result", uuid::Uuid::now_v7(), "value").is_none());
}

#[test]
fn graphdoc_remove_node_cascades_connections() {
    let registry = NodeTypeRegistry::builtin();
    let mut doc = GraphDocument::new();
    let add = doc.create_node(
        registry.get(&NodeTypeId::from("math.add")).unwrap(),
        GridPos::default(),
    );
    let out = doc.create_node(
        registry.get(&NodeTypeId::from("io.output")).unwrap(),
        GridPos::default(),
    );
    let cid = doc.connect(add, "result", out, "value").unwrap();

    assert!(doc.remove_node(add));
    assert!(doc.get_connection(cid).is_none());
    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.connection_count(), 0);
}

#[test]
fn graphdoc_rename_and_fetch_helpers() {
    let registry = NodeTypeRegistry::builtin();
    let mut doc = GraphDocument::new();
    let a = doc.create_node(
        registry.get(&NodeTypeId::from("math.add")).unwrap(),
        GridPos::default(),
    );
    let b = doc.create_node(
        registry.get(&NodeTypeId::from("math.add")).unwrap(),
        GridPos::default(),
    );
    let out = doc.create_node(
        registry.get(&NodeTypeId::from("io.output")).unwrap(),
        GridPos::default(),
    );

    // rename changes the title, never the type
    assert!(doc.rename_node(a, "Sum".to_string()));
    assert_eq!(doc.get_node(a).unwrap().title, "Sum");
    assert_eq!(doc.get_node(a).unwrap().type_id, NodeTypeId::from("math.add"));
    assert!(!doc.rename_node(uuid::Uuid::now_v7(), "Ghost".to_string()));

    let mut adds = doc.find_nodes_by_type(&NodeTypeId::from("math.add"));
    adds.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(adds, expected);
    assert!(doc.find_nodes_by_type(&NodeTypeId::from("logic.not")).is_empty());

    let cid = doc.connect(a, "result", out, "value").unwrap();
    assert_eq!(doc.connections_of(a), vec![cid]);
    assert_eq!(doc.connections_of(out), vec![cid]);
    assert!(doc.connections_of(b).is_empty());
}

#[test]
fn node_titles_match_catalog_display_names() {
    // Holds for explicit placements and for derived (nicified) ones alike
    let registry = NodeTypeRegistry::builtin();
    let catalog = Catalog::from_registry(&registry);
    let mut doc = GraphDocument::new();
    for entry in catalog.entries() {
        let ty = registry.get(&entry.type_id).unwrap();
        let handle = doc.create_node(ty, GridPos::default());
        assert_eq!(
            doc.get_node(handle).unwrap().title,
            entry.display_name(),
            "title for {} should match its menu label",
            entry.type_id
        );
    }
}

#[test]
fn settings_override_routes_autosave_files() {
    let dir = std::env::temp_dir().join(format!("node-weave-test-{}", uuid::Uuid::now_v7()));
    persist::set_settings_override(AppSettings {
        autosave_override: Some(dir.clone()),
        ..AppSettings::default()
    });
    assert_eq!(persist::effective_settings().autosave_dir(), dir);

    let registry = NodeTypeRegistry::builtin();
    let mut doc = GraphDocument::new();
    doc.create_node(
        registry.get(&NodeTypeId::from("io.constant")).unwrap(),
        GridPos::new(1.0, 2.0),
    );
    let state = AppStateFile::from_runtime(&doc, egui::vec2(3.0, -4.0), 1.5);

    let active = persist::save_active(&state).expect("save should succeed");
    assert!(active.starts_with(&dir));
    let versioned = persist::save_versioned(&state).expect("save should succeed");
    assert!(versioned.starts_with(&dir));
    assert_eq!(persist::list_versions().unwrap(), vec![versioned]);

    let loaded = persist::load_active()
        .expect("load should succeed")
        .expect("state was just written");
    let (loaded_doc, pan, zoom) = loaded.to_runtime();
    assert_eq!(loaded_doc.node_count(), 1);
    assert_eq!(pan, egui::vec2(3.0, -4.0));
    assert_eq!(zoom, 1.5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn builtin_registry_search_smoke() {
    // End to end over the shipped catalog: tag search finds the arithmetic
    // nodes, in registration order, without touching the tree.
    let catalog = Catalog::from_registry(&NodeTypeRegistry::builtin());
    let hits = ids(&search("arithmetic", &catalog));
    assert_eq!(hits, vec!["math.add", "math.subtract", "math.multiply"]);

    // multi-word narrows conjunctively
    let hits = ids(&search("arithmetic sub", &catalog));
    assert_eq!(hits, vec!["math.subtract"]);
}
