//! Integration tests: the full write/validate/prepare/commit cycle against
//! the bundled RFC 8345 resources and an inline module exercising every
//! validation rule.

use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use yangkit_core::{PathArgument, QName, QNameModule, Revision, Value, YangInstanceIdentifier};
use yangkit_data::{
    ContainerNodeBuilder, DataTreeConfiguration, DataTreeError, DataTreeResult, InMemoryDataTree, LeafNodeBuilder,
    MapEntryNodeBuilder, MapNodeBuilder, ModificationType, NormalizedNode, DEFAULT_CONFIGURATION, DEFAULT_OPERATIONAL,
};
use yangkit_model::SchemaContext;
use yangkit_parser::{DefaultYangParserFactory, YangParser, YangParserFactory, YangTextSchemaSource};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn bundled_context() -> SchemaContext {
    let resources = repo_root().join("resources");
    let mut parser = DefaultYangParserFactory.create_parser();
    for main in [
        "/mainSources/ietf-network@2018-02-26.yang",
        "/mainSources/ietf-network-topology@2018-02-26.yang",
    ] {
        parser
            .add_source(&YangTextSchemaSource::for_resource(&resources, main).unwrap())
            .unwrap();
    }
    parser
        .add_lib_source(
            &YangTextSchemaSource::for_resource(&resources, "/all_the_modules/ietf-inet-types@2013-07-15.yang")
                .unwrap(),
        )
        .unwrap();
    parser.build_schema_context().unwrap()
}

// ─── Bundled resources ──────────────────────────────────────────────

#[test]
fn test_sample_document_commits_and_is_visible_after() {
    let schema = Arc::new(bundled_context());
    let module = schema
        .find_module("ietf-network-topology", Some(Revision::of("2018-02-26").unwrap()))
        .unwrap();
    let q = |name: &str| module.qname(name).unwrap();

    let entry_id = PathArgument::with_predicate(q("list1"), q("name"), "sample name");
    let document = ContainerNodeBuilder::new()
        .with_node_identifier(q("cont"))
        .with_child(
            ContainerNodeBuilder::new()
                .with_node_identifier(q("cont2"))
                .with_child(
                    MapNodeBuilder::new()
                        .with_node_identifier(q("list1"))
                        .with_child(
                            MapEntryNodeBuilder::new()
                                .with_node_identifier(entry_id.clone())
                                .with_child(NormalizedNode::leaf(q("name"), "sample name"))
                                .build()
                                .unwrap(),
                        )
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let tree = InMemoryDataTree::new(DEFAULT_CONFIGURATION);
    tree.set_schema_context(Arc::clone(&schema));
    let before = tree.take_snapshot();

    let cont_path = YangInstanceIdentifier::of(q("cont"));
    let mut modification = tree.take_snapshot().new_modification();
    modification.write(&cont_path, document).unwrap();
    let modification = modification.ready();
    tree.validate(&modification).unwrap();
    let candidate = tree.prepare(modification).unwrap();
    assert_eq!(candidate.changes().len(), 1);
    assert_eq!(candidate.changes()[0].modification_type, ModificationType::Write);
    tree.commit(candidate).unwrap();
    let after = tree.take_snapshot();

    let leaf_path = cont_path
        .clone()
        .node(q("cont2"))
        .node(q("list1"))
        .node(entry_id)
        .node(q("name"));
    assert_eq!(leaf_path.to_string(), "/cont/cont2/list1/list1[name='sample name']/name");
    assert!(before.read_node(&cont_path).is_none());
    let leaf = after.read_node(&leaf_path).unwrap();
    assert_eq!(leaf.value(), Some(&Value::from("sample name")));
    assert_eq!(after.version(), 1);
    assert_eq!(tree.version(), 1);

    assert_eq!(
        after.to_json(),
        json!({"ietf-network-topology:cont": {"cont2": {"list1": [{"name": "sample name"}]}}})
    );
}

// ─── Inline schema ───────────────────────────────────────────────────

const TEST_MODULE: &str = r#"
module test-data {
  yang-version 1.1;
  namespace "urn:test:data";
  prefix td;

  identity transport-base;
  identity fast { base transport-base; }

  container top {
    leaf name { type string { length "1..8"; } }
    leaf count { type uint8; }
    leaf total { type int64; }
    leaf kind { type identityref { base transport-base; } }
    list item {
      key "id";
      max-elements 2;
      unique "label";
      leaf id { type string; }
      leaf label { type string; }
    }
    leaf item-ref {
      type leafref { path "../item/id"; }
    }
    choice transport {
      case tcp { leaf tcp-port { type uint16; } }
      case udp { leaf udp-port { type uint16; } }
    }
    leaf status { type string; config false; }
    list offer {
      key "id";
      unique "price";
      leaf id { type string; }
      leaf price { type decimal64 { fraction-digits 2; } }
    }
    leaf code {
      type union { type int8; type string; }
    }
  }

  container settings {
    presence "enables settings";
    leaf mode { type string; mandatory true; }
  }
}
"#;

struct Fixture {
    schema: Arc<SchemaContext>,
    ns: QNameModule,
}

impl Fixture {
    fn new() -> Self {
        let mut parser = DefaultYangParserFactory.create_parser();
        parser
            .add_source(&YangTextSchemaSource::from_string("test-data.yang", TEST_MODULE).unwrap())
            .unwrap();
        let schema = parser.build_schema_context().unwrap();
        let ns = schema.find_module("test-data", None).unwrap().qname_module().clone();
        Self {
            schema: Arc::new(schema),
            ns,
        }
    }

    fn q(&self, name: &str) -> QName {
        QName::create(&self.ns, name).unwrap()
    }

    fn tree(&self, config: DataTreeConfiguration) -> InMemoryDataTree {
        let tree = InMemoryDataTree::new(config);
        tree.set_schema_context(Arc::clone(&self.schema));
        tree
    }

    fn top_path(&self) -> YangInstanceIdentifier {
        YangInstanceIdentifier::of(self.q("top"))
    }

    fn top(&self, children: Vec<NormalizedNode>) -> NormalizedNode {
        children
            .into_iter()
            .fold(ContainerNodeBuilder::new().with_node_identifier(self.q("top")), |b, c| b.with_child(c))
            .build()
            .unwrap()
    }

    fn entry(&self, id: &str, key_leaf: &str, label: Option<&str>) -> NormalizedNode {
        let mut builder = MapEntryNodeBuilder::new()
            .with_node_identifier(PathArgument::with_predicate(self.q("item"), self.q("id"), id))
            .with_child(NormalizedNode::leaf(self.q("id"), key_leaf));
        if let Some(label) = label {
            builder = builder.with_child(NormalizedNode::leaf(self.q("label"), label));
        }
        builder.build().unwrap()
    }

    fn items(&self, entries: Vec<NormalizedNode>) -> NormalizedNode {
        entries
            .into_iter()
            .fold(MapNodeBuilder::new().with_node_identifier(self.q("item")), |b, e| b.with_child(e))
            .build()
            .unwrap()
    }

    fn leaf(&self, name: &str, value: impl Into<Value>) -> NormalizedNode {
        LeafNodeBuilder::new()
            .with_node_identifier(self.q(name))
            .with_value(value)
            .build()
            .unwrap()
    }

    /// Write `node` at `path`, then validate, prepare, and commit.
    fn commit(&self, tree: &InMemoryDataTree, path: &YangInstanceIdentifier, node: NormalizedNode) -> DataTreeResult<()> {
        let mut modification = tree.take_snapshot().new_modification();
        modification.write(path, node)?;
        let modification = modification.ready();
        tree.validate(&modification)?;
        let candidate = tree.prepare(modification)?;
        tree.commit(candidate)
    }

    fn commit_top(&self, children: Vec<NormalizedNode>) -> DataTreeResult<()> {
        let tree = self.tree(DEFAULT_CONFIGURATION);
        self.commit(&tree, &self.top_path(), self.top(children))
    }
}

#[test]
fn test_valid_document_commits() {
    let f = Fixture::new();
    f.commit_top(vec![
        f.leaf("name", "edge"),
        f.leaf("count", 7u64),
        f.leaf("kind", Value::Identityref(f.q("fast"))),
        f.items(vec![f.entry("a", "a", Some("one")), f.entry("b", "b", Some("two"))]),
        f.leaf("item-ref", "b"),
        f.leaf("tcp-port", 830u64),
    ])
    .unwrap();
}

#[test]
fn test_unknown_child_rejected() {
    let f = Fixture::new();
    let stranger = QName::create(&QNameModule::create("urn:other", None).unwrap(), "name").unwrap();
    let err = f
        .commit_top(vec![NormalizedNode::leaf(stranger, "x")])
        .unwrap_err();
    assert!(matches!(err, DataTreeError::UnknownNode { ref path, .. } if path == "/top"), "{err}");

    let tree = f.tree(DEFAULT_CONFIGURATION);
    let unknown_top = f.q("nowhere");
    let err = f
        .commit(&tree, &YangInstanceIdentifier::of(unknown_top.clone()), NormalizedNode::empty_container(unknown_top))
        .unwrap_err();
    assert!(matches!(err, DataTreeError::UnknownNode { .. }), "{err}");
}

#[test]
fn test_wrong_value_type_rejected() {
    let f = Fixture::new();
    let err = f.commit_top(vec![f.leaf("count", "seven")]).unwrap_err();
    assert!(matches!(err, DataTreeError::InvalidValue { ref path, .. } if path == "/top/count"), "{err}");

    let err = f.commit_top(vec![f.leaf("count", 300u64)]).unwrap_err();
    assert!(matches!(err, DataTreeError::InvalidValue { .. }), "{err}");

    let err = f.commit_top(vec![f.leaf("name", "far-too-long")]).unwrap_err();
    assert!(matches!(err, DataTreeError::InvalidValue { .. }), "{err}");
}

#[test]
fn test_identityref_must_derive_from_base() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![f.leaf("kind", Value::Identityref(f.q("transport-base")))])
        .unwrap_err();
    assert!(matches!(err, DataTreeError::InvalidValue { .. }), "{err}");
}

#[test]
fn test_container_kind_mismatch_rejected() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![NormalizedNode::empty_container(f.q("name"))])
        .unwrap_err();
    assert!(
        matches!(err, DataTreeError::NodeKindMismatch { expected: "leaf", actual: "container", .. }),
        "{err}"
    );
}

#[test]
fn test_key_mismatch_rejected() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![f.items(vec![f.entry("a", "b", None)])])
        .unwrap_err();
    assert!(matches!(err, DataTreeError::KeyMismatch { .. }), "{err}");

    let missing_key_leaf = MapEntryNodeBuilder::new()
        .with_node_identifier(PathArgument::with_predicate(f.q("item"), f.q("id"), "a"))
        .build()
        .unwrap();
    let err = f.commit_top(vec![f.items(vec![missing_key_leaf])]).unwrap_err();
    assert!(err.to_string().contains("missing"), "{err}");

    let wrong_key_name = MapEntryNodeBuilder::new()
        .with_node_identifier(PathArgument::with_predicate(f.q("item"), f.q("label"), "a"))
        .with_child(f.leaf("label", "a"))
        .build()
        .unwrap();
    let err = f.commit_top(vec![f.items(vec![wrong_key_name])]).unwrap_err();
    assert!(matches!(err, DataTreeError::KeyMismatch { .. }), "{err}");
}

#[test]
fn test_write_creates_entry_with_key_leaf() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    let entry = f
        .top_path()
        .node(f.q("item"))
        .node(PathArgument::with_predicate(f.q("item"), f.q("id"), "auto"));
    f.commit(&tree, &entry.clone().node(f.q("label")), f.leaf("label", "made"))
        .unwrap();
    let key = tree.take_snapshot().read_node(&entry.node(f.q("id"))).unwrap();
    assert_eq!(key.value(), Some(&Value::from("auto")));
}

#[test]
fn test_missing_mandatory_rejected() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    let settings = f.q("settings");
    let err = f
        .commit(&tree, &YangInstanceIdentifier::of(settings.clone()), NormalizedNode::empty_container(settings.clone()))
        .unwrap_err();
    assert!(
        matches!(err, DataTreeError::MandatoryMissing { ref node, .. } if node == "mode"),
        "{err}"
    );

    let relaxed = f.tree(DEFAULT_CONFIGURATION.with_mandatory_validation(false));
    f.commit(&relaxed, &YangInstanceIdentifier::of(settings.clone()), NormalizedNode::empty_container(settings))
        .unwrap();
}

#[test]
fn test_list_cardinality_rejected() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![f.items(vec![
            f.entry("a", "a", None),
            f.entry("b", "b", None),
            f.entry("c", "c", None),
        ])])
        .unwrap_err();
    assert!(
        matches!(err, DataTreeError::Cardinality { count: 3, ref allowed, .. } if allowed == "0..2"),
        "{err}"
    );
}

#[test]
fn test_unique_constraint() {
    let f = Fixture::new();
    let dup = || f.items(vec![f.entry("a", "a", Some("same")), f.entry("b", "b", Some("same"))]);
    let err = f.commit_top(vec![dup()]).unwrap_err();
    assert!(matches!(err, DataTreeError::UniqueViolation { .. }), "{err}");

    let tree = f.tree(DEFAULT_CONFIGURATION.with_unique_validation(false));
    f.commit(&tree, &f.top_path(), f.top(vec![dup()])).unwrap();
}

#[test]
fn test_choice_cases_are_exclusive() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![f.leaf("tcp-port", 1u64), f.leaf("udp-port", 2u64)])
        .unwrap_err();
    assert!(matches!(err, DataTreeError::ChoiceConflict { ref choice, .. } if choice == "transport"), "{err}");
}

#[test]
fn test_config_false_write_rejected_in_configuration_tree() {
    let f = Fixture::new();
    let config_tree = f.tree(DEFAULT_CONFIGURATION);
    let err = f
        .commit(&config_tree, &f.top_path(), f.top(vec![f.leaf("status", "up")]))
        .unwrap_err();
    assert!(
        matches!(err, DataTreeError::ConfigFalseWrite { ref path } if path == "/top/status"),
        "{err}"
    );
    let operational = f.tree(DEFAULT_OPERATIONAL);
    f.commit(&operational, &f.top_path(), f.top(vec![f.leaf("status", "up")]))
        .unwrap();
}

fn price(value: i64, fraction_digits: u8) -> Value {
    Value::Decimal64 {
        value,
        fraction_digits,
    }
}

fn offers(f: &Fixture, prices: &[(&str, Value)]) -> NormalizedNode {
    prices
        .iter()
        .fold(MapNodeBuilder::new().with_node_identifier(f.q("offer")), |b, (id, p)| {
            b.with_child(
                MapEntryNodeBuilder::new()
                    .with_node_identifier(PathArgument::with_predicate(f.q("offer"), f.q("id"), *id))
                    .with_child(f.leaf("id", *id))
                    .with_child(f.leaf("price", p.clone()))
                    .build()
                    .unwrap(),
            )
        })
        .build()
        .unwrap()
}

#[test]
fn test_decimal_price_must_use_type_scale() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![offers(&f, &[("a", price(15, 1)), ("b", price(150, 2))])])
        .unwrap_err();
    assert!(
        matches!(err, DataTreeError::InvalidValue { ref path, .. } if path.ends_with("offer[id='a']/price")),
        "{err}"
    );
}

#[test]
fn test_equal_decimal_prices_violate_unique() {
    let f = Fixture::new();
    let err = f
        .commit_top(vec![offers(&f, &[("a", price(150, 2)), ("b", price(150, 2))])])
        .unwrap_err();
    assert!(matches!(err, DataTreeError::UniqueViolation { .. }), "{err}");
    f.commit_top(vec![offers(&f, &[("a", price(150, 2)), ("b", price(151, 2))])])
        .unwrap();
}

#[test]
fn test_oversized_decimal_in_union_is_invalid_not_panic() {
    let f = Fixture::new();
    let err = f.commit_top(vec![f.leaf("code", price(1, 20))]).unwrap_err();
    assert!(matches!(err, DataTreeError::InvalidValue { ref path, .. } if path == "/top/code"), "{err}");
    f.commit_top(vec![f.leaf("code", Value::Int(-3))]).unwrap();
}

#[test]
fn test_json_integer_encoding_follows_leaf_type() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    f.commit(
        &tree,
        &f.top_path(),
        f.top(vec![
            f.leaf("count", 7u64),
            f.leaf("total", Value::Int(5)),
            f.leaf("code", Value::Int(-3)),
            offers(&f, &[("a", price(150, 2))]),
        ]),
    )
    .unwrap();
    assert_eq!(
        tree.take_snapshot().to_json(),
        json!({"test-data:top": {
            "count": 7,
            "total": "5",
            "code": -3,
            "offer": [{"id": "a", "price": "1.5"}]
        }})
    );
}

#[test]
fn test_leafref_requires_instance() {
    let f = Fixture::new();
    let err = f.commit_top(vec![f.leaf("item-ref", "ghost")]).unwrap_err();
    assert!(
        matches!(err, DataTreeError::LeafrefMissingInstance { ref value, .. } if value == "ghost"),
        "{err}"
    );
    f.commit_top(vec![f.items(vec![f.entry("ghost", "ghost", None)]), f.leaf("item-ref", "ghost")])
        .unwrap();
}

// ─── Lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_stale_candidate_fails_to_commit() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);

    let mut first = tree.take_snapshot().new_modification();
    first.write(&f.top_path(), f.top(vec![f.leaf("name", "one")])).unwrap();
    let first = tree.prepare(first.ready()).unwrap();

    let mut second = tree.take_snapshot().new_modification();
    second
        .write(&YangInstanceIdentifier::of(f.q("settings")), ContainerNodeBuilder::new()
            .with_node_identifier(f.q("settings"))
            .with_child(f.leaf("mode", "fast"))
            .build()
            .unwrap())
        .unwrap();
    let second = tree.prepare(second.ready()).unwrap();

    tree.commit(first).unwrap();
    let err = tree.commit(second).unwrap_err();
    assert_eq!(
        err,
        DataTreeError::StaleCandidate {
            base_version: 0,
            current_version: 1
        }
    );
    assert_eq!(tree.version(), 1);
}

#[test]
fn test_conflicting_modification_rejected_at_validate() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    let base = tree.take_snapshot();
    let name_path = f.top_path().node(f.q("name"));

    let mut late = base.new_modification();
    late.write(&name_path, f.leaf("name", "late")).unwrap();
    let late = late.ready();

    f.commit(&tree, &name_path, f.leaf("name", "early")).unwrap();
    let err = tree.validate(&late).unwrap_err();
    assert!(matches!(err, DataTreeError::ConflictingModification { .. }), "{err}");
}

#[test]
fn test_disjoint_modifications_both_commit() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    let base = tree.take_snapshot();

    let mut settings = base.new_modification();
    settings
        .write(&YangInstanceIdentifier::of(f.q("settings")), ContainerNodeBuilder::new()
            .with_node_identifier(f.q("settings"))
            .with_child(f.leaf("mode", "fast"))
            .build()
            .unwrap())
        .unwrap();
    let settings = settings.ready();

    f.commit(&tree, &f.top_path(), f.top(vec![f.leaf("name", "first")])).unwrap();
    let candidate = tree.prepare(settings).unwrap();
    assert_eq!(candidate.base_version(), 1);
    tree.commit(candidate).unwrap();

    let snapshot = tree.take_snapshot();
    assert!(snapshot.read_node(&f.top_path().node(f.q("name"))).is_some());
    assert!(snapshot.read_node(&YangInstanceIdentifier::of(f.q("settings"))).is_some());
    assert!(base.read_node(&f.top_path()).is_none());
}

#[test]
fn test_candidate_records_delete_and_merge() {
    let f = Fixture::new();
    let tree = f.tree(DEFAULT_CONFIGURATION);
    f.commit(&tree, &f.top_path(), f.top(vec![f.leaf("name", "x"), f.leaf("count", 1u64)]))
        .unwrap();

    let mut m = tree.take_snapshot().new_modification();
    m.delete(&f.top_path().node(f.q("count"))).unwrap();
    m.merge(&f.top_path(), f.top(vec![f.leaf("name", "y")])).unwrap();
    let candidate = tree.prepare(m.ready()).unwrap();

    let kinds: Vec<ModificationType> = candidate.changes().iter().map(|c| c.modification_type).collect();
    assert_eq!(kinds, vec![ModificationType::Delete, ModificationType::SubtreeModified]);
    tree.commit(candidate).unwrap();

    let top = tree.take_snapshot().read_node(&f.top_path()).unwrap();
    assert!(top.child(&PathArgument::node(f.q("count"))).is_none());
    assert_eq!(
        top.child(&PathArgument::node(f.q("name"))).and_then(|n| n.value().cloned()),
        Some(Value::from("y"))
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_committed_names_read_back(name in "[a-z]{1,8}") {
        let f = Fixture::new();
        let tree = f.tree(DEFAULT_CONFIGURATION);
        let path = f.top_path().node(f.q("name"));
        f.commit(&tree, &path, f.leaf("name", name.as_str())).unwrap();
        let read = tree.take_snapshot().read_node(&path).unwrap();
        prop_assert_eq!(read.value(), Some(&Value::from(name.as_str())));
    }
}
