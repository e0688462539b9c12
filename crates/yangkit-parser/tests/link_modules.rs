//! Integration tests: link the bundled RFC 8345 resources and small inline
//! modules exercising groupings, augments, choices, features, and errors.

use std::collections::BTreeSet;
use std::path::PathBuf;

use yangkit_core::{QName, QNameModule, Revision};
use yangkit_model::{BaseType, DataSchemaNode, SchemaContext};
use yangkit_parser::{DefaultYangParserFactory, ParserError, YangParser, YangParserFactory, YangTextSchemaSource};

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
    parser
        .add_source(
            &YangTextSchemaSource::for_resource(&resources, "/mainSources/ietf-network@2018-02-26.yang").unwrap(),
        )
        .unwrap()
        .add_source(
            &YangTextSchemaSource::for_resource(&resources, "/mainSources/ietf-network-topology@2018-02-26.yang")
                .unwrap(),
        )
        .unwrap()
        .add_lib_source(
            &YangTextSchemaSource::for_resource(&resources, "/all_the_modules/ietf-inet-types@2013-07-15.yang")
                .unwrap(),
        )
        .unwrap();
    parser.build_schema_context().unwrap()
}

fn build(sources: &[(&str, &str)]) -> Result<SchemaContext, ParserError> {
    let mut parser = DefaultYangParserFactory.create_parser();
    for (name, text) in sources {
        parser.add_source(&YangTextSchemaSource::from_string(name, *text)?)?;
    }
    parser.build_schema_context()
}

fn q(namespace: &str, local: &str) -> QName {
    QName::create(&QNameModule::create(namespace, None).unwrap(), local).unwrap()
}

const NT: &str = "urn:ietf:params:xml:ns:yang:ietf-network-topology";
const NW: &str = "urn:ietf:params:xml:ns:yang:ietf-network";

fn nt(local: &str, revision: Revision) -> QName {
    QName::create(&QNameModule::create(NT, Some(revision)).unwrap(), local).unwrap()
}

fn nw(local: &str, revision: Revision) -> QName {
    QName::create(&QNameModule::create(NW, Some(revision)).unwrap(), local).unwrap()
}

// ─── Bundled resources ──────────────────────────────────────────────

#[test]
fn test_bundled_resources_link() {
    let context = bundled_context();
    let names: Vec<&str> = context.modules().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["ietf-inet-types", "ietf-network", "ietf-network-topology"]);
}

#[test]
fn test_topology_module_shape() {
    let context = bundled_context();
    let rev = Revision::of("2018-02-26").unwrap();
    let module = context.find_module("ietf-network-topology", Some(rev)).unwrap();
    assert_eq!(module.name(), "ietf-network-topology");
    assert_eq!(module.revision(), Some(rev));
    assert_eq!(module.augmentations().len(), 2);
    assert_eq!(module.groupings().len(), 2);
    assert!(module.rpcs().is_empty());

    let path = [nt("cont", rev), nt("cont2", rev), nt("foo", rev)];
    match module.find_data_tree_child(&path) {
        Some(DataSchemaNode::Leaf(leaf)) => {
            assert_eq!(leaf.info.qname.local_name(), "foo");
            assert_eq!(leaf.type_.display_name(), "string");
        }
        other => panic!("expected leaf foo, got {other:?}"),
    }

    let list = module
        .find_data_tree_child(&[nt("cont", rev), nt("cont2", rev), nt("list1", rev)])
        .unwrap();
    match list {
        DataSchemaNode::List(list) => assert_eq!(list.key, vec![nt("name", rev)]),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_augments_land_in_target_module() {
    let context = bundled_context();
    let rev = Revision::of("2018-02-26").unwrap();

    let link = context
        .find_data_tree_child(&[nw("networks", rev), nw("network", rev), nt("link", rev)])
        .unwrap();
    assert!(link.info().augmenting);
    assert!(matches!(link, DataSchemaNode::List(_)));

    let tp = context
        .find_data_tree_child(&[
            nw("networks", rev),
            nw("network", rev),
            nw("node", rev),
            nt("termination-point", rev),
        ])
        .unwrap();
    match tp {
        DataSchemaNode::List(list) => assert_eq!(list.key, vec![nt("tp-id", rev)]),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_grouping_instantiation_uses_using_namespace() {
    let context = bundled_context();
    let rev = Revision::of("2018-02-26").unwrap();
    let module = context.find_module("ietf-network-topology", None).unwrap();
    let link_ref = module
        .groupings()
        .iter()
        .find(|g| g.qname.local_name() == "link-ref")
        .unwrap();
    let names: Vec<&QName> = link_ref.children.iter().map(DataSchemaNode::qname).collect();
    assert_eq!(names, vec![&nt("link-ref", rev), &nt("network-ref", rev)]);
    let network_ref = &link_ref.children[1];
    assert!(network_ref.info().added_by_uses);
    match network_ref {
        DataSchemaNode::Leaf(leaf) => match &leaf.type_.base {
            BaseType::LeafRef { path, require_instance } => {
                assert!(!require_instance);
                assert!(path.absolute);
            }
            other => panic!("expected leafref, got {other:?}"),
        },
        other => panic!("expected leaf, got {other:?}"),
    }
}

#[test]
fn test_typedef_chain_through_imported_module() {
    let context = bundled_context();
    let rev = Revision::of("2018-02-26").unwrap();
    let leaf = context
        .find_data_tree_child(&[nw("networks", rev), nw("network", rev), nw("network-id", rev)])
        .unwrap();
    match leaf {
        DataSchemaNode::Leaf(leaf) => {
            assert_eq!(leaf.type_.display_name(), "network-id");
            assert!(matches!(leaf.type_.base, BaseType::String { .. }));
        }
        other => panic!("expected leaf, got {other:?}"),
    }
    let inet = context.find_module("ietf-inet-types", None).unwrap();
    assert_eq!(inet.revisions.len(), 2);
    assert_eq!(inet.revision(), Some(Revision::of("2013-07-15").unwrap()));
}

// ─── Inline modules ─────────────────────────────────────────────────

const REFINE: &str = r#"
module refine {
  yang-version 1.1;
  namespace "urn:test:refine";
  prefix r;

  grouping endpoint {
    leaf address { type string; }
    leaf port { type uint16 { range "1..65535"; } default 830; }
    container options {
      leaf retries { type uint8; }
    }
  }

  container server {
    uses endpoint {
      refine port { default 22; description "SSH port."; }
      refine address { mandatory true; }
      augment options {
        leaf timeout { type uint32; units seconds; }
      }
    }
  }
}
"#;

#[test]
fn test_refine_and_uses_augment() {
    let context = build(&[("refine.yang", REFINE)]).unwrap();
    let port = context
        .find_data_tree_child(&[q("urn:test:refine", "server"), q("urn:test:refine", "port")])
        .unwrap();
    match port {
        DataSchemaNode::Leaf(leaf) => {
            assert_eq!(leaf.default.as_deref(), Some("22"));
            assert_eq!(leaf.info.description.as_deref(), Some("SSH port."));
            assert!(leaf.info.added_by_uses);
        }
        other => panic!("expected leaf, got {other:?}"),
    }
    match context
        .find_data_tree_child(&[q("urn:test:refine", "server"), q("urn:test:refine", "address")])
        .unwrap()
    {
        DataSchemaNode::Leaf(leaf) => assert!(leaf.mandatory),
        other => panic!("expected leaf, got {other:?}"),
    }
    match context
        .find_data_tree_child(&[
            q("urn:test:refine", "server"),
            q("urn:test:refine", "options"),
            q("urn:test:refine", "timeout"),
        ])
        .unwrap()
    {
        DataSchemaNode::Leaf(leaf) => {
            assert!(leaf.info.augmenting);
            assert_eq!(leaf.units.as_deref(), Some("seconds"));
        }
        other => panic!("expected leaf, got {other:?}"),
    }
}

const CHOICE: &str = r#"
module shapes {
  namespace "urn:test:shapes";
  prefix s;

  container shape {
    choice kind {
      default circle;
      case circle {
        leaf radius { type decimal64 { fraction-digits 2; } }
      }
      leaf side { type uint32; }
    }
  }

  augment "/s:shape/s:kind" {
    case triangle {
      leaf base { type uint32; }
      leaf height { type uint32; }
    }
  }
}
"#;

#[test]
fn test_choice_shorthand_and_augment_into_choice() {
    let context = build(&[("shapes.yang", CHOICE)]).unwrap();
    let ns = "urn:test:shapes";
    let shape = context.data_child(&q(ns, "shape")).unwrap();
    match &shape.children()[0] {
        DataSchemaNode::Choice(choice) => {
            let cases: Vec<&str> = choice.cases.iter().map(|c| c.info.qname.local_name()).collect();
            assert_eq!(cases, vec!["circle", "side", "triangle"]);
            assert_eq!(choice.default_case, Some(q(ns, "circle")));
        }
        other => panic!("expected choice, got {other:?}"),
    }
    // Data children are found through choice and case.
    assert!(shape.data_child(&q(ns, "height")).is_some());
    assert!(context.find_data_tree_child(&[q(ns, "shape"), q(ns, "side")]).is_some());
}

const FEATURES: &str = r#"
module feat {
  yang-version 1.1;
  namespace "urn:test:feat";
  prefix f;

  feature fast;
  feature turbo { if-feature fast; }

  container engine {
    leaf speed { type uint32; }
    leaf boost { if-feature "fast and turbo"; type boolean; }
    leaf eco { if-feature "not fast"; type boolean; }
  }
}
"#;

fn feature_context(features: Option<&[&str]>) -> SchemaContext {
    let mut parser = DefaultYangParserFactory.create_parser();
    parser
        .add_source(&YangTextSchemaSource::from_string("feat.yang", FEATURES).unwrap())
        .unwrap();
    if let Some(list) = features {
        parser.set_supported_features(list.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>());
    }
    parser.build_schema_context().unwrap()
}

#[test]
fn test_if_feature_all_supported_by_default() {
    let context = feature_context(None);
    let engine = context.data_child(&q("urn:test:feat", "engine")).unwrap();
    let names: Vec<&str> = engine.children().iter().map(|c| c.qname().local_name()).collect();
    assert_eq!(names, vec!["speed", "boost"]);
}

#[test]
fn test_if_feature_with_restricted_set() {
    let context = feature_context(Some(&["feat:turbo"]));
    let engine = context.data_child(&q("urn:test:feat", "engine")).unwrap();
    let names: Vec<&str> = engine.children().iter().map(|c| c.qname().local_name()).collect();
    // turbo depends on fast, which is not enabled.
    assert_eq!(names, vec!["speed", "eco"]);
    let module = context.find_module("feat", None).unwrap();
    assert!(module.features.iter().all(|f| !f.supported));
}

const CONFIG: &str = r#"
module state {
  namespace "urn:test:state";
  prefix st;

  container stats {
    config false;
    list counter {
      leaf name { type string; }
      leaf value { type uint64; }
    }
  }
  rpc reset {
    input { leaf name { type string; } }
    output { leaf ok { type boolean; } }
  }
  notification overflow {
    leaf name { type string; }
  }
}
"#;

#[test]
fn test_config_false_lists_need_no_key() {
    let context = build(&[("state.yang", CONFIG)]).unwrap();
    let stats = context.data_child(&q("urn:test:state", "stats")).unwrap();
    assert!(!stats.is_config());
    assert!(stats.children().iter().all(|c| !c.is_config()));
    let module = context.find_module("state", None).unwrap();
    assert_eq!(module.rpcs.len(), 1);
    assert_eq!(module.rpcs[0].input.len(), 1);
    assert_eq!(module.rpcs[0].output.len(), 1);
    assert_eq!(module.notifications.len(), 1);
    assert_eq!(context.rpcs().count(), 1);
}

#[test]
fn test_submodule_include() {
    let main = r#"
        module parent {
          namespace "urn:test:parent";
          prefix p;
          include child;
          container top { uses shared; }
        }
    "#;
    let sub = r#"
        submodule child {
          belongs-to parent { prefix p; }
          grouping shared { leaf id { type p:ident; } }
          typedef ident { type string { length "1..8"; } }
        }
    "#;
    let mut parser = DefaultYangParserFactory.create_parser();
    parser
        .add_source(&YangTextSchemaSource::from_string("parent.yang", main).unwrap())
        .unwrap()
        .add_lib_source(&YangTextSchemaSource::from_string("child.yang", sub).unwrap())
        .unwrap();
    let context = parser.build_schema_context().unwrap();
    let module = context.find_module("parent", None).unwrap();
    assert_eq!(module.submodules, vec!["child".to_string()]);
    assert!(context
        .find_data_tree_child(&[q("urn:test:parent", "top"), q("urn:test:parent", "id")])
        .is_some());
}

#[test]
fn test_import_revision_date_selects_exact_revision() {
    let old = r#"module lib { namespace "urn:test:lib"; prefix l; revision 2019-01-01; typedef t { type int8; } }"#;
    let new = r#"module lib { namespace "urn:test:lib"; prefix l; revision 2021-01-01; typedef t { type string; } }"#;
    let user = r#"
        module user {
          namespace "urn:test:user";
          prefix u;
          import lib { prefix l; revision-date 2019-01-01; }
          leaf v { type l:t; }
        }
    "#;
    let mut parser = DefaultYangParserFactory.create_parser();
    parser
        .add_source(&YangTextSchemaSource::from_string("user.yang", user).unwrap())
        .unwrap()
        .add_lib_source(&YangTextSchemaSource::from_string("lib@2019-01-01.yang", old).unwrap())
        .unwrap()
        .add_lib_source(&YangTextSchemaSource::from_string("lib@2021-01-01.yang", new).unwrap())
        .unwrap();
    let context = parser.build_schema_context().unwrap();
    assert_eq!(context.modules().len(), 2);
    let module = context.find_module("user", None).unwrap();
    assert_eq!(module.imports[0].resolved_revision, Some(Revision::of("2019-01-01").unwrap()));
    match context.data_child(&q("urn:test:user", "v")).unwrap() {
        DataSchemaNode::Leaf(leaf) => assert!(matches!(leaf.type_.base, BaseType::Integer { .. })),
        other => panic!("expected leaf, got {other:?}"),
    }
}

// ─── Link errors ────────────────────────────────────────────────────

fn link_error(body: &str) -> ParserError {
    let text = format!("module bad {{ namespace \"urn:test:bad\"; prefix b; {body} }}");
    build(&[("bad.yang", text.as_str())]).unwrap_err()
}

#[test]
fn test_unknown_type_is_unresolved() {
    let err = link_error("leaf x { type missing-type; }");
    assert!(matches!(err, ParserError::Unresolved { kind: "type", .. }), "{err}");
}

#[test]
fn test_unknown_grouping_is_unresolved() {
    let err = link_error("container c { uses nowhere; }");
    assert!(matches!(err, ParserError::Unresolved { kind: "grouping", .. }), "{err}");
}

#[test]
fn test_unknown_prefix_is_unresolved() {
    let err = link_error("leaf x { type z:t; }");
    assert!(matches!(err, ParserError::Unresolved { kind: "prefix", .. }), "{err}");
}

#[test]
fn test_augment_with_missing_target() {
    let err = link_error("container c; augment \"/b:nothing\" { leaf x { type string; } }");
    assert!(matches!(err, ParserError::InvalidAugmentTarget { ref target, .. } if target == "/b:nothing"), "{err}");
}

#[test]
fn test_list_key_must_name_a_leaf() {
    let err = link_error("list l { key id; container id; }");
    assert!(matches!(err, ParserError::Semantic { .. }), "{err}");
    assert!(err.to_string().contains("invalid key"));
}

#[test]
fn test_config_list_requires_key() {
    let err = link_error("list l { leaf id { type string; } }");
    assert!(err.to_string().contains("must declare a key"), "{err}");
}

#[test]
fn test_config_true_under_config_false() {
    let err = link_error("container c { config false; leaf x { config true; type string; } }");
    assert!(err.to_string().contains("config false parent"), "{err}");
}

#[test]
fn test_invalid_default_rejected() {
    let err = link_error("leaf x { type uint8; default 300; }");
    assert!(err.to_string().contains("invalid default"), "{err}");
}

#[test]
fn test_invalid_pattern_rejected() {
    let err = link_error("leaf x { type string { pattern '[a-'; } }");
    assert!(err.to_string().contains("pattern"), "{err}");
}

#[test]
fn test_duplicate_sibling_rejected() {
    let err = link_error("leaf x { type string; } leaf x { type int8; }");
    assert!(err.to_string().contains("defined twice"), "{err}");
}

#[test]
fn test_recursive_grouping_rejected() {
    let err = link_error("grouping g { container c { uses g; } }");
    assert!(err.to_string().contains("nests too deeply"), "{err}");
}
