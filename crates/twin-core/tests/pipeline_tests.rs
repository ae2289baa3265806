use pretty_assertions::{assert_eq, assert_ne};
use std::collections::BTreeSet;
use std::path::Path;
use twin_core::{
    BasicEmitter, ConfigEmitter, EmittedConfig, LogFormat, ReplicaConfig, ReplicaError,
    ReplicaPipeline,
};
use twin_graph::{AbstractedView, Representation, Topology};
use twin_model::{AbstractedId, ConfigTree, DEPENDS_ON_KEY, ResourceAddress};
use twin_split::{CommunityDetector, FnDetector, SplitError, MANIFEST_FILE};
use twin_test_utils as fixtures;
use twin_validate::ValidationError;

/// Ignores the graph and hands out a prepared configuration
#[derive(Debug)]
struct FixedEmitter(ConfigTree);

impl ConfigEmitter for FixedEmitter {
    fn name(&self) -> &str {
        "fixed"
    }

    fn emit(&self, _view: &AbstractedView<'_>) -> Result<EmittedConfig, ReplicaError> {
        Ok(EmittedConfig {
            config: self.0.clone(),
            addresses: Default::default(),
        })
    }
}

fn fixed_communities(sets: &'static [&'static [&'static str]]) -> Box<dyn CommunityDetector> {
    Box::new(FnDetector::new("fixed", move |_: &Topology| -> Vec<BTreeSet<AbstractedId>> {
        sets.iter()
            .map(|ids| ids.iter().map(|id| AbstractedId::new(*id)).collect())
            .collect()
    }))
}

fn config(out: &Path) -> ReplicaConfig {
    ReplicaConfig::new().with_output_dir(out)
}

fn resources() -> Vec<twin_model::DiscoveredResource> {
    let mut resources = fixtures::sample_resources();
    resources.push(fixtures::vnet("vnet2"));
    resources
}

fn abstracted_ids(pipeline: &ReplicaPipeline) -> Vec<AbstractedId> {
    pipeline.store().abstracted().iter().map(|n| n.id.clone()).collect()
}

#[test]
fn test_end_to_end_one_file_per_component() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ReplicaPipeline::from_config(
        &config(dir.path()),
        Box::new(BasicEmitter::new().with_shared_blocks(fixtures::shared_blocks())),
    )
    .unwrap();

    let report = pipeline
        .run(&resources(), &fixtures::sample_relationships())
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.ingest.pairs_created, 5);
    assert_eq!(report.ingest.edges_created, 3);
    assert!(report.integrity.is_consistent());
    assert_eq!(report.manifest.total_communities, 2);
    assert_eq!(report.manifest.total_resources, 5);
    assert_eq!(report.files.len(), 3);
    assert!(report.files[2].ends_with(MANIFEST_FILE));
    assert_eq!(report.manifest.entry(0).unwrap().resource_count, 4);

    // Only abstracted identifiers reach the output
    for path in &report.files {
        let content = std::fs::read_to_string(path).unwrap();
        assert!(!content.contains(fixtures::SUBSCRIPTION), "{}", path.display());
        assert!(!content.contains(fixtures::RESOURCE_GROUP), "{}", path.display());
    }
}

#[test]
fn test_rerun_merges_instead_of_duplicating() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline =
        ReplicaPipeline::from_config(&config(dir.path()), Box::new(BasicEmitter::new())).unwrap();

    let first = pipeline.run(&resources(), &fixtures::sample_relationships()).unwrap();
    let second = pipeline.run(&resources(), &fixtures::sample_relationships()).unwrap();

    assert_eq!(second.ingest.pairs_created, 0);
    assert_eq!(second.ingest.pairs_updated, 5);
    assert_eq!(second.ingest.edges_created, 0);
    assert_eq!(pipeline.store().node_count(Representation::Original), 5);
    assert_eq!(pipeline.store().node_count(Representation::Abstracted), 5);
    assert_eq!(first.files, second.files);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn test_seed_directory_keeps_ids_stable_across_pipelines() {
    let seeds = tempfile::tempdir().unwrap();
    let (out_a, out_b) = (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap());

    let a = ReplicaPipeline::from_config(
        &config(out_a.path()).with_seed_dir(seeds.path()),
        Box::new(BasicEmitter::new()),
    )
    .unwrap();
    let b = ReplicaPipeline::from_config(
        &config(out_b.path()).with_seed_dir(seeds.path()),
        Box::new(BasicEmitter::new()),
    )
    .unwrap();

    a.run(&resources(), &[]).unwrap();
    b.run(&resources(), &[]).unwrap();
    assert_eq!(abstracted_ids(&a), abstracted_ids(&b));

    let out_c = tempfile::tempdir().unwrap();
    let c = ReplicaPipeline::from_config(
        &config(out_c.path()),
        Box::new(BasicEmitter::new()),
    )
    .unwrap();
    c.run(&resources(), &[]).unwrap();
    assert_ne!(abstracted_ids(&a), abstracted_ids(&c));
}

#[test]
fn test_unresolved_parent_is_reported_not_fabricated() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ReplicaPipeline::from_config(
        &config(dir.path()),
        Box::new(FixedEmitter(fixtures::dns_link_config("z", false))),
    )
    .unwrap()
    .with_detector(fixed_communities(&[&["link1", "vnet1"]]));

    let report = pipeline.run(&[], &[]).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.validation.violation_count(), 1);
    assert_eq!(report.manifest.total_resources, 2);

    let written = ConfigTree::from_json(&std::fs::read_to_string(&report.files[0]).unwrap()).unwrap();
    let link = written
        .resource(&ResourceAddress::new(
            "azurerm_private_dns_zone_virtual_network_link",
            "link1",
        ))
        .unwrap();
    assert_eq!(link[DEPENDS_ON_KEY], serde_json::json!(["azurerm_virtual_network.vnet1"]));
    assert!(written.resources_of_type("azurerm_private_dns_zone").is_empty());

    match report.into_result() {
        Err(ReplicaError::Validation(ValidationError::UnresolvedParentDependency { violations })) => {
            assert_eq!(violations[0].parent_name.as_deref(), Some("z"));
        }
        other => panic!("expected unresolved parent, got {other:?}"),
    }
}

#[test]
fn test_cross_community_reference_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("replica");
    let pipeline = ReplicaPipeline::from_config(
        &config(&out),
        Box::new(FixedEmitter(fixtures::cross_reference_config())),
    )
    .unwrap()
    .with_detector(fixed_communities(&[&["vm1", "nic1"], &["vnet1", "subnet1"]]));

    let err = pipeline.run(&[], &[]).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        ReplicaError::Split(SplitError::CrossCommunityReference { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn test_repaired_dependency_across_communities_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("replica");
    let pipeline = ReplicaPipeline::from_config(
        &config(&out),
        Box::new(FixedEmitter(fixtures::dns_link_config("z", true))),
    )
    .unwrap()
    .with_detector(fixed_communities(&[&["link1", "vnet1"], &["z"]]));

    match pipeline.run(&[], &[]) {
        Err(ReplicaError::Split(SplitError::CrossCommunityReference { violations })) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(
                violations[0].from,
                ResourceAddress::new("azurerm_private_dns_zone_virtual_network_link", "link1")
            );
            assert_eq!(violations[0].to, ResourceAddress::new("azurerm_private_dns_zone", "z"));
            assert_eq!(violations[0].to_community, Some(1));
        }
        other => panic!("expected cross-community reference, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_config_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("replica.toml");
    std::fs::write(&toml_path, "digest_bytes = 24\nauto_fix_dependencies = false\n").unwrap();
    let from_toml = ReplicaConfig::from_file(&toml_path).unwrap();
    assert_eq!(from_toml.digest_bytes, 24);
    assert!(!from_toml.auto_fix_dependencies);

    let yaml_path = dir.path().join("replica.yml");
    std::fs::write(
        &yaml_path,
        "log_format: json\ndependency_rules:\n  - name: plan\n    child_type: azurerm_linux_web_app\n    parent_type: azurerm_service_plan\n    reference_fields: [service_plan_id]\n",
    )
    .unwrap();
    let from_yaml = ReplicaConfig::from_file(&yaml_path).unwrap();
    assert_eq!(from_yaml.log_format, LogFormat::Json);
    assert_eq!(from_yaml.dependency_rules[0].reference_fields.len(), 1);

    let json_path = dir.path().join("replica.json");
    std::fs::write(&json_path, "{}").unwrap();
    assert!(matches!(
        ReplicaConfig::from_file(&json_path),
        Err(ReplicaError::UnsupportedFormat(_))
    ));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "digest_bytes = 64\n").unwrap();
    assert!(matches!(ReplicaConfig::from_file(&bad), Err(ReplicaError::Config(_))));
}
