use pretty_assertions::assert_eq;

use crate::{self as keystone, *};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn resource_name_without_optional_components() {
    init_logging();
    let name = ResourceNameParts::new("prod", "orders", "table")
        .compose()
        .unwrap();
    assert_eq!("prod-orders-table", name);
}

#[test]
fn resource_name_with_all_components() {
    let parts = ResourceNameParts::new("develop", "update-user", "queue")
        .with_suffix("dlq")
        .with_region("eu-west-2");
    assert_eq!(
        "develop-update-user-queue-dlq-eu-west-2",
        compose_resource_name(&parts).unwrap()
    );
}

#[test]
fn empty_components_do_not_double_the_separator() {
    let parts = ResourceNameParts::new("prod", "orders", "table")
        .with_suffix("")
        .with_region("");
    assert_eq!("prod-orders-table", parts.compose().unwrap());

    let parts = ResourceNameParts::new("prod", "", "table").with_region("us-east-1");
    assert_eq!("prod-table-us-east-1", parts.compose().unwrap());
}

#[test]
fn resource_name_is_lowercased_after_joining() {
    let parts = ResourceNameParts::new("Develop", "Orders", "QUEUE");
    assert_eq!("develop-orders-queue", parts.compose().unwrap());
}

#[test]
fn resource_name_is_deterministic() {
    let parts = ResourceNameParts::new("test", "billing", "function").with_suffix("v2");
    assert_eq!(parts.compose().unwrap(), parts.compose().unwrap());
}

#[test]
fn resource_name_length_boundary() {
    // "prod-" + service + "-table" is 11 characters plus the service.
    let at_limit = ResourceNameParts::new("prod", "s".repeat(53), "table");
    let name = at_limit.compose().unwrap();
    assert_eq!(RESOURCE_NAME_MAX_LEN, name.len());

    let over_limit = ResourceNameParts::new("prod", "s".repeat(54), "table");
    let err = over_limit.compose().unwrap_err();
    assert_eq!(
        keystone::Error::NameTooLong {
            name: format!("prod-{}-table", "s".repeat(54)),
            limit: 64,
        },
        err
    );
    assert!(err
        .to_string()
        .ends_with("exceeds the maximum allowed length of 64 characters"));
}

#[test]
fn bucket_name_always_has_bucket_segment() {
    assert_eq!(
        "prod-assets-bucket",
        BucketNameParts::new("prod", "assets").compose().unwrap()
    );
    assert_eq!(
        "staging-assets-bucket-logs-eu-west-1",
        compose_bucket_name(
            &BucketNameParts::new("Staging", "Assets")
                .with_suffix("logs")
                .with_region("eu-west-1")
        )
        .unwrap()
    );
}

#[test]
fn bucket_name_floor_is_reported_before_anything_else() {
    let err = BucketNameParts::new("a", "").compose().unwrap_err();
    assert_eq!(
        keystone::Error::NameTooShort {
            name: "a".to_owned(),
            min: BUCKET_NAME_MIN_LEN,
        },
        err
    );

    // Too short and also containing an invalid character.
    let err = BucketNameParts::new("_", "").compose().unwrap_err();
    assert!(matches!(err, keystone::Error::NameTooShort { .. }), "{err}");
}

#[test]
fn bucket_name_ceiling() {
    // "prod-" + service + "-bucket" is 12 characters plus the service.
    let name = BucketNameParts::new("prod", "a".repeat(51))
        .compose()
        .unwrap();
    assert_eq!(BUCKET_NAME_MAX_LEN, name.len());

    let err = BucketNameParts::new("prod", "a".repeat(52))
        .compose()
        .unwrap_err();
    assert!(
        matches!(err, keystone::Error::NameTooLong { limit: 63, .. }),
        "{err}"
    );
}

#[test]
fn bucket_name_character_class() {
    let err = BucketNameParts::new("staging", "/").compose().unwrap_err();
    assert_eq!(
        keystone::Error::InvalidNameCharacters {
            name: "staging-/-bucket".to_owned(),
        },
        err
    );
    assert!(err.to_string().contains("'staging-/-bucket'"));

    let err = BucketNameParts::new("prod", "assets")
        .with_region("eu_west_1")
        .compose()
        .unwrap_err();
    assert!(
        matches!(err, keystone::Error::InvalidNameCharacters { .. }),
        "{err}"
    );

    let err = BucketNameParts::new("prod", "assets")
        .with_suffix("logs.")
        .compose()
        .unwrap_err();
    assert!(
        matches!(err, keystone::Error::InvalidNameCharacters { .. }),
        "must end alphanumeric: {err}"
    );

    assert_eq!(
        "prod-assets.v2-bucket",
        BucketNameParts::new("prod", "assets.v2").compose().unwrap()
    );
}

fn stack_with(tags: &[(&str, &str)]) -> Construct {
    Construct::stack("OrdersStack")
        .with_tags(tags.iter().copied().collect())
        .with_child(Construct::resource("Table", "AWS::DynamoDB::Table"))
}

#[test]
fn compliant_unit_has_no_diagnostics() {
    init_logging();
    let stack = stack_with(&[
        ("Environment", "prod"),
        ("Owner", "orders-team"),
        ("Project", "shop"),
    ]);
    let diagnostics = check_required_tags(&stack, ["Environment", "Owner", "Project"]);
    assert!(diagnostics.is_empty(), "{diagnostics}");
}

#[test]
fn untagged_unit_reports_no_tags_then_each_missing_key() {
    let stack = stack_with(&[]);
    let diagnostics = check_required_tags(&stack, ["Environment"]);
    assert_eq!(
        vec![
            DiagnosticKind::NoTagsPresent,
            DiagnosticKind::MissingRequiredTag {
                key: "Environment".to_owned()
            },
        ],
        diagnostics
            .iter()
            .map(|d| d.kind.clone())
            .collect::<Vec<_>>()
    );
    assert!(diagnostics.iter().all(|d| d.unit == "OrdersStack"));
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn partially_tagged_unit_reports_missing_keys_in_declared_order() {
    let stack = stack_with(&[("Environment", "develop")]);
    let diagnostics = check_required_tags(&stack, ["Environment", "Project", "Owner"]);
    let missing = diagnostics
        .iter()
        .map(|d| match &d.kind {
            DiagnosticKind::MissingRequiredTag { key } => key.as_str(),
            DiagnosticKind::NoTagsPresent => "<none>",
        })
        .collect::<Vec<_>>();
    assert_eq!(vec!["Project", "Owner"], missing);
}

#[test]
fn tag_keys_are_case_sensitive() {
    let stack = stack_with(&[("environment", "prod")]);
    let diagnostics = check_required_tags(&stack, ["Environment"]);
    assert_eq!(1, diagnostics.len());
}

#[test]
fn non_unit_nodes_are_inert() {
    let resource = Construct::resource("Queue", "AWS::SQS::Queue");
    let mut visitor = RequiredTags::new(["Environment", "Owner"]);
    let mut diagnostics = Diagnostics::default();
    visitor.visit(&resource, &mut diagnostics);
    assert!(diagnostics.is_empty());

    // An untagged resource nested in a compliant stack is not reported.
    let stack = Construct::stack("Api")
        .with_tag("Environment", "prod")
        .with_tag("Owner", "api-team")
        .with_child(Construct::resource("Handler", "AWS::Lambda::Function"));
    assert!(check_required_tags(&stack, ["Environment", "Owner"]).is_empty());
}

#[test]
fn every_unit_in_the_tree_is_audited() {
    let app = Construct::stack("App")
        .with_tag("Environment", "prod")
        .with_child(
            Construct::stack("Storage")
                .with_child(Construct::resource("Bucket", "AWS::S3::Bucket"))
                .with_child(Construct::stack("Backups").with_tag("Owner", "ops")),
        )
        .with_child(Construct::stack("Cdn").with_tag("Environment", "prod"));

    let diagnostics = check_required_tags(&app, ["Environment"]);
    let units = diagnostics
        .iter()
        .map(|d| d.unit.as_str())
        .collect::<Vec<_>>();
    assert_eq!(vec!["Storage", "Storage", "Backups"], units);
    assert_eq!(2, diagnostics.for_unit("Storage").count());
    assert_eq!(0, diagnostics.for_unit("Cdn").count());
    assert!(diagnostics.has_errors());
}

#[test]
fn walk_visits_every_node_once_parents_first() {
    struct Recorder(Vec<String>);

    impl Visitor for Recorder {
        fn visit(&mut self, node: &dyn Node, _: &mut Diagnostics) {
            self.0.push(node.name().to_owned());
        }
    }

    let tree = Construct::stack("A")
        .with_child(
            Construct::stack("B")
                .with_child(Construct::resource("B1", "x"))
                .with_child(Construct::resource("B2", "x")),
        )
        .with_child(Construct::resource("C", "x"));
    let mut recorder = Recorder(vec![]);
    let mut diagnostics = Diagnostics::default();
    walk(&tree, &mut recorder, &mut diagnostics);
    assert_eq!(vec!["A", "B", "B1", "B2", "C"], recorder.0);
}

#[test]
fn apply_tags_is_last_write_wins_and_keeps_existing() {
    let mut stack = Construct::stack("Api").with_tag("Team", "api");
    apply_tags(
        &mut stack,
        &Tags::from_iter([("Environment", "develop"), ("Owner", "a")]),
    );
    apply_tags(&mut stack, &Tags::from_iter([("Owner", "b")]));
    assert_eq!(
        Tags::from_iter([("Environment", "develop"), ("Owner", "b"), ("Team", "api")]),
        stack.tags
    );
}

#[test]
fn construct_tree_loads_from_json() {
    let json = r#"{
        "id": "OrdersStack",
        "kind": "stack",
        "tags": {"Environment": "prod"},
        "children": [
            {"id": "Table", "kind": "resource", "resource_type": "AWS::DynamoDB::Table"}
        ]
    }"#;
    let stack: Construct = serde_json::from_str(json).unwrap();
    assert_eq!(
        Construct::stack("OrdersStack")
            .with_tag("Environment", "prod")
            .with_child(Construct::resource("Table", "AWS::DynamoDB::Table")),
        stack
    );

    let diagnostics = check_required_tags(&stack, ["Environment", "Owner"]);
    let value = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(
        serde_json::json!([{
            "unit": "OrdersStack",
            "severity": "error",
            "kind": "missing_required_tag",
            "key": "Owner",
        }]),
        value
    );
    assert_eq!(
        "[error] OrdersStack: required tag 'Owner' is missing on 'OrdersStack'\n",
        diagnostics.to_string()
    );
}
