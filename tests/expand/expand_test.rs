use std::collections::BTreeMap;

use kestrel::expand::expand_queries;
use kestrel::query::QueryDefinition;

fn regions() -> Vec<String> {
    vec![
        "us-east-1".to_string(),
        "us-west-2".to_string(),
        "eu-west-1".to_string(),
    ]
}

#[test]
fn test_all_region_output_size_is_regions_plus_general() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "ec2".to_string(),
        QueryDefinition::new()
            .with("service", "AmazonEC2")
            .with("region", "all"),
    );

    let expanded = expand_queries(&queries, &regions());

    assert_eq!(expanded.len(), regions().len() + 1);
    for region in regions() {
        let name = format!("ec2_{}", region);
        assert_eq!(expanded[&name].get("region"), Some(region.as_str()));
        assert_eq!(expanded[&name].get("service"), Some("AmazonEC2"));
    }
}

#[test]
fn test_general_variant_has_no_region_key() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "ec2".to_string(),
        QueryDefinition::new()
            .with("service", "AmazonEC2")
            .with("region", "all"),
    );

    let expanded = expand_queries(&queries, &regions());
    let general = &expanded["ec2_general"];

    assert!(!general.contains("region"));
    assert_eq!(general.get("service"), Some("AmazonEC2"));
}

#[test]
fn test_comma_list_expands_trimmed() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "s3".to_string(),
        QueryDefinition::new()
            .with("service", "AmazonS3")
            .with("region", "us-east-1, eu-west-1"),
    );

    let expanded = expand_queries(&queries, &regions());

    assert_eq!(expanded.len(), 3);
    assert_eq!(expanded["s3_us-east-1"].get("region"), Some("us-east-1"));
    assert_eq!(expanded["s3_eu-west-1"].get("region"), Some("eu-west-1"));
    assert!(!expanded["s3_general"].contains("region"));
}

#[test]
fn test_tag_dimensions_are_prefixed_and_lowercased() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "media".to_string(),
        QueryDefinition::new()
            .with("Service", "AmazonS3")
            .with("Team", "media-*"),
    );

    let expanded = expand_queries(&queries, &regions());
    let query = &expanded["media"];

    assert_eq!(query.get("service"), Some("AmazonS3"));
    assert_eq!(query.get("user_team"), Some("media-*"));
    assert!(!query.contains("Team"));
}

#[test]
fn test_mixed_definitions_expand_independently() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "ec2".to_string(),
        QueryDefinition::new()
            .with("service", "AmazonEC2")
            .with("region", "all"),
    );
    queries.insert(
        "rds".to_string(),
        QueryDefinition::new().with("service", "AmazonRDS"),
    );

    let expanded = expand_queries(&queries, &regions());

    // 3 regions + general for ec2, passthrough for rds.
    assert_eq!(expanded.len(), 5);
    assert!(expanded.contains_key("rds"));
}

#[test]
fn test_expansion_is_deterministic() {
    let mut queries = BTreeMap::new();
    queries.insert(
        "ec2".to_string(),
        QueryDefinition::new()
            .with("service", "AmazonEC2")
            .with("region", "all"),
    );

    let first = expand_queries(&queries, &regions());
    let second = expand_queries(&queries, &regions());
    assert_eq!(first, second);
}
