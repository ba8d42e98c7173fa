use std::collections::HashMap;

use chrono::NaiveDate;
use kestrel::facts::{FactRow, FactTable};
use kestrel::query::{filter_series, FilterSkip, QueryDefinition};

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn row(day_s: &str, service: &str, operation: &str, region: &str, cost: f64) -> FactRow {
    FactRow {
        day: day(day_s),
        service: service.to_string(),
        operation: operation.to_string(),
        region: region.to_string(),
        cost,
        tags: HashMap::new(),
    }
}

fn tagged(mut row: FactRow, tag: &str, value: &str) -> FactRow {
    row.tags.insert(tag.to_string(), value.to_string());
    row
}

/// A hand-built view: two services, two regions, one tag, three days.
fn fixture() -> FactTable {
    let mut view = FactTable::new();
    view.append(
        vec!["user_team".to_string()],
        vec![
            tagged(
                row("2024-03-01", "AmazonEC2", "RunInstances", "us-east-1", 10.0),
                "user_team",
                "media",
            ),
            row("2024-03-01", "AmazonEC2", "RunInstances", "us-west-2", 4.0),
            row("2024-03-01", "AmazonS3", "PutObject", "us-east-1", 2.0),
            tagged(
                row("2024-03-02", "AmazonEC2", "RunInstances", "us-east-1", 11.0),
                "user_team",
                "media",
            ),
            row("2024-03-02", "AmazonEC2", "CreateSnapshot", "us-east-1", 3.0),
            row("2024-03-03", "AmazonEC2", "RunInstances", "us-east-1", 12.0),
        ],
    );
    view
}

#[test]
fn test_daily_sum_over_exactly_matching_rows() {
    let definition = QueryDefinition::new()
        .with("service", "AmazonEC2")
        .with("region", "us-east-1");

    let series = filter_series(&fixture(), &definition).unwrap();

    // 2024-03-02 has two matching rows across operations: 11 + 3.
    assert_eq!(series.get(day("2024-03-01")), Some(10.0));
    assert_eq!(series.get(day("2024-03-02")), Some(14.0));
    assert_eq!(series.get(day("2024-03-03")), Some(12.0));
    assert_eq!(series.len(), 3);
}

#[test]
fn test_operation_narrowing() {
    let definition = QueryDefinition::new()
        .with("service", "AmazonEC2")
        .with("operation", "RunInstances")
        .with("region", "us-east-1");

    let series = filter_series(&fixture(), &definition).unwrap();
    assert_eq!(series.get(day("2024-03-02")), Some(11.0));
}

#[test]
fn test_wildcard_substring_containment() {
    let mut view = FactTable::new();
    view.append(
        Vec::new(),
        vec![
            row("2024-03-01", "AmazonEC2Compute", "RunInstances", "us-east-1", 7.0),
            row("2024-03-01", "AmazonS3", "PutObject", "us-east-1", 2.0),
        ],
    );

    let definition = QueryDefinition::new().with("service", "*Compute*");
    let series = filter_series(&view, &definition).unwrap();

    assert_eq!(series.get(day("2024-03-01")), Some(7.0));
}

#[test]
fn test_tag_predicate_matches_only_tagged_rows() {
    let definition = QueryDefinition::new().with("user_team", "media");

    let series = filter_series(&fixture(), &definition).unwrap();
    assert_eq!(series.get(day("2024-03-01")), Some(10.0));
    assert_eq!(series.get(day("2024-03-02")), Some(11.0));
    assert!(!series.contains(day("2024-03-03")));
}

#[test]
fn test_tag_wildcard() {
    let definition = QueryDefinition::new().with("user_team", "med*");

    let series = filter_series(&fixture(), &definition).unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn test_unknown_dimension_lists_missing_columns() {
    let definition = QueryDefinition::new()
        .with("service", "AmazonEC2")
        .with("user_env", "prod")
        .with("user_owner", "infra");

    let skip = filter_series(&fixture(), &definition).unwrap_err();
    match skip {
        FilterSkip::MissingColumns(missing) => {
            assert_eq!(
                missing,
                vec!["user_env".to_string(), "user_owner".to_string()]
            );
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn test_no_matching_rows_is_a_skip() {
    let definition = QueryDefinition::new().with("service", "AmazonDynamoDB");

    assert_eq!(
        filter_series(&fixture(), &definition).unwrap_err(),
        FilterSkip::NoRows
    );
}

#[test]
fn test_conjunction_of_predicates() {
    // Each predicate alone matches rows; together they match none.
    let definition = QueryDefinition::new()
        .with("service", "AmazonS3")
        .with("region", "us-west-2");

    assert_eq!(
        filter_series(&fixture(), &definition).unwrap_err(),
        FilterSkip::NoRows
    );
}
