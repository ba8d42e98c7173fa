//! Region derivation from usage-type codes.

/// Usage-type prefix codes and the regions they denote. Matching walks the
/// table in declared order and the first hit wins.
const REGION_PREFIXES: &[(&str, &str)] = &[
    ("USW1", "us-west-1"),
    ("USW2", "us-west-2"),
    ("APN1", "ap-northeast-1"),
    ("EUW2", "eu-west-2"),
    ("EUW1", "eu-west-1"),
];

/// Region assumed when a usage type carries no recognized prefix.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Derive the region from a raw usage-type string, e.g.
/// "USW2-BoxUsage:m5.large" → "us-west-2".
pub fn parse_region(usage_type: &str) -> &'static str {
    REGION_PREFIXES
        .iter()
        .find(|(prefix, _)| usage_type.starts_with(prefix))
        .map(|(_, region)| *region)
        .unwrap_or(DEFAULT_REGION)
}
