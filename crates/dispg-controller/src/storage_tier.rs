//! Premium SSD storage tier selection

pub const DEFAULT_STORAGE_TIER: &str = "P10";

const TIER_ORDER: [&str; 14] = [
    "P1", "P2", "P3", "P4", "P6", "P10", "P15", "P20", "P30", "P40", "P50", "P60", "P70", "P80",
];

fn rank(tier: &str) -> Option<usize> {
    TIER_ORDER.iter().position(|t| *t == tier)
}

/// Smallest tier whose capacity covers `size_gb`
fn baseline_tier(size_gb: i32) -> &'static str {
    match size_gb {
        ..=4 => "P1",
        ..=8 => "P2",
        ..=16 => "P3",
        ..=32 => "P4",
        ..=64 => "P6",
        ..=128 => "P10",
        ..=256 => "P15",
        ..=512 => "P20",
        ..=1024 => "P30",
        ..=2048 => "P40",
        ..=4096 => "P50",
        ..=8192 => "P60",
        ..=16384 => "P70",
        _ => "P80",
    }
}

/// Highest tier Azure allows for a disk of `size_gb`
fn max_tier(size_gb: i32) -> &'static str {
    if size_gb <= 4096 { "P50" } else { "P80" }
}

/// Pick the storage tier for a disk of `size_gb`.
///
/// The requested tier is trimmed and upper-cased; an unset or unknown tier
/// falls back to the default. The result is clamped to
/// `[baseline(size), max(size)]`, and the baseline wins if it exceeds the max.
pub fn resolve_storage_tier(size_gb: i32, requested: Option<&str>) -> String {
    let tier = requested
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| rank(t).is_some())
        .unwrap_or_else(|| DEFAULT_STORAGE_TIER.to_string());

    let baseline = baseline_tier(size_gb);
    let max = max_tier(size_gb);

    // All three are members of TIER_ORDER at this point.
    let tier_rank = rank(&tier).unwrap_or_default();
    let min_rank = rank(baseline).unwrap_or_default();
    let max_rank = rank(max).unwrap_or_default();

    if tier_rank < min_rank {
        baseline.to_string()
    } else if tier_rank > max_rank {
        if min_rank > max_rank {
            baseline.to_string()
        } else {
            max.to_string()
        }
    } else {
        tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_when_unset() {
        assert_eq!(resolve_storage_tier(32, None), "P10");
    }

    #[test]
    fn test_unknown_tier_falls_back_to_default() {
        assert_eq!(resolve_storage_tier(32, Some("P999")), "P10");
        assert_eq!(resolve_storage_tier(32, Some("")), "P10");
    }

    #[test]
    fn test_unknown_tier_matches_unset_for_any_size() {
        for size in [1, 100, 256, 5000, 20000] {
            assert_eq!(
                resolve_storage_tier(size, Some("gold")),
                resolve_storage_tier(size, None)
            );
        }
    }

    #[test]
    fn test_tier_below_baseline_is_raised() {
        assert_eq!(resolve_storage_tier(256, Some("P4")), "P15");
    }

    #[test]
    fn test_tier_above_max_is_lowered() {
        assert_eq!(resolve_storage_tier(32, Some("P80")), "P50");
    }

    #[test]
    fn test_tier_is_normalised() {
        assert_eq!(resolve_storage_tier(32, Some(" p20 ")), "P20");
    }

    #[test]
    fn test_large_disks_allow_higher_tiers() {
        assert_eq!(resolve_storage_tier(8192, Some("P80")), "P80");
        assert_eq!(resolve_storage_tier(8192, None), "P60");
        assert_eq!(resolve_storage_tier(32768, None), "P80");
    }
}
