//! Tier Policy Tests
//!
//! The tier hierarchy is monotonic: every tier carries every constraint of
//! the tier below it, Silver never locks, Gold and Platinum lock identically.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use vaultgraph::resolver::{ResolverConfig, VaultPolicyResolver};
use vaultgraph::vault::{PolicyDelta, VaultTier};

fn resolver() -> VaultPolicyResolver {
    VaultPolicyResolver::new(ResolverConfig::new("o-test1234"))
}

#[test]
fn test_silver_has_no_lock_fields() {
    let vault = resolver().build_vault(VaultTier::Silver, "vault-silver");
    assert_eq!(vault.lock, None);
    assert!(vault.advisories.is_empty());
}

#[test]
fn test_gold_and_platinum_lock_identically() {
    let r = resolver();
    let gold = r.build_vault(VaultTier::Gold, "vault-gold");
    let platinum = r.build_vault(VaultTier::Platinum, "vault-platinum");

    let gold_lock = gold.lock.expect("gold locks");
    let platinum_lock = platinum.lock.expect("platinum locks");
    assert_eq!(gold_lock, platinum_lock);
    assert_eq!(gold_lock.changeable_for_days, 14);
    assert_eq!(gold_lock.max_retention_days, 35);
    assert_eq!(gold_lock.min_retention_days, 1);
}

#[test]
fn test_class_label_matches_tier_name() {
    let r = resolver();
    for tier in VaultTier::ALL {
        let vault = r.build_vault(tier, "vault");
        assert_eq!(vault.class, tier.label());
    }
}

#[test]
fn test_every_tier_is_superset_of_the_tier_below() {
    for tier in VaultTier::ALL {
        let Some(below) = tier.predecessor() else {
            continue;
        };
        let ours = PolicyDelta::cumulative(tier, "o-test1234");
        let theirs = PolicyDelta::cumulative(below, "o-test1234");
        assert!(
            ours.is_superset_of(&theirs),
            "{tier} must carry everything {below} carries"
        );
    }
}

#[test]
fn test_all_tiers_restrict_copy_to_the_organization() {
    let r = resolver();
    for tier in VaultTier::ALL {
        let vault = r.build_vault(tier, "vault");
        let statement = &vault.access_policy.statements[0];
        assert_eq!(statement.actions, vec!["backup:CopyIntoBackupVault"]);
        let condition = statement.condition.as_ref().expect("org condition");
        assert_eq!(
            condition.string_equals.get("aws:PrincipalOrgID"),
            Some(&"o-test1234".to_string())
        );
    }
}

fn tier_strategy() -> impl Strategy<Value = VaultTier> {
    prop::sample::select(VaultTier::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_cumulative_policy_is_monotonic(
        tier in tier_strategy(),
        org in "o-[a-z0-9]{8,12}",
    ) {
        let ours = PolicyDelta::cumulative(tier, &org);
        // Walk every tier at or below and check containment, not just the
        // direct predecessor
        for below in VaultTier::ALL.into_iter().filter(|t| *t <= tier) {
            let theirs = PolicyDelta::cumulative(below, &org);
            prop_assert!(ours.is_superset_of(&theirs));
        }
    }

    #[test]
    fn prop_lock_presence_tracks_tier(tier in tier_strategy(), org in "o-[a-z0-9]{8,12}") {
        let delta = PolicyDelta::cumulative(tier, &org);
        prop_assert_eq!(delta.lock.is_some(), tier >= VaultTier::Gold);
    }
}
