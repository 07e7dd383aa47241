//! JSON snapshots of a deployment's complete accounting state.
//!
//! A snapshot is taken from the source program and replayed into a target
//! program opened in migration mode, one raw-state instruction per record.

use anchor_client::Program;
use anyhow::{format_err, Context, Result};
use serde::{Deserialize, Serialize};
use solana_client::rpc_client::RpcClient;
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;
use talent_staking::accounting::RewardCalculator;
use talent_staking::states::{StakePosition, StakingConfig, StakingState, TalentState};

use crate::instructions::utils::{get_staking_config_address, get_staking_state_address};

mod pubkey_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let text = String::deserialize(deserializer)?;
        Pubkey::from_str(&text).map_err(D::Error::custom)
    }
}

/// `u128` as a decimal string.
mod u128_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Parameters that must match between source and target for rewards to carry over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub start: u64,
    pub end: u64,
    pub rewards_max: u64,
    #[serde(with = "u128_string")]
    pub reward_rate: u128,
    pub token_price: u64,
    pub talent_price: u64,
    pub token_decimals: u8,
    pub talent_reward_bps: u64,
    pub talent_supply_max: u64,
}

impl ConfigSnapshot {
    /// Names of the fields that differ from `other`.
    pub fn mismatches(&self, other: &ConfigSnapshot) -> Vec<&'static str> {
        let checks = [
            ("start", self.start == other.start),
            ("end", self.end == other.end),
            ("rewards_max", self.rewards_max == other.rewards_max),
            ("reward_rate", self.reward_rate == other.reward_rate),
            ("token_price", self.token_price == other.token_price),
            ("talent_price", self.talent_price == other.talent_price),
            ("token_decimals", self.token_decimals == other.token_decimals),
            ("talent_reward_bps", self.talent_reward_bps == other.talent_reward_bps),
            ("talent_supply_max", self.talent_supply_max == other.talent_supply_max),
        ];
        checks
            .into_iter()
            .filter(|(_, same)| !same)
            .map(|(name, _)| name)
            .collect()
    }
}

impl From<&StakingConfig> for ConfigSnapshot {
    fn from(config: &StakingConfig) -> Self {
        Self {
            start: config.start,
            end: config.end,
            rewards_max: config.rewards_max,
            reward_rate: config.reward_rate,
            token_price: config.token_price,
            talent_price: config.talent_price,
            token_decimals: config.token_decimals,
            talent_reward_bps: config.talent_reward_bps,
            talent_supply_max: config.talent_supply_max,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSnapshot {
    pub active_stakes: u64,
    pub total_stable_stored: u64,
    pub total_tokens_staked: u64,
    pub rewards_given: u64,
    #[serde(with = "u128_string")]
    pub s: u128,
    pub s_at: u64,
    #[serde(with = "u128_string")]
    pub total_adjusted_shares: u128,
}

impl From<&StakingState> for GlobalSnapshot {
    fn from(state: &StakingState) -> Self {
        Self {
            active_stakes: state.active_stakes,
            total_stable_stored: state.total_stable_stored,
            total_tokens_staked: state.total_tokens_staked,
            rewards_given: state.rewards_given,
            s: state.s,
            s_at: state.s_at,
            total_adjusted_shares: state.total_adjusted_shares,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentSnapshot {
    #[serde(with = "pubkey_string")]
    pub talent: Pubkey,
    pub total_staked: u64,
    pub talent_supply: u64,
    pub talent_redeemable_rewards: u64,
    #[serde(with = "u128_string")]
    pub max_s_for_talent: u128,
}

impl From<&TalentState> for TalentSnapshot {
    fn from(talent: &TalentState) -> Self {
        Self {
            talent: talent.talent,
            total_staked: talent.total_staked,
            talent_supply: talent.talent_supply,
            talent_redeemable_rewards: talent.talent_redeemable_rewards,
            max_s_for_talent: talent.max_s_for_talent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    #[serde(with = "pubkey_string")]
    pub staker: Pubkey,
    #[serde(with = "pubkey_string")]
    pub talent: Pubkey,
    pub amount: u64,
    #[serde(with = "u128_string")]
    pub shares: u128,
    #[serde(with = "u128_string")]
    pub s_snapshot: u128,
    pub claimable: u64,
    pub total_claimed: u64,
    pub talent_amount: u64,
}

impl PositionSnapshot {
    /// No stake, nothing to claim and no claim history.
    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.claimable == 0 && self.total_claimed == 0
    }
}

impl From<&StakePosition> for PositionSnapshot {
    fn from(position: &StakePosition) -> Self {
        Self {
            staker: position.staker,
            talent: position.talent,
            amount: position.amount,
            shares: position.shares,
            s_snapshot: position.s_snapshot,
            claimable: position.claimable,
            total_claimed: position.total_claimed,
            talent_amount: position.talent_amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(with = "pubkey_string")]
    pub program: Pubkey,
    /// Slot the snapshot was read at.
    pub slot: u64,
    pub config: ConfigSnapshot,
    pub global: GlobalSnapshot,
    pub talents: Vec<TalentSnapshot>,
    pub positions: Vec<PositionSnapshot>,
}

impl Snapshot {
    /// Reads every account of `program`. Talents and positions come out sorted by key.
    pub fn capture(rpc_client: &RpcClient, program: &Program<Rc<Keypair>>) -> Result<Self> {
        let slot = rpc_client.get_slot()?;
        let config: StakingConfig = program
            .account(get_staking_config_address(&program.id()))
            .context("staking config not found")?;
        let state: StakingState = program
            .account(get_staking_state_address(&program.id()))
            .context("staking state not found")?;

        let mut talents: Vec<TalentSnapshot> = program
            .accounts::<TalentState>(vec![])?
            .iter()
            .map(|(_, talent)| TalentSnapshot::from(talent))
            .collect();
        talents.sort_by_key(|talent| talent.talent);

        let mut positions: Vec<PositionSnapshot> = program
            .accounts::<StakePosition>(vec![])?
            .iter()
            .map(|(_, position)| PositionSnapshot::from(position))
            .collect();
        positions.sort_by_key(|position| (position.staker, position.talent));

        Ok(Self {
            program: program.id(),
            slot,
            config: ConfigSnapshot::from(&config),
            global: GlobalSnapshot::from(&state),
            talents,
            positions,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write snapshot {}", path.display()))
    }

    /// Checks the cross-account invariants before anything is written to a target.
    pub fn verify(&self) -> Result<()> {
        let mut shares: u128 = 0;
        let mut tokens: u64 = 0;
        let mut active: u64 = 0;
        let mut to_stakers: u64 = 0;
        for position in &self.positions {
            let expected = RewardCalculator::adjusted_shares(position.amount)
                .ok_or_else(|| format_err!("shares overflow"))?;
            if position.shares != expected {
                return Err(format_err!(
                    "position {}/{} holds {} shares for amount {}",
                    position.staker,
                    position.talent,
                    position.shares,
                    position.amount
                ));
            }
            shares = shares
                .checked_add(position.shares)
                .ok_or_else(|| format_err!("total shares overflow"))?;
            tokens = tokens
                .checked_add(position.amount)
                .ok_or_else(|| format_err!("total staked tokens overflow"))?;
            to_stakers = position
                .claimable
                .checked_add(position.total_claimed)
                .and_then(|owed| to_stakers.checked_add(owed))
                .ok_or_else(|| format_err!("staker rewards overflow"))?;
            if position.amount > 0 {
                active += 1;
            }
        }

        if shares != self.global.total_adjusted_shares {
            return Err(format_err!(
                "positions hold {} shares, global state {}",
                shares,
                self.global.total_adjusted_shares
            ));
        }
        if tokens != self.global.total_tokens_staked {
            return Err(format_err!(
                "positions hold {} tokens, global state {}",
                tokens,
                self.global.total_tokens_staked
            ));
        }
        if active != self.global.active_stakes {
            return Err(format_err!(
                "{} active positions, global state counts {}",
                active,
                self.global.active_stakes
            ));
        }
        if self.global.rewards_given > self.config.rewards_max {
            return Err(format_err!("rewards given exceed the budget"));
        }
        // Talent withdrawals are not on chain, so this is an upper bound only.
        let accounted = self
            .talents
            .iter()
            .try_fold(to_stakers, |total, talent| {
                total.checked_add(talent.talent_redeemable_rewards)
            })
            .ok_or_else(|| format_err!("talent rewards overflow"))?;
        if accounted > self.global.rewards_given {
            return Err(format_err!(
                "positions and talents account for more than the {} rewards given",
                self.global.rewards_given
            ));
        }
        Ok(())
    }

    /// Positions still to import into a target that already holds `existing`.
    pub fn positions_to_import<'a>(
        &'a self,
        existing: &'a BTreeSet<(Pubkey, Pubkey)>,
    ) -> impl Iterator<Item = &'a PositionSnapshot> + 'a {
        self.positions.iter().filter(move |position| {
            !position.is_empty() && !existing.contains(&(position.staker, position.talent))
        })
    }

    /// Snapshot positions the target already holds.
    pub fn positions_already_imported(&self, existing: &BTreeSet<(Pubkey, Pubkey)>) -> usize {
        self.positions
            .iter()
            .filter(|position| {
                !position.is_empty() && existing.contains(&(position.staker, position.talent))
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(amount: u64, claimable: u64) -> PositionSnapshot {
        PositionSnapshot {
            staker: Pubkey::new_unique(),
            talent: Pubkey::new_unique(),
            amount,
            shares: RewardCalculator::adjusted_shares(amount).unwrap(),
            s_snapshot: 1_234,
            claimable,
            total_claimed: 0,
            talent_amount: amount,
        }
    }

    fn snapshot() -> Snapshot {
        let mut exited = position(0, 0);
        exited.total_claimed = 3;
        let positions = vec![
            position(100, 5),
            position(64, 0),
            position(0, 7),
            position(0, 0),
            exited,
        ];
        Snapshot {
            program: talent_staking::id(),
            slot: 42,
            config: ConfigSnapshot {
                start: 1_000,
                end: 2_000,
                rewards_max: 1_000_000,
                reward_rate: u128::MAX / 3,
                token_price: 1_000_000,
                talent_price: 1_000_000,
                token_decimals: 6,
                talent_reward_bps: 500,
                talent_supply_max: 0,
            },
            global: GlobalSnapshot {
                active_stakes: 2,
                total_stable_stored: 0,
                total_tokens_staked: 164,
                rewards_given: 23,
                s: u128::MAX - 1,
                s_at: 1_500,
                total_adjusted_shares: 18,
            },
            talents: vec![TalentSnapshot {
                talent: positions[0].talent,
                total_staked: 100,
                talent_supply: 100,
                talent_redeemable_rewards: 1,
                max_s_for_talent: 0,
            }],
            positions,
        }
    }

    #[test]
    fn json_keeps_wide_integers_and_keys_readable() {
        let snapshot = snapshot();
        let text = serde_json::to_string(&snapshot).unwrap();
        assert!(text.contains(&format!("\"{}\"", u128::MAX - 1)));
        assert!(text.contains(&talent_staking::id().to_string()));
        let parsed: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn rejects_malformed_keys() {
        let text = serde_json::to_string(&snapshot())
            .unwrap()
            .replace(&talent_staking::id().to_string(), "not-a-key");
        assert!(serde_json::from_str::<Snapshot>(&text).is_err());
    }

    #[test]
    fn verify_accepts_consistent_state() {
        snapshot().verify().unwrap();
    }

    #[test]
    fn verify_catches_share_drift() {
        let mut tampered = snapshot();
        tampered.global.total_adjusted_shares += 1;
        assert!(tampered.verify().is_err());

        let mut tampered = snapshot();
        tampered.positions[1].shares = 9;
        assert!(tampered.verify().is_err());

        let mut tampered = snapshot();
        tampered.global.active_stakes = 3;
        assert!(tampered.verify().is_err());

        let mut tampered = snapshot();
        tampered.positions[0].claimable = 100;
        assert!(tampered.verify().is_err());
    }

    #[test]
    fn import_skips_empty_and_existing_positions() {
        let snapshot = snapshot();
        let existing = BTreeSet::from([(snapshot.positions[0].staker, snapshot.positions[0].talent)]);
        let amounts: Vec<(u64, u64)> = snapshot
            .positions_to_import(&existing)
            .map(|p| (p.amount, p.claimable))
            .collect();
        assert_eq!(amounts, vec![(64, 0), (0, 7), (0, 0)]);
        assert_eq!(snapshot.positions_already_imported(&existing), 1);

        let unrelated = BTreeSet::from([(Pubkey::new_unique(), Pubkey::new_unique())]);
        assert_eq!(snapshot.positions_already_imported(&unrelated), 0);
    }

    #[test]
    fn verify_reports_overflow_instead_of_panicking() {
        let mut crafted = snapshot();
        crafted.positions.push(position(u64::MAX, 0));
        crafted.positions.push(position(u64::MAX, 0));
        assert!(crafted.verify().is_err());

        let mut crafted = snapshot();
        crafted.positions[1].claimable = u64::MAX;
        crafted.positions[1].total_claimed = 1;
        assert!(crafted.verify().is_err());

        let mut crafted = snapshot();
        crafted.talents[0].talent_redeemable_rewards = u64::MAX;
        assert!(crafted.verify().is_err());
    }

    #[test]
    fn config_mismatches_are_named() {
        let source = snapshot().config;
        let mut target = source.clone();
        assert!(source.mismatches(&target).is_empty());
        target.end += 1;
        target.talent_reward_bps = 0;
        assert_eq!(source.mismatches(&target), vec!["end", "talent_reward_bps"]);
    }
}
