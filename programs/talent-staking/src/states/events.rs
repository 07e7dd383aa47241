use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track protocol state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the staking configuration is initialized.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StakingConfigInitialized {
    pub admin: Pubkey,
    pub stable_coin: Pubkey,
    pub factory: Pubkey,
    pub start: u64,
    pub end: u64,
    pub rewards_max: u64,
    /// Derived emission rate, scaled by `s_precision`.
    pub reward_rate: u128,
    pub token_price: u64,
    pub talent_price: u64,
    pub token_decimals: u8,
    pub talent_reward_bps: u64,
    pub talent_supply_max: u64,
    /// Whether the instance starts in migration mode.
    pub migration_open: bool,
}

/// Emitted whenever configuration parameters are modified via `update_config`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ConfigUpdated {
    pub admin: Pubkey,
    pub token_price: u64,
    pub talent_price: u64,
    pub talent_reward_bps: u64,
    pub talent_supply_max: u64,
}

/// Emitted when a supporter stakes on a talent.
///
/// `emit_stake_event` replays historical stakes with this exact shape, so
/// indexers see one uniform stream across a cutover migration.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StakeEvent {
    /// Supporter wallet.
    pub staker: Pubkey,
    /// Talent receiving the stake.
    pub talent: Pubkey,
    /// Staked token units.
    pub amount: u64,
    /// UNIX timestamp of the original stake.
    pub timestamp: u64,
}

/// Emitted when a supporter withdraws part or all of a position.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct UnstakeEvent {
    pub staker: Pubkey,
    pub talent: Pubkey,
    pub amount: u64,
    pub timestamp: u64,
}

/// Emitted when rewards are claimed, live or replayed.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardClaimEvent {
    /// Claimant (the supporter, or the talent itself for talent withdrawals).
    pub staker: Pubkey,
    pub talent: Pubkey,
    /// Reward units paid out.
    pub amount: u64,
    pub timestamp: u64,
}

/// Emitted when a talent first reaches its supply cap and accrual freezes.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct TalentSupplyCapped {
    pub talent: Pubkey,
    pub max_s_for_talent: u128,
}

/// Emitted by the raw-state migration instructions with the values written.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct AccumulatedStateSet {
    pub active_stakes: u64,
    pub total_stable_stored: u64,
    pub total_tokens_staked: u64,
    pub rewards_given: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RealtimeStateSet {
    pub s: u128,
    pub s_at: u64,
    pub total_adjusted_shares: u128,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct TalentStateSet {
    pub talent: Pubkey,
    pub talent_redeemable_rewards: u64,
    pub max_s_for_talent: u128,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StakeImported {
    pub staker: Pubkey,
    pub talent: Pubkey,
    pub amount: u64,
    pub shares: u128,
}

/// Emitted when the admin moves a position from one supporter to another.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StakeTransferred {
    pub from: Pubkey,
    pub to: Pubkey,
    pub talent: Pubkey,
    pub amount: u64,
}

/// Emitted once, when the migration window is closed for good.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct MigrationFinished {
    pub stake_events_replayed: u64,
    pub claim_events_replayed: u64,
}
