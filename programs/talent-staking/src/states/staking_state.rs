use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakingState Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the global staking state account.
pub const STAKING_STATE_SEED: &str = "staking_state";

/// Aggregated accounting state for the whole staking program.
///
/// The first four fields are the "accumulated" state and the last three the
/// "realtime" state; the two groups are transplanted separately during a
/// cutover migration.
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct StakingState {
    /// PDA bump for this account.
    pub bump: u8,

    /// Number of positions currently holding a non-zero amount.
    pub active_stakes: u64,

    /// Total stable coin deposited through `stake_stable`.
    pub total_stable_stored: u64,

    /// Total staked token units across all live positions.
    pub total_tokens_staked: u64,

    /// Cumulative rewards realized to stakers and talents.
    pub rewards_given: u64,

    /// Cumulative reward per adjusted share, scaled by `s_precision`.
    pub s: u128,

    /// Timestamp up to which `s` has been advanced.
    pub s_at: u64,

    /// Sum of every live position's adjusted shares.
    pub total_adjusted_shares: u128,
}

impl StakingState {
    /// Fixed serialized size of the account.
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8 * 5: five `u64` fields
    /// - 16 * 2: two `u128` fields
    pub const LEN: usize = 8 + 1 + 8 * 5 + 16 * 2;
}
