use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakePosition Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive a position, together with staker and talent.
pub const STAKE_POSITION_SEED: &str = "stake_position";

/// A single supporter's stake on a single talent.
///
/// Rewards are tracked lazily: `s_snapshot` is the talent's effective `S` at the
/// last settlement, so the pending reward is always
/// `(effective_s - s_snapshot) * shares / s_precision`.
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct StakePosition {
    /// PDA bump for this account.
    pub bump: u8,

    /// Supporter wallet owning the position.
    pub staker: Pubkey,

    /// Talent the stake supports.
    pub talent: Pubkey,

    /// Staked token units.
    pub amount: u64,

    /// Adjusted share weight, `isqrt(amount)`.
    pub shares: u128,

    /// Effective accumulator value at the last settlement.
    pub s_snapshot: u128,

    /// Realized rewards awaiting `claim`.
    pub claimable: u64,

    /// Lifetime rewards claimed.
    pub total_claimed: u64,

    /// Talent tokens issued against this position.
    pub talent_amount: u64,
}

impl StakePosition {
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 2: staker, talent
    /// - 8 * 4: four `u64` fields
    /// - 16 * 2: two `u128` fields
    pub const LEN: usize = 8 + 1 + 32 * 2 + 8 * 4 + 16 * 2;

    pub fn is_active(&self) -> bool {
        self.amount > 0
    }

    /// No stake, nothing to claim and no claim history.
    pub fn is_empty(&self) -> bool {
        !self.is_active() && self.claimable == 0 && self.total_claimed == 0
    }
}
