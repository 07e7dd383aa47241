use anchor_lang::prelude::*;

pub const TALENT_STATE_SEED: &str = "talent_state";

/// Per-talent accounting, derived from `TALENT_STATE_SEED + talent`.
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct TalentState {
    pub bump: u8,

    pub talent: Pubkey,

    /// Staked token units across this talent's positions.
    pub total_staked: u64,

    /// Talent tokens issued against stakes (bounded by `talent_supply_max`).
    pub talent_supply: u64,

    /// Realized talent share of rewards, not yet withdrawn.
    pub talent_redeemable_rewards: u64,

    /// Value of `S` at which accrual for this talent stops (`0` = no cap yet).
    pub max_s_for_talent: u128,
}

impl TalentState {
    pub const LEN: usize = 8 + 1 + 32 + 8 * 3 + 16;

    /// Accumulator value positions on this talent accrue against.
    pub fn effective_s(&self, s: u128) -> u128 {
        if self.max_s_for_talent == 0 {
            s
        } else {
            s.min(self.max_s_for_talent)
        }
    }
}
