//! Reward-per-share calculations

use crate::{states::BPS_DENOMINATOR, utils::U256};

/// Split of a realized reward between the supporter and the talent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardSplit {
    /// Portion credited to the position's claimable balance.
    pub staker_reward: u64,
    /// Portion credited to the talent's redeemable rewards.
    pub talent_reward: u64,
}

impl RewardSplit {
    pub fn total(&self) -> Option<u64> {
        self.staker_reward.checked_add(self.talent_reward)
    }
}

/// Stateless fixed-point helpers behind the accounting ledger.
///
/// Every product that can leave `u128` range is computed in `U256` and narrowed
/// back, returning `None` on overflow so callers can map it to `MathOverflow`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardCalculator {}

impl RewardCalculator {
    /// Adjusted share weight of a position holding `amount` token units.
    ///
    /// The integer square root dampens the weight of very large positions.
    pub fn adjusted_shares(amount: u64) -> Option<u128> {
        spl_math::approximations::sqrt(u128::from(amount))
    }

    /// Emission rate spreading `rewards_max` over `duration` seconds, scaled by `s_precision`.
    pub fn reward_rate(rewards_max: u64, s_precision: u128, duration: u64) -> Option<u128> {
        if duration == 0 {
            return None;
        }
        U256::from(rewards_max)
            .checked_mul(U256::from(s_precision))?
            .checked_div(U256::from(duration))?
            .checked_as_u128()
    }

    /// Increase of `S` over `elapsed` seconds.
    ///
    /// Zero when nobody holds shares; the emission for that interval is not
    /// distributed.
    pub fn accumulator_delta(elapsed: u64, reward_rate: u128, total_shares: u128) -> Option<u128> {
        if total_shares == 0 || elapsed == 0 {
            return Some(0);
        }
        U256::from(elapsed)
            .checked_mul(U256::from(reward_rate))?
            .checked_div(U256::from(total_shares))?
            .checked_as_u128()
    }

    /// Reward owed to `shares` for the accumulator moving from `s_from` to `s_to`.
    pub fn pending_reward(s_from: u128, s_to: u128, shares: u128, s_precision: u128) -> Option<u64> {
        let delta = s_to.checked_sub(s_from)?;
        if delta == 0 || shares == 0 {
            return Some(0);
        }
        U256::from(delta)
            .checked_mul(U256::from(shares))?
            .checked_div(U256::from(s_precision))?
            .checked_as_u64()
    }

    /// Splits `reward` so that `talent_reward_bps / 10_000` (rounded down) goes to the talent.
    pub fn split_reward(reward: u64, talent_reward_bps: u64) -> Option<RewardSplit> {
        if talent_reward_bps > BPS_DENOMINATOR {
            return None;
        }
        let talent_reward = u64::try_from(
            u128::from(reward)
                .checked_mul(u128::from(talent_reward_bps))?
                .checked_div(u128::from(BPS_DENOMINATOR))?,
        )
        .ok()?;
        Some(RewardSplit {
            staker_reward: reward.checked_sub(talent_reward)?,
            talent_reward,
        })
    }

    /// Converts stable coin base units into staked token base units at `token_price`.
    pub fn stable_to_tokens(stable_amount: u64, token_price: u64, token_unit: u128) -> Option<u64> {
        Self::convert(stable_amount, token_price, token_unit)
    }

    /// Talent tokens issued for `token_amount` staked at `talent_price`.
    pub fn tokens_to_talent(token_amount: u64, talent_price: u64, token_unit: u128) -> Option<u64> {
        Self::convert(token_amount, talent_price, token_unit)
    }

    /// Part of `talent_amount` released when `amount` of `position_amount` is unstaked.
    pub fn released_talent_amount(
        talent_amount: u64,
        amount: u64,
        position_amount: u64,
    ) -> Option<u64> {
        if amount == position_amount {
            return Some(talent_amount);
        }
        u64::try_from(
            u128::from(talent_amount)
                .checked_mul(u128::from(amount))?
                .checked_div(u128::from(position_amount))?,
        )
        .ok()
    }

    fn convert(amount: u64, price: u64, unit: u128) -> Option<u64> {
        if price == 0 {
            return None;
        }
        U256::from(amount)
            .checked_mul(U256::from(unit))?
            .checked_div(U256::from(price))?
            .checked_as_u64()
    }
}
