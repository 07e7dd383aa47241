use crate::accounting::ledger::{self, StakeReceipt};
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Accounts context shared by `stake` and `stake_stable`.
///
/// The talent state and the `(staker, talent)` position are created on the
/// first stake and reused afterwards.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// Supporter; pays rent for a new position.
    #[account(mut)]
    pub staker: Signer<'info>,

    /// CHECK: Talent identity. Only its key is used, as a seed and a record.
    pub talent: UncheckedAccount<'info>,

    #[account(
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,

    #[account(
        mut,
        seeds = [STAKING_STATE_SEED.as_bytes()],
        bump = staking_state.bump,
    )]
    pub staking_state: Account<'info, StakingState>,

    #[account(
        init_if_needed,
        seeds = [TALENT_STATE_SEED.as_bytes(), talent.key().as_ref()],
        bump,
        payer = staker,
        space = TalentState::LEN
    )]
    pub talent_state: Account<'info, TalentState>,

    #[account(
        init_if_needed,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            staker.key().as_ref(),
            talent.key().as_ref()
        ],
        bump,
        payer = staker,
        space = StakePosition::LEN
    )]
    pub stake_position: Account<'info, StakePosition>,

    pub system_program: Program<'info, System>,
}

impl Stake<'_> {
    pub(crate) fn record_bumps(&mut self, bumps: &StakeBumps) {
        self.talent_state.bump = bumps.talent_state;
        self.stake_position.bump = bumps.stake_position;
    }

    /// Emits the events for a completed stake of `tokens`.
    pub(crate) fn publish(&self, receipt: &StakeReceipt, now: u64) {
        #[cfg(feature = "enable-log")]
        msg!(
            "stake: tokens {}, talent tokens {}, settled {}",
            receipt.tokens,
            receipt.talent_amount,
            receipt.settlement.reward
        );
        emit!(StakeEvent {
            staker: self.staker.key(),
            talent: self.talent.key(),
            amount: receipt.tokens,
            timestamp: now,
        });
        if receipt.capped {
            msg!("Talent supply cap reached");
            emit!(TalentSupplyCapped {
                talent: self.talent.key(),
                max_s_for_talent: self.talent_state.max_s_for_talent,
            });
        }
    }
}

/// Stakes `amount` token units on the talent.
///
/// Accrues `S` up to now, settles the position's pending reward and then adds
/// the new shares. See [`ledger::stake`] for the failure cases.
pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;
    accounts.record_bumps(&ctx.bumps);

    let staker = accounts.staker.key();
    let talent = accounts.talent.key();
    let receipt = ledger::stake(
        &accounts.staking_config,
        &mut accounts.staking_state,
        &mut accounts.talent_state,
        &mut accounts.stake_position,
        staker,
        talent,
        amount,
        now,
    )?;

    accounts.publish(&receipt, now);
    Ok(())
}
