use crate::error::ErrorCode;
use anchor_lang::prelude::*;

/// Current cluster time as unsigned UNIX seconds.
pub fn current_timestamp() -> Result<u64> {
    let clock = Clock::get()?;
    u64::try_from(clock.unix_timestamp).map_err(|_| error!(ErrorCode::InvalidTimestamp))
}
