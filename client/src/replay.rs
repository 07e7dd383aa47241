//! Historical event files and exactly-once resumption of their replay.

use anyhow::{format_err, Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Stake,
    RewardClaim,
}

/// One indexed event from the source deployment, in original order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub kind: EventKind,
    pub staker: String,
    pub talent: String,
    pub amount: u64,
    pub timestamp: u64,
}

impl HistoricalEvent {
    pub fn staker(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.staker).map_err(|_| format_err!("invalid staker {}", self.staker))
    }

    pub fn talent(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.talent).map_err(|_| format_err!("invalid talent {}", self.talent))
    }
}

pub fn load_events(path: &Path) -> Result<Vec<HistoricalEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read events {}", path.display()))?;
    let events: Vec<HistoricalEvent> = serde_json::from_str(&text)?;
    for event in &events {
        event.staker()?;
        event.talent()?;
    }
    Ok(events)
}

/// Events not yet replayed, given the target's on-chain replay counters.
///
/// Each kind is counted separately, so the first `stakes_done` stake events and
/// the first `claims_done` claim events are skipped and the rest keep their
/// original order.
pub fn pending_events(
    events: &[HistoricalEvent],
    stakes_done: u64,
    claims_done: u64,
) -> Result<Vec<&HistoricalEvent>> {
    let count = |kind: EventKind| events.iter().filter(|event| event.kind == kind).count() as u64;
    let (stakes, claims) = (count(EventKind::Stake), count(EventKind::RewardClaim));
    if stakes_done > stakes || claims_done > claims {
        return Err(format_err!(
            "target already replayed {} stake and {} claim events, file holds {} and {}",
            stakes_done,
            claims_done,
            stakes,
            claims
        ));
    }

    let (mut stakes_seen, mut claims_seen) = (0u64, 0u64);
    Ok(events
        .iter()
        .filter(|event| {
            let (seen, done) = match event.kind {
                EventKind::Stake => (&mut stakes_seen, stakes_done),
                EventKind::RewardClaim => (&mut claims_seen, claims_done),
            };
            *seen += 1;
            *seen > done
        })
        .collect())
}
