//! Game hub summary
//!
//! What the hub page shows before a game is picked: the game list, the
//! jackpot and the player's balance.

use crate::config::NexuzConfig;
use crate::errors::NexuzResult;
use crate::gateway::JackpotSource;
use crate::games::types::GameKind;
use crate::session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameListing {
    pub game: GameKind,
    pub title: String,
    pub blurb: String,
    /// Fixed price per play, if the game has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSummary {
    pub games: Vec<GameListing>,
    pub jackpot: u64,
    /// Absent for signed-out visitors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

pub fn game_listings(config: &NexuzConfig) -> Vec<GameListing> {
    GameKind::ALL
        .iter()
        .map(|&game| {
            let (title, blurb, fixed_cost) = match game {
                GameKind::Wheel => (
                    "Wheel of Fortune",
                    "Spin for a flat prize. Watch out for BANKRUPT.",
                    Some(config.games.wheel.spin_cost),
                ),
                GameKind::Dice => (
                    "Dice Duel",
                    "Call over, under or exact on two dice.",
                    None,
                ),
                GameKind::Slots => (
                    "Cosmic Slots",
                    "Match two or three symbols across the reels.",
                    None,
                ),
                GameKind::Crash => (
                    "Crash",
                    "Cash out before the multiplier crashes.",
                    None,
                ),
            };
            GameListing {
                game,
                title: title.to_string(),
                blurb: blurb.to_string(),
                fixed_cost,
            }
        })
        .collect()
}

/// Assemble the hub view. The jackpot is read-only here.
pub async fn hub_summary<J: JackpotSource + ?Sized>(
    config: &NexuzConfig,
    session: &Session,
    jackpot: &J,
) -> NexuzResult<HubSummary> {
    Ok(HubSummary {
        games: game_listings(config),
        jackpot: jackpot.read_jackpot().await?,
        balance: session.is_authenticated().then(|| session.balance()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;

    #[test]
    fn test_listings_cover_every_game() {
        let listings = game_listings(&NexuzConfig::default());
        let games: Vec<_> = listings.iter().map(|l| l.game).collect();
        assert_eq!(games, GameKind::ALL.to_vec());
        assert_eq!(listings[0].fixed_cost, Some(100));
    }

    #[tokio::test]
    async fn test_summary_reads_jackpot() {
        let gateway = InMemoryGateway::new().with_jackpot(12_345);
        let config = NexuzConfig::default();

        let signed_in = hub_summary(&config, &Session::authenticated("eve", 70), &gateway)
            .await
            .unwrap();
        assert_eq!(signed_in.jackpot, 12_345);
        assert_eq!(signed_in.balance, Some(70));

        let visitor = hub_summary(&config, &Session::anonymous(), &gateway).await.unwrap();
        assert_eq!(visitor.balance, None);
    }
}
