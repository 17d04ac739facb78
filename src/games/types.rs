use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier handed out by the session provider
pub type AccountId = String;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Wheel,
    Dice,
    Slots,
    Crash,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Wheel,
        GameKind::Dice,
        GameKind::Slots,
        GameKind::Crash,
    ];

    /// Crash separates bet commit from round start; the others start on commit.
    pub fn starts_on_commit(self) -> bool {
        !matches!(self, GameKind::Crash)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Wheel => write!(f, "wheel"),
            GameKind::Dice => write!(f, "dice"),
            GameKind::Slots => write!(f, "slots"),
            GameKind::Crash => write!(f, "crash"),
        }
    }
}

impl std::str::FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wheel" => Ok(GameKind::Wheel),
            "dice" => Ok(GameKind::Dice),
            "slots" => Ok(GameKind::Slots),
            "crash" => Ok(GameKind::Crash),
            other => Err(format!("unknown game '{}'", other)),
        }
    }
}

/// What a wheel segment pays
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum WheelPrize {
    Coins(u64),
    Bankrupt,
    LoseAll,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WheelSegment {
    pub label: &'static str,
    pub prize: WheelPrize,
}

/// The wheel, clockwise from the pointer at rest
pub const WHEEL_SEGMENTS: [WheelSegment; 8] = [
    WheelSegment { label: "100", prize: WheelPrize::Coins(100) },
    WheelSegment { label: "500", prize: WheelPrize::Coins(500) },
    WheelSegment { label: "BANKRUPT", prize: WheelPrize::Bankrupt },
    WheelSegment { label: "1000", prize: WheelPrize::Coins(1000) },
    WheelSegment { label: "50", prize: WheelPrize::Coins(50) },
    WheelSegment { label: "2000", prize: WheelPrize::Coins(2000) },
    WheelSegment { label: "LOSE ALL", prize: WheelPrize::LoseAll },
    WheelSegment { label: "250", prize: WheelPrize::Coins(250) },
];

/// Player's call on the dice total
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DicePrediction {
    Over,
    Under,
    Exact,
}

impl fmt::Display for DicePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DicePrediction::Over => write!(f, "over"),
            DicePrediction::Under => write!(f, "under"),
            DicePrediction::Exact => write!(f, "exact"),
        }
    }
}

impl std::str::FromStr for DicePrediction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "over" => Ok(DicePrediction::Over),
            "under" => Ok(DicePrediction::Under),
            "exact" => Ok(DicePrediction::Exact),
            other => Err(format!("unknown prediction '{}'", other)),
        }
    }
}

pub const DICE_TARGET_MIN: u8 = 2;
pub const DICE_TARGET_MAX: u8 = 12;

/// Dice call made before the roll
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceCall {
    pub prediction: DicePrediction,
    pub target: u8,
}

/// Slot reel symbols, cheapest first by draw order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Plum,
    Bell,
    Bar,
    Seven,
    Diamond,
}

impl SlotSymbol {
    /// Reel table in draw order; every entry is equally likely.
    pub const TABLE: [SlotSymbol; 8] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Orange,
        SlotSymbol::Plum,
        SlotSymbol::Bell,
        SlotSymbol::Bar,
        SlotSymbol::Seven,
        SlotSymbol::Diamond,
    ];

    pub fn value(self) -> u64 {
        match self {
            SlotSymbol::Cherry => 50,
            SlotSymbol::Lemon => 30,
            SlotSymbol::Orange => 40,
            SlotSymbol::Plum => 60,
            SlotSymbol::Bell => 100,
            SlotSymbol::Bar => 200,
            SlotSymbol::Seven => 500,
            SlotSymbol::Diamond => 1000,
        }
    }
}

impl fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotSymbol::Cherry => "cherry",
            SlotSymbol::Lemon => "lemon",
            SlotSymbol::Orange => "orange",
            SlotSymbol::Plum => "plum",
            SlotSymbol::Bell => "bell",
            SlotSymbol::Bar => "bar",
            SlotSymbol::Seven => "seven",
            SlotSymbol::Diamond => "diamond",
        };
        write!(f, "{}", name)
    }
}

/// Choices the player locks in when committing a bet.
/// The variant also selects the game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Wager {
    Wheel,
    Dice(DiceCall),
    Slots,
    Crash,
}

impl Wager {
    pub fn game(&self) -> GameKind {
        match self {
            Wager::Wheel => GameKind::Wheel,
            Wager::Dice(_) => GameKind::Dice,
            Wager::Slots => GameKind::Slots,
            Wager::Crash => GameKind::Crash,
        }
    }
}

/// Random result of a round, decoupled from what it pays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameOutcome {
    Wheel {
        segment: usize,
    },
    Dice {
        d1: u8,
        d2: u8,
    },
    Slots {
        reels: [SlotSymbol; 3],
    },
    Crash {
        crash_point: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        cashed_out_at: Option<f64>,
    },
}

impl GameOutcome {
    pub fn game(&self) -> GameKind {
        match self {
            GameOutcome::Wheel { .. } => GameKind::Wheel,
            GameOutcome::Dice { .. } => GameKind::Dice,
            GameOutcome::Slots { .. } => GameKind::Slots,
            GameOutcome::Crash { .. } => GameKind::Crash,
        }
    }

    /// Short label used for logs and histograms
    pub fn label(&self) -> String {
        match self {
            GameOutcome::Wheel { segment } => WHEEL_SEGMENTS
                .get(*segment)
                .map(|s| s.label.to_string())
                .unwrap_or_else(|| format!("segment {}", segment)),
            GameOutcome::Dice { d1, d2 } => format!("{}+{}={}", d1, d2, d1 + d2),
            GameOutcome::Slots { reels } => {
                format!("{} {} {}", reels[0], reels[1], reels[2])
            }
            GameOutcome::Crash {
                crash_point,
                cashed_out_at,
            } => match cashed_out_at {
                Some(m) => format!("cashed out {:.2}x (crash {:.2}x)", m, crash_point),
                None => format!("crashed {:.2}x", crash_point),
            },
        }
    }
}

/// Simple phase view of the machine for display and logs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Idle,
    Committed,
    Resolving,
    Resolved,
}

impl RoundPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Committed => "committed",
            RoundPhase::Resolving => "resolving",
            RoundPhase::Resolved => "resolved",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the winnings credit of a resolved round stands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreditStatus {
    /// Nothing to credit
    NotDue,
    Pending { amount: u64 },
    Applied { amount: u64 },
    Failed { amount: u64, reason: String },
}

impl CreditStatus {
    pub fn due(payout: u64) -> Self {
        if payout > 0 {
            CreditStatus::Pending { amount: payout }
        } else {
            CreditStatus::NotDue
        }
    }

    /// Amount owed to the player that has not reached the gateway yet
    pub fn outstanding(&self) -> Option<u64> {
        match self {
            CreditStatus::Pending { amount } | CreditStatus::Failed { amount, .. } => {
                Some(*amount)
            }
            _ => None,
        }
    }
}

/// One play cycle, alive from commit until reset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub wager: Wager,
    pub bet: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<u64>,
    /// Current crash multiplier; stays 1.0 for the other games
    pub multiplier: f64,
    pub credit: CreditStatus,
}

impl Round {
    pub fn new(wager: Wager, bet: u64) -> Self {
        Self {
            wager,
            bet,
            outcome: None,
            payout: None,
            multiplier: 1.0,
            credit: CreditStatus::NotDue,
        }
    }

    pub fn game(&self) -> GameKind {
        self.wager.game()
    }
}

/// Result of a finished round kept for "last results" display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: uuid::Uuid,
    pub account_id: AccountId,
    pub game: GameKind,
    pub wager: Wager,
    pub bet: u64,
    pub outcome: GameOutcome,
    pub payout: u64,
    pub credit: CreditStatus,
    /// Wheel only: rotation in degrees the reveal animates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_angle: Option<f64>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl RoundRecord {
    /// Net change to the balance once the credit lands. Bets can exceed
    /// `i64::MAX`, hence the wider type.
    pub fn net(&self) -> i128 {
        self.payout as i128 - self.bet as i128
    }
}
