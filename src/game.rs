// src/game.rs
// This module provides the GameSession that owns the roster, the ball drawer and the
// active win strategy, and runs the per-round protocol: draw, broadcast, mark, evaluate.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardGenerator};
use crate::config::GameConfig;
use crate::defs::{announce, Number, FIRSTNUMBER, LASTNUMBER};
use crate::drawer::BallDrawer;
use crate::error::{BingoError, Result};
use crate::logging::{log_debug, log_info};
use crate::notify::{BallChannel, ListenerHandle};
use crate::player::Player;
use crate::strategy::{CellSet, WinStrategy};

/// Shared handle to a registered player. The session keeps one clone, the
/// notification channel another.
pub type PlayerHandle = ListenerHandle<Player>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    AllBallsDrawn,
    PlayerWon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    InProgress,
    Finished(FinishReason),
}

/// What a call to [`GameSession::play_round`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// A ball was drawn and every player marked it.
    Called(Number),
    /// Nothing was drawn; the session is over.
    Finished(FinishReason),
}

impl RoundOutcome {
    pub fn ball(&self) -> Option<Number> {
        match self {
            RoundOutcome::Called(ball) => Some(*ball),
            RoundOutcome::Finished(_) => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, RoundOutcome::Finished(_))
    }
}

/// The first player (in registration order) whose card satisfied the strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
    pub player_index: usize,
    pub player_name: String,
    pub card_index: usize,
    pub cells: CellSet,
}

/// One round played and evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub outcome: RoundOutcome,
    pub winner: Option<Winner>,
}

impl RoundReport {
    /// True when no further round can be played.
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_terminated() || self.winner.is_some()
    }
}

/// One game of Bingo from roster assembly to a winner or an empty drawer.
///
/// Single-threaded by construction: players are shared through `Rc<RefCell<_>>`
/// so the session is neither `Send` nor `Sync`.
pub struct GameSession {
    id: String,
    created_at: SystemTime,
    state: GameState,
    drawer: BallDrawer,
    channel: BallChannel<Player>,
    players: Vec<PlayerHandle>,
    strategy: Option<WinStrategy>,
    winner: Option<Winner>,
    rng: StdRng,
}

impl GameSession {
    /// Session over the standard 1..=75 range with a freshly shuffled drawer.
    pub fn new() -> Self {
        Self::from_parts(BallDrawer::default(), StdRng::from_os_rng())
    }

    /// Session over `min..=max`.
    pub fn with_range(min: Number, max: Number) -> Result<Self> {
        Ok(Self::from_parts(BallDrawer::new(min, max)?, StdRng::from_os_rng()))
    }

    /// Session whose drawer, strategy choice and id all derive from `seed`.
    pub fn seeded(min: Number, max: Number, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let drawer = BallDrawer::seeded(min, max, rng.random())?;
        Ok(Self::from_parts(drawer, rng))
    }

    /// Session around an existing drawer, e.g. one with a stacked order.
    pub fn with_drawer(drawer: BallDrawer) -> Self {
        Self::from_parts(drawer, StdRng::from_os_rng())
    }

    fn from_parts(drawer: BallDrawer, mut rng: StdRng) -> Self {
        let id = new_game_id(&mut rng);
        let session = GameSession {
            id,
            created_at: SystemTime::now(),
            state: GameState::NotStarted,
            drawer,
            channel: BallChannel::new(),
            players: Vec::new(),
            strategy: None,
            winner: None,
            rng,
        };
        log_info(&format!("Created new game: {}", session.game_info()));
        session
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Human-readable creation time
    pub fn created_at_string(&self) -> String {
        match self.created_at.duration_since(std::time::UNIX_EPOCH) {
            Ok(duration) => {
                let datetime: DateTime<Utc> = DateTime::from_timestamp(duration.as_secs() as i64, 0)
                    .unwrap_or_else(Utc::now);
                datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
            }
            Err(_) => "Unknown time".to_string(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, GameState::Finished(_))
    }

    pub fn strategy(&self) -> Option<WinStrategy> {
        self.strategy
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }

    /// Register a player and subscribe them to called balls. Any marks the
    /// cards carry are cleared: only balls called in this session count.
    pub fn add_player(&mut self, mut player: Player) -> Result<PlayerHandle> {
        if self.is_finished() {
            return Err(BingoError::SessionFinished(self.id.clone()));
        }
        player.clear_marks();

        log_info(&format!(
            "Player '{}' joined game {} with {} card(s)",
            player.name(),
            self.id,
            player.card_count()
        ));

        let handle: PlayerHandle = Rc::new(RefCell::new(player));
        self.channel.attach(&handle);
        self.players.push(Rc::clone(&handle));
        Ok(handle)
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<Ref<'_, Player>> {
        self.players.get(index).map(|handle| handle.borrow())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Fix the strategy for this session. Only allowed before the first round.
    pub fn set_strategy(&mut self, strategy: WinStrategy) -> Result<()> {
        if self.state != GameState::NotStarted {
            return Err(BingoError::StrategyLocked);
        }
        self.strategy = Some(strategy);
        log_info(&format!("Win strategy for game {}: {}", self.id, strategy.name()));
        Ok(())
    }

    /// Pick one of the five strategies uniformly at random. Only allowed
    /// before the first round.
    pub fn choose_strategy_randomly(&mut self) -> Result<WinStrategy> {
        if self.state != GameState::NotStarted {
            return Err(BingoError::StrategyLocked);
        }
        let strategy = WinStrategy::choose(&mut self.rng);
        self.set_strategy(strategy)?;
        Ok(strategy)
    }

    /// Draw the next ball and broadcast it to every player.
    ///
    /// Once the drawer is empty this moves the session to
    /// `Finished(AllBallsDrawn)` without drawing. A finished session never draws.
    pub fn play_round(&mut self) -> RoundOutcome {
        if let GameState::Finished(reason) = self.state {
            return RoundOutcome::Finished(reason);
        }

        let Some(ball) = self.drawer.draw() else {
            self.state = GameState::Finished(FinishReason::AllBallsDrawn);
            log_info(&format!(
                "All {} balls drawn in game {}, no winner",
                self.drawer.total(),
                self.id
            ));
            return RoundOutcome::Finished(FinishReason::AllBallsDrawn);
        };

        self.state = GameState::InProgress;
        log_debug(&format!(
            "Called {} ({} remaining)",
            announce(ball),
            self.drawer.remaining_count()
        ));
        self.channel.notify(ball);

        RoundOutcome::Called(ball)
    }

    /// Check the active strategy against every player, in registration order.
    ///
    /// The first player with a winning card ends the session with
    /// `Finished(PlayerWon)`. Returns the winner, if any. Nobody can win
    /// before the first ball is called.
    pub fn evaluate_round(&mut self) -> Result<Option<Winner>> {
        let strategy = self.strategy.ok_or(BingoError::NoStrategy)?;

        match self.state {
            GameState::Finished(FinishReason::PlayerWon) => return Ok(self.winner.clone()),
            GameState::Finished(FinishReason::AllBallsDrawn) | GameState::NotStarted => return Ok(None),
            GameState::InProgress => {}
        }

        let found = self.players.iter().enumerate().find_map(|(player_index, handle)| {
            let player = handle.borrow();
            player.winning_card(strategy).map(|card_index| Winner {
                player_index,
                player_name: player.name().to_string(),
                card_index,
                cells: strategy.winning_cells(&player.cards()[card_index]),
            })
        });

        if let Some(winner) = &found {
            self.state = GameState::Finished(FinishReason::PlayerWon);
            log_info(&format!(
                "BINGO! {} wins game {} with a {} on card {} after {} ball(s)",
                winner.player_name,
                self.id,
                strategy.name(),
                winner.card_index + 1,
                self.drawer.drawn_history().len()
            ));
            self.winner = found.clone();
        }

        Ok(found)
    }

    /// Play one round and evaluate it.
    pub fn advance(&mut self) -> Result<RoundReport> {
        if self.strategy.is_none() {
            return Err(BingoError::NoStrategy);
        }
        let outcome = self.play_round();
        let winner = match outcome {
            RoundOutcome::Called(_) => self.evaluate_round()?,
            RoundOutcome::Finished(_) => self.winner.clone(),
        };
        Ok(RoundReport { outcome, winner })
    }

    /// Keep advancing until someone wins or the balls run out.
    pub fn play_until_finished(&mut self) -> Result<Option<Winner>> {
        loop {
            let report = self.advance()?;
            if report.is_game_over() {
                return Ok(report.winner);
            }
        }
    }

    /// Balls called so far, in draw order.
    pub fn called_balls(&self) -> &[Number] {
        self.drawer.drawn_history()
    }

    pub fn last_called(&self) -> Option<Number> {
        self.drawer.last_drawn()
    }

    pub fn balls_remaining(&self) -> usize {
        self.drawer.remaining_count()
    }

    pub fn has_more_balls(&self) -> bool {
        self.drawer.has_more()
    }

    pub fn total_balls(&self) -> usize {
        self.drawer.total()
    }

    /// Start over with the same roster, cards and strategy: new game id,
    /// reshuffled drawer, every card back to only the free cell marked.
    /// Returns a description of each component that was reset.
    pub fn reset(&mut self) -> Vec<String> {
        let mut reset_components = Vec::new();

        self.id = new_game_id(&mut self.rng);
        self.created_at = SystemTime::now();
        reset_components.push(format!("New game ID generated: {}", self.id));

        self.drawer.reset();
        let (min, max) = self.drawer.range();
        reset_components.push(format!("Drawer refilled with numbers {min}-{max}"));

        for handle in &self.players {
            handle.borrow_mut().clear_marks();
        }
        reset_components.push(format!("Marks cleared on {} player(s)", self.players.len()));

        self.state = GameState::NotStarted;
        self.winner = None;
        reset_components.push("Game state reset".to_string());

        log_info(&format!("Game reset: {}", self.game_info()));
        reset_components
    }

    /// One-line summary for logging
    pub fn game_info(&self) -> String {
        format!(
            "Game[id={}, created={}, players={}, called={}, remaining={}, strategy={}, state={:?}]",
            self.id,
            self.created_at_string(),
            self.players.len(),
            self.drawer.drawn_history().len(),
            self.drawer.remaining_count(),
            self.strategy.map_or("none", |s| s.name()),
            self.state
        )
    }

    /// Everything a presentation layer needs to draw the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let players = self
            .players
            .iter()
            .map(|handle| {
                let player = handle.borrow();
                PlayerSnapshot {
                    name: player.name().to_string(),
                    cards: player
                        .cards()
                        .iter()
                        .map(|card| CardSnapshot::new(card, self.strategy))
                        .collect(),
                }
            })
            .collect();

        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at_string(),
            state: self.state,
            strategy: self.strategy,
            strategy_name: self.strategy.map(|s| s.name()),
            last_called: self.last_called(),
            called_balls: self.called_balls().to_vec(),
            balls_remaining: self.balls_remaining(),
            players,
            winner: self.winner.clone(),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

fn new_game_id(rng: &mut StdRng) -> String {
    format!("game_{:08x}", rng.random::<u32>())
}

/// Serializable view of a session, for renderers and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: String,
    pub state: GameState,
    pub strategy: Option<WinStrategy>,
    pub strategy_name: Option<&'static str>,
    pub last_called: Option<Number>,
    pub called_balls: Vec<Number>,
    pub balls_remaining: usize,
    pub players: Vec<PlayerSnapshot>,
    pub winner: Option<Winner>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardSnapshot {
    pub id: String,
    pub numbers: Vec<Vec<Number>>,
    pub marked: Vec<Vec<bool>>,
    pub winning_cells: CellSet,
}

impl CardSnapshot {
    fn new(card: &Card, strategy: Option<WinStrategy>) -> Self {
        CardSnapshot {
            id: card.id_string(),
            numbers: card.numbers().to_vec(),
            marked: card.marked().to_vec(),
            winning_cells: strategy.map(|s| s.winning_cells(card)).unwrap_or_default(),
        }
    }
}

/// A roster entry waiting to be built: either a card count to generate or
/// ready-made cards.
#[derive(Debug, Clone)]
enum PendingPlayer {
    Generated { name: String, card_count: usize },
    Prebuilt(Player),
}

/// Assembles a ready-to-play session: range, roster with per-player card
/// counts, strategy (fixed or random) and an optional seed.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    min: Number,
    max: Number,
    seed: Option<u64>,
    strategy: Option<WinStrategy>,
    draw_order: Option<Vec<Number>>,
    players: Vec<PendingPlayer>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        SessionBuilder {
            min: FIRSTNUMBER,
            max: LASTNUMBER,
            seed: None,
            strategy: None,
            draw_order: None,
            players: Vec::new(),
        }
    }

    /// Builder preloaded with the range, seed and strategy from a config.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut builder = Self::new().range(config.min_ball, config.max_ball);
        builder.seed = config.seed;
        builder.strategy = config.strategy;
        builder
    }

    pub fn range(mut self, min: Number, max: Number) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use this strategy instead of a random pick.
    pub fn strategy(mut self, strategy: WinStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Call the balls in exactly this order.
    pub fn draw_order(mut self, order: Vec<Number>) -> Self {
        self.draw_order = Some(order);
        self
    }

    /// A player who gets `card_count` freshly generated standard cards.
    pub fn player(mut self, name: impl Into<String>, card_count: usize) -> Self {
        self.players.push(PendingPlayer::Generated {
            name: name.into(),
            card_count,
        });
        self
    }

    /// A player who brings their own cards.
    pub fn player_with_cards(mut self, player: Player) -> Self {
        self.players.push(PendingPlayer::Prebuilt(player));
        self
    }

    pub fn build(self) -> Result<GameSession> {
        let (mut session, mut generator) = match self.seed {
            Some(seed) => {
                let session = GameSession::seeded(self.min, self.max, seed)?;
                (session, CardGenerator::seeded(seed.rotate_left(32)))
            }
            None => (GameSession::with_range(self.min, self.max)?, CardGenerator::new()),
        };

        if let Some(order) = self.draw_order {
            session.drawer = match self.seed {
                Some(seed) => BallDrawer::seeded_with_order(self.min, self.max, order, seed)?,
                None => BallDrawer::with_order(self.min, self.max, order)?,
            };
        }

        for pending in self.players {
            let player = match pending {
                PendingPlayer::Generated { name, card_count } => {
                    Player::with_cards(name, generator.generate_cards(card_count))
                }
                PendingPlayer::Prebuilt(player) => player,
            };
            session.add_player(player)?;
        }

        match self.strategy {
            Some(strategy) => session.set_strategy(strategy)?,
            None => {
                session.choose_strategy_randomly()?;
            }
        }

        Ok(session)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
