//! Match orchestrator
//!
//! Owns one match for the whole turn loop. Every action is validated against
//! the side to move before anything changes; a rejection leaves the state
//! exactly as it was.
//!
//! Per-round upkeep runs after the opponent's move:
//! bonding -> trust decay -> random dysregulation -> contagion -> storm tick
//! -> natural recovery -> breakthroughs -> trauma processing -> defection
//! -> storm trigger check.

use tracing::{debug, info};

use crate::ai::Opponent;
use crate::board::{execute, integrity, legal_moves_for_piece, legal_moves_for_side, Move, MoveOutcome};
use crate::core::error::RejectReason;
use crate::core::rng::GameRng;
use crate::core::types::{PieceId, Position, Team};
use crate::emotion::{
    bonding, breakthrough, contagion, defection, dysregulation, recovery, trauma, RoundContext,
};
use crate::empathy::{CommandId, CommandOption};
use crate::game::events::{EventLog, EventSink, GameEvent};
use crate::game::state::{GameState, MatchOutcome, PendingChain};
use crate::piece::Piece;
use crate::storm::{MitigationAction, RoundSignals};

pub type ActionResult = Result<Vec<GameEvent>, RejectReason>;

pub struct Match<R: GameRng> {
    state: GameState,
    rng: R,
    sinks: Vec<Box<dyn EventSink>>,
}

impl<R: GameRng> Match<R> {
    pub fn new(state: GameState, rng: R) -> Self {
        Self {
            state,
            rng,
            sinks: Vec::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scenario setup; bypasses validation
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Swap or script the dice mid-match
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn into_parts(self) -> (GameState, R) {
        (self.state, self.rng)
    }

    fn publish(&mut self, mut log: EventLog) -> Vec<GameEvent> {
        let events = log.take();
        for sink in self.sinks.iter_mut() {
            for event in &events {
                sink.emit(event);
            }
        }
        events
    }

    fn ensure_live(&self) -> Result<(), RejectReason> {
        if self.state.is_over() {
            Err(RejectReason::MatchOver)
        } else {
            Ok(())
        }
    }

    fn ensure_player_turn(&self) -> Result<(), RejectReason> {
        self.ensure_live()?;
        if self.state.side_to_move != Team::Player {
            return Err(RejectReason::NotYourTurn);
        }
        if self.state.pending_chain.is_some() {
            return Err(RejectReason::MustContinueCapture);
        }
        Ok(())
    }

    fn check_piece(&self, id: PieceId) -> Result<&Piece, RejectReason> {
        self.ensure_live()?;
        let piece = self.state.roster.get(id).ok_or(RejectReason::UnknownPiece)?;
        if piece.captured {
            return Err(RejectReason::PieceCaptured);
        }
        if piece.team != self.state.side_to_move {
            return Err(match self.state.side_to_move {
                Team::Opponent => RejectReason::NotYourTurn,
                Team::Player => RejectReason::OpponentPiece,
            });
        }
        if let Some(chain) = &self.state.pending_chain {
            if chain.piece != id {
                return Err(RejectReason::MustContinueCapture);
            }
            return Ok(piece);
        }
        piece.check_selectable()?;
        Ok(piece)
    }

    /// Pieces the side to move may pick up right now
    pub fn selectable_pieces(&self) -> Vec<PieceId> {
        if self.state.is_over() {
            return Vec::new();
        }
        if let Some(chain) = &self.state.pending_chain {
            return vec![chain.piece];
        }
        let mut ids: Vec<PieceId> = legal_moves_for_side(
            &self.state.board,
            &self.state.roster,
            self.state.side_to_move,
            self.state.config.forced_capture,
        )
        .into_iter()
        .map(|m| m.piece)
        .collect();
        ids.dedup();
        ids
    }

    /// Full legal moves for a piece; mid-chain, the chains still open to it
    pub fn legal_moves(&self, id: PieceId) -> Result<Vec<Move>, RejectReason> {
        self.check_piece(id)?;
        if let Some(chain) = &self.state.pending_chain {
            return Ok(chain.remaining.clone());
        }
        Ok(legal_moves_for_piece(
            &self.state.board,
            &self.state.roster,
            id,
            self.state.config.forced_capture,
        ))
    }

    fn chain_step(&self) -> usize {
        self.state.pending_chain.as_ref().map(|c| c.steps).unwrap_or(0)
    }

    /// Squares the piece can land on with its next step
    pub fn legal_destinations(&self, id: PieceId) -> Result<Vec<Position>, RejectReason> {
        let step = self.chain_step();
        let mut squares: Vec<Position> = self
            .legal_moves(id)?
            .iter()
            .filter_map(|m| m.path.get(step).copied())
            .collect();
        squares.sort();
        squares.dedup();
        Ok(squares)
    }

    /// Move one step: a simple move, or one jump of a capture chain
    ///
    /// While further jumps remain the same side keeps the move and only the
    /// chain piece may act.
    pub fn move_piece(&mut self, id: PieceId, to: Position) -> ActionResult {
        let step = self.chain_step();
        let candidates: Vec<Move> = self
            .legal_moves(id)?
            .into_iter()
            .filter(|m| m.path.get(step) == Some(&to))
            .collect();
        let Some(first) = candidates.first() else {
            return Err(RejectReason::IllegalDestination);
        };
        let from = self.state.board.position_of(id).ok_or(RejectReason::PieceCaptured)?;
        let single = Move {
            piece: id,
            from,
            path: vec![to],
            captured: first.captured.get(step).copied().into_iter().collect(),
        };
        let origin = self.state.pending_chain.as_ref().map(|c| c.from).unwrap_or(first.from);
        let steps = step + 1;
        let captured: Vec<PieceId> = first.captured.iter().take(steps).copied().collect();
        let done = candidates.iter().all(|m| m.path.len() <= steps);

        let outcome = execute(&mut self.state.board, &mut self.state.roster, &single)?;
        let mut log = EventLog::new();
        self.after_execute(&outcome, &mut log);

        if done {
            self.state.pending_chain = None;
            self.finish_move(id, origin, to, captured, &mut log);
        } else {
            debug!(piece = %id, at = %to, "Capture chain continues");
            log.push(GameEvent::ChainContinues {
                turn: self.state.turn,
                piece: id,
                at: to,
            });
            self.state.pending_chain = Some(PendingChain {
                piece: id,
                from: origin,
                steps,
                remaining: candidates,
            });
        }
        Ok(self.publish(log))
    }

    /// Play a complete move in one go
    pub fn play(&mut self, mv: &Move) -> ActionResult {
        if self.state.pending_chain.is_some() {
            self.ensure_live()?;
            return Err(RejectReason::MustContinueCapture);
        }
        if !self.legal_moves(mv.piece)?.contains(mv) {
            return Err(RejectReason::IllegalDestination);
        }
        let outcome = execute(&mut self.state.board, &mut self.state.roster, mv)?;
        let mut log = EventLog::new();
        self.after_execute(&outcome, &mut log);
        self.finish_move(mv.piece, mv.from, mv.to(), mv.captured.clone(), &mut log);
        Ok(self.publish(log))
    }

    /// Immediate reactions to an executed step: capture witnesses and promotion
    fn after_execute(&mut self, outcome: &MoveOutcome, log: &mut EventLog) {
        let turn = self.state.turn;
        for &(victim, square) in &outcome.captured {
            self.state.captured.push(victim);
            self.state.signals.capture = true;
            if let Some(v) = self.state.roster.get(victim) {
                log.push(GameEvent::PieceCaptured {
                    turn,
                    piece: victim,
                    name: v.name.clone(),
                    team: v.team,
                    by: outcome.piece,
                    square,
                });
            }
            let GameState {
                board, roster, config, ..
            } = &mut self.state;
            let mut ctx = RoundContext::new(turn, config, &mut self.rng, log);
            let witnesses = trauma::witness_capture(board, roster, victim, square, &mut ctx);
            if witnesses > 0 {
                debug!(victim = %victim, witnesses, "Capture witnessed");
            }
        }

        if outcome.promoted {
            if let Some(piece) = self.state.roster.get_mut(outcome.piece) {
                log.push(GameEvent::PiecePromoted {
                    turn,
                    piece: piece.id,
                    name: piece.name.clone(),
                    square: outcome.to,
                });
                let transition = dysregulation::promotion_anxiety(piece, turn, &mut self.rng);
                log.transition(piece, transition.as_ref());
            }
        }

        if !defection::check(&mut self.state.roster, turn, log).is_empty() {
            self.state.signals.defection = true;
        }
    }

    fn finish_move(&mut self, piece: PieceId, from: Position, to: Position, captured: Vec<PieceId>, log: &mut EventLog) {
        let name = self.state.roster.get(piece).map(|p| p.name.clone()).unwrap_or_default();
        log.push(GameEvent::MoveCompleted {
            turn: self.state.turn,
            team: self.state.side_to_move,
            piece,
            name,
            from,
            to,
            captured,
        });
        integrity::verify(&mut self.state.board, &mut self.state.roster);
        self.advance(log);
    }

    fn advance(&mut self, log: &mut EventLog) {
        match self.state.side_to_move {
            Team::Player => self.state.side_to_move = Team::Opponent,
            Team::Opponent => {
                self.end_round(log);
                self.state.side_to_move = Team::Player;
                self.begin_player_turn();
            }
        }
        if self.state.outcome.is_none() {
            if let Some(outcome) = self.state.evaluate_outcome() {
                self.conclude(outcome, log);
            }
        }
    }

    fn end_round(&mut self, log: &mut EventLog) {
        let turn = self.state.turn;
        let GameState {
            board,
            roster,
            storm,
            config,
            signals,
            storm_weights,
            ..
        } = &mut self.state;

        {
            let mut ctx = RoundContext::new(turn, config, &mut self.rng, log);
            bonding::apply(board, roster, &mut ctx);
            recovery::decay_trust(roster, &mut ctx);
            dysregulation::random_checks(roster, &mut ctx);
            contagion::spread(board, roster, &mut ctx);
            storm.tick(board, roster, &mut ctx);
            recovery::natural_recovery(roster, &mut ctx);
            breakthrough::process_ready(roster, &mut ctx);
            trauma::process(roster, &mut ctx);
        }
        if !defection::check(roster, turn, log).is_empty() {
            signals.defection = true;
        }
        storm.check_trigger(roster, signals, storm_weights, turn, config, &mut self.rng, log);
        *signals = RoundSignals::default();

        self.state.turn += 1;
        if self.state.turn > self.state.config.max_turns {
            self.conclude(MatchOutcome::Draw, log);
        }
    }

    /// Reset per-turn empathy flags and mark pieces that will not move without it
    fn begin_player_turn(&mut self) {
        for piece in self.state.roster.iter_mut().filter(|p| p.is_emotional()) {
            piece.empathy_provided = false;
            piece.needs_empathy_first = piece
                .emotional_state
                .kind()
                .map(|k| k.needs_empathy_first())
                .unwrap_or(false);
        }
    }

    fn conclude(&mut self, outcome: MatchOutcome, log: &mut EventLog) {
        let turn = self.state.turn;
        info!(turn, ?outcome, "Match over");
        self.state.outcome = Some(outcome);
        self.state.pending_chain = None;
        log.push(GameEvent::MatchEnded { turn, outcome });
    }

    fn check_empathy_target(&self, id: PieceId) -> Result<&Piece, RejectReason> {
        self.ensure_player_turn()?;
        let piece = self.state.roster.get(id).ok_or(RejectReason::UnknownPiece)?;
        if piece.captured {
            return Err(RejectReason::PieceCaptured);
        }
        if piece.team != Team::Player || piece.defected {
            return Err(RejectReason::OpponentPiece);
        }
        if piece.is_regulated() {
            return Err(RejectReason::NotDysregulated);
        }
        Ok(piece)
    }

    /// Up to four ranked commands for a dysregulated player piece
    pub fn empathy_options(&self, id: PieceId) -> Result<Vec<CommandOption>, RejectReason> {
        let piece = self.check_empathy_target(id)?;
        Ok(self.state.empathy.options(piece))
    }

    /// Resolve an empathy command; a resulting trust collapse defects at once
    pub fn apply_empathy(&mut self, id: PieceId, command: CommandId) -> ActionResult {
        self.check_empathy_target(id)?;
        let turn = self.state.turn;
        let mut log = EventLog::new();

        let piece = self.state.roster.get_mut(id).ok_or(RejectReason::UnknownPiece)?;
        let resolution = self.state.empathy.resolve(piece, command, turn, &mut self.rng)?;
        for transition in &resolution.transitions {
            log.push(GameEvent::state_changed(piece, transition));
        }
        log.push(GameEvent::EmpathyResolved {
            turn,
            piece: id,
            name: piece.name.clone(),
            command,
            outcome: resolution.outcome,
            trust_before: resolution.initial_trust,
            trust_after: resolution.final_trust,
            state_before: resolution.initial_state,
            state_after: resolution.final_state,
            combo: resolution.combo,
        });

        if !defection::check(&mut self.state.roster, turn, &mut log).is_empty() {
            self.state.signals.defection = true;
            if let Some(outcome) = self.state.evaluate_outcome() {
                self.conclude(outcome, &mut log);
            }
        }
        Ok(self.publish(log))
    }

    pub fn mitigation_options(&self) -> Vec<MitigationAction> {
        self.state
            .storm
            .available_mitigations(&self.state.board, &self.state.roster)
    }

    /// Try a mitigation action against an approaching storm
    pub fn mitigate_storm(&mut self, action: MitigationAction) -> ActionResult {
        self.ensure_player_turn()?;
        let mut log = EventLog::new();
        let GameState {
            board,
            roster,
            storm,
            config,
            turn,
            ..
        } = &mut self.state;
        storm.mitigate(action, board, roster, *turn, config, &mut self.rng, &mut log)?;
        Ok(self.publish(log))
    }

    /// Give up the move; only allowed when no legal move exists
    pub fn pass_turn(&mut self) -> ActionResult {
        self.ensure_live()?;
        if self.state.pending_chain.is_some() {
            return Err(RejectReason::MustContinueCapture);
        }
        let team = self.state.side_to_move;
        let moves = legal_moves_for_side(
            &self.state.board,
            &self.state.roster,
            team,
            self.state.config.forced_capture,
        );
        if !moves.is_empty() {
            return Err(RejectReason::MovesAvailable);
        }
        debug!(team = ?team, "Turn passed");
        let mut log = EventLog::new();
        log.push(GameEvent::TurnPassed {
            turn: self.state.turn,
            team,
        });
        self.advance(&mut log);
        Ok(self.publish(log))
    }

    /// Let an opponent implementation move for the side to move
    pub fn ai_turn(&mut self, ai: &dyn Opponent) -> ActionResult {
        self.ensure_live()?;
        if self.state.pending_chain.is_some() {
            return Err(RejectReason::MustContinueCapture);
        }
        let choice = ai.choose_move(
            &self.state.board,
            &self.state.roster,
            self.state.side_to_move,
            self.state.config.forced_capture,
            &mut self.rng,
        );
        match choice {
            Some(mv) => self.play(&mv),
            None => self.pass_turn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::rng::{ScriptedRng, SeededRng};
    use crate::piece::{DysregulationKind, Personality, TransitionCause};

    pub(crate) fn state_with(pieces: &[(u32, Team, u8, u8)]) -> GameState {
        let mut state = GameState::empty(SimulationConfig::default());
        for &(id, team, row, col) in pieces {
            let piece = Piece::new(PieceId(id), format!("P{}", id), team, Personality::default(), 5.0, 20);
            state.add_piece(piece, Position::new(row, col)).unwrap();
        }
        state
    }

    fn simple() -> Match<SeededRng> {
        Match::new(
            state_with(&[
                (1, Team::Player, 5, 0),
                (2, Team::Player, 5, 4),
                (10, Team::Opponent, 0, 1),
                (11, Team::Opponent, 0, 5),
            ]),
            SeededRng::with_seed(1),
        )
    }

    #[test]
    fn test_simple_move_hands_over_the_turn() {
        let mut game = simple();
        let events = game.move_piece(PieceId(1), Position::new(4, 1)).unwrap();
        assert!(matches!(events.last(), Some(GameEvent::MoveCompleted { .. })));
        assert_eq!(game.state().side_to_move, Team::Opponent);
        assert_eq!(game.state().board.get(Position::new(4, 1)), Some(PieceId(1)));
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut game = simple();
        let before = game.state().clone();
        assert_eq!(
            game.move_piece(PieceId(10), Position::new(1, 0)),
            Err(RejectReason::OpponentPiece)
        );
        assert_eq!(
            game.move_piece(PieceId(1), Position::new(3, 2)),
            Err(RejectReason::IllegalDestination)
        );
        assert_eq!(game.move_piece(PieceId(99), Position::new(4, 1)), Err(RejectReason::UnknownPiece));
        assert_eq!(game.state(), &before);

        game.move_piece(PieceId(1), Position::new(4, 1)).unwrap();
        assert_eq!(
            game.move_piece(PieceId(2), Position::new(4, 5)),
            Err(RejectReason::NotYourTurn)
        );
    }

    #[test]
    fn test_frozen_piece_is_never_selectable() {
        let mut game = simple();
        game.state_mut()
            .roster
            .get_mut(PieceId(1))
            .unwrap()
            .dysregulate(DysregulationKind::Freeze, TransitionCause::Storm, 1);
        assert_eq!(game.selectable_pieces(), vec![PieceId(2)]);
        assert_eq!(
            game.move_piece(PieceId(1), Position::new(4, 1)),
            Err(RejectReason::Frozen)
        );
    }

    #[test]
    fn test_capture_chain_keeps_the_turn() {
        let mut game = Match::new(
            state_with(&[
                (1, Team::Player, 6, 1),
                (10, Team::Opponent, 5, 2),
                (11, Team::Opponent, 3, 4),
                (12, Team::Opponent, 0, 7),
                (2, Team::Player, 7, 6),
            ]),
            SeededRng::with_seed(3),
        );
        assert_eq!(game.legal_destinations(PieceId(1)).unwrap(), vec![Position::new(4, 3)]);

        let events = game.move_piece(PieceId(1), Position::new(4, 3)).unwrap();
        assert!(events.iter().any(|e| matches!(e, GameEvent::ChainContinues { .. })));
        assert_eq!(game.state().side_to_move, Team::Player);
        assert_eq!(
            game.move_piece(PieceId(2), Position::new(6, 5)),
            Err(RejectReason::MustContinueCapture)
        );
        assert_eq!(game.pass_turn(), Err(RejectReason::MustContinueCapture));
        assert_eq!(game.legal_destinations(PieceId(1)).unwrap(), vec![Position::new(2, 5)]);

        let events = game.move_piece(PieceId(1), Position::new(2, 5)).unwrap();
        let completed = events
            .iter()
            .find_map(|e| match e {
                GameEvent::MoveCompleted { from, captured, .. } => Some((*from, captured.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(completed, (Position::new(6, 1), vec![PieceId(10), PieceId(11)]));
        assert_eq!(game.state().side_to_move, Team::Opponent);
        assert_eq!(game.state().captured, vec![PieceId(10), PieceId(11)]);
    }

    #[test]
    fn test_round_upkeep_advances_turn() {
        let mut game = simple();
        game.move_piece(PieceId(1), Position::new(4, 1)).unwrap();
        game.move_piece(PieceId(10), Position::new(1, 0)).unwrap();
        assert_eq!(game.state().turn, 2);
        assert_eq!(game.state().side_to_move, Team::Player);
    }

    #[test]
    fn test_turn_limit_is_a_draw() {
        let mut game = simple();
        game.state_mut().config.max_turns = 1;
        game.move_piece(PieceId(1), Position::new(4, 1)).unwrap();
        let events = game.move_piece(PieceId(10), Position::new(1, 0)).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::MatchEnded {
                outcome: MatchOutcome::Draw,
                ..
            }
        )));
        assert_eq!(
            game.move_piece(PieceId(2), Position::new(4, 5)),
            Err(RejectReason::MatchOver)
        );
    }

    #[test]
    fn test_empathy_needs_a_dysregulated_player_piece() {
        let mut game = Match::new(simple().into_parts().0, ScriptedRng::new([0.0]));
        assert_eq!(
            game.apply_empathy(PieceId(1), CommandId::Listen),
            Err(RejectReason::NotDysregulated)
        );
        assert_eq!(
            game.apply_empathy(PieceId(10), CommandId::Listen),
            Err(RejectReason::OpponentPiece)
        );
        game.state_mut()
            .roster
            .get_mut(PieceId(1))
            .unwrap()
            .dysregulate(DysregulationKind::Anxious, TransitionCause::Storm, 1);
        assert!(!game.empathy_options(PieceId(1)).unwrap().is_empty());

        let events = game.apply_empathy(PieceId(1), CommandId::Listen).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::EmpathyResolved {
                outcome: crate::empathy::Outcome::CriticalSuccess,
                ..
            }
        )));
        assert!(game.state().roster.get(PieceId(1)).unwrap().is_regulated());
    }

    #[test]
    fn test_needs_empathy_flag_set_at_turn_start() {
        let mut game = simple();
        game.state_mut()
            .roster
            .get_mut(PieceId(2))
            .unwrap()
            .dysregulate(DysregulationKind::Shutdown, TransitionCause::Storm, 1);
        game.move_piece(PieceId(1), Position::new(4, 1)).unwrap();
        game.move_piece(PieceId(10), Position::new(1, 0)).unwrap();
        let piece = game.state().roster.get(PieceId(2)).unwrap();
        if !piece.is_regulated() {
            assert!(piece.needs_empathy_first);
            assert_eq!(
                game.move_piece(PieceId(2), Position::new(4, 5)),
                Err(RejectReason::NeedsEmpathy)
            );
        }
    }

    #[test]
    fn test_pass_only_without_moves() {
        let mut game = simple();
        assert_eq!(game.pass_turn(), Err(RejectReason::MovesAvailable));
    }

    #[test]
    fn test_witness_defects_on_the_capture_that_ends_the_match() {
        let mut state = state_with(&[
            (1, Team::Player, 3, 2),
            (2, Team::Player, 3, 4),
            (10, Team::Opponent, 2, 1),
        ]);
        state.side_to_move = Team::Opponent;
        state.roster.get_mut(PieceId(2)).unwrap().adjust_trust(-9.8, 1);
        let mut game = Match::new(state, SeededRng::with_seed(3));

        let events = game.move_piece(PieceId(10), Position::new(4, 3)).unwrap();

        let defected_at = events
            .iter()
            .position(|e| matches!(e, GameEvent::Defection { piece, .. } if *piece == PieceId(2)))
            .unwrap();
        let completed_at = events
            .iter()
            .position(|e| matches!(e, GameEvent::MoveCompleted { .. }))
            .unwrap();
        assert!(defected_at < completed_at);
        assert_eq!(game.state().roster.get(PieceId(2)).unwrap().team, Team::Opponent);
        assert_eq!(
            game.state().outcome,
            Some(MatchOutcome::Winner {
                team: Team::Opponent,
                reason: crate::game::state::WinReason::NoPieces
            })
        );
    }
}
