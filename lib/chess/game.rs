use crate::chess::{Board, Castles, Color, File, Move, Outcome, Piece, Position, Role};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// The reason why a move was rejected.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display("invalid move")]
pub struct InvalidMove;

/// The rules engine for one game of chess.
///
/// Owns the [`Board`] plus the transient rules state that cannot be read off
/// the board alone: the side to move, the remaining [`Castles`] rights, and
/// the en passant window for the current ply. The transient state is
/// recomputed on every accepted move, never inferred by scanning history.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    turn: Color,
    castles: Castles,
    en_passant: Vec<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Game {
            board: Board::default(),
            turn: Color::White,
            castles: Castles::all(),
            en_passant: Vec::new(),
        }
    }
}

impl Game {
    /// A game at the standard starting position, white to move.
    pub fn new() -> Self {
        Game::default()
    }

    /// A game set up from an arbitrary board position.
    pub fn from_position(board: Board, turn: Color) -> Self {
        Game {
            board,
            turn,
            castles: Castles::all(),
            en_passant: Vec::new(),
        }
    }

    /// The current [`Board`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The fully legal moves for the piece on the given square, or `None`
    /// if the square is empty.
    ///
    /// Candidates are the piece's geometric moves plus any live en passant
    /// or castle move starting there; each candidate is then simulated on a
    /// board clone and discarded if it leaves the mover's own king in check.
    /// The live board is never mutated during this scan.
    pub fn legal_moves(&self, pos: Position) -> Option<Vec<Move>> {
        let piece = self.board.piece_on(pos)?;

        let mut moves = piece.moves(&self.board, pos);
        moves.extend(self.en_passant.iter().filter(|m| m.start() == pos));
        moves.extend(self.castle_moves(pos, piece));
        moves.retain(|&m| !self.leaves_king_exposed(m, piece.color()));

        Some(moves)
    }

    /// Whether the given side's king is attacked.
    ///
    /// Check is computed from the opponent's *unfiltered* geometric moves;
    /// filtering them for legality would recurse back into this function.
    pub fn is_in_check(&self, color: Color) -> bool {
        Self::check_on(&self.board, color)
    }

    /// Whether the given side has at least one legal move.
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.board
            .iter()
            .filter(|(p, _)| p.color() == color)
            .any(|(_, pos)| self.legal_moves(pos).is_some_and(|ms| !ms.is_empty()))
    }

    /// Whether the given side is checkmated.
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// Whether the given side is stalemated.
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// The terminal state derived from the board, if the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_in_checkmate(self.turn) {
            Some(Outcome::Checkmate(!self.turn))
        } else if self.is_in_stalemate(self.turn) {
            Some(Outcome::Stalemate)
        } else {
            None
        }
    }

    /// Makes a move, failing with [`InvalidMove`] unless the piece on the
    /// start square belongs to the side to move and the move is in its
    /// legal set.
    pub fn make_move(&mut self, m: Move) -> Result<(), InvalidMove> {
        let piece = self.board.piece_on(m.start()).ok_or(InvalidMove)?;

        if piece.color() != self.turn {
            return Err(InvalidMove);
        }

        match self.legal_moves(m.start()) {
            Some(moves) if moves.contains(&m) => {}
            _ => return Err(InvalidMove),
        }

        Self::apply(&mut self.board, m);
        self.castles.discard(m.start());
        self.en_passant = Self::en_passant_window(&self.board, m, piece);
        self.turn = !self.turn;

        Ok(())
    }

    /// The castle moves available to the piece on `pos`, subject to the
    /// full legality conditions: rights intact, rook at its original
    /// square, empty path, and a king that is neither in check now nor
    /// passing through or landing on an attacked square. The safety checks
    /// simulate on board clones, never on live state.
    fn castle_moves(&self, pos: Position, piece: Piece) -> Vec<Move> {
        let mut moves = Vec::new();
        let side = piece.color();
        let rank = side.home_rank();

        if piece.role() != Role::King || pos != Position::new(File::E, rank) {
            return moves;
        }

        let candidates = [
            (
                self.castles.has_short(side),
                File::H,
                &[File::F, File::G][..],
                File::F,
                File::G,
            ),
            (
                self.castles.has_long(side),
                File::A,
                &[File::B, File::C, File::D][..],
                File::D,
                File::C,
            ),
        ];

        for (right, rook_file, between, through, destination) in candidates {
            if !right {
                continue;
            }

            let rook = Position::new(rook_file, rank);
            if self.board.piece_on(rook) != Some(Piece::new(side, Role::Rook)) {
                continue;
            }

            if between
                .iter()
                .any(|&f| self.board.piece_on(Position::new(f, rank)).is_some())
            {
                continue;
            }

            if Self::check_on(&self.board, side) {
                continue;
            }

            let step = Move(pos, Position::new(through, rank), None);
            let castle = Move(pos, Position::new(destination, rank), None);
            if self.leaves_king_exposed(step, side) || self.leaves_king_exposed(castle, side) {
                continue;
            }

            moves.push(castle);
        }

        moves
    }

    /// Simulates a move on a clone of the board and reports whether it
    /// leaves the given side's king in check; the clone is then discarded.
    fn leaves_king_exposed(&self, m: Move, color: Color) -> bool {
        let mut board = self.board.clone();
        Self::apply(&mut board, m);
        Self::check_on(&board, color)
    }

    fn check_on(board: &Board, color: Color) -> bool {
        let king = board.king(color).expect("the king is missing from the board");

        board
            .iter()
            .filter(|(p, _)| p.color() != color)
            .any(|(p, pos)| p.moves(board, pos).iter().any(|m| m.end() == king))
    }

    /// Applies a move to a board, including the side effects that follow
    /// from its shape: an en passant capture removes the passed pawn, a
    /// two-file king move drags the rook along, and a promotion replaces
    /// the pawn.
    fn apply(board: &mut Board, m: Move) {
        let Some(piece) = board.piece_on(m.start()) else {
            debug_assert!(false, "no piece on {}", m.start());
            return;
        };

        if piece.role() == Role::Pawn
            && m.start().column() != m.end().column()
            && board.piece_on(m.end()).is_none()
        {
            if let Some(captured) = Position::try_new(m.start().row(), m.end().column()) {
                board.place(captured, None);
            }
        }

        if piece.role() == Role::King && (m.end().column() - m.start().column()).abs() == 2 {
            let rank = m.start().rank();
            let (from, to) = if m.end().column() > m.start().column() {
                (File::H, File::F)
            } else {
                (File::A, File::D)
            };

            let rook = board.piece_on(Position::new(from, rank));
            board.place(Position::new(from, rank), None);
            board.place(Position::new(to, rank), rook);
        }

        let placed = match m.promotion() {
            Some(role) => Piece::new(piece.color(), role),
            None => piece,
        };

        board.place(m.start(), None);
        board.place(m.end(), Some(placed));
    }

    /// The en passant captures the opponent may answer with on the next
    /// ply: set iff `m` was a double pawn advance and an enemy pawn sits
    /// immediately beside its landing square. The capture target is the
    /// square directly behind the landing square.
    fn en_passant_window(board: &Board, m: Move, piece: Piece) -> Vec<Move> {
        let mut window = Vec::new();

        if piece.role() != Role::Pawn || (m.end().row() - m.start().row()).abs() != 2 {
            return window;
        }

        let Some(behind) = Position::try_new((m.start().row() + m.end().row()) / 2, m.end().column())
        else {
            return window;
        };

        for dc in [-1, 1] {
            if let Some(beside) = m.end().offset(0, dc) {
                if board.piece_on(beside) == Some(Piece::new(!piece.color(), Role::Pawn)) {
                    window.push(Move(beside, behind, None));
                }
            }
        }

        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(placement: &str, turn: Color) -> Game {
        Game::from_position(placement.parse().unwrap(), turn)
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for m in moves {
            game.make_move(m.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn legal_moves_returns_none_on_an_empty_square() {
        assert_eq!(Game::new().legal_moves("e4".parse().unwrap()), None);
    }

    #[test]
    fn turn_alternates_strictly_after_each_accepted_move() {
        let mut game = Game::new();
        assert_eq!(game.turn(), Color::White);

        for (n, m) in ["e2e4", "e7e5", "g1f3", "b8c6"].iter().enumerate() {
            game.make_move(m.parse().unwrap()).unwrap();
            match n % 2 {
                0 => assert_eq!(game.turn(), Color::Black),
                _ => assert_eq!(game.turn(), Color::White),
            }
        }
    }

    #[test]
    fn moving_out_of_turn_is_rejected() {
        let mut game = Game::new();
        assert_eq!(game.make_move("e7e5".parse().unwrap()), Err(InvalidMove));
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn geometrically_unreachable_moves_are_rejected() {
        let mut game = Game::new();
        assert_eq!(game.make_move("e2e5".parse().unwrap()), Err(InvalidMove));
        assert_eq!(game.make_move("a1a5".parse().unwrap()), Err(InvalidMove));
    }

    #[test]
    fn after_e4_the_e7_pawn_still_has_both_advances() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);

        let moves = game.legal_moves("e7".parse().unwrap()).unwrap();
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&"e7e6".parse().unwrap()));
        assert!(moves.contains(&"e7e5".parse().unwrap()));
    }

    #[test]
    fn a_pinned_piece_has_no_legal_moves() {
        let game = position("4r3/8/8/8/8/8/4B3/4K3", Color::White);
        assert_eq!(game.legal_moves("e2".parse().unwrap()), Some(vec![]));
    }

    #[test]
    fn the_king_may_not_step_into_an_attacked_square() {
        let game = position("4r3/8/8/8/8/8/8/3K4", Color::White);

        let moves = game.legal_moves("d1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"d1e1".parse().unwrap()));
        assert!(!moves.contains(&"d1e2".parse().unwrap()));
        assert!(moves.contains(&"d1c1".parse().unwrap()));
    }

    #[test]
    fn fools_mate_ends_in_checkmate() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert!(game.is_in_check(Color::White));
        assert!(game.is_in_checkmate(Color::White));
        assert!(!game.is_in_stalemate(Color::White));
        assert_eq!(game.outcome(), Some(Outcome::Checkmate(Color::Black)));
    }

    #[test]
    fn a_cornered_king_under_rook_attack_is_checkmated() {
        let game = position("k7/8/8/8/8/8/8/RR5K", Color::Black);

        assert!(game.is_in_check(Color::Black));
        assert!(game.is_in_checkmate(Color::Black));
        assert_eq!(game.outcome(), Some(Outcome::Checkmate(Color::White)));
    }

    #[test]
    fn a_cornered_king_with_no_moves_but_no_check_is_stalemated() {
        let game = position("k7/2Q5/8/8/8/8/8/7K", Color::Black);

        assert!(!game.is_in_check(Color::Black));
        assert!(game.is_in_stalemate(Color::Black));
        assert!(!game.is_in_checkmate(Color::Black));
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn checkmate_requires_check() {
        let game = Game::new();
        assert!(!game.is_in_checkmate(Color::White));
        assert!(!game.is_in_stalemate(Color::White));
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn a_double_advance_opens_the_en_passant_window() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "d7d5", "e4e5", "f7f5"]);

        let moves = game.legal_moves("e5".parse().unwrap()).unwrap();
        assert!(moves.contains(&"e5f6".parse().unwrap()));
    }

    #[test]
    fn capturing_en_passant_removes_the_passed_pawn() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "d7d5", "e4e5", "f7f5", "e5f6"]);

        assert_eq!(game.board().piece_on("f5".parse().unwrap()), None);
        assert_eq!(
            game.board().piece_on("f6".parse().unwrap()),
            Some(Piece::new(Color::White, Role::Pawn))
        );
    }

    #[test]
    fn the_en_passant_window_closes_after_one_ply() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "d7d5", "e4e5", "f7f5", "a2a3", "a7a6"]);

        let moves = game.legal_moves("e5".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e5f6".parse().unwrap()));
        assert_eq!(game.make_move("e5f6".parse().unwrap()), Err(InvalidMove));
    }

    #[test]
    fn a_double_advance_beside_no_enemy_pawn_opens_no_window() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        assert!(game
            .legal_moves("d7".parse().unwrap())
            .unwrap()
            .iter()
            .all(|m| m.end().column() == 4));
    }

    #[test]
    fn the_king_can_castle_kingside_once_the_path_is_clear() {
        let game = position("rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R", Color::White);

        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn castling_relocates_the_rook() {
        let mut game = position("rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R", Color::White);
        play(&mut game, &["e1g1"]);

        assert_eq!(
            game.board().piece_on("g1".parse().unwrap()),
            Some(Piece::new(Color::White, Role::King))
        );
        assert_eq!(
            game.board().piece_on("f1".parse().unwrap()),
            Some(Piece::new(Color::White, Role::Rook))
        );
        assert_eq!(game.board().piece_on("h1".parse().unwrap()), None);
        assert_eq!(game.board().piece_on("e1".parse().unwrap()), None);
    }

    #[test]
    fn moving_the_king_and_back_forfeits_castling() {
        let mut game = position("rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R", Color::White);
        play(&mut game, &["e1f1", "b8a6", "f1e1", "a6b8"]);

        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn moving_the_rook_and_back_forfeits_castling() {
        let mut game = position("rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R", Color::White);
        play(&mut game, &["h1g1", "b8a6", "g1h1", "a6b8"]);

        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn the_king_may_not_castle_out_of_check() {
        let game = position("4k3/8/8/8/8/8/4r3/4K2R", Color::White);
        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn the_king_may_not_castle_through_an_attacked_square() {
        let game = position("4kr2/8/8/8/8/8/8/4K2R", Color::White);
        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn the_king_may_not_castle_into_an_attacked_square() {
        let game = position("4k1r1/8/8/8/8/8/8/4K2R", Color::White);
        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn castling_requires_an_empty_path() {
        let game = Game::new();
        let moves = game.legal_moves("e1".parse().unwrap()).unwrap();
        assert!(moves.is_empty());
    }

    #[test]
    fn promotion_places_the_promoted_piece() {
        let mut game = position("4k3/P7/8/8/8/8/8/4K3", Color::White);
        play(&mut game, &["a7a8q"]);

        assert_eq!(
            game.board().piece_on("a8".parse().unwrap()),
            Some(Piece::new(Color::White, Role::Queen))
        );
    }

    #[test]
    fn a_pawn_may_not_reach_the_farthest_rank_without_promoting() {
        let mut game = position("4k3/P7/8/8/8/8/8/4K3", Color::White);
        assert_eq!(game.make_move("a7a8".parse().unwrap()), Err(InvalidMove));
    }

    #[test]
    fn legal_moves_never_leave_the_movers_king_in_check() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "d1h5", "b8c6", "h5f7"]);

        // black is in check; every legal reply must resolve it
        assert!(game.is_in_check(Color::Black));
        for pos in Position::iter() {
            let Some(moves) = game.legal_moves(pos) else {
                continue;
            };

            for m in moves {
                let mut next = game.clone();
                if game.board().color_on(pos) == Some(Color::Black) {
                    next.make_move(m).unwrap();
                    assert!(!next.is_in_check(Color::Black));
                }
            }
        }
    }

    #[test]
    fn making_a_move_never_mutates_state_on_rejection() {
        let mut game = Game::new();
        let before = game.clone();
        assert_eq!(game.make_move("e2d3".parse().unwrap()), Err(InvalidMove));
        assert_eq!(game, before);
    }

    #[test]
    fn game_serializes_to_json_and_back() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "d7d5"]);

        let json = serde_json::to_string(&game).unwrap();
        assert_eq!(serde_json::from_str::<Game>(&json).unwrap(), game);
    }
}
