//! Play command - a game on the terminal, against the AI or hot-seat
//!
//! Every move goes through the session store, exactly as a remote client's
//! would, so rejections come back with the same taxonomy.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: open_game(), Table::play()
//! - Level 3: human_turn(), ai_turn(), after_game()
//! - Level 4: command parsing, board rendering

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use nonaga_core::{
    legal_relocations, Color, GameState, HeuristicAI, Hex, MoveRequest, Phase, Status, TileId,
};
use nonaga_session::{GameId, Session, SessionStore, StoreError};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Color the AI plays, or `none` for two players at one terminal
    #[arg(long, value_enum, default_value = "blue")]
    pub ai: AiSide,

    /// AI weights JSON file
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiSide {
    Red,
    Blue,
    None,
}

impl AiSide {
    fn color(self) -> Option<Color> {
        match self {
            AiSide::Red => Some(Color::Red),
            AiSide::Blue => Some(Color::Blue),
            AiSide::None => None,
        }
    }
}

const HOST: &str = "player-1";
const GUEST: &str = "player-2";

const HELP: &str = "\
Commands:
  <piece> <q> <r>   slide a piece, e.g. `r1 0 1`
  <tile> <q> <r>    relocate a tile by index, e.g. `7 3 -1`
  hint [target]     legal destinations, for everything or one piece/tile
  tiles             list tile indices and coordinates
  board             show the board again
  help              this text
  quit              resign the game";

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load AI weights (when an AI plays)
/// 2. Open a game with both seats filled
/// 3. Alternate turns until someone wins or quits
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = crate::create_rng(seed);
    let ai = match args.ai.color() {
        Some(color) => {
            let heuristics = crate::load_heuristics(args.weights.as_deref())?;
            Some(Opponent {
                color,
                ai: HeuristicAI::with_seed(heuristics, rng.gen()),
            })
        }
        None => None,
    };

    let store = SessionStore::new();
    let id = open_game(&store, &mut rng)?;
    tracing::info!(game = %id, ai = ?args.ai, "starting local game");

    let mut table = Table::new(&store, id, ai, rng);
    table.play(&mut io::stdin().lock(), &mut io::stdout())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Create a game and seat the second player
fn open_game(store: &SessionStore, rng: &mut ChaCha8Rng) -> Result<GameId> {
    let created = store.create(HOST, rng);
    let joined = store
        .join(&created.id, created.version, GUEST)
        .context("Failed to seat the second player")?;
    Ok(joined.id)
}

struct Opponent {
    color: Color,
    ai: HeuristicAI,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// One local game and whoever sits at it
struct Table<'a> {
    store: &'a SessionStore,
    id: GameId,
    ai: Option<Opponent>,
    rng: ChaCha8Rng,
    /// Version last drawn, so the board is redrawn only after a change
    shown: Option<u64>,
}

impl<'a> Table<'a> {
    fn new(store: &'a SessionStore, id: GameId, ai: Option<Opponent>, rng: ChaCha8Rng) -> Self {
        Self {
            store,
            id,
            ai,
            rng,
            shown: None,
        }
    }

    fn play<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        writeln!(out, "{HELP}\n")?;

        loop {
            let session = self.store.get(&self.id)?;
            let flow = if session.state.is_terminal() {
                self.after_game(&session, input, out)?
            } else if self.ai_plays(session.state.turn()) {
                self.ai_turn(&session, out)?
            } else {
                self.human_turn(&session, input, out)?
            };

            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    // ========================================================================
    // LEVEL 3 - STEPS
    // ========================================================================

    fn ai_plays(&self, color: Color) -> bool {
        self.ai.as_ref().is_some_and(|opponent| opponent.color == color)
    }

    fn human_turn<R: BufRead, W: Write>(
        &mut self,
        session: &Session,
        input: &mut R,
        out: &mut W,
    ) -> Result<Flow> {
        let state = &session.state;
        if self.shown != Some(session.version) {
            write!(out, "{}", render_board(state))?;
            self.shown = Some(session.version);
        }

        let color = state.turn();
        let actor = seat_of(state, color)?;
        let action = match state.phase() {
            Phase::RelocateTile => "move a tile",
            _ => "slide a piece",
        };
        write!(out, "{color} to {action} > ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out)?;
            return Ok(Flow::Quit);
        };

        match parse_command(&line) {
            Err(message) => writeln!(out, "{message}")?,
            Ok(Command::Help) => writeln!(out, "{HELP}")?,
            Ok(Command::Board) => write!(out, "{}", render_board(state))?,
            Ok(Command::Tiles) => write!(out, "{}", render_tiles(state))?,
            Ok(Command::Hint(target)) => write!(out, "{}", render_hint(state, target.as_ref()))?,
            Ok(Command::Quit) => {
                match self.store.abandon(&self.id, session.version, &actor) {
                    Ok(_) => writeln!(out, "{color} resigns.")?,
                    Err(err) => writeln!(out, "{}", rejection_message(&err))?,
                }
            }
            Ok(Command::Move { target, to }) => {
                let request = target.into_request(&actor, to);
                match self.store.submit(&self.id, session.version, &request) {
                    Ok((_, motion)) => writeln!(out, "{color}: {} -> {}", motion.from, motion.to)?,
                    Err(err) => writeln!(out, "{}", rejection_message(&err))?,
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn ai_turn<W: Write>(&mut self, session: &Session, out: &mut W) -> Result<Flow> {
        let state = &session.state;
        let color = state.turn();
        let actor = seat_of(state, color)?;

        let Some(opponent) = self.ai.as_mut() else {
            bail!("No AI seated for {color}");
        };
        let Some(mv) = opponent.ai.next_move(state) else {
            bail!("AI found no legal move for {color} in {:?}", state.phase());
        };

        let (from, to) = (mv.from(), mv.to());
        let request = mv.into_request(actor);
        self.store
            .submit(&self.id, session.version, &request)
            .with_context(|| format!("AI move {from} -> {to} was rejected"))?;

        let what = match request {
            MoveRequest::Piece { piece_id, .. } => piece_id,
            MoveRequest::Tile { tile, .. } => format!("tile {tile}"),
        };
        writeln!(out, "AI ({color}): {what} {from} -> {to}")?;
        Ok(Flow::Continue)
    }

    /// Announce the result and offer a rematch
    fn after_game<R: BufRead, W: Write>(
        &mut self,
        session: &Session,
        input: &mut R,
        out: &mut W,
    ) -> Result<Flow> {
        let state = &session.state;
        write!(out, "{}", render_board(state))?;
        writeln!(out, "{}", describe_result(state))?;
        write!(out, "Rematch? [y/N] > ")?;
        out.flush()?;

        let wants_rematch = read_line(input)?
            .is_some_and(|line| matches!(line.trim(), "y" | "Y" | "yes"));
        if !wants_rematch {
            return Ok(Flow::Quit);
        }

        let next = self
            .store
            .rematch(&self.id, session.version, HOST, &mut self.rng)
            .context("Failed to start a rematch")?;
        tracing::info!(game = %self.id, host_color = %next.state.host_color(), "rematch");
        self.shown = None;
        Ok(Flow::Continue)
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn seat_of(state: &GameState, color: Color) -> Result<String> {
    state
        .player_for(color)
        .map(str::to_string)
        .with_context(|| format!("Nobody is seated as {color}"))
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    Ok((read > 0).then_some(line))
}

/// User-facing text for a refused command
fn rejection_message(err: &StoreError) -> String {
    match err.kind() {
        Some(kind) => format!("{} ({err})", kind.message()),
        None => err.to_string(),
    }
}

fn describe_result(state: &GameState) -> String {
    match (state.status(), state.winner()) {
        (Status::Finished, Some(winner)) => match state.victory_line() {
            Some([a, b, c]) => format!("{winner} wins with {a} {b} {c}!"),
            None => format!("{winner} wins!"),
        },
        (Status::Abandoned, Some(winner)) => format!("Game abandoned, {winner} wins."),
        (status, _) => format!("Game over ({status:?})."),
    }
}

/// What a move or hint refers to
#[derive(Clone, Debug, PartialEq, Eq)]
enum Target {
    Piece(String),
    Tile(TileId),
}

impl Target {
    fn into_request(self, actor: &str, to: Hex) -> MoveRequest {
        match self {
            Target::Piece(id) => MoveRequest::piece(actor, id, to),
            Target::Tile(tile) => MoveRequest::tile(actor, tile, to),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Move { target: Target, to: Hex },
    Hint(Option<Target>),
    Tiles,
    Board,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Err("Type `help` for the list of commands.".to_string()),
        ["help" | "?"] => Ok(Command::Help),
        ["quit" | "resign"] => Ok(Command::Quit),
        ["tiles"] => Ok(Command::Tiles),
        ["board"] => Ok(Command::Board),
        ["hint"] => Ok(Command::Hint(None)),
        ["hint", target] => Ok(Command::Hint(Some(parse_target(target)))),
        [target, q, r] => Ok(Command::Move {
            target: parse_target(target),
            to: Hex::new(parse_coord(q)?, parse_coord(r)?),
        }),
        _ => Err(format!("Unrecognized command: {}", line.trim())),
    }
}

/// Numbers name tiles, anything else names a piece
fn parse_target(word: &str) -> Target {
    match word.trim_start_matches('#').parse::<usize>() {
        Ok(index) => Target::Tile(TileId(index)),
        Err(_) => Target::Piece(word.to_ascii_lowercase()),
    }
}

fn parse_coord(word: &str) -> Result<i32, String> {
    word.parse()
        .map_err(|_| format!("Not a coordinate: {word}"))
}

/// Rows of the hex map from top (lowest r) to bottom. Pieces show as
/// `r`/`b`, capitalized on a winning line; empty tiles as `.`.
fn render_board(state: &GameState) -> String {
    let board = state.board();
    let column = |hex: Hex| 2 * i64::from(hex.q) + i64::from(hex.r);
    let (Some(min_r), Some(max_r)) = (
        board.coords().iter().map(|h| h.r).min(),
        board.coords().iter().map(|h| h.r).max(),
    ) else {
        return String::from("(no tiles)\n");
    };
    let min_col = board.coords().iter().map(|&h| column(h)).min().unwrap_or(0);
    let max_col = board.coords().iter().map(|&h| column(h)).max().unwrap_or(0);
    let width = (max_col - min_col + 1) as usize;
    let line = state.victory_line();

    let mut text = String::new();
    for r in min_r..=max_r {
        let mut row = vec![' '; width];
        for &hex in board.coords().iter().filter(|h| h.r == r) {
            let glyph = match state.pieces().iter().find(|p| p.position == hex) {
                Some(piece) => {
                    let glyph = match piece.owner {
                        Color::Red => 'r',
                        Color::Blue => 'b',
                    };
                    if line.is_some_and(|cells| cells.contains(&hex)) {
                        glyph.to_ascii_uppercase()
                    } else {
                        glyph
                    }
                }
                None => '.',
            };
            row[(column(hex) - min_col) as usize] = glyph;
        }
        let row: String = row.into_iter().collect();
        text.push_str(&format!("{r:>3} | {}\n", row.trim_end()));
    }

    for color in Color::ALL {
        let pieces: Vec<String> = state
            .pieces_of(color)
            .map(|p| format!("{} {}", p.id, p.position))
            .collect();
        text.push_str(&format!("{color:>5}: {}\n", pieces.join("  ")));
    }
    text
}

fn render_tiles(state: &GameState) -> String {
    let cells: Vec<String> = state
        .board()
        .iter()
        .map(|(tile, hex)| format!("{} {hex}", tile.index()))
        .collect();
    let mut text = String::new();
    for chunk in cells.chunks(6) {
        text.push_str(&chunk.join("   "));
        text.push('\n');
    }
    text
}

fn render_hint(state: &GameState, target: Option<&Target>) -> String {
    let list = |cells: &[Hex]| {
        if cells.is_empty() {
            "nowhere".to_string()
        } else {
            cells.iter().map(Hex::to_string).collect::<Vec<_>>().join(" ")
        }
    };

    match target {
        Some(Target::Piece(id)) => format!("{id}: {}\n", list(&state.piece_targets(id))),
        Some(Target::Tile(tile)) => match state.tile_targets(*tile) {
            Ok(cells) => format!("tile {tile}: {}\n", list(&cells)),
            Err(err) => format!("tile {tile}: {err}\n"),
        },
        None if state.phase() == Phase::RelocateTile => {
            let moves = legal_relocations(state.board(), state.pieces());
            let mut text = String::new();
            for (tile, hex) in state.board().iter() {
                let count = moves.iter().filter(|mv| mv.tile == tile).count();
                if count > 0 {
                    text.push_str(&format!("tile {} {hex}: {count} destinations\n", tile.index()));
                }
            }
            text
        }
        None => state
            .slide_targets(state.turn())
            .into_iter()
            .map(|(p, cells)| format!("{} {}: {}\n", p.id, p.position, list(&cells)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::initial_pieces;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn table_with(store: &SessionStore, ai: Option<Color>, seed: u64) -> Table<'_> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = open_game(store, &mut rng).unwrap();
        let ai = ai.map(|color| Opponent {
            color,
            ai: HeuristicAI::with_seed(Default::default(), seed),
        });
        Table::new(store, id, ai, rng)
    }

    fn run_script(table: &mut Table<'_>, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        table.play(&mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_command("r1 0 1"),
            Ok(Command::Move {
                target: Target::Piece("r1".to_string()),
                to: Hex::new(0, 1),
            })
        );
        assert_eq!(
            parse_command("  7 3 -1 \n"),
            Ok(Command::Move {
                target: Target::Tile(TileId(7)),
                to: Hex::new(3, -1),
            })
        );
        assert_eq!(
            parse_command("hint #4"),
            Ok(Command::Hint(Some(Target::Tile(TileId(4)))))
        );
        assert_eq!(parse_command("B2 1 x").unwrap_err(), "Not a coordinate: x");
        assert!(parse_command("").is_err());
        assert!(parse_command("r1 0").is_err());
    }

    #[test]
    fn test_render_initial_board() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = GameState::start(HOST, &mut rng);
        let text = render_board(&state);
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 5 + 2);
        assert_eq!(rows[0], " -2 |   b . r");
        assert_eq!(rows[2], "  0 | r . . . b");
        assert!(rows[5].contains("r1 (2,-2)"));
    }

    #[test]
    fn test_hint_lists_own_pieces() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = GameState::start(HOST, &mut rng).join(GUEST).unwrap();
        let hint = render_hint(&state, None);
        for piece in initial_pieces().iter().filter(|p| p.owner == state.turn()) {
            assert!(hint.contains(&piece.id));
        }

        let occupied = render_hint(&state, Some(&Target::Tile(TileId(15))));
        assert!(occupied.starts_with("tile #15: "));
    }

    #[test]
    fn test_rejections_keep_the_game_going() {
        let store = SessionStore::new();
        let mut table = table_with(&store, None, 3);
        let out = run_script(&mut table, "0 3 3\nzz 0 0\nquit\n");

        assert!(out.contains(nonaga_core::ErrorKind::WrongPhase.message()));
        assert!(out.contains(nonaga_core::ErrorKind::InvalidSelection.message()));
        assert!(out.contains("resigns"));

        let session = store.get(&table.id).unwrap();
        assert_eq!(session.state.status(), Status::Abandoned);
        assert_eq!(session.state.winner(), Some(Color::Blue));
    }

    #[test]
    fn test_ai_moves_before_human() {
        let store = SessionStore::new();
        let mut table = table_with(&store, Some(Color::Red), 5);
        let out = run_script(&mut table, "quit\n");

        assert!(out.contains("AI (red)"));
        let session = store.get(&table.id).unwrap();
        assert_ne!(session.state.pieces(), initial_pieces().as_slice());
        assert_eq!(session.state.winner(), Some(Color::Red));
    }

    #[test]
    fn test_end_of_input_leaves_game_open() {
        let store = SessionStore::new();
        let mut table = table_with(&store, Some(Color::Blue), 9);
        run_script(&mut table, "help\n");

        let session = store.get(&table.id).unwrap();
        assert_eq!(session.state.status(), Status::Playing);
    }
}
