//! Core simulation: playfield grid, falling piece, line clearing, round state.

/// Gravity cadence: a descent is attempted on every 40th tick.
pub const GRAVITY_INTERVAL: u32 = 40;

/// One grid position. `Active` cells belong to the falling piece; everything
/// settled is `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Locked,
    Active,
}

/// One decoded input command per tick. `Quit` is consumed by the driver loop
/// and never reaches the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    None,
    Left,
    Right,
    Down,
    Rotate,
    Quit,
}

/// Shape kinds (Line, the two Z mirrors, the two L mirrors, Square, T).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Z,
    ZMirror,
    L,
    LMirror,
    Square,
    T,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [
        Self::Line,
        Self::Z,
        Self::ZMirror,
        Self::L,
        Self::LMirror,
        Self::Square,
        Self::T,
    ];

    /// 4 cells relative to the spawn column; each (x, y). The order is
    /// significant: index 1 is the rotation pivot.
    pub fn cells(&self) -> &[(i32, i32); 4] {
        match self {
            Self::Line => &[(0, 0), (0, 1), (0, 2), (0, 3)],
            Self::Z => &[(1, 0), (1, 1), (0, 1), (0, 2)],
            Self::ZMirror => &[(0, 0), (0, 1), (1, 1), (1, 2)],
            Self::L => &[(1, 0), (0, 0), (0, 1), (0, 2)],
            Self::LMirror => &[(0, 0), (1, 0), (1, 1), (1, 2)],
            Self::Square => &[(0, 0), (0, 1), (1, 1), (1, 0)],
            Self::T => &[(0, 0), (1, 0), (1, 1), (2, 0)],
        }
    }
}

/// Playfield: grid of cells. (0, 0) is top-left, x grows rightward and
/// y downward. Created once per round and mutated in place, never resized.
#[derive(Debug, Clone)]
pub struct Playfield {
    pub width: usize,
    pub height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: Vec<Vec<Cell>>,
}

impl Playfield {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            width: w,
            height: h,
            rows: vec![vec![Cell::Empty; w]; h],
        }
    }

    #[inline]
    pub fn is_out_of_bounds(&self, x: i32, y: i32) -> bool {
        x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32
    }

    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<Cell> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some(self.rows[y as usize][x as usize])
    }

    /// True if the cell at (x, y) currently holds `state`. An out-of-range
    /// coordinate never matches.
    #[inline]
    pub fn is_collision(&self, x: i32, y: i32, state: Cell) -> bool {
        self.tile(x, y) == Some(state)
    }

    pub fn set_tile(&mut self, x: i32, y: i32, state: Cell) {
        if !self.is_out_of_bounds(x, y) {
            self.rows[y as usize][x as usize] = state;
        }
    }

    /// Replace an entire row (used by line clearing).
    pub fn set_row(&mut self, index: usize, row: Vec<Cell>) {
        if index < self.height && row.len() == self.width {
            self.rows[index] = row;
        }
    }

    /// Read-only snapshot for collision scanning and the renderer.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

/// The falling piece: 4 cells of one shape, a gravity counter, and the
/// `idle` / `spawnable` flags.
#[derive(Debug, Clone)]
pub struct Piece {
    kind: ShapeKind,
    blocks: [(i32, i32); 4],
    gravity_ticks: u32,
    idle: bool,
    spawnable: bool,
}

impl Piece {
    /// Place a fresh piece at the spawn column (width / 2). The cells are
    /// painted `Active` even when the spawn collides; an unspawnable piece
    /// ends the round before the next command is processed.
    pub fn spawn(kind: ShapeKind, field: &mut Playfield) -> Self {
        let offset = field.width as i32 / 2;
        let mut blocks = *kind.cells();
        for block in &mut blocks {
            block.0 += offset;
        }
        let spawnable = !blocks
            .iter()
            .any(|&(x, y)| field.is_collision(x, y, Cell::Locked));
        for &(x, y) in &blocks {
            field.set_tile(x, y, Cell::Active);
        }
        Self {
            kind,
            blocks,
            gravity_ticks: 0,
            idle: false,
            spawnable,
        }
    }

    /// Gravity: every `GRAVITY_INTERVAL`th call attempts to descend one row.
    /// A single blocked cell locks the whole piece in place.
    pub fn tick(&mut self, field: &mut Playfield) {
        if self.idle {
            return;
        }
        self.gravity_ticks += 1;
        if self.gravity_ticks < GRAVITY_INTERVAL {
            return;
        }
        self.gravity_ticks = 0;

        if self.blocked_below(field) {
            self.lock(field);
            return;
        }
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Empty);
        }
        for block in &mut self.blocks {
            block.1 += 1;
        }
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Active);
        }
    }

    fn blocked_below(&self, field: &Playfield) -> bool {
        self.blocks.iter().any(|&(x, y)| {
            field.is_out_of_bounds(x, y + 1) || field.is_collision(x, y + 1, Cell::Locked)
        })
    }

    fn lock(&mut self, field: &mut Playfield) {
        self.idle = true;
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Locked);
        }
    }

    /// Translate all 4 cells by (dx, dy). Rejected wholesale if any target
    /// cell is out of bounds or locked. A committed soft drop (dy == 1)
    /// resets the gravity counter so gravity does not double-step.
    pub fn shift(&mut self, dx: i32, dy: i32, field: &mut Playfield) {
        if self.idle {
            return;
        }
        for &(x, y) in &self.blocks {
            if field.is_out_of_bounds(x + dx, y + dy)
                || field.is_collision(x + dx, y + dy, Cell::Locked)
            {
                return;
            }
        }
        if dy == 1 {
            self.gravity_ticks = 0;
        }
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Empty);
        }
        for block in &mut self.blocks {
            block.0 += dx;
            block.1 += dy;
        }
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Active);
        }
    }

    /// Rotate 90° clockwise around the second cell: (dx, dy) relative to the
    /// pivot maps to (px - dy, py + dx). The symmetric Square never rotates.
    /// All 4 target cells are validated before anything is committed.
    pub fn rotate(&mut self, field: &mut Playfield) {
        if self.idle || self.kind == ShapeKind::Square {
            return;
        }
        let (px, py) = self.blocks[1];
        let mut rotated = [(0i32, 0i32); 4];
        for (i, &(x, y)) in self.blocks.iter().enumerate() {
            let (dx, dy) = (x - px, y - py);
            let (nx, ny) = (px - dy, py + dx);
            if field.is_out_of_bounds(nx, ny) || field.is_collision(nx, ny, Cell::Locked) {
                return;
            }
            rotated[i] = (nx, ny);
        }
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Empty);
        }
        self.blocks = rotated;
        for &(x, y) in &self.blocks {
            field.set_tile(x, y, Cell::Active);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn is_spawnable(&self) -> bool {
        self.spawnable
    }

    pub fn blocks(&self) -> &[(i32, i32); 4] {
        &self.blocks
    }
}

/// Compacts the playfield after a lock: full rows (all `Locked`) are removed
/// bottom-to-top and everything above shifts down one.
#[derive(Debug, Default)]
pub struct LineClearScanner;

impl LineClearScanner {
    /// Returns the number of rows cleared. After a shift the cursor stays on
    /// the same row index — the shifted-in contents may be full too — so
    /// stacked full rows collapse in a single scan.
    pub fn scan(&self, field: &mut Playfield) -> u32 {
        let mut cleared = 0;
        let mut cursor = field.height;
        while cursor > 0 {
            let row = cursor - 1;
            if !Self::is_full(field, row) {
                cursor -= 1;
                continue;
            }
            for i in (1..=row).rev() {
                let above = field.rows()[i - 1].clone();
                field.set_row(i, above);
            }
            field.set_row(0, vec![Cell::Empty; field.width]);
            cleared += 1;
        }
        cleared
    }

    fn is_full(field: &Playfield, row: usize) -> bool {
        field.rows()[row].iter().all(|&c| c == Cell::Locked)
    }
}

/// Linear congruential shape draw; seedable for deterministic rounds.
#[derive(Debug, Clone)]
pub struct ShapeRng {
    state: u32,
}

impl ShapeRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would collapse the low bits early on.
        let state = if seed == 0 { 0x1234_5678 } else { seed };
        Self { state }
    }

    fn next_rand(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.state >> 16
    }

    /// Uniform pick over the 7 shape kinds.
    pub fn next_kind(&mut self) -> ShapeKind {
        ShapeKind::ALL[(self.next_rand() % 7) as usize]
    }
}

/// One round: playfield, falling piece, line scanner, score. Drives exactly
/// one discrete simulation step per tick.
#[derive(Debug)]
pub struct RoundController {
    field: Playfield,
    piece: Piece,
    scanner: LineClearScanner,
    rng: ShapeRng,
    score: u32,
    playable: bool,
}

impl RoundController {
    pub fn new(width: u16, height: u16, seed: u32) -> Self {
        let mut field = Playfield::new(width, height);
        let mut rng = ShapeRng::new(seed);
        let piece = Piece::spawn(rng.next_kind(), &mut field);
        Self {
            field,
            piece,
            scanner: LineClearScanner,
            rng,
            score: 0,
            playable: true,
        }
    }

    /// One simulation step: apply the command, replace a locked piece (ending
    /// the round if the replacement cannot spawn), clear full rows, then
    /// advance gravity.
    pub fn step(&mut self, command: Command) {
        if !self.playable {
            return;
        }
        match command {
            Command::Left => self.piece.shift(-1, 0, &mut self.field),
            Command::Right => self.piece.shift(1, 0, &mut self.field),
            Command::Down => self.piece.shift(0, 1, &mut self.field),
            Command::Rotate => self.piece.rotate(&mut self.field),
            Command::None | Command::Quit => {}
        }

        if self.piece.is_idle() {
            self.piece = Piece::spawn(self.rng.next_kind(), &mut self.field);
            if !self.piece.is_spawnable() {
                self.playable = false;
                return;
            }
            self.score += self.scanner.scan(&mut self.field);
        }

        self.piece.tick(&mut self.field);
    }

    pub fn is_playable(&self) -> bool {
        self.playable
    }

    pub fn is_over(&self) -> bool {
        !self.playable
    }

    /// Total rows cleared over the round's lifetime.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_10x20() -> Playfield {
        Playfield::new(10, 20)
    }

    fn active_count(field: &Playfield) -> usize {
        field
            .rows()
            .iter()
            .flatten()
            .filter(|&&c| c == Cell::Active)
            .count()
    }

    fn fill_row_locked(field: &mut Playfield, y: i32, skip: Option<i32>) {
        for x in 0..field.width as i32 {
            if Some(x) != skip {
                field.set_tile(x, y, Cell::Locked);
            }
        }
    }

    fn has_full_locked_row(field: &Playfield) -> bool {
        field
            .rows()
            .iter()
            .any(|row| row.iter().all(|&c| c == Cell::Locked))
    }

    #[test]
    fn playfield_bounds() {
        let field = field_10x20();
        assert!(!field.is_out_of_bounds(0, 0));
        assert!(!field.is_out_of_bounds(9, 19));
        assert!(field.is_out_of_bounds(-1, 0));
        assert!(field.is_out_of_bounds(0, -1));
        assert!(field.is_out_of_bounds(10, 0));
        assert!(field.is_out_of_bounds(0, 20));
        assert_eq!(field.tile(10, 0), None);
    }

    #[test]
    fn set_tile_out_of_range_is_noop() {
        let mut field = field_10x20();
        field.set_tile(-1, 5, Cell::Locked);
        field.set_tile(10, 5, Cell::Locked);
        field.set_tile(5, 20, Cell::Locked);
        assert!(field.rows().iter().flatten().all(|&c| c == Cell::Empty));
    }

    #[test]
    fn collision_matches_state_only() {
        let mut field = field_10x20();
        field.set_tile(3, 4, Cell::Locked);
        assert!(field.is_collision(3, 4, Cell::Locked));
        assert!(!field.is_collision(3, 4, Cell::Active));
        assert!(!field.is_collision(-1, 4, Cell::Locked));
    }

    #[test]
    fn line_spawns_at_mid_column() {
        let mut field = field_10x20();
        let piece = Piece::spawn(ShapeKind::Line, &mut field);
        assert_eq!(piece.blocks(), &[(5, 0), (5, 1), (5, 2), (5, 3)]);
        assert!(piece.is_spawnable());
        assert!(!piece.is_idle());
        assert_eq!(active_count(&field), 4);
    }

    #[test]
    fn spawn_collision_marks_unspawnable() {
        let mut field = field_10x20();
        field.set_tile(5, 1, Cell::Locked);
        let piece = Piece::spawn(ShapeKind::Line, &mut field);
        assert!(!piece.is_spawnable());
    }

    #[test]
    fn gravity_advances_every_fortieth_tick() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        for _ in 0..GRAVITY_INTERVAL - 1 {
            piece.tick(&mut field);
        }
        assert_eq!(piece.blocks(), &[(5, 0), (5, 1), (5, 2), (5, 3)]);
        piece.tick(&mut field);
        assert_eq!(piece.blocks(), &[(5, 1), (5, 2), (5, 3), (5, 4)]);
        assert_eq!(active_count(&field), 4);
        assert_eq!(field.tile(5, 0), Some(Cell::Empty));
    }

    #[test]
    fn soft_drop_resets_gravity_counter() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        for _ in 0..GRAVITY_INTERVAL - 1 {
            piece.tick(&mut field);
        }
        piece.shift(0, 1, &mut field);
        assert_eq!(piece.blocks(), &[(5, 1), (5, 2), (5, 3), (5, 4)]);
        // Without the reset this tick would be the 40th and descend again.
        piece.tick(&mut field);
        assert_eq!(piece.blocks(), &[(5, 1), (5, 2), (5, 3), (5, 4)]);
    }

    #[test]
    fn rejected_shift_is_atomic() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        field.set_tile(4, 1, Cell::Locked);
        let before = *piece.blocks();
        piece.shift(-1, 0, &mut field);
        assert_eq!(piece.blocks(), &before);
        assert_eq!(active_count(&field), 4);
        for &(x, y) in &before {
            assert_eq!(field.tile(x, y), Some(Cell::Active));
        }
    }

    #[test]
    fn shift_stops_at_wall() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        for _ in 0..10 {
            piece.shift(-1, 0, &mut field);
        }
        assert_eq!(piece.blocks(), &[(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(active_count(&field), 4);
    }

    #[test]
    fn rotate_pivots_around_second_cell() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        piece.rotate(&mut field);
        assert_eq!(piece.blocks(), &[(6, 1), (5, 1), (4, 1), (3, 1)]);
        assert_eq!(active_count(&field), 4);
    }

    #[test]
    fn rejected_rotation_is_atomic() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        field.set_tile(3, 1, Cell::Locked);
        let before = *piece.blocks();
        piece.rotate(&mut field);
        assert_eq!(piece.blocks(), &before);
        for &(x, y) in &before {
            assert_eq!(field.tile(x, y), Some(Cell::Active));
        }
    }

    #[test]
    fn rotation_rejected_at_boundary() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        for _ in 0..5 {
            piece.shift(-1, 0, &mut field);
        }
        let before = *piece.blocks();
        // Pivot at (0, 1); two rotated cells would land at x = -1 and -2.
        piece.rotate(&mut field);
        assert_eq!(piece.blocks(), &before);
    }

    #[test]
    fn square_rotation_is_noop() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Square, &mut field);
        let before = *piece.blocks();
        for _ in 0..4 {
            piece.rotate(&mut field);
        }
        assert_eq!(piece.blocks(), &before);
    }

    #[test]
    fn gravity_locks_piece_at_floor() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Square, &mut field);
        for _ in 0..18 {
            piece.shift(0, 1, &mut field);
        }
        assert_eq!(piece.blocks(), &[(5, 18), (5, 19), (6, 19), (6, 18)]);
        for _ in 0..GRAVITY_INTERVAL {
            piece.tick(&mut field);
        }
        assert!(piece.is_idle());
        assert_eq!(active_count(&field), 0);
        for &(x, y) in piece.blocks() {
            assert_eq!(field.tile(x, y), Some(Cell::Locked));
        }
    }

    #[test]
    fn one_blocked_cell_locks_the_whole_piece() {
        let mut field = field_10x20();
        // Only the cell below (5, 0) is blocked; the other three could fall.
        field.set_tile(5, 1, Cell::Locked);
        let mut piece = Piece::spawn(ShapeKind::T, &mut field);
        assert!(piece.is_spawnable());
        for _ in 0..GRAVITY_INTERVAL {
            piece.tick(&mut field);
        }
        assert!(piece.is_idle());
        for &(x, y) in &[(5, 0), (6, 0), (6, 1), (7, 0)] {
            assert_eq!(field.tile(x, y), Some(Cell::Locked));
        }
    }

    #[test]
    fn locked_piece_ignores_commands() {
        let mut field = field_10x20();
        let mut piece = Piece::spawn(ShapeKind::Line, &mut field);
        for _ in 0..16 {
            piece.shift(0, 1, &mut field);
        }
        for _ in 0..GRAVITY_INTERVAL {
            piece.tick(&mut field);
        }
        assert!(piece.is_idle());
        let before = *piece.blocks();
        piece.shift(-1, 0, &mut field);
        piece.rotate(&mut field);
        piece.tick(&mut field);
        assert_eq!(piece.blocks(), &before);
    }

    #[test]
    fn scanner_clears_single_full_row() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 19, None);
        field.set_tile(3, 18, Cell::Locked);
        let cleared = LineClearScanner.scan(&mut field);
        assert_eq!(cleared, 1);
        // The marker above shifted down into the cleared row.
        assert_eq!(field.tile(3, 19), Some(Cell::Locked));
        assert_eq!(field.tile(0, 19), Some(Cell::Empty));
        assert!(field.rows()[0].iter().all(|&c| c == Cell::Empty));
        assert!(!has_full_locked_row(&field));
    }

    #[test]
    fn scanner_leaves_partial_rows_alone() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 19, Some(4));
        let cleared = LineClearScanner.scan(&mut field);
        assert_eq!(cleared, 0);
        assert_eq!(field.tile(0, 19), Some(Cell::Locked));
        assert_eq!(field.tile(4, 19), Some(Cell::Empty));
    }

    #[test]
    fn active_cells_do_not_complete_a_row() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 19, Some(4));
        field.set_tile(4, 19, Cell::Active);
        let cleared = LineClearScanner.scan(&mut field);
        assert_eq!(cleared, 0);
    }

    #[test]
    fn scanner_collapses_stacked_rows_by_rechecking() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 18, None);
        fill_row_locked(&mut field, 19, None);
        field.set_tile(0, 17, Cell::Locked);
        let cleared = LineClearScanner.scan(&mut field);
        // Row 19 clears, row 18's contents shift into it and clear again on
        // the re-check of the same index.
        assert_eq!(cleared, 2);
        assert_eq!(field.tile(0, 19), Some(Cell::Locked));
        assert_eq!(field.tile(1, 19), Some(Cell::Empty));
        assert!(!has_full_locked_row(&field));
    }

    #[test]
    fn scanner_clears_non_contiguous_rows() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 17, None);
        field.set_tile(2, 18, Cell::Locked);
        fill_row_locked(&mut field, 19, None);
        let cleared = LineClearScanner.scan(&mut field);
        assert_eq!(cleared, 2);
        // The lone marker from the in-between row survives at the bottom.
        assert_eq!(field.tile(2, 19), Some(Cell::Locked));
        assert_eq!(field.tile(0, 19), Some(Cell::Empty));
        assert!(!has_full_locked_row(&field));
    }

    #[test]
    fn scanner_clears_full_top_row() {
        let mut field = field_10x20();
        fill_row_locked(&mut field, 0, None);
        let cleared = LineClearScanner.scan(&mut field);
        assert_eq!(cleared, 1);
        assert!(field.rows()[0].iter().all(|&c| c == Cell::Empty));
    }

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = ShapeRng::new(12_345);
        let mut b = ShapeRng::new(12_345);
        for _ in 0..100 {
            assert_eq!(a.next_kind(), b.next_kind());
        }
    }

    #[test]
    fn rng_seeds_diverge() {
        let mut a = ShapeRng::new(1);
        let mut b = ShapeRng::new(2);
        let diverged = (0..32).any(|_| a.next_kind() != b.next_kind());
        assert!(diverged);
    }

    #[test]
    fn rng_zero_seed_is_usable() {
        let mut rng = ShapeRng::new(0);
        let kinds: Vec<ShapeKind> = (0..64).map(|_| rng.next_kind()).collect();
        // Not a constant stream.
        assert!(kinds.iter().any(|&k| k != kinds[0]));
    }

    #[test]
    fn controller_scores_a_completed_row() {
        let mut ctrl = RoundController::new(10, 20, 7);
        // Replace the random opener with a known vertical Line over a row
        // that is one cell short of full.
        for &(x, y) in ctrl.piece.blocks() {
            ctrl.field.set_tile(x, y, Cell::Empty);
        }
        fill_row_locked(&mut ctrl.field, 19, Some(5));
        let piece = Piece::spawn(ShapeKind::Line, &mut ctrl.field);
        ctrl.piece = piece;

        // 16 soft drops reach the floor; the next gravity attempt locks, and
        // the step after that spawns, scans and scores.
        for _ in 0..16 + GRAVITY_INTERVAL as usize + 1 {
            ctrl.step(Command::Down);
            if ctrl.score() == 1 {
                break;
            }
        }
        assert_eq!(ctrl.score(), 1);
        assert!(ctrl.is_playable());
        assert!(!has_full_locked_row(ctrl.field()));
        assert_eq!(active_count(ctrl.field()), 4);
    }

    #[test]
    fn controller_ends_round_on_unspawnable_piece() {
        let mut ctrl = RoundController::new(10, 20, 7);
        // Wall off the whole spawn area so any shape collides, then force the
        // current piece to be treated as settled.
        for y in 0..4 {
            for x in 5..8 {
                ctrl.field.set_tile(x, y, Cell::Locked);
            }
        }
        ctrl.piece.idle = true;
        ctrl.step(Command::None);
        assert!(ctrl.is_over());
        assert!(!ctrl.is_playable());

        // Terminal: further steps change nothing.
        let score = ctrl.score();
        ctrl.step(Command::Down);
        ctrl.step(Command::Rotate);
        assert!(ctrl.is_over());
        assert_eq!(ctrl.score(), score);
    }

    #[test]
    fn score_is_monotonic_and_full_rows_resolve_within_a_step() {
        let mut ctrl = RoundController::new(10, 20, 42);
        let commands = [
            Command::Left,
            Command::Down,
            Command::Rotate,
            Command::Right,
            Command::None,
            Command::Down,
        ];
        let mut last_score = 0;
        for i in 0..5_000 {
            if ctrl.is_over() {
                break;
            }
            // A lock may complete a row at the end of a step; the scan in the
            // following step must resolve it.
            let full_before = has_full_locked_row(ctrl.field());
            ctrl.step(commands[i % commands.len()]);
            if full_before && ctrl.is_playable() {
                assert!(!has_full_locked_row(ctrl.field()));
            }
            assert!(ctrl.score() >= last_score);
            last_score = ctrl.score();
        }
    }

    #[test]
    fn active_cell_count_is_always_four_while_playing() {
        // Gravity-only play: pieces pile up in the spawn columns and no row
        // can ever fill, so the piece cells are the only Active cells.
        let mut ctrl = RoundController::new(10, 20, 99);
        for _ in 0..20_000 {
            if ctrl.is_over() {
                break;
            }
            ctrl.step(Command::None);
            if ctrl.is_playable() {
                assert_eq!(active_count(ctrl.field()), 4);
            }
        }
        // A 20-deep well fills well within 20 000 gravity-only ticks.
        assert!(ctrl.is_over());
    }
}
