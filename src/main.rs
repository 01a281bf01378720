use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use lightning_maze::{CellState, Grid, LightningCycle, MazeGenerator, Phase, Pos, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const BOLT: (u8, u8, u8) = (255, 255, 221);
const WALL: Color = Color::DarkGrey;

/// One maze cell on screen: its own top and left walls drawn in the
/// foreground over the state colour.
#[derive(Clone, Copy, PartialEq, Debug)]
struct Block {
    glyph: &'static str,
    fg: Color,
    bg: Color,
}

const BLANK: Block = Block {
    glyph: "",
    fg: Color::Reset,
    bg: Color::Reset,
};

struct Renderer {
    last: Vec<Block>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    top_row: usize,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            top_row: 0,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let settings = Settings::from_env();

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = MazeGenerator::default().with_max_attempts(settings.max_attempts);
    let mut cycle =
        LightningCycle::generate(&generator, &mut rng).context("failed to generate maze")?;

    if let Some(frames) = settings.headless_frames {
        run_headless(&mut cycle, frames);
        return Ok(());
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    stdout
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    stdout.execute(Hide).context("failed to hide cursor")?;

    let result = run(&mut stdout, &mut cycle, &settings);

    if let Err(err) = stdout.execute(Show) {
        error!(?err, "failed to show cursor");
    }
    if let Err(err) = stdout.execute(LeaveAlternateScreen) {
        error!(?err, "failed to leave alternate screen");
    }
    if let Err(err) = terminal::disable_raw_mode() {
        error!(?err, "failed to disable raw mode");
    }
    result
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn run_headless(cycle: &mut LightningCycle, frames: u64) {
    let counts = tally_phases(cycle, frames);
    info!(
        frames,
        cycles = cycle.cycles(),
        start = counts[Phase::Start as usize],
        path = counts[Phase::Path as usize],
        strike = counts[Phase::Strike as usize],
        flash = counts[Phase::Flash as usize],
        phase = cycle.phase().label(),
        "headless run completed"
    );
}

/// Advances `frames` times and counts the steps of each phase.
fn tally_phases(cycle: &mut LightningCycle, frames: u64) -> [u64; 4] {
    let mut counts = [0u64; 4];
    for _ in 0..frames {
        let phase = cycle.advance();
        counts[phase as usize] += 1;
    }
    counts
}

fn run(stdout: &mut Stdout, cycle: &mut LightningCycle, settings: &Settings) -> Result<()> {
    let (width, height) = cycle.grid().dimensions();
    let mut renderer = Renderer::new(width, height);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_step = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => {}
                },
                Event::Resize(_, _) => renderer.needs_full = true,
                _ => {}
            }
        }

        if last_step.elapsed() >= cycle.next_delay() {
            last_step = Instant::now();
            cycle.advance();
        }
        render(stdout, cycle, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn render(stdout: &mut Stdout, cycle: &LightningCycle, renderer: &mut Renderer) -> io::Result<()> {
    let grid = cycle.grid();
    let (width, height) = grid.dimensions();
    let needed_w = (width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < 2 {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too narrow. Need at least {} columns. Current: {}x{}.",
            needed_w, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    // Rows that do not fit below the HUD scroll with the lit cells.
    let visible = height.min(term_h as usize - 1);
    let top_row = scroll_top(deepest_lit_row(grid), visible, height);
    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - visible as u16 - 1) / 2 + 1;
    if origin_x != renderer.origin_x
        || origin_y != renderer.origin_y
        || top_row != renderer.top_row
    {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.top_row = top_row;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = hud_line(cycle, visible < height);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for line in 0..visible {
        let row = top_row + line;
        for col in 0..width {
            let block = block_for(grid, Pos::new(row, col));
            let idx = row * width + col;
            if renderer.needs_full || block != renderer.last[idx] {
                renderer.last[idx] = block;
                draw_block(stdout, renderer, col, line, block)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn hud_line(cycle: &LightningCycle, scrolled: bool) -> String {
    let strike = match cycle.strike_point() {
        Some(pos) => format!("row {} col {}", pos.row, pos.col),
        None => "-".to_string(),
    };
    format!(
        "Lightning  phase: {:<6}  cycle: {}  step: {}  strike: {}{}  (q to quit)",
        cycle.phase().label(),
        cycle.cycles() + 1,
        cycle.advances(),
        strike,
        if scrolled { "  [scrolled]" } else { "" }
    )
}

fn deepest_lit_row(grid: &Grid) -> usize {
    grid.iter()
        .filter(|(_, cell)| cell.state != CellState::Empty)
        .map(|(pos, _)| pos.row)
        .max()
        .unwrap_or(0)
}

/// First maze row to show so that `focus` sits in the lower quarter of a
/// window of `visible` rows.
fn scroll_top(focus: usize, visible: usize, height: usize) -> usize {
    let max_top = height.saturating_sub(visible);
    focus.saturating_sub(visible * 3 / 4).min(max_top)
}

fn block_for(grid: &Grid, pos: Pos) -> Block {
    let cell = grid.cell_at(pos.row, pos.col);
    let glyph = match (cell.walls.top, cell.walls.left) {
        (true, true) => "┌─",
        (true, false) => "──",
        (false, true) => "│ ",
        (false, false) => "  ",
    };
    Block {
        glyph,
        fg: WALL,
        bg: state_color(cell.state),
    }
}

fn state_color(state: CellState) -> Color {
    match state {
        CellState::Empty => Color::Black,
        CellState::Start | CellState::Strike { .. } => rgb(BOLT, 1.0),
        CellState::Path { weight, .. } => rgb(BOLT, 0.12 + 0.5 * weight),
        CellState::Flash => Color::White,
    }
}

fn rgb((r, g, b): (u8, u8, u8), scale: f32) -> Color {
    let channel = |c: u8| (c as f32 * scale.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}

fn draw_block(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    block: Block,
) -> io::Result<()> {
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(block.fg))?;
    stdout.queue(SetBackgroundColor(block.bg))?;
    stdout.queue(Print(block.glyph))?;
    let w = UnicodeWidthStr::width(block.glyph);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
