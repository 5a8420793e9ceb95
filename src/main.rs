// Copyright (c) 2026 rezky_nightky

mod cascade;
mod column;
mod config;
mod drop;
mod error;
mod field;
mod frame;
mod glyph;
mod offset;
mod palette;
mod render;
mod runtime;
mod scene;
mod script;
mod sprite;
mod stack;
mod store;
mod terminal;

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use log::{error, info, warn, LevelFilter};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, Args, ColorBg,
};
use crate::field::{FieldOptions, RainField, RainPalette};
use crate::frame::Frame;
use crate::offset::{OffsetAnimationMap, OffsetCycle, OffsetErrorLog, OffsetFunction};
use crate::palette::{build_palette, parse_rgb_list, scheme_rgb};
use crate::render::{draw_status, FrameCanvas, Status, Viewport};
use crate::runtime::{ColorMode, ColorScheme};
use crate::scene::{Stage, UpdateClock};
use crate::script::LuaOffsetFunction;
use crate::store::{GlyphImageStore, GlyphMetrics, StoreOptions};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const VELOCITY_STEP: f32 = 0.02;

fn build_info() -> &'static str {
    env!("RAINPANE_BUILD")
}

fn git_sha() -> &'static str {
    env!("RAINPANE_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        fail(format!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        fail(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    require_f64_range(name, v as f64, min as f64, max as f64) as f32
}

fn require_int_range<T>(name: &str, v: T, min: T, max: T) -> T
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if v < min || v > max {
        fail(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8) | Some(256) => ColorMode::Color256,
        Some(24) | Some(32) => ColorMode::TrueColor,
        Some(m) => fail(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            m
        )),
    }
}

fn parse_color_scheme(s: &str) -> Result<ColorScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" => Ok(ColorScheme::Green),
        "green2" => Ok(ColorScheme::Green2),
        "gold" => Ok(ColorScheme::Gold),
        "red" => Ok(ColorScheme::Red),
        "blue" => Ok(ColorScheme::Blue),
        "cyan" => Ok(ColorScheme::Cyan),
        "purple" => Ok(ColorScheme::Purple),
        "neon" | "synthwave" => Ok(ColorScheme::Neon),
        "fire" | "inferno" => Ok(ColorScheme::Fire),
        "ocean" | "deep-sea" | "deep_sea" | "deepsea" => Ok(ColorScheme::Ocean),
        "gray" | "grey" => Ok(ColorScheme::Gray),
        "snow" => Ok(ColorScheme::Snow),
        "rainbow" => Ok(ColorScheme::Rainbow),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

fn init_logging(path: Option<&Path>) -> std::io::Result<()> {
    let Some(path) = path else {
        // stdout belongs to the alternate screen
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}

fn install_restore_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

struct SceneRecipe {
    palette: RainPalette,
    store: Arc<GlyphImageStore>,
    offsets: Arc<OffsetAnimationMap>,
    max_cells: usize,
    row_mode: bool,
}

impl SceneRecipe {
    fn build(
        &self,
        (width, height): (i32, i32),
        velocity: f32,
        seed: Option<u64>,
        debug: bool,
    ) -> Result<RainField, error::RainError> {
        let field = RainField::new(
            FieldOptions {
                width,
                height,
                max_cells: self.max_cells,
                velocity,
                row_mode: self.row_mode,
                seed,
            },
            self.palette.clone(),
            self.store.clone(),
            self.offsets.clone(),
        )?;
        field.set_debug(debug);
        Ok(field)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    install_restore_handlers();

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Commit: {}", git_sha());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    init_logging(args.log_file.as_deref())?;

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let update_ms = require_int_range("--update-ms", args.update_ms, 1, 1000);
    let speed = require_f32_range("--speed", args.speed, 0.0, 1.0);
    let glyph_width = require_int_range("--glyph-width", args.glyph_width, 1, 64);
    let glyph_height = require_int_range("--glyph-height", args.glyph_height, 1, 64);
    let max_cells = require_int_range("--max-cells", args.max_cells, 1, 10_000);
    let duration = args
        .duration
        .filter(|s| !s.is_finite() || *s > 0.0)
        .map(|s| Duration::from_secs_f64(require_f64_range("--duration", s, 0.1, 86400.0)));

    let color_mode = detect_color_mode(&args);
    let rain_rgb = match &args.colors {
        Some(list) => parse_rgb_list(list).unwrap_or_else(|e| fail(format!("--colors: {}", e))),
        None => scheme_rgb(parse_color_scheme(&args.color).unwrap_or_else(|e| fail(e))),
    };
    let default_bg = matches!(
        args.color_bg,
        ColorBg::DefaultBackground | ColorBg::Transparent
    );
    let colors = build_palette(&rain_rgb, color_mode, default_bg);

    let metrics = GlyphMetrics::new(glyph_width, glyph_height)?;
    let palette = RainPalette::new(&colors.colors, colors.lead)?;
    let store = Arc::new(GlyphImageStore::new(
        palette.colors(),
        palette.lead(),
        metrics,
        StoreOptions {
            ascii: args.ascii || default_to_ascii(),
            mono: color_mode == ColorMode::Mono,
        },
    ));
    info!(
        "glyph images for {} rain colors, {}x{} units",
        palette.colors().len(),
        store.glyph_width(),
        store.glyph_height()
    );

    let errors = Arc::new(OffsetErrorLog::new());
    let script: Option<Arc<dyn OffsetFunction>> = match &args.offset_script {
        Some(path) => match LuaOffsetFunction::from_file(path) {
            Ok(f) => Some(Arc::new(f)),
            Err(e) => fail(format!("failed to load --offset-script: {}", e)),
        },
        None => None,
    };
    let mut offset_cycle = OffsetCycle::new(args.offset, script, store.glyph_width());
    let function = offset_cycle.current();
    info!("offset function: {}", function.name());
    let offsets = Arc::new(OffsetAnimationMap::new(function, errors.clone()));

    let recipe = SceneRecipe {
        palette,
        store,
        offsets: offsets.clone(),
        max_cells,
        row_mode: !args.smooth,
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let viewport = Viewport::new(metrics, args.fullwidth);
    let mut frame = Frame::new(w, h, colors.bg);

    let stage = Arc::new(Stage::new(recipe.build(
        viewport.pane_size(w, h),
        speed,
        args.seed,
        args.debug,
    )?));
    let (fatal_tx, fatal_rx) = mpsc::channel();
    let mut clock = UpdateClock::start(
        stage.clone(),
        Duration::from_millis(update_ms),
        fatal_tx,
    )?;

    let start_time = Instant::now();
    let end_time = duration.map(|d| start_time + d);
    let frame_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut show_status = args.status;
    let mut status = Status::default();
    let mut sample_at = Instant::now();
    let mut sample_frames: u64 = 0;
    let mut sample_updates = clock.updates();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        if let Ok(e) = fatal_rx.try_recv() {
            drop(term);
            error!("fatal engine error: {}", e);
            return Err(e.into());
        }

        let mut pending_resize: Option<(u16, u16)> = None;
        while Terminal::poll_event(Duration::from_millis(0))? {
            match Terminal::read_event()? {
                Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    if args.screensaver {
                        running = false;
                        break;
                    }
                    let field = stage.current();
                    match k.code {
                        KeyCode::Esc | KeyCode::Char('q') => running = false,
                        KeyCode::Char(' ') => {
                            let next = recipe.build(
                                viewport.pane_size(frame.width, frame.height),
                                field.velocity(),
                                None,
                                field.debug(),
                            )?;
                            stage.replace(next);
                        }
                        KeyCode::Up => {
                            field.change_velocity((field.velocity() + VELOCITY_STEP).min(1.0))
                        }
                        KeyCode::Down => {
                            field.change_velocity((field.velocity() - VELOCITY_STEP).max(0.0))
                        }
                        KeyCode::Char('p') => {
                            let paused = clock.toggle_pause();
                            info!("update clock {}", if paused { "paused" } else { "resumed" });
                        }
                        KeyCode::Char('d') => field.set_debug(!field.debug()),
                        KeyCode::Char('f') => show_status = !show_status,
                        KeyCode::Char('o') => {
                            offsets.replace_function(offset_cycle.advance());
                            info!("offset function: {}", offsets.function_name());
                        }
                        KeyCode::Char('c') => errors.clear(),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            let (pw, ph) = viewport.pane_size(nw, nh);
            stage.current().resize(pw, ph)?;
            frame = Frame::new(nw, nh, colors.bg);
        }

        let now = Instant::now();
        if now < next_frame {
            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                timeout = timeout.min(end.saturating_duration_since(now));
            }
            let _ = Terminal::poll_event(timeout)?;
            continue;
        }
        next_frame += frame_period;
        if next_frame < now {
            next_frame = now;
        }

        let field = stage.current();
        frame.clear();
        field.draw(&mut FrameCanvas::new(&mut frame, viewport))?;

        sample_frames += 1;
        let since = sample_at.elapsed();
        if since >= Duration::from_secs(1) {
            let updates = clock.updates();
            status.fps = sample_frames as f64 / since.as_secs_f64();
            status.ups = (updates - sample_updates) as f64 / since.as_secs_f64();
            sample_frames = 0;
            sample_updates = updates;
            sample_at = Instant::now();
        }
        if show_status {
            status.velocity = field.velocity();
            status.columns = field.column_count();
            status.offset = offsets.function_name();
            status.paused = clock.is_paused();
            status.last_error = errors.latest();
            draw_status(&mut frame, &status);
        }
        term.draw(&frame)?;
    }

    clock.stop();
    drop(term);
    if errors.total_reports() > 0 {
        warn!("{} offset function errors reported", errors.total_reports());
    }
    Ok(())
}
