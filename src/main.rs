use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Deserialize;

use ladderchart::defaults::{CONFIG_FILE_NAME, IMAGE_FILE_NAME, SURFACE_SIZE};
use ladderchart::fonts::CosmicTextMeasure;
use ladderchart::interaction::NoCapture;
use ladderchart::raster::{svg_to_pdf, svg_to_png};
use ladderchart::{ChartRenderer, ChartStyle, EditorSession, Ladder, Point, PointerEvent};

/// Engineering ladder radar chart editor
#[derive(Parser, Debug)]
#[command(name = "ladderchart")]
#[command(version)]
#[command(about = "Edit, replay and render engineering ladder radar charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the chart to an image (extension selects .svg, .png or .pdf; a directory
    /// gets ladder-chart.png)
    Render {
        /// Config snapshot to load (defaults to the built-in ladder)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Built-in theme name or path to an Alacritty theme file (TOML or YAML)
        #[arg(short, long, value_name = "THEME")]
        theme: Option<String>,

        /// Edge length of the square chart surface in pixels
        #[arg(short, long, default_value_t = SURFACE_SIZE)]
        size: f64,

        /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
        #[arg(long, default_value_t = 1.0)]
        png_scale: f32,
    },

    /// Write the full config snapshot as pretty JSON
    Export {
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Apply label and value edits to a config
    Edit {
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Axis label, as AXIS=TEXT
        #[arg(long = "label", value_name = "AXIS=TEXT", value_parser = parse_axis_text)]
        labels: Vec<(usize, String)>,

        /// Axis value, as AXIS=NUMBER (clamped to 1..=5, rounded to a tenth)
        #[arg(long = "value", value_name = "AXIS=NUMBER", value_parser = parse_axis_value)]
        values: Vec<(usize, f64)>,

        /// Level label, as AXIS:LEVEL=TEXT
        #[arg(long = "level", value_name = "AXIS:LEVEL=TEXT", value_parser = parse_level_text)]
        levels: Vec<(usize, usize, String)>,

        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Replay recorded pointer gestures against the chart surface
    Replay {
        /// JSON array of {"kind": "down"|"move"|"up"|"cancel", "x": .., "y": ..}
        #[arg(short, long, value_name = "EVENTS")]
        events: PathBuf,

        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long, default_value_t = SURFACE_SIZE)]
        size: f64,

        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List built-in themes
    Themes,

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            config,
            output,
            theme,
            size,
            png_scale,
        } => {
            let style = load_style(theme.as_deref())?;
            let session = load_session(config.as_deref(), style)?;
            render_to_file(&session, size, png_scale, &output)
        }
        Command::Export { config, output } => {
            let session = load_session(config.as_deref(), ChartStyle::default())?;
            write_config(&session, output.as_deref())
        }
        Command::Edit {
            config,
            labels,
            values,
            levels,
            output,
        } => {
            let mut session = load_session(config.as_deref(), ChartStyle::default())?;
            for (axis, text) in labels {
                session.set_axis_label(axis, text)?;
            }
            for (axis, value) in values {
                session.set_axis_value(axis, value)?;
            }
            for (axis, level, text) in levels {
                session.set_level_label(axis, level, text)?;
            }
            write_config(&session, output.as_deref())
        }
        Command::Replay {
            events,
            config,
            size,
            output,
        } => {
            let content = fs_err::read_to_string(&events)?;
            let events = parse_events(&content)
                .with_context(|| format!("Invalid event script: {}", events.display()))?;

            let mut session = load_session(config.as_deref(), ChartStyle::default())?;
            session.mount(size, Rc::new(NoCapture));
            for event in &events {
                session.handle_event(*event);
            }
            session.unmount();
            log::info!("replayed {} pointer events", events.len());

            write_config(&session, output.as_deref())
        }
        Command::Themes => {
            for name in ChartStyle::list_builtins() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ladderchart", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_style(theme: Option<&str>) -> Result<ChartStyle> {
    let Some(theme) = theme else {
        return Ok(ChartStyle::default());
    };

    let path = Path::new(theme);
    if path.is_file() {
        let content = fs_err::read_to_string(path)?;
        ChartStyle::from_theme_file_content(&content)
            .with_context(|| format!("Failed to parse theme file as TOML or YAML: {}", path.display()))
    } else {
        Ok(ChartStyle::from_builtin(theme)?)
    }
}

fn load_session(config: Option<&Path>, style: ChartStyle) -> Result<EditorSession> {
    let mut session = EditorSession::new(Ladder::default(), style, Box::new(CosmicTextMeasure::new()));

    if let Some(path) = config {
        let content = if path.to_str() == Some("-") {
            std::io::read_to_string(std::io::stdin()).context("Failed to read from stdin")?
        } else {
            fs_err::read_to_string(path)?
        };
        session
            .import_json(&content)
            .with_context(|| format!("Invalid JSON file: {}", path.display()))?;
        log::info!("imported config from {}", path.display());
    }

    Ok(session)
}

fn write_config(session: &EditorSession, output: Option<&Path>) -> Result<()> {
    let json = session.export_json()?;
    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(CONFIG_FILE_NAME)
            } else {
                path.to_path_buf()
            };
            fs_err::write(&path, json)?;
            eprintln!("Config saved to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

fn render_to_file(session: &EditorSession, size: f64, png_scale: f32, output: &Path) -> Result<()> {
    let mut renderer = ChartRenderer::new(session.style().clone(), size);
    let svg = renderer.render(session.state());

    let output = if output.is_dir() {
        output.join(IMAGE_FILE_NAME)
    } else {
        output.to_path_buf()
    };
    let output = output.as_path();

    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("Output file has no extension"))?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            fs_err::write(output, svg)?;
            eprintln!("SVG saved to: {}", output.display());
        }
        "png" => {
            fs_err::write(output, svg_to_png(&svg, png_scale)?)?;
            eprintln!("PNG saved to: {}", output.display());
        }
        "pdf" => {
            fs_err::write(output, svg_to_pdf(&svg)?)?;
            eprintln!("PDF saved to: {}", output.display());
        }
        _ => bail!(
            "Unsupported output format: .{} (use .svg, .png or .pdf)",
            output_ext
        ),
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ScriptedEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Cancel,
}

impl From<ScriptedEvent> for PointerEvent {
    fn from(event: ScriptedEvent) -> Self {
        match event {
            ScriptedEvent::Down { x, y } => PointerEvent::Down(Point::new(x, y)),
            ScriptedEvent::Move { x, y } => PointerEvent::Move(Point::new(x, y)),
            ScriptedEvent::Up { x, y } => PointerEvent::Up(Point::new(x, y)),
            ScriptedEvent::Cancel => PointerEvent::Cancel,
        }
    }
}

fn parse_events(content: &str) -> Result<Vec<PointerEvent>> {
    let events: Vec<ScriptedEvent> = serde_json::from_str(content)?;
    Ok(events.into_iter().map(PointerEvent::from).collect())
}

fn split_assignment(s: &str) -> Result<(&str, &str), String> {
    s.split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("invalid index '{}': {}", s, e))
}

fn parse_axis_text(s: &str) -> Result<(usize, String), String> {
    let (axis, text) = split_assignment(s)?;
    Ok((parse_index(axis)?, text.to_string()))
}

fn parse_axis_value(s: &str) -> Result<(usize, f64), String> {
    let (axis, value) = split_assignment(s)?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid number '{}': {}", value, e))?;
    Ok((parse_index(axis)?, value))
}

fn parse_level_text(s: &str) -> Result<(usize, usize, String), String> {
    let (key, text) = split_assignment(s)?;
    let (axis, level) = key
        .split_once(':')
        .ok_or_else(|| format!("expected AXIS:LEVEL, got '{}'", key))?;
    Ok((parse_index(axis)?, parse_index(level)?, text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_flags_parse() {
        assert_eq!(parse_axis_text("2=Craft = Care").unwrap(), (2, "Craft = Care".to_string()));
        assert_eq!(parse_axis_value("0=4.25").unwrap(), (0, 4.25));
        assert_eq!(
            parse_level_text("1:4=Sets direction").unwrap(),
            (1, 4, "Sets direction".to_string())
        );
        assert!(parse_axis_value("x=1").is_err());
        assert!(parse_level_text("1=Missing level").is_err());
    }

    #[test]
    fn event_script_parses() {
        let events = parse_events(
            r#"[{"kind":"down","x":200,"y":104},{"kind":"move","x":200,"y":40},{"kind":"up","x":0,"y":0},{"kind":"cancel"}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                PointerEvent::Down(Point::new(200.0, 104.0)),
                PointerEvent::Move(Point::new(200.0, 40.0)),
                PointerEvent::Up(Point::new(0.0, 0.0)),
                PointerEvent::Cancel,
            ]
        );
        assert!(parse_events(r#"[{"kind":"hover"}]"#).is_err());
    }

    #[test]
    fn replayed_drag_updates_value() {
        let mut session = EditorSession::default();
        session.mount(SURFACE_SIZE, Rc::new(NoCapture));
        for event in parse_events(
            r#"[{"kind":"down","x":200,"y":104},{"kind":"move","x":200,"y":40},{"kind":"up","x":200,"y":40}]"#,
        )
        .unwrap()
        {
            session.handle_event(event);
        }
        assert_eq!(session.state().value(0), 5.0);
    }
}
