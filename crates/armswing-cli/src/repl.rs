//! REPL – Read-Eval-Print Loop for the armswing interactive shell.
//!
//! Supported slash-commands:
//!   /help                 – show this list
//!   /mock [pose]          – estimate a built-in pose (neutral / forward / backward)
//!   /next                 – advance the demo cycle and estimate the new pose
//!   /estimate <file>      – estimate every frame of a JSON keypoint file
//!   /explain <file>       – show the intermediate vectors of the first frame
//!   /schema               – print the JSON schema of a keypoint frame
//!   /settings             – interactively edit `~/.armswing/config.toml`
//!   /quit | /exit         – gracefully exit the CLI

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use armswing_perception::{SagittalEstimator, SwingGeometry};
use armswing_types::{AngleResult, KeypointSet, SwingDirection};
use tracing::{info, warn};

use crate::config::{self, Config};
use crate::demo::{DemoCycle, MockPose};
use crate::input;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed slash-command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Mock(Option<MockPose>),
    Next,
    Estimate(PathBuf),
    Explain(PathBuf),
    Schema,
    Settings,
    Quit,
}

impl Command {
    /// Parse one input line.  Returns a user-facing message on failure.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match (name, arg) {
            ("/help", _) => Ok(Command::Help),
            ("/mock", None) => Ok(Command::Mock(None)),
            ("/mock", Some(pose)) => pose.parse().map(|p| Command::Mock(Some(p))),
            ("/next", _) => Ok(Command::Next),
            ("/estimate", Some(path)) => Ok(Command::Estimate(PathBuf::from(path))),
            ("/explain", Some(path)) => Ok(Command::Explain(PathBuf::from(path))),
            ("/estimate" | "/explain", None) => Err(format!("{name} needs a file path")),
            ("/schema", _) => Ok(Command::Schema),
            ("/settings", _) => Ok(Command::Settings),
            ("/quit" | "/exit", _) => Ok(Command::Quit),
            (other, _) => Err(format!("Unknown command '{other}'")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Estimator plus the demo cycle, rebuilt whenever settings change.
pub struct Session {
    estimator: SagittalEstimator,
    cycle: DemoCycle,
}

impl Session {
    /// Build a session from `cfg`, falling back to default tolerances when
    /// the configured ones are invalid.
    pub fn new(cfg: &Config) -> Self {
        let estimator = SagittalEstimator::try_new(cfg.estimator_config()).unwrap_or_else(|e| {
            warn!(error = %e, "invalid estimator tolerances; using defaults");
            SagittalEstimator::default()
        });
        Self {
            estimator,
            cycle: DemoCycle::new(cfg.start_pose),
        }
    }

    pub fn estimator(&self) -> &SagittalEstimator {
        &self.estimator
    }

    /// Estimate `pose` (or the current pose) and make it the current pose.
    pub fn mock(&mut self, pose: Option<MockPose>) -> (MockPose, AngleResult) {
        if let Some(pose) = pose {
            self.cycle.set(pose);
        }
        let pose = self.cycle.current();
        (pose, self.estimator.estimate(&pose.keypoints()))
    }

    /// Advance the demo cycle and estimate the new pose.
    pub fn next(&mut self) -> (MockPose, AngleResult) {
        let pose = self.cycle.advance();
        (pose, self.estimator.estimate(&pose.keypoints()))
    }

    /// Estimate every frame in `frames`.
    pub fn estimate_all(&self, frames: &[KeypointSet]) -> Vec<AngleResult> {
        frames.iter().map(|f| self.estimator.estimate(f)).collect()
    }
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(shutdown: Arc<AtomicBool>, cfg: Config) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = Session::new(&cfg);

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "armswing>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Help) => cmd_help(),
            Ok(Command::Mock(pose)) => {
                let (pose, result) = session.mock(pose);
                print_pose_result(pose, &result);
            }
            Ok(Command::Next) => {
                let (pose, result) = session.next();
                print_pose_result(pose, &result);
            }
            Ok(Command::Estimate(path)) => cmd_estimate(&session, &path),
            Ok(Command::Explain(path)) => cmd_explain(&session, &path),
            Ok(Command::Schema) => cmd_schema(),
            Ok(Command::Settings) => {
                if let Some(cfg) = cmd_settings() {
                    session = Session::new(&cfg);
                }
            }
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(msg) => {
                println!(
                    "{} Type {} for available commands.",
                    msg.red(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "armswing Commands".bold().underline());
    println!("  {}       – estimate a built-in pose (neutral/forward/backward)", "/mock [pose]".bold().cyan());
    println!("  {}               – advance the demo cycle",                      "/next".bold().cyan());
    println!("  {}    – estimate every frame in a JSON file",                   "/estimate <file>".bold().cyan());
    println!("  {}     – show intermediate vectors of the first frame",         "/explain <file>".bold().cyan());
    println!("  {}             – print the keypoint JSON schema",                "/schema".bold().cyan());
    println!("  {}           – edit ~/.armswing/config.toml",                    "/settings".bold().cyan());
    println!("  {}        – exit the CLI",                                       "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_estimate(session: &Session, path: &Path) {
    let frames = match input::load_frames(path) {
        Ok(frames) => frames,
        Err(e) => {
            println!("{}: {}", "Input error".red(), e);
            return;
        }
    };

    let results = session.estimate_all(&frames);
    info!(frames = results.len(), path = %path.display(), "keypoint file estimated");
    for (index, result) in results.iter().enumerate() {
        println!("  [{:>3}] {}", index, render_result(result));
    }
}

fn cmd_explain(session: &Session, path: &Path) {
    let frame = match input::load_frames(path) {
        Ok(frames) => frames[0],
        Err(e) => {
            println!("{}: {}", "Input error".red(), e);
            return;
        }
    };

    println!("{}", "Swing Geometry".bold().underline());
    match session.estimator().geometry(&frame) {
        Some(g) => print_geometry(&g),
        None => println!("  {}", "shoulder line is parallel to the torso axis".red()),
    }
    println!("  {:<16} {}", "result".bold(), render_result(&session.estimator().estimate(&frame)));
}

fn cmd_schema() {
    let schema = schemars::schema_for!(KeypointSet);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("{}: {}", "Schema error".red(), e),
    }
}

/// Edit the tolerances and start pose.  Returns the saved config so the
/// caller can rebuild its session.
fn cmd_settings() -> Option<Config> {
    let mut cfg = match config::load_file() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {}", "Error loading config".red(), e);
            return None;
        }
    };

    println!("{}", "Settings Editor".bold().underline());
    cfg.min_projected_norm =
        prompt_tolerance("  Min projected norm", cfg.min_projected_norm, false);
    cfg.dead_zone = prompt_tolerance("  Dead zone         ", cfg.dead_zone, true);

    let pose = prompt_str(
        &format!("  Start pose         [{}]: ", cfg.start_pose),
        &cfg.start_pose.to_string(),
    );
    match pose.parse::<MockPose>() {
        Ok(p) => cfg.start_pose = p,
        Err(e) => println!("  {} {}, keeping {}", "Warning:".yellow(), e, cfg.start_pose),
    }

    match config::save(&cfg) {
        Ok(()) => {
            println!(
                "{} {}",
                "✓ Settings saved to".green(),
                config::config_path().display().to_string().bold()
            );
            Some(cfg)
        }
        Err(e) => {
            println!("{}: {}", "Error saving config".red(), e);
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// One-line, colour-coded rendering of a result.
pub fn render_result(result: &AngleResult) -> String {
    match result.direction {
        SwingDirection::Error => format!("{}", "unable to estimate (degenerate pose)".red()),
        direction => {
            let label = match direction {
                SwingDirection::Forward => direction.label().green().bold(),
                SwingDirection::Backward => direction.label().yellow().bold(),
                _ => direction.label().dimmed(),
            };
            format!("{:>6.1}°  {}", result.angle_degrees, label)
        }
    }
}

fn print_pose_result(pose: MockPose, result: &AngleResult) {
    println!("  {:<9} {}", pose.to_string().bold(), render_result(result));
}

fn print_geometry(g: &SwingGeometry) {
    let rows = [
        ("shoulder mid", g.shoulder_mid),
        ("hip mid", g.hip_mid),
        ("torso axis", g.torso_axis),
        ("shoulder line", g.shoulder_line),
        ("normal", g.sagittal_normal),
        ("arm", g.arm),
        ("arm projected", g.arm_projected),
        ("axis projected", g.axis_projected),
        ("front", g.front),
    ];
    for (name, v) in rows {
        println!("  {:<16} {}", name.bold(), v);
    }
    println!("  {:<16} {:.4}", "front·arm".bold(), g.front_back_dot);
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt for a finite tolerance that is positive (or zero when
/// `allow_zero`).  Returns `current` on Enter or on an invalid entry.
fn prompt_tolerance(label: &str, current: f64, allow_zero: bool) -> f64 {
    let raw = prompt_str(&format!("{} [{}]: ", label, current), &current.to_string());
    match raw.parse::<f64>() {
        Ok(v) if is_valid_tolerance(v, allow_zero) => v,
        _ => {
            println!(
                "  {} '{}' is not a valid tolerance, keeping {}",
                "Warning:".yellow(),
                raw,
                current
            );
            current
        }
    }
}

fn is_valid_tolerance(value: f64, allow_zero: bool) -> bool {
    value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0))
}

/// Prompt for a string value.  Returns `default` when the user presses Enter.
fn prompt_str(msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed
            }
        }
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(Command::parse("/help"), Ok(Command::Help));
        assert_eq!(Command::parse("  /next  "), Ok(Command::Next));
        assert_eq!(Command::parse("/schema"), Ok(Command::Schema));
        assert_eq!(Command::parse("/settings"), Ok(Command::Settings));
        assert_eq!(Command::parse("/quit"), Ok(Command::Quit));
        assert_eq!(Command::parse("/exit"), Ok(Command::Quit));
    }

    #[test]
    fn parse_mock_with_and_without_pose() {
        assert_eq!(Command::parse("/mock"), Ok(Command::Mock(None)));
        assert_eq!(
            Command::parse("/mock backward"),
            Ok(Command::Mock(Some(MockPose::Backward)))
        );
        assert!(Command::parse("/mock upside-down").is_err());
    }

    #[test]
    fn parse_file_commands_keep_spaces_in_path() {
        assert_eq!(
            Command::parse("/estimate my frames.json"),
            Ok(Command::Estimate(PathBuf::from("my frames.json")))
        );
        assert_eq!(
            Command::parse("/explain run.json"),
            Ok(Command::Explain(PathBuf::from("run.json")))
        );
        assert!(Command::parse("/estimate").is_err());
    }

    #[test]
    fn parse_unknown_command_is_error() {
        let err = Command::parse("/dance").unwrap_err();
        assert!(err.contains("/dance"));
    }

    #[test]
    fn session_starts_at_configured_pose() {
        let cfg = Config {
            start_pose: MockPose::Forward,
            ..Config::default()
        };
        let mut session = Session::new(&cfg);
        let (pose, _) = session.mock(None);
        assert_eq!(pose, MockPose::Forward);
        let (pose, _) = session.next();
        assert_eq!(pose, MockPose::Backward);
    }

    #[test]
    fn session_falls_back_on_invalid_tolerances() {
        let cfg = Config {
            dead_zone: -1.0,
            ..Config::default()
        };
        let session = Session::new(&cfg);
        assert_eq!(session.estimator(), &SagittalEstimator::default());
    }

    #[test]
    fn session_falls_back_on_zero_min_norm() {
        let cfg = Config {
            min_projected_norm: 0.0,
            ..Config::default()
        };
        assert_eq!(Session::new(&cfg).estimator(), &SagittalEstimator::default());
    }

    #[test]
    fn tolerance_entry_rules() {
        assert!(is_valid_tolerance(0.01, false));
        assert!(!is_valid_tolerance(0.0, false));
        assert!(is_valid_tolerance(0.0, true));
        assert!(!is_valid_tolerance(-0.1, true));
        assert!(!is_valid_tolerance(f64::NAN, true));
    }

    #[test]
    fn session_estimates_every_frame() {
        let session = Session::new(&Config::default());
        let frames: Vec<_> = MockPose::ALL.iter().map(|p| p.keypoints()).collect();
        assert_eq!(session.estimate_all(&frames).len(), 3);
    }

    #[test]
    fn render_names_the_direction() {
        let forward = render_result(&AngleResult::new(149.0, SwingDirection::Forward));
        assert!(forward.contains("149.0"));
        assert!(forward.contains("forward"));

        let error = render_result(&AngleResult::error());
        assert!(error.contains("unable to estimate"));
    }

    #[test]
    fn explain_geometry_is_available_for_mock_pose() {
        let session = Session::new(&Config::default());
        let g = session
            .estimator()
            .geometry(&MockPose::Forward.keypoints())
            .expect("non-degenerate");
        assert_eq!(g.arm_projected.z, 0.0);
        assert!(g.sagittal_normal.z < 0.0);
        assert_eq!(g.sagittal_normal.x, 0.0);
    }
}
