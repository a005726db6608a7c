//! Command-line front end: build, inspect and check gun steering

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::DVec3;
use gun_units::{parse_quantity, Dimension};
use particle_gun::{
    steering_file_name, to_args, to_steering, AngularDistribution, GunConfiguration, Simulation,
};

/// Write and check particle-gun steering for ddsim
#[derive(Debug, Parser)]
#[command(name = "gun-steering", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a summary of the gun configuration
    Show {
        /// Configuration to start from (.toml, .json or .py); defaults to the
        /// HCal cluster-check gun
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Write the configuration as a steering file, ddsim arguments, TOML or JSON
    Render {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Steering)]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long, conflicts_with = "purpose")]
        output: Option<PathBuf>,

        /// Write to `steering.<purpose>_<run tag>.py` in the current directory
        /// (`.toml` or `.json` for those formats)
        #[arg(long)]
        purpose: Option<String>,
    },

    /// Read and validate a configuration file; fails on the first problem
    Check {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Steering,
    Args,
    Toml,
    Json,
}

/// Field overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Primary particle, e.g. pi+
    #[arg(long)]
    pub particle: Option<String>,

    /// Kinetic energy, e.g. 5*GeV
    #[arg(long)]
    pub energy: Option<String>,

    /// Emission point as x,y,z, e.g. 0,0,10*cm
    #[arg(long)]
    pub position: Option<String>,

    /// uniform, cos(theta), eta, theta or ffbar
    #[arg(long)]
    pub distribution: Option<String>,

    /// e.g. 70*degree
    #[arg(long)]
    pub theta_min: Option<String>,

    /// e.g. 80*degree
    #[arg(long)]
    pub theta_max: Option<String>,

    /// Number of events to simulate
    #[arg(long)]
    pub events: Option<u32>,

    /// Switch the gun on or off in the driver (`--enable-gun` alone means true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub enable_gun: Option<bool>,

    #[arg(long)]
    pub compact_file: Option<String>,

    #[arg(long)]
    pub output_file: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, sim: &mut Simulation) -> Result<()> {
        let gun = &mut sim.gun;
        if let Some(particle) = &self.particle {
            gun.particle = particle.clone();
        }
        if let Some(energy) = &self.energy {
            gun.energy = parse_quantity(energy, Dimension::Energy)
                .with_context(|| format!("--energy {energy}"))?;
        }
        if let Some(position) = &self.position {
            gun.position = parse_position(position)?;
        }
        if let Some(distribution) = &self.distribution {
            gun.distribution = distribution.parse::<AngularDistribution>()?;
        }
        if let Some(theta) = &self.theta_min {
            gun.theta_min = parse_quantity(theta, Dimension::Angle)
                .with_context(|| format!("--theta-min {theta}"))?;
        }
        if let Some(theta) = &self.theta_max {
            gun.theta_max = parse_quantity(theta, Dimension::Angle)
                .with_context(|| format!("--theta-max {theta}"))?;
        }

        if self.events.is_some() {
            sim.number_of_events = self.events;
        }
        if self.enable_gun.is_some() {
            sim.enable_gun = self.enable_gun;
        }
        if self.compact_file.is_some() {
            sim.compact_file = self.compact_file.clone();
        }
        if self.output_file.is_some() {
            sim.output_file = self.output_file.clone();
        }
        if self.seed.is_some() {
            sim.random_seed = self.seed;
        }
        Ok(())
    }
}

fn parse_position(text: &str) -> Result<DVec3> {
    let coordinates = text
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(|c| parse_quantity(c, Dimension::Length))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("--position {text}"))?;
    match coordinates.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => bail!("--position {text}: expected three coordinates x,y,z"),
    }
}

/// Loaded configuration with overrides applied
pub fn build_simulation(config: Option<&Path>, overrides: &Overrides) -> Result<Simulation> {
    let mut sim = match config {
        Some(path) => Simulation::load(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => Simulation::hcal_cluster_check(),
    };
    overrides.apply(&mut sim)?;
    Ok(sim)
}

pub fn render(sim: &Simulation, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Steering => to_steering(sim),
        OutputFormat::Args => {
            let words: Vec<String> = to_args(sim).iter().map(|a| shell_word(a)).collect();
            format!("{}\n", words.join(" "))
        }
        OutputFormat::Toml => sim.to_toml_string()?,
        OutputFormat::Json => format!("{}\n", sim.to_json_string()?),
    })
}

/// File `--purpose` writes to: the steering file name with the extension
/// of the chosen format
pub fn purpose_path(
    purpose: &str,
    format: OutputFormat,
    gun: &GunConfiguration,
) -> Result<PathBuf> {
    let steering = PathBuf::from(steering_file_name(purpose, gun));
    Ok(match format {
        OutputFormat::Steering => steering,
        OutputFormat::Toml => steering.with_extension("toml"),
        OutputFormat::Json => steering.with_extension("json"),
        OutputFormat::Args => {
            bail!("--purpose writes a configuration file; use --output for ddsim arguments")
        }
    })
}

/// Print a top-level error through the logger, or to stderr when logging is off
pub fn report(error: &anyhow::Error) -> bool {
    if log::log_enabled!(log::Level::Error) {
        log::error!("{error:#}");
        true
    } else {
        eprintln!("error: {error:#}");
        false
    }
}

fn shell_word(word: &str) -> String {
    let plain = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.+/=:,".contains(c));
    if plain && !word.is_empty() {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Show { config, overrides } => {
            let sim = build_simulation(config.as_deref(), &overrides)?;
            println!("run           {}", sim.gun.run_tag());
            println!("{}", sim.gun);
            if let Some(events) = sim.number_of_events {
                println!("events        {events}");
            }
        }
        Command::Render {
            config,
            overrides,
            format,
            output,
            purpose,
        } => {
            let sim = build_simulation(config.as_deref(), &overrides)?;
            if let Err(e) = sim.validate() {
                log::warn!("rendering a configuration the simulation will reject: {e}");
            }
            let output = match (output, purpose) {
                (Some(path), _) => Some(path),
                (None, Some(purpose)) => Some(purpose_path(&purpose, format, &sim.gun)?),
                (None, None) => None,
            };
            let text = render(&sim, format)?;
            match output {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    log::info!("✓ Wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        Command::Check { file } => {
            let sim = Simulation::load(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            sim.validate()
                .with_context(|| format!("{} is not a valid run", file.display()))?;
            println!("✓ {}: run {}", file.display(), sim.gun.run_tag());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gun_units::{cm, degree, GeV, MeV};

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "gun-steering",
            "render",
            "--format",
            "toml",
            "--energy",
            "10*GeV",
            "--theta-min",
            "60*degree",
        ])
        .unwrap();
        let Command::Render {
            format, overrides, ..
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(format, OutputFormat::Toml);
        assert_eq!(overrides.energy.as_deref(), Some("10*GeV"));
        assert_eq!(overrides.theta_min.as_deref(), Some("60*degree"));
    }

    #[test]
    fn test_output_and_purpose_conflict() {
        let result = Cli::try_parse_from([
            "gun-steering",
            "render",
            "--output",
            "a.py",
            "--purpose",
            "forHCalClusterCheck",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides = Overrides {
            particle: Some("e-".to_string()),
            energy: Some("500 MeV".to_string()),
            position: Some("(0, 0, 10*cm)".to_string()),
            distribution: Some("eta".to_string()),
            theta_max: Some("85*degree".to_string()),
            events: Some(100),
            enable_gun: Some(true),
            ..Default::default()
        };
        let sim = build_simulation(None, &overrides).unwrap();
        assert_eq!(sim.gun.particle, "e-");
        assert_eq!(sim.gun.energy, 500.0 * MeV);
        assert_eq!(sim.gun.position, DVec3::new(0.0, 0.0, 10.0 * cm));
        assert_eq!(sim.gun.distribution, AngularDistribution::Eta);
        assert_eq!(sim.gun.theta_min, 70.0 * degree);
        assert_eq!(sim.gun.theta_max, 85.0 * degree);
        assert_eq!(sim.number_of_events, Some(100));
        assert_eq!(sim.enable_gun, Some(true));
    }

    #[test]
    fn test_bad_overrides() {
        let bad = [
            Overrides {
                energy: Some("5*degree".to_string()),
                ..Default::default()
            },
            Overrides {
                position: Some("1,2".to_string()),
                ..Default::default()
            },
            Overrides {
                distribution: Some("flat".to_string()),
                ..Default::default()
            },
        ];
        for overrides in bad {
            assert!(build_simulation(None, &overrides).is_err(), "{overrides:?}");
        }
    }

    #[test]
    fn test_render_args_are_shell_quoted() {
        let text = render(&Simulation::hcal_cluster_check(), OutputFormat::Args).unwrap();
        assert_eq!(
            text,
            "--gun.energy '5*GeV' --gun.particle pi+ --gun.position '(0.0, 0.0, 0.0)' \
             --gun.distribution 'cos(theta)' --gun.thetaMin '70*degree' --gun.thetaMax '80*degree'\n"
        );
        assert_eq!(shell_word("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_render_then_check_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = Simulation::hcal_cluster_check();
        sim.gun.energy = 20.0 * GeV;

        for (name, format) in [
            ("run.py", OutputFormat::Steering),
            ("run.toml", OutputFormat::Toml),
            ("run.json", OutputFormat::Json),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, render(&sim, format).unwrap()).unwrap();
            let cli = Cli {
                command: Command::Check { file: path.clone() },
            };
            assert!(run(cli).is_ok(), "{name}");
            assert_eq!(
                build_simulation(Some(path.as_path()), &Overrides::default()).unwrap(),
                sim
            );
        }
    }

    #[test]
    fn test_check_rejects_invalid_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let mut sim = Simulation::hcal_cluster_check();
        sim.gun.theta_min = 90.0 * degree;
        fs::write(&path, sim.to_toml_string().unwrap()).unwrap();

        let err = run(Cli {
            command: Command::Check { file: path },
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("thetaMin"));
    }

    #[test]
    fn test_enable_gun_flag_forms() {
        let parse = |args: &[&str]| {
            let cli = Cli::try_parse_from(["gun-steering", "show"].iter().chain(args).copied())
                .unwrap();
            let Command::Show { overrides, .. } = cli.command else {
                panic!("expected show");
            };
            overrides.enable_gun
        };
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["--enable-gun"]), Some(true));
        assert_eq!(parse(&["--enable-gun", "false"]), Some(false));
        assert_eq!(parse(&["--enable-gun=true"]), Some(true));
    }

    #[test]
    fn test_enable_gun_override_switches_loaded_gun_off() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("on.toml");
        let mut sim = Simulation::hcal_cluster_check();
        sim.enable_gun = Some(true);
        sim.save(&path).unwrap();

        let overrides = Overrides {
            enable_gun: Some(false),
            ..Default::default()
        };
        let sim = build_simulation(Some(path.as_path()), &overrides).unwrap();
        assert_eq!(sim.enable_gun, Some(false));
        assert!(!to_args(&sim).iter().any(|a| a == "--enableGun"));
    }

    #[test]
    fn test_purpose_path_follows_format() {
        let gun = GunConfiguration::hcal_cluster_check();
        let path = |format| purpose_path("forHCalClusterCheck", format, &gun).unwrap();
        assert_eq!(
            path(OutputFormat::Steering),
            PathBuf::from("steering.forHCalClusterCheck_e5th70pip.py")
        );
        assert_eq!(
            path(OutputFormat::Toml),
            PathBuf::from("steering.forHCalClusterCheck_e5th70pip.toml")
        );
        assert_eq!(
            path(OutputFormat::Json),
            PathBuf::from("steering.forHCalClusterCheck_e5th70pip.json")
        );
        assert!(purpose_path("forHCalClusterCheck", OutputFormat::Args, &gun).is_err());
    }

    #[test]
    fn test_purpose_file_passes_check_in_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulation::hcal_cluster_check();
        for format in [OutputFormat::Steering, OutputFormat::Toml, OutputFormat::Json] {
            let path = dir
                .path()
                .join(purpose_path("forHCalClusterCheck", format, &sim.gun).unwrap());
            fs::write(&path, render(&sim, format).unwrap()).unwrap();
            let check = Cli {
                command: Command::Check { file: path.clone() },
            };
            assert!(run(check).is_ok(), "{}", path.display());
        }
    }

    #[test]
    fn test_report_without_logger_goes_to_stderr() {
        // no logger is installed in unit tests
        assert!(!report(&anyhow::anyhow!("cannot read run.toml")));
    }
}
