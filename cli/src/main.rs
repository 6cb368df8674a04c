use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use machigai_core::bounding_box::parse_boxes;
use machigai_core::{
    parse_seed, plan_distribution, AssetManifest, BoardGeometry, GameRules, PlacementSession,
    PlacementWarning, PuzzleGame, RandomSource, Rect, Side, Size, Template, SEED_QUERY_PARAM,
    SEED_RANGE,
};
use rand::Rng;
use url::Url;

#[derive(Parser)]
#[command(name = "machigai-cli", version, about = "Authoring tools for spot-the-difference templates")]
struct Cli {
    /// JSON file overriding game rules.
    #[arg(long, global = true, env = "MACHIGAI_RULES")]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    Puzzle {
        #[command(subcommand)]
        command: PuzzleCommand,
    },
    Boxes {
        #[command(subcommand)]
        command: BoxesCommand,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    Validate {
        path: PathBuf,
        #[arg(long, env = "MACHIGAI_MANIFEST")]
        manifest: Option<PathBuf>,
    },
    Rescale {
        path: PathBuf,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PuzzleCommand {
    Generate {
        #[arg(long)]
        template: PathBuf,
        #[arg(long, env = "MACHIGAI_MANIFEST")]
        manifest: PathBuf,
        #[arg(long)]
        seed: Option<String>,
        /// Rendered background width; defaults to the template's recorded size.
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long, env = "MACHIGAI_BASE_URL")]
        base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum BoxesCommand {
    Plan {
        #[arg(long)]
        boxes: PathBuf,
        #[arg(long)]
        count: usize,
    },
    Scatter {
        #[arg(long)]
        boxes: Option<PathBuf>,
        #[arg(long, env = "MACHIGAI_MANIFEST")]
        manifest: PathBuf,
        #[arg(long)]
        background: String,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        count: usize,
        #[arg(long, default_value = "scatter")]
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

struct ThreadRandom(rand::rngs::ThreadRng);

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let rules = match cli.rules.as_deref() {
        Some(path) => GameRules::from_json(&read(path)?)?,
        None => GameRules::default(),
    };

    match cli.command {
        Commands::Template { command } => match command {
            TemplateCommand::Validate { path, manifest } => {
                let template = Template::from_json(&read(&path)?)?;
                if let Some(manifest) = manifest {
                    let manifest = AssetManifest::from_json(&read(&manifest)?)?;
                    template.validate_against(&manifest)?;
                }
                println!("template: {}", template.name);
                println!("background: {}", template.background);
                println!("sprites: {}", template.sprites.len());
                match template.render_size() {
                    Some(size) => println!("recorded at: {}x{}", size.width, size.height),
                    None => println!("recorded at: unknown (legacy template)"),
                }
            }
            TemplateCommand::Rescale {
                path,
                width,
                height,
                out,
            } => {
                let template = Template::from_json(&read(&path)?)?;
                let rescaled = template.rescaled(Size::new(width, height), rules.scale_tolerance);
                write_or_print(out.as_deref(), &rescaled.to_json_pretty()?)?;
            }
        },
        Commands::Puzzle { command } => match command {
            PuzzleCommand::Generate {
                template,
                manifest,
                seed,
                width,
                height,
                base_url,
            } => {
                let template = Template::from_json(&read(&template)?)?;
                let manifest = AssetManifest::from_json(&read(&manifest)?)?;
                template.validate_against(&manifest)?;
                let seed = match seed.as_deref() {
                    Some(raw) => parse_seed(raw)?,
                    None => rand::rng().random_range(0..SEED_RANGE),
                };
                let recorded = template.render_size();
                let size = match (width, height, recorded) {
                    (Some(width), Some(height), _) => Size::new(width, height),
                    (_, _, Some(recorded)) => recorded,
                    _ => return Err("background size unknown; pass --width and --height".into()),
                };
                let (game, warnings) = PuzzleGame::start(&template, &manifest, size, seed, rules);
                print_warnings(&warnings);
                println!("seed: {seed}");
                println!(
                    "sprites: left {} right {}",
                    game.board(Side::Left).len(),
                    game.board(Side::Right).len()
                );
                println!("differences: {}", game.total());
                for difference in game.differences() {
                    println!(
                        "  {} at ({:.1}, {:.1})",
                        difference.id, difference.center_x, difference.center_y
                    );
                }
                if let Some(base_url) = base_url {
                    println!("share_url: {}", build_share_url(&base_url, seed)?);
                }
            }
        },
        Commands::Boxes { command } => match command {
            BoxesCommand::Plan { boxes, count } => {
                let boxes = parse_boxes(&read(&boxes)?)?;
                let sizes: Vec<Size> = boxes.iter().map(|entry| entry.rect().size()).collect();
                let plan = plan_distribution(&sizes, count, &rules.footprint());
                if plan.is_empty() {
                    println!("no boxes; sprites go anywhere on the background");
                }
                for (entry, allocated) in boxes.iter().zip(plan) {
                    println!(
                        "{}: {} sprites ({}x{} at {},{})",
                        entry.id, allocated, entry.width, entry.height, entry.x, entry.y
                    );
                }
            }
            BoxesCommand::Scatter {
                boxes,
                manifest,
                background,
                width,
                height,
                count,
                name,
                out,
            } => {
                let manifest = AssetManifest::from_json(&read(&manifest)?)?;
                if manifest.sprites.is_empty() {
                    return Err("manifest lists no sprites".into());
                }
                let regions: Vec<Rect> = match boxes {
                    Some(path) => parse_boxes(&read(&path)?)?
                        .iter()
                        .map(|entry| entry.rect())
                        .collect(),
                    None => Vec::new(),
                };
                let mut rng = ThreadRandom(rand::rng());
                let srcs: Vec<String> = (0..count)
                    .map(|_| {
                        let idx = rng.next_index(manifest.sprites.len());
                        manifest.sprites[idx].filename.clone()
                    })
                    .collect();
                let geometry = BoardGeometry {
                    background: Rect::new(0.0, 0.0, width, height),
                    container: Rect::new(0.0, 0.0, width, height),
                };
                let original = manifest
                    .background(&background)
                    .and_then(|entry| entry.dimensions());
                let mut session = PlacementSession::new(rules);
                session.set_background(background, geometry.background_size());
                let report = session.place_all(&srcs, &manifest, &regions, &geometry, &mut rng);
                print_warnings(&report.warnings);
                let template = session.to_template(&name, original)?;
                write_or_print(out.as_deref(), &template.to_json_pretty()?)?;
            }
        },
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(path).map_err(|err| format!("failed to read {}: {err}", path.display()).into())
}

fn write_or_print(out: Option<&Path>, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    match out {
        Some(path) => {
            fs::write(path, contents)?;
            println!("wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

fn print_warnings(warnings: &[PlacementWarning]) {
    for warning in warnings {
        match warning {
            PlacementWarning::AssetMissing { id, src } => {
                eprintln!("warning: {id} skipped, asset {src} missing");
            }
            PlacementWarning::Overlapping { id, attempts } => {
                eprintln!("warning: {id} overlaps after {attempts} attempts");
            }
        }
    }
}

fn build_share_url(base_url: &str, seed: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SEED_QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SEED_QUERY_PARAM, &seed.to_string());
    }
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_replaces_existing_seed() {
        let url = build_share_url("https://example.com/play?seed=5&lang=ja#top", 42).expect("url");
        assert_eq!(url.as_str(), "https://example.com/play?lang=ja&seed=42");
    }

    #[test]
    fn share_url_rejects_relative_base() {
        assert!(build_share_url("play", 1).is_err());
    }
}
