//! media-alloc simulator
//!
//! Text front-end for the address space. Reads one command per line from
//! stdin and re-renders the block list after every change.

use anyhow::{bail, Context};
use clap::Parser;
use media_alloc::{AddressSpace, AllocatorConfig, Media, Strategy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "media-alloc")]
#[command(about = "Simulate first/best/worst-fit allocation of camera media")]
struct Args {
    /// Path to a TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Address space size in units (overrides the config file)
    #[arg(short = 't', long)]
    total_size: Option<u64>,

    /// Initial placement strategy (first-fit, best-fit, worst-fit)
    #[arg(short = 's', long)]
    strategy: Option<Strategy>,

    /// Render the block list as JSON
    #[arg(long)]
    json: bool,
}

const HELP: &str = "\
Commands:
  image <width> <height>   allocate an image
  video <duration>         allocate a video
  strategy <name>          select first-fit, best-fit or worst-fit
  free <address>           deallocate the block starting at <address>
  clear                    release every block
  show                     print the block list
  stats                    print usage statistics
  help                     print this message
  quit                     exit";

struct Session {
    space: AddressSpace,
    json: bool,
}

impl Session {
    fn new(space: AddressSpace, json: bool) -> Self {
        Session { space, json }
    }

    /// Run one command line. Returns `false` when the session should end.
    fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            return Ok(true);
        };

        match command.to_lowercase().as_str() {
            "image" => {
                let [width, height] = parse_args::<2>(rest)?;
                let media = Media::image(to_u32(width)?, to_u32(height)?);
                self.allocate(media, out)?;
            }
            "video" => {
                let [duration] = parse_args::<1>(rest)?;
                self.allocate(Media::video(to_u32(duration)?), out)?;
            }
            "strategy" => {
                let name = rest.first().context("usage: strategy <name>")?;
                let strategy: Strategy = name.parse().map_err(anyhow::Error::msg)?;
                self.space.set_default_strategy(strategy);
                self.render(out)?;
            }
            "free" => {
                let [address] = parse_args::<1>(rest)?;
                self.space.deallocate(address);
                writeln!(out, "Memory deallocated successfully.")?;
                self.render(out)?;
            }
            "clear" => {
                self.space.reset();
                writeln!(out, "Memory cleared.")?;
                self.render(out)?;
            }
            "show" => self.render(out)?,
            "stats" => {
                let stats = self.space.stats();
                writeln!(
                    out,
                    "total {} | allocated {} | free {} in {} block(s) | largest free {} | fragmentation {:.2}",
                    stats.total_size,
                    stats.allocated_size,
                    stats.free_size,
                    stats.free_block_count,
                    stats.largest_free_block,
                    stats.fragmentation
                )?;
            }
            "help" => writeln!(out, "{}", HELP)?,
            "quit" | "exit" => return Ok(false),
            other => bail!("unknown command '{}' (try 'help')", other),
        }

        Ok(true)
    }

    fn allocate(&mut self, media: Media, out: &mut impl Write) -> anyhow::Result<()> {
        let size = self.space.sizer().size_of(&media);
        if size > self.space.total_size() {
            writeln!(
                out,
                "{} needs {} units but memory holds {}. Please choose a smaller size.",
                media,
                size,
                self.space.total_size()
            )?;
            return Ok(());
        }

        let strategy = self.space.default_strategy();
        match self.space.try_allocate_media(media, strategy) {
            Ok(start) => debug!("Placed {} at {}", media, start),
            Err(e) => writeln!(out, "Allocation failed: {}", e)?,
        }
        self.render(out)
    }

    fn render(&self, out: &mut impl Write) -> anyhow::Result<()> {
        if self.json {
            writeln!(out, "{}", self.space.snapshot_json()?)?;
            return Ok(());
        }

        writeln!(
            out,
            "Selected Memory Allocation Strategy: {}\n",
            self.space.default_strategy().label()
        )?;
        for block in self.space.list_blocks() {
            writeln!(out, "{}", block)?;
        }
        Ok(())
    }
}

fn parse_args<const N: usize>(args: &[&str]) -> anyhow::Result<[u64; N]> {
    if args.len() != N {
        bail!("expected {} numeric argument(s), got {}", N, args.len());
    }

    let mut values = [0u64; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg
            .parse()
            .with_context(|| format!("'{}' is not a non-negative integer", arg))?;
    }
    Ok(values)
}

fn to_u32(value: u64) -> anyhow::Result<u32> {
    u32::try_from(value).with_context(|| format!("{} is too large", value))
}

fn load_config(args: &Args) -> anyhow::Result<AllocatorConfig> {
    let mut config = match &args.config {
        Some(path) => AllocatorConfig::load(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => AllocatorConfig::default(),
    };

    if let Some(total_size) = args.total_size {
        config.total_size = total_size;
    }
    if let Some(strategy) = args.strategy {
        config.default_strategy = strategy;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!(
        "Starting simulator: {} units, {}",
        config.total_size, config.default_strategy
    );

    let mut session = Session::new(AddressSpace::with_config(&config)?, args.json);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    session.render(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line?;
        match session.execute(&line, &mut stdout) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(stdout, "Error: {:#}", e)?,
        }
        stdout.flush()?;
    }

    Ok(())
}
