use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Builder as TokioRuntimeBuilder;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use focus_carousel::carousel::{CardPresentation, CarouselSnapshot, FocusCarouselController};
use focus_carousel::config::CarouselConfig;
use focus_carousel::generation::{GenerationKind, GenerationSimulator};
use focus_carousel::layout::{closest_index, CardStrip};
use focus_carousel::models::{find_template, CardDeck, TEMPLATES};
use focus_carousel::runtime::spawn_carousel;
use focus_carousel::timers::{TokioScheduler, VirtualClock};

#[derive(Debug, Parser)]
#[command(name = "focus-carousel", version, about = "Replay carousel focus sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a scripted scroll session against a demo deck.
    Carousel(CarouselArgs),
    /// Play the simulated generation timeline.
    Generate(GenerateArgs),
    /// List the built-in templates.
    Templates,
}

#[derive(Debug, Args)]
struct CarouselArgs {
    /// Number of cards in the demo deck.
    #[arg(long, default_value_t = 6)]
    cards: usize,
    /// Images per card.
    #[arg(long, default_value_t = 3)]
    images: usize,
    /// Size cards to 70% of this viewport width instead of --card-width.
    #[arg(long)]
    viewport_width: Option<f64>,
    #[arg(long, default_value_t = 300.0)]
    card_width: f64,
    #[arg(long, default_value_t = 16.0)]
    gap: f64,
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[arg(long)]
    slide_ms: Option<u64>,
    /// Scroll samples as `at_ms:offset` pairs, e.g. "500:632,600:948".
    #[arg(long, default_value = "")]
    script: String,
    /// Total session length.
    #[arg(long, default_value_t = 8000)]
    duration_ms: u64,
    /// Run on a virtual clock and finish immediately.
    #[arg(long)]
    virtual_time: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Template id; omit to generate from a prank prompt.
    #[arg(long)]
    template: Option<String>,
}

/// One scripted scroll sample.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollStep {
    at: Duration,
    offset: f64,
}

impl CarouselArgs {
    fn config(&self) -> CarouselConfig {
        let mut config = CarouselConfig::from_env();
        if let Some(ms) = self.debounce_ms {
            config = config.with_debounce(Duration::from_millis(ms));
        }
        if let Some(ms) = self.slide_ms {
            config = config.with_slide_interval(Duration::from_millis(ms));
        }
        config
    }

    fn strip(&self) -> CardStrip {
        match self.viewport_width {
            Some(width) => CardStrip::from_viewport(width, self.gap),
            None => CardStrip::new(self.card_width, self.gap),
        }
    }

    /// The strip, rejected up front if its pitch could never map a scroll offset.
    fn checked_strip(&self) -> Result<CardStrip> {
        let strip = self.strip();
        closest_index(0.0, strip.pitch())
            .with_context(|| format!("Card pitch must be positive, got {}", strip.pitch()))?;
        Ok(strip)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("focus_carousel=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Carousel(args) => run_carousel(args),
        Command::Generate(args) => run_generate(args),
        Command::Templates => {
            for template in TEMPLATES {
                println!("{:>3}  {:<18} {}", template.id, template.name, template.description);
            }
            Ok(())
        }
    }
}

fn run_carousel(args: CarouselArgs) -> Result<()> {
    let strip = args.checked_strip()?;
    let script = parse_script(&args.script)?;
    let deck = CardDeck::uniform(args.cards, args.images);
    let config = args.config();
    let duration = Duration::from_millis(args.duration_ms);

    info!(
        cards = deck.len(),
        pitch = strip.pitch(),
        debounce_ms = config.debounce.as_millis() as u64,
        slide_ms = config.slide_interval.as_millis() as u64,
        "Starting carousel session"
    );

    if args.virtual_time {
        return replay_virtual(config, strip, &deck, &script, duration);
    }

    let runtime = TokioRuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(replay_realtime(config, strip, deck, script, duration))
}

async fn replay_realtime(
    config: CarouselConfig,
    strip: CardStrip,
    deck: CardDeck,
    script: Vec<ScrollStep>,
    duration: Duration,
) -> Result<()> {
    let handle = spawn_carousel(config, &deck, 0)?;
    let start = Instant::now();
    log_snapshot(&deck, &handle.snapshot(), Duration::ZERO);

    let log_deck = deck.clone();
    handle.on_change(move |snapshot| log_snapshot(&log_deck, snapshot, start.elapsed()));

    for step in script.iter().filter(|s| s.at <= duration) {
        sleep_until(start + step.at).await;
        handle.scroll(step.offset, strip.pitch())?;
    }
    sleep_until(start + duration).await;

    let last = handle.shutdown().await?;
    info!(revision = last.revision, "Session finished");
    Ok(())
}

fn replay_virtual(
    config: CarouselConfig,
    strip: CardStrip,
    deck: &CardDeck,
    script: &[ScrollStep],
    duration: Duration,
) -> Result<()> {
    let mut controller = FocusCarouselController::manual(config).with_deck(deck);
    controller.initialize(0);
    let mut published = controller.revision();
    log_snapshot(deck, &controller.snapshot(), Duration::ZERO);

    let steps = script.iter().filter(|s| s.at <= duration);
    for target in steps.map(|s| (s.at, Some(s.offset))).chain([(duration, None)]) {
        let (at, offset) = target;
        // Step through deadlines one at a time so every change is logged.
        loop {
            let scheduler = controller.manual_scheduler();
            let now = scheduler.now();
            let Some(deadline) = scheduler.next_deadline().filter(|d| *d <= at) else {
                controller.advance(at.saturating_sub(now));
                break;
            };
            controller.advance(deadline.saturating_sub(now));
            if controller.revision() != published {
                published = controller.revision();
                log_snapshot(deck, &controller.snapshot(), deadline);
            }
        }
        if let Some(offset) = offset {
            controller.on_scroll(offset, strip.pitch())?;
            if controller.revision() != published {
                published = controller.revision();
                log_snapshot(deck, &controller.snapshot(), at);
            }
        }
    }

    controller.dispose();
    info!(revision = controller.revision(), "Session finished");
    Ok(())
}

fn log_snapshot(deck: &CardDeck, snapshot: &CarouselSnapshot, elapsed: Duration) {
    let at_ms = elapsed.as_millis() as u64;
    let Some(focused) = snapshot.focused else {
        info!(at_ms, "No card focused");
        return;
    };
    let title = deck.get(focused).map(|c| c.title.as_str()).unwrap_or("<off deck>");
    let presentation = CardPresentation::for_card(snapshot, focused);
    if presentation.preview {
        let image = deck
            .get(focused)
            .and_then(|c| c.images.get(presentation.visible_image))
            .map(String::as_str)
            .unwrap_or("<none>");
        info!(at_ms, focused, title, image, "Previewing");
    } else {
        info!(at_ms, focused, title, preview = ?snapshot.preview, "Focus");
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let kind = match args.template.as_deref() {
        Some(id) => {
            let template = find_template(id)?;
            info!(template = template.name, prompt = template.prompt, "Generating from template");
            GenerationKind::Template
        }
        None => GenerationKind::Prank,
    };

    let runtime = TokioRuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(async move {
        let (scheduler, timer_rx) = TokioScheduler::new()?;
        let mut simulator = GenerationSimulator::new(scheduler);
        simulator.start(kind);
        info!(status = simulator.status_text().unwrap_or_default(), "Generation");

        while !simulator.is_done() {
            let timer = timer_rx
                .recv_async()
                .await
                .context("Generation timer channel closed")?;
            if simulator.on_timer(timer) {
                info!(status = simulator.status_text().unwrap_or_default(), "Generation");
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// Parses `at_ms:offset` pairs separated by commas, sorted by time.
fn parse_script(script: &str) -> Result<Vec<ScrollStep>> {
    let mut steps = Vec::new();
    for entry in script.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (at, offset) = entry
            .split_once(':')
            .with_context(|| format!("Script entry `{entry}` is not `at_ms:offset`"))?;
        let at = at
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid time in script entry `{entry}`"))?;
        let offset = offset
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid offset in script entry `{entry}`"))?;
        if !offset.is_finite() {
            bail!("Offset in script entry `{entry}` is not finite");
        }
        steps.push(ScrollStep {
            at: Duration::from_millis(at),
            offset,
        });
    }
    steps.sort_by_key(|s| s.at);
    Ok(steps)
}
