//! Donezo CLI
//!
//! Command-line front end for the Donezo dashboard:
//! - Log in and print a token
//! - List, search, filter and locally add users and products
//! - Show the overview and analytics pages
//! - Run the time tracker

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use donezo::analytics::format_count;
use donezo::client::{ClientConfig, DashboardApi, DashboardClient, Session};
use donezo::config::{generate_default_config, Config, LoggingConfig};
use donezo::models::{Product, ProductDraft, User, UserDraft};
use donezo::tracker::TimeTracker;
use donezo::views::{AnalyticsView, OverviewView, ProductsView, UsersView};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "donezo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plan, prioritize, and accomplish your tasks with ease")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/donezo/config.toml or ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dashboard API URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (default: "demo")
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the issued token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// List users
    Users {
        /// Case-insensitive match on name or email
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact status, or "all"
        #[arg(long, default_value = "all")]
        status: String,
        /// Add a user with this name before listing (local only)
        #[arg(long, value_name = "NAME")]
        add: Option<String>,
        /// Email of the added user
        #[arg(long, requires = "add")]
        email: Option<String>,
    },

    /// List products
    Products {
        /// Case-insensitive match on name or category
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact category, or "all"
        #[arg(long, default_value = "all")]
        category: String,
        /// Add a product with this name before listing (local only)
        #[arg(long, value_name = "NAME")]
        add: Option<String>,
        /// Price of the added product
        #[arg(long, requires = "add")]
        price: Option<f64>,
        /// Category of the added product
        #[arg(long, requires = "add")]
        add_category: Option<String>,
    },

    /// Show traffic totals and the views/clicks chart
    Analytics,

    /// Show stat cards, the weekly chart and the team preview
    Overview,

    /// Run the time tracker
    Track {
        /// Stop after this many seconds (Ctrl-C stops early)
        #[arg(short, long, default_value = "10")]
        seconds: u64,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.api.token = Some(token.clone());
    }

    init_logging(&config.logging);
    tracing::debug!(base_url = %config.api.base_url, "Donezo v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Track { seconds } => run_tracker(&config, seconds).await,

        Commands::Login { email, password } => {
            let client = DashboardClient::new(config.api.client_config())?;
            let user = client.login(&email, &password).await?;
            let session = client.session().await;
            println!("Logged in as {}", user.email.as_deref().unwrap_or(&email));
            println!("Token: {}", session.bearer());
            println!("Pass it with --token or DONEZO_TOKEN on later commands.");
        }

        Commands::Users {
            search,
            status,
            add,
            email,
        } => {
            let client = connect(config.api.client_config(), config.api.token.clone())?;
            let mut view = UsersView::users();
            view.load(&client).await;

            if let Some(name) = add {
                let user = view.submit_add(UserDraft {
                    name,
                    email: email.unwrap_or_default(),
                    status: String::new(),
                })?;
                tracing::info!(id = %user.id, "Added user (local only)");
            }

            view.set_search(search);
            view.set_discriminator(status);
            let users: Vec<&User> = view.visible().collect();
            print_records(
                cli.format,
                &["NAME", "EMAIL", "STATUS", "JOINED"],
                &users,
                |u: &User| {
                    vec![
                        u.name.clone(),
                        u.email.clone(),
                        u.status.clone(),
                        u.joined_on().map(|d| d.to_string()).unwrap_or_default(),
                    ]
                },
            )?;
        }

        Commands::Products {
            search,
            category,
            add,
            price,
            add_category,
        } => {
            let client = connect(config.api.client_config(), config.api.token.clone())?;
            let mut view = ProductsView::products();
            view.load(&client).await;

            if let Some(name) = add {
                let product = view.submit_add(ProductDraft {
                    name,
                    category: add_category.unwrap_or_default(),
                    price: price.unwrap_or(0.0),
                })?;
                tracing::info!(id = %product.id, "Added product (local only)");
            }

            view.set_search(search);
            view.set_discriminator(category);
            let products: Vec<&Product> = view.visible().collect();
            print_records(
                cli.format,
                &["NAME", "CATEGORY", "PRICE", "SALES"],
                &products,
                |p: &Product| {
                    vec![
                        p.name.clone(),
                        p.category.clone(),
                        format!("${}", p.price),
                        format!("{} units", format_count(p.sales)),
                    ]
                },
            )?;
        }

        Commands::Analytics => {
            let client = connect(config.api.client_config(), config.api.token.clone())?;
            let mut view = AnalyticsView::new();
            view.load(&client).await;

            let totals = view.totals();
            match cli.format {
                OutputFormat::Json => {
                    let out = serde_json::json!({ "totals": totals, "chart": view.chart() });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                OutputFormat::Csv => write_csv(view.points())?,
                OutputFormat::Table => {
                    println!("Total Views:      {}", format_count(totals.views));
                    println!("Total Clicks:     {}", format_count(totals.clicks));
                    println!("Conversions:      {}", format_count(totals.conversions));
                    println!("Conversion Rate:  {}", totals.conversion_rate_display());
                    println!();
                    for bar in view.chart() {
                        println!(
                            "{:<4} views  {}\n     clicks {}",
                            bar.label,
                            gauge(bar.views_height),
                            gauge(bar.clicks_height)
                        );
                    }
                }
            }
        }

        Commands::Overview => {
            let client = connect(config.api.client_config(), config.api.token.clone())?;
            let mut view = OverviewView::with_tracker(TimeTracker::with_tick(config.tracker.tick()));
            view.load(&client).await;

            match cli.format {
                OutputFormat::Json | OutputFormat::Csv => {
                    let out = serde_json::json!({
                        "stats": view.stat_cards(),
                        "chart": view.chart(),
                        "team": view.team(),
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                OutputFormat::Table => {
                    if view.dashboard().is_none() {
                        println!("No dashboard data available.");
                        return Ok(());
                    }
                    for card in view.stat_cards() {
                        println!("{:<14} {}", card.title, card.value);
                    }
                    println!();
                    for bar in view.chart() {
                        let marker = if bar.highlighted { '*' } else { ' ' };
                        println!("{}{} {}", bar.label, marker, gauge(bar.height));
                    }
                    println!();
                    for member in view.team() {
                        println!(
                            "{:<24} {:<52} {}",
                            member.user.name, member.task, member.status
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("donezo={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn connect(config: ClientConfig, token: Option<String>) -> anyhow::Result<DashboardClient> {
    let session = token.map(Session::with_token).unwrap_or_default();
    Ok(DashboardClient::with_session(config, session)?)
}

async fn run_tracker(config: &Config, seconds: u64) {
    let mut tracker = TimeTracker::with_tick(config.tracker.tick());
    tracker.toggle();
    println!("{}", tracker.display());

    // Subscribed after the toggle, so only ticks show up as changes
    let mut watch = tracker.subscribe();

    loop {
        tokio::select! {
            state = watch.changed() => match state {
                Some(state) if state.running => {
                    println!("{}", state.display());
                    if state.elapsed_seconds >= seconds {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    let state = tracker.shutdown();
    println!("Tracked {}", state.display());
}

fn print_records<R: Serialize>(
    format: OutputFormat,
    headers: &[&str],
    records: &[&R],
    row: impl Fn(&R) -> Vec<String>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => write_csv(records)?,
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = records.iter().map(|r| row(r)).collect();
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    rows.iter()
                        .map(|r| r[i].chars().count())
                        .chain(std::iter::once(h.len()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let line = |cells: Vec<String>| {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| format!("{:<width$}", c, width = w))
                    .collect::<Vec<_>>()
                    .join("  ")
            };

            println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
            for r in rows {
                println!("{}", line(r));
            }
            println!("\n{} record(s)", records.len());
        }
    }
    Ok(())
}

fn write_csv<R: Serialize>(records: &[R]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Horizontal bar for a 0-100 percentage
fn gauge(pct: f64) -> String {
    let filled = (pct / 5.0).round() as usize;
    format!("{:<20} {:>5.1}%", "█".repeat(filled), pct)
}
