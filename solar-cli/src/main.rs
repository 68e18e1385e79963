use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use solar_cli::app::{self, MapReport, Services};
use solar_cli::config::{Overrides, SolarConfig};
use solar_cli::logging::init_logging;
use solar_cli::render;
use solar_cli::utils::parse_decimal;
use solar_core::calculations::MapViewMode;
use solar_core::contact_form::SUBMIT_SUCCESS_MESSAGE;
use solar_core::session::guard::LOGIN_PATH;
use solar_core::{
    ContactForm, ContactSubmitter, DashboardView, EstimateInput, Guarded, LoginCredentials,
    SubsidyPolicy,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Rooftop solar savings estimates and admin tools for the sales site.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Configuration file. Defaults to `solar.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the site's API, e.g. `https://api.example.in/api`.
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Session store backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    store_backend: Option<String>,

    /// Session store location. For SQLite a file path or `:memory:`.
    #[arg(long = "store", global = true)]
    store_path: Option<String>,

    /// Subsidy rule: `flat`, `capped`, or `capped:<fraction>`.
    #[arg(long, global = true)]
    subsidy_policy: Option<SubsidyPolicy>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate system size, cost, subsidy and savings.
    Estimate {
        /// Monthly electricity bill in rupees.
        #[arg(long, value_parser = parse_decimal)]
        bill: Decimal,

        /// Usable roof area in square feet.
        #[arg(long, value_parser = parse_decimal)]
        roof_area: Decimal,

        /// Region id, see `solar regions`.
        #[arg(long, default_value = "maharashtra")]
        region: String,

        /// Use the figures as given instead of the calculator's ranges.
        #[arg(long)]
        no_clamp: bool,

        #[arg(long)]
        json: bool,
    },

    /// List regions with their tariff and subsidy ceiling.
    Regions {
        #[arg(long)]
        json: bool,
    },

    /// Solar potential per city.
    Map {
        #[arg(long, default_value = "irradiance")]
        mode: MapViewMode,

        #[arg(long)]
        json: bool,
    },

    /// Sign in as admin and keep the session for later commands.
    Login {
        #[arg(long)]
        email: String,

        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session.
    Logout,

    /// Show whether an admin session is held.
    Status,

    /// Contact submissions with summary counters. Requires a session.
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Send a message through the contact form.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        message: String,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend_url: self.backend_url.clone(),
            store_backend: self.store_backend.clone(),
            store_path: self.store_path.clone(),
            subsidy_policy: self.subsidy_policy,
            log_file: self.log_file.clone(),
        }
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("cannot read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── commands ────────────────────────────────────────────────────────────────

async fn run(cli: Cli, config: SolarConfig) -> Result<()> {
    match cli.command {
        Command::Estimate {
            bill,
            roof_area,
            region,
            no_clamp,
            json,
        } => {
            let data = app::load_reference_data(&config)?;
            let input = EstimateInput::new(bill, roof_area, region.trim().to_lowercase());
            let report = app::run_estimate(&data, &config.estimator, input, !no_clamp)?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::render_estimate(&report));
            }
        }

        Command::Regions { json } => {
            let data = app::load_reference_data(&config)?;
            if json {
                print_json(&data.tariffs.iter().collect::<Vec<_>>())?;
            } else {
                print!("{}", render::render_regions(&data.tariffs));
            }
        }

        Command::Map { mode, json } => {
            let data = app::load_reference_data(&config)?;
            let report = MapReport::build(&data.cities, mode);
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::render_map(&report));
            }
        }

        Command::Login { email, password } => {
            let services = Services::http(&config)?;
            let gate = app::open_gate(&config, &app::build_registry(), services.auth).await?;
            app::ensure_signed_out(&gate.state())?;

            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };

            match gate.login(&LoginCredentials::new(email, password)).await {
                Ok(identity) => println!("Signed in as {}", identity.email),
                Err(error) => bail!("{} ({error})", error.user_message()),
            }
        }

        Command::Logout => {
            let services = Services::http(&config)?;
            let gate = app::open_gate(&config, &app::build_registry(), services.auth).await?;
            let outcome = gate.logout().await?;
            if outcome.backend_acknowledged {
                println!("Signed out.");
            } else {
                println!("Signed out locally; the server did not confirm.");
            }
        }

        Command::Status => {
            let services = Services::http(&config)?;
            let gate = app::open_gate(&config, &app::build_registry(), services.auth).await?;
            println!("{}", render::render_state(&gate.state()));
        }

        Command::Dashboard { json } => {
            let services = Services::http(&config)?;
            let gate = app::open_gate(&config, &app::build_registry(), services.auth).await?;

            let view = DashboardView::build(&gate, services.contacts.as_ref(), &Local::now()).await;
            match view {
                Ok(Guarded::Rendered(view)) if json => print_json(&view)?,
                Ok(Guarded::Rendered(view)) => print!("{}", render::render_dashboard(&view)),
                Ok(Guarded::Loading) => println!("Signing in, try again shortly."),
                Ok(Guarded::Redirect(path)) => {
                    bail!("not signed in; run `solar login` ({path})")
                }
                Err(error) if error.requires_login() => {
                    bail!("{} Run `solar login` ({LOGIN_PATH}).", error.user_message())
                }
                Err(error) => bail!("{} ({error})", error.user_message()),
            }
        }

        Command::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let services = Services::http(&config)?;
            let submitter = ContactSubmitter::new(services.contacts);
            let form = ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            };
            match submitter.submit(&form).await {
                Ok(()) => println!("{SUBMIT_SUCCESS_MESSAGE}"),
                Err(error) => bail!(error.user_message()),
            }
        }
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SolarConfig::resolve(cli.config.as_deref(), cli.overrides())
        .context("failed to load configuration")?;
    init_logging("info", config.log_file.as_deref())?;
    debug!(store = %config.store.backend, "configuration resolved");

    run(cli, config).await
}
