use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "freightcalc")]
#[command(about = "Freight trip profitability calculator")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Override the log level (e.g. debug).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a session (password is never read from CLI).
    Login { username: String },
    Logout,
    /// Show the logged-in principal.
    Whoami,
    /// List tax residencies and their rates.
    Taxes,
    /// Price a trip without saving it.
    Calc(TripArgs),
    /// Price a trip and append it to the history.
    Save(SaveArgs),
    /// List saved trips, optionally within a date range.
    History(HistoryArgs),
    /// Show a saved trip recomputed with current rules.
    Show { id: String },
    Delete { id: String },
    Rate(Rate),
    Users(Users),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TripArgs {
    /// Trip distance in km.
    #[arg(long, short)]
    pub distance: Option<f64>,
    /// Flat freight amount.
    #[arg(long, conflicts_with = "rate_per_km")]
    pub freight: Option<f64>,
    /// Revenue per km instead of a flat amount.
    #[arg(long)]
    pub rate_per_km: Option<f64>,
    /// Revenue is in EUR.
    #[arg(long)]
    pub euro: bool,
    /// Fuel consumption, l/100km.
    #[arg(long)]
    pub consumption: Option<f64>,
    /// Fuel price per liter.
    #[arg(long)]
    pub fuel_price: Option<f64>,
    /// Toll cost per km.
    #[arg(long)]
    pub toll: Option<f64>,
    /// Service cost per km.
    #[arg(long)]
    pub service: Option<f64>,
    /// Tax residency (e.g. Polska, Niemcy).
    #[arg(long)]
    pub tax: Option<String>,
    /// EUR -> PLN rate for this trip only.
    #[arg(long)]
    pub exchange_rate: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    #[command(flatten)]
    pub trip: TripArgs,
    /// Logical trip date (YYYY-MM-DD); defaults to today's UTC date.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// First day included (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<String>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<String>,
    /// Also write the listed trips to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct Rate {
    #[command(subcommand)]
    pub command: RateCommand,
}

#[derive(Subcommand, Debug)]
pub enum RateCommand {
    Show,
    /// Fetch the current EUR mid rate.
    Refresh,
    Set { rate: f64 },
}

#[derive(Args, Debug)]
pub struct Users {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    Create {
        username: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    Delete { username: String },
}
