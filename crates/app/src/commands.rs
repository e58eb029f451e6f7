use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use engine::{
    BlobStore, CalculationResults, Currency, DateRange, Engine, EngineError, ExchangeRate,
    Revenue, Role, TaxTable, TripInputs, TripRecord,
};

use crate::{
    cli::{Command, HistoryArgs, RateCommand, SaveArgs, TripArgs, UserCommand},
    error::Result,
    export, format, prompt,
    rates::{NbpRateProvider, WithTimeout},
    settings::{Settings, TripDefaults},
};

pub async fn run<S: BlobStore + Clone>(
    command: Command,
    engine: &mut Engine<S>,
    settings: &Settings,
) -> Result<()> {
    match command {
        Command::Login { username } => {
            let password = prompt::password("Password: ")?;
            let principal = engine.login(&username, &password)?;
            println!("logged in as {} ({})", principal.username, principal.role);
        }
        Command::Logout => {
            engine.logout()?;
            println!("logged out");
        }
        Command::Whoami => match engine.current_principal()? {
            Some(principal) => println!("{} ({})", principal.username, principal.role),
            None => println!("not logged in"),
        },
        Command::Taxes => {
            for (name, tax) in engine.tax_table().iter() {
                println!("{} {name:<10} {}", tax.flag, format::percent(tax.rate));
            }
        }
        Command::Calc(args) => {
            let inputs = trip_inputs(
                &args,
                &settings.defaults,
                engine.tax_table(),
                engine.exchange_rate(),
            )?;
            let results = engine.calculate(&inputs)?;
            print_results(&inputs, &results);
        }
        Command::Save(SaveArgs { trip, date }) => {
            let inputs = trip_inputs(
                &trip,
                &settings.defaults,
                engine.tax_table(),
                engine.exchange_rate(),
            )?;
            let now = Utc::now();
            let trip_date = resolve_trip_date(date.as_deref(), now)?;
            let record = engine.save_trip(inputs, Some(trip_date), now)?;
            println!(
                "saved trip {} ({}): {}",
                record.id,
                record.effective_date(),
                record_profit(&record)
            );
        }
        Command::History(args) => history(engine, &args)?,
        Command::Show { id } => {
            let record = engine.load_trip(&id)?;
            let results = engine.calculate(&record.inputs)?;
            println!("trip {} ({})", record.id, record.effective_date());
            print_results(&record.inputs, &results);
            println!("saved net profit: {}", record_profit(&record));
        }
        Command::Delete { id } => {
            if engine.delete_trip(&id)? {
                println!("deleted trip {id}");
            } else {
                eprintln!("trip not found: {id}");
                std::process::exit(1);
            }
        }
        Command::Rate(rate) => match rate.command {
            RateCommand::Show => println!("1 EUR = {} PLN", engine.exchange_rate()),
            RateCommand::Refresh => {
                let provider = WithTimeout::new(
                    NbpRateProvider::new(&settings.rate.base_url)?,
                    Duration::from_secs(settings.rate.timeout_secs),
                );
                match engine.refresh_rate(&provider).await {
                    Ok(rate) => println!("1 EUR = {rate} PLN"),
                    Err(EngineError::RateUnavailable { retained, reason }) => {
                        eprintln!("rate refresh failed ({reason}), keeping 1 EUR = {retained} PLN");
                        std::process::exit(1);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            RateCommand::Set { rate } => {
                let rate = ExchangeRate::new(rate)?;
                engine.set_exchange_rate(rate)?;
                println!("1 EUR = {rate} PLN");
            }
        },
        Command::Users(users) => match users.command {
            UserCommand::List => {
                for principal in engine.list_principals()? {
                    println!("{} ({})", principal.username, principal.role);
                }
            }
            UserCommand::Create { username, role } => {
                let role = Role::try_from(role.as_str())?;
                let password = prompt::new_password()?;
                let principal = engine.create_principal(&username, &password, role)?;
                println!("created user: {} ({})", principal.username, principal.role);
            }
            UserCommand::Delete { username } => {
                engine.delete_principal(&username)?;
                println!("deleted user: {username}");
            }
        },
    }
    Ok(())
}

fn history<S: BlobStore + Clone>(engine: &Engine<S>, args: &HistoryArgs) -> Result<()> {
    let range = DateRange::parse(args.from.as_deref(), args.to.as_deref())?;
    let (records, summary) = engine.history(&range)?;
    for record in &records {
        println!(
            "{}  {:>14}  {:>8.0} km  {:>16}  {}",
            record.effective_date(),
            record.id,
            record.inputs.distance_km,
            record_profit(record),
            record.inputs.tax_residency
        );
    }
    println!(
        "{} trips, {:.0} km, net profit {}",
        summary.trip_count,
        summary.total_distance_km,
        format::money(summary.total_profit, Currency::BASE, engine.exchange_rate())
    );
    if let Some(path) = &args.csv {
        export::write_history_csv(path, &records)?;
    }
    Ok(())
}

/// Saved profit in the currency the trip was displayed in.
fn record_profit(record: &TripRecord) -> String {
    format::money(
        record.summary.total_net_profit,
        record.summary.currency,
        record.inputs.exchange_rate,
    )
}

/// The `--date` given, or today's UTC date.
fn resolve_trip_date(raw: Option<&str>, now: DateTime<Utc>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(now.date_naive()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(format!("expected YYYY-MM-DD, got {raw}")).into())
}

/// Fills the gaps in `args` from the configured defaults and the held rate.
fn trip_inputs(
    args: &TripArgs,
    defaults: &TripDefaults,
    tax_table: &TaxTable,
    held_rate: ExchangeRate,
) -> Result<TripInputs> {
    let revenue = match args.rate_per_km {
        Some(rate) => Revenue::PerKmRate(rate),
        None => Revenue::FlatAmount(args.freight.unwrap_or(0.0)),
    };
    let exchange_rate = match args.exchange_rate {
        Some(rate) => ExchangeRate::new(rate)?,
        None => held_rate,
    };
    let tax_residency = tax_table.resolve(args.tax.as_deref().unwrap_or(&defaults.tax_residency))?;
    Ok(TripInputs {
        distance_km: args.distance.unwrap_or(0.0),
        revenue,
        is_euro_mode: args.euro,
        exchange_rate,
        fuel_consumption_l_per_100km: args.consumption.unwrap_or(defaults.fuel_consumption),
        fuel_price_per_liter: args.fuel_price.unwrap_or(defaults.fuel_price),
        toll_cost_per_km: args.toll.unwrap_or(defaults.toll_cost),
        service_cost_per_km: args.service.unwrap_or(defaults.service_cost),
        tax_residency: tax_residency.to_string(),
    })
}

fn print_results(inputs: &TripInputs, results: &CalculationResults) {
    let currency = Currency::for_euro_mode(inputs.is_euro_mode);
    let rate = inputs.exchange_rate;
    let money = |amount| format::money(amount, currency, rate);

    println!("revenue           {}", money(results.total_revenue));
    println!("  fuel            {}", money(results.total_fuel_cost));
    println!("  tolls           {}", money(results.total_toll_cost));
    println!("  service         {}", money(results.total_service_cost));
    println!("operational cost  {}", money(results.total_operational_cost));
    println!("before tax        {}", money(results.earnings_before_tax));
    println!(
        "tax ({})         {}",
        inputs.tax_residency,
        money(results.tax_cost)
    );
    println!("net profit        {}", money(results.total_net_profit));
    println!(
        "net profit / km   {}",
        format::per_km(results.net_profit_per_km, currency, rate)
    );
    println!("breakeven price   {}", money(results.suggested_price));
    if !results.is_profitable() {
        println!("this trip runs at a loss");
    }
}
