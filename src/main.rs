use chrono::{Local, NaiveDate};
use clap::Parser;
use flat_groups::config::Command;
use flat_groups::core::report::write_group_report;
use flat_groups::core::stats::PaymentFilter;
use flat_groups::domain::model::parse_month;
use flat_groups::domain::model::{GroupView, Overview};
use flat_groups::utils::error::ErrorSeverity;
use flat_groups::utils::{logger, validation::Validate};
use flat_groups::{
    AppConfig, CliConfig, FlatNumber, GroupError, GroupService, JsonFileStore, Payment,
    PaymentMode, Result, StatusFilter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(config.logging.verbose, config.logging.json);
    tracing::info!("Starting flat-groups");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.store.path);
    let service = GroupService::from_config(store, config);

    match command {
        Command::Seed => {
            let seeded = service.seed().await?;
            println!(
                "✅ Seeded {} flats and {} payments",
                seeded.flats, seeded.payments
            );
        }
        Command::AddFlat { flat_number } => {
            let flat = service.create_flat(&flat_number).await?;
            if flat.connected_flats.is_empty() {
                println!("✅ Flat {} created in a new group", flat.flat_number);
            } else {
                println!(
                    "✅ Flat {} created, connected to {}",
                    flat.flat_number,
                    labels(&flat.connected_flats)
                );
            }
        }
        Command::Connect { source, targets } => {
            let written = service.connect_flats(&source, &targets).await?;
            for flat in written {
                println!("{} -> {}", flat.flat_number, labels(&flat.connected_flats));
            }
        }
        Command::Group {
            flat_number,
            period,
        } => {
            let view = service.group_view(&flat_number, period.resolve()?).await?;
            print_group(&view);
        }
        Command::Overview {
            period,
            filter,
            search,
            json,
        } => {
            let filter: StatusFilter = filter.parse()?;
            let overview = service
                .overview(period.resolve()?, filter, search.as_deref())
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print_overview(&overview);
            }
        }
        Command::Pay {
            flat_number,
            month,
            year,
            amount,
            mode,
            paid_on,
        } => {
            let today = Local::now().date_naive();
            let period = flat_groups::config::PeriodArgs {
                month: Some(month),
                year,
            }
            .resolve()?;
            let paid_on = match paid_on {
                Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                    GroupError::validation(format!("Invalid payment date '{}': {}", raw, e))
                })?,
                None => today,
            };
            let mode: PaymentMode = mode.parse()?;
            let payment = Payment::new(
                FlatNumber::parse(&flat_number)?,
                period,
                amount.unwrap_or(service.default_amount()),
                mode,
                paid_on,
            )?;
            let payment = service.record_payment(payment).await?;
            println!(
                "✅ Recorded ₹{} ({}) for flat {}, {} {}",
                payment.amount, payment.payment_mode, payment.flat_number, payment.month, payment.year
            );
        }
        Command::Payments {
            flat_number,
            month,
            year,
        } => {
            let filter = PaymentFilter {
                flat_number: flat_number.as_deref().map(FlatNumber::parse).transpose()?,
                month: month.as_deref().map(parse_month).transpose()?,
                year,
            };
            let payments = service.payments(&filter).await?;
            if payments.is_empty() {
                println!("No payment history found");
            }
            for p in payments {
                println!(
                    "{:<8} {:<10} {:<5} ₹{:<7} {} {}",
                    p.flat_number, p.month, p.year, p.amount, p.paid_on, p.payment_mode
                );
            }
        }
        Command::DeletePayment {
            flat_number,
            month,
            year,
        } => {
            let period = flat_groups::config::PeriodArgs {
                month: Some(month),
                year,
            }
            .resolve()?;
            let payment = service.delete_payment(&flat_number, period).await?;
            println!(
                "🗑️  Deleted ₹{} payment of flat {} for {} {}",
                payment.amount, payment.flat_number, payment.month, payment.year
            );
        }
        Command::Audit => {
            let issues = service.audit().await?;
            if issues.is_empty() {
                println!("✅ No adjacency issues");
            }
            for issue in issues {
                println!("⚠️  {}", issue);
            }
        }
        Command::Export { output, period } => {
            let overview = service
                .overview(period.resolve()?, StatusFilter::All, None)
                .await?;
            let file = std::fs::File::create(&output)?;
            write_group_report(file, &overview)?;
            println!("📁 Group report saved to: {}", output);
        }
    }

    Ok(())
}

fn labels(flats: &[FlatNumber]) -> String {
    flats
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_group(view: &GroupView) {
    println!("Flat {} ({})", view.flat, view.period);
    println!("  Total paid:           ₹{}", view.total_paid);
    println!("  Total flats in group: {}", view.stats.total);
    println!("  Paid this month:      {}", view.stats.paid);
    println!("  Pending dues:         {}", view.stats.due);
    if !view.connected.is_empty() {
        println!("  Connected flats:      {}", labels(&view.connected));
    }
}

fn print_overview(overview: &Overview) {
    println!(
        "{}: {} flats, {} paid, {} due",
        overview.period, overview.summary.total, overview.summary.paid, overview.summary.due
    );
    for group in &overview.groups {
        println!(
            "Group {}: {} (paid {}, due {})",
            group.index,
            labels(&group.members),
            group.stats.paid,
            group.stats.due
        );
    }
    for flat in &overview.flats {
        println!(
            "  {:<8} group {:<3} {}",
            flat.flat_number,
            flat.group,
            if flat.paid { "paid" } else { "due" }
        );
    }
}
