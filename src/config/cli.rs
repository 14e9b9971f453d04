use crate::config::toml_config::AppConfig;
use crate::domain::model::{parse_month, BillingPeriod};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "flat-groups")]
#[command(about = "Maintenance payments for groups of connected flats")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the store file from the configuration")]
    pub store: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fill an empty store with the sample building
    Seed,
    /// Create a flat and place it in a group
    AddFlat { flat_number: String },
    /// Link a flat to one or more flats in both directions
    Connect {
        source: String,
        #[arg(value_delimiter = ',', num_args = 1.., required = true)]
        targets: Vec<String>,
    },
    /// Show a flat's group and its payment status
    Group {
        flat_number: String,
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Collection totals and every group
    Overview {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value = "all", help = "all, paid or due")]
        filter: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, help = "Print the overview as JSON")]
        json: bool,
    },
    /// Record a maintenance payment
    Pay {
        flat_number: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        amount: Option<u32>,
        #[arg(long, default_value = "UPI")]
        mode: String,
        #[arg(long, help = "Payment date as YYYY-MM-DD, defaults to today")]
        paid_on: Option<String>,
    },
    /// List payments, optionally for one flat, month or year
    Payments {
        flat_number: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Remove a recorded payment
    DeletePayment {
        flat_number: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Report asymmetric, dangling and oversized links
    Audit,
    /// Write the group overview as CSV
    Export {
        output: String,
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    #[arg(long, help = "Billing month, defaults to the current month")]
    pub month: Option<String>,
    #[arg(long, help = "Billing year, defaults to the current year")]
    pub year: Option<i32>,
}

impl PeriodArgs {
    pub fn resolve(&self) -> Result<BillingPeriod> {
        let current = BillingPeriod::current();
        let month = match &self.month {
            Some(month) => parse_month(month)?,
            None => current.month,
        };
        Ok(BillingPeriod::new(month, self.year.unwrap_or(current.year)))
    }
}

impl CliConfig {
    /// Configuration file with command line overrides applied.
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(store) = &self.store {
            config.store.path = store.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.json = true;
        }

        Ok(config)
    }
}
