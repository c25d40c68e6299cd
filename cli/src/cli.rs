use std::{borrow::Cow, fs::File, io::stdin, path::PathBuf, process::exit};

use clap::{Args, Parser, Subcommand};
use console::style;
use power_tariffs::{
    explain,
    model::PriceModel,
    pricer::{Pricer, Report},
    series::UsageSeries,
};
use tabled::{settings::Style, Table, Tabled};

use crate::{error::Error, ingest, Result};

#[derive(Debug, Parser)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) {
        if let Err(err) = self.command.run() {
            eprintln!("{err}");
            exit(1);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the itemized bill for a usage series priced with a model.
    ///
    /// This command will show the fixed fee, every usage fee and demand
    /// tariff line, VAT and the total.
    Bill(Bill),
    /// Show the daily peaks a demand tariff bills over.
    ///
    /// This command will show, per tariff, the peak of every qualifying day
    /// and which of them enter the billed average.
    Peaks(Peaks),
    /// Describe the rules of a price model in words.
    Explain(Explain),
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::Bill(args) => args.run(),
            Self::Peaks(args) => args.run(),
            Self::Explain(args) => args.run(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    /// A path to the price model in json format.
    #[arg(short = 'm', long)]
    model: PathBuf,

    /// A path to the usage series in csv format.
    ///
    /// If no path is provided the series is read from standard in.
    #[arg(short = 'u', long)]
    usage: Option<PathBuf>,

    /// Restrict the series to one calendar month, for example `2025-01`.
    #[arg(long)]
    month: Option<String>,

    /// Minimum number of rows the series must contain.
    #[arg(long, default_value_t = ingest::DEFAULT_MIN_ROWS)]
    min_rows: usize,
}

impl ModelArgs {
    fn usage_name(&self) -> Cow<'_, str> {
        self.usage.as_ref().map_or("<stdin>".into(), |path| {
            path.file_name().unwrap().to_string_lossy()
        })
    }

    fn load_model(&self) -> Result<PriceModel> {
        let file =
            File::open(&self.model).map_err(|e| Error::file(self.model.clone(), e))?;
        serde_json::from_reader(&file)
            .map_err(|e| Error::deserialize(self.model.display(), "price model", e))
    }

    fn load_all(&self) -> Result<(PriceModel, UsageSeries)> {
        let model = self.load_model()?;

        let records = if let Some(path) = &self.usage {
            let file = File::open(path).map_err(|e| Error::file(path.clone(), e))?;
            ingest::read_usage_csv(file, self.min_rows)?
        } else {
            ingest::read_usage_csv(stdin().lock(), self.min_rows)?
        };

        let mut series = UsageSeries::new(records);

        if let Some(month) = &self.month {
            let (year, month) = parse_month(month)?;
            if !series.complete_months().contains(&(year, month)) {
                eprintln!(
                    "{} the series does not cover {year}-{month:02} in full",
                    style("warning:").yellow()
                );
            }
            series = series.select_month(year, month);
        }

        Ok((model, series))
    }
}

fn parse_month(value: &str) -> Result<(i32, u32)> {
    let parsed = value
        .split_once('-')
        .and_then(|(year, month)| Some((year.parse().ok()?, month.parse().ok()?)))
        .filter(|&(_, month)| (1..=12).contains(&month));

    parsed.ok_or_else(|| Error::MonthFormat(value.to_string()))
}

#[derive(Debug, Parser)]
pub struct Bill {
    #[command(flatten)]
    args: ModelArgs,

    /// Print the report as json instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BillRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl Bill {
    fn run(self) -> Result<()> {
        let (model, series) = self.args.load_all()?;
        let pricer = Pricer::new(&model, series)?;
        let report = pricer.build_report();

        if self.json {
            let json = serde_json::to_string_pretty(&report).map_err(Error::Serialize)?;
            println!("{json}");
            return Ok(());
        }

        println!(
            "{} `{}` priced with `{}` ({} kWh metered)",
            style("Billing").green(),
            self.args.usage_name(),
            model.name,
            report.total_energy,
        );

        println!("{}", Table::new(bill_rows(&report)).with(Style::modern()));

        Ok(())
    }
}

fn bill_rows(report: &Report) -> Vec<BillRow> {
    let currency = &report.currency;
    let mut rows = vec![BillRow {
        item: "Fixed fee".to_string(),
        amount: format!("{} {currency}", report.fixed_fee),
    }];

    for line in &report.usage_lines {
        // lines that matched no readings are part of the subtotal but not
        // worth a row
        if line.energy.is_zero() {
            continue;
        }

        rows.push(BillRow {
            item: format!(
                "{} ({} kWh × {} {currency}/kWh)",
                line.name, line.energy, line.rate
            ),
            amount: format!("{} {currency}", line.cost),
        });
    }

    for line in &report.demand_lines {
        rows.push(BillRow {
            item: format!(
                "{} ({} kW × {} {currency}/kW, top {} peaks)",
                line.name, line.peak_average, line.rate, line.top_peaks
            ),
            amount: format!("{} {currency}", line.cost),
        });
    }

    rows.push(BillRow {
        item: format!("VAT ({}%)", report.vat_rate.percentage()),
        amount: format!("{} {currency}", report.vat),
    });

    rows.push(BillRow {
        item: "Total".to_string(),
        amount: format!("{} {currency}", report.total),
    });

    rows
}

#[derive(Debug, Parser)]
pub struct Peaks {
    #[command(flatten)]
    args: ModelArgs,
}

#[derive(Debug, Tabled)]
struct PeakRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Peak (kW)")]
    peak: String,
    #[tabled(rename = "Averaged")]
    averaged: String,
}

impl Peaks {
    fn run(self) -> Result<()> {
        let (model, series) = self.args.load_all()?;
        let pricer = Pricer::new(&model, series)?;

        for tariff in pricer.tariffs() {
            let mut peaks = tariff.daily_peaks(pricer.series());
            peaks.sort_by(|a, b| b.1.cmp(&a.1));

            println!(
                "\n{} `{}`: average of the top {} peaks is {} kW",
                style("Tariff").green(),
                tariff.name,
                tariff.top_peaks,
                tariff.average_top_peaks(pricer.series()),
            );

            let rows: Vec<PeakRow> = peaks
                .iter()
                .enumerate()
                .map(|(index, (date, peak))| PeakRow {
                    date: date.to_string(),
                    peak: peak.to_string(),
                    averaged: if index < tariff.top_peaks { "yes" } else { "" }.to_string(),
                })
                .collect();

            println!("{}", Table::new(rows).with(Style::modern()));
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Explain {
    /// A path to the price model in json format.
    #[arg(short = 'm', long)]
    model: PathBuf,
}

impl Explain {
    fn run(self) -> Result<()> {
        let file = File::open(&self.model).map_err(|e| Error::file(self.model.clone(), e))?;
        let model: PriceModel = serde_json::from_reader(&file)
            .map_err(|e| Error::deserialize(self.model.display(), "price model", e))?;
        model.validate()?;

        let explained = explain::explain(&model);
        let currency = &model.currency;

        println!("{} `{}`", style("Model").green(), model.name);
        println!(
            "  VAT {}%, {}",
            model.vat_rate.percentage(),
            if model.prices_include_vat {
                "included in the configured rates"
            } else {
                "added on top of the configured rates"
            }
        );
        println!(
            "  Fixed fee: {} {currency}/month",
            explained.fixed_fee_per_month
        );

        if !explained.usage_fees.is_empty() {
            println!("\n{}", style("Usage fees").green());
            for rule in &explained.usage_fees {
                println!(
                    "  {}: {} {currency}/kWh{}",
                    rule.name,
                    rule.rate,
                    conditions(&rule.conditions)
                );
            }
        }

        if !explained.power_tariffs.is_empty() {
            println!("\n{}", style("Power tariffs").green());
            for rule in &explained.power_tariffs {
                println!(
                    "  {}: {} {currency}/kW{}",
                    rule.name,
                    rule.rate,
                    conditions(&rule.conditions)
                );
            }
        }

        Ok(())
    }
}

fn conditions(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(", {}", conditions.join(", "))
    }
}
