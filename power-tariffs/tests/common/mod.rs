use std::{
    collections::HashMap,
    fs::{read_dir, File},
    path::PathBuf,
};

use power_tariffs::{
    model::PriceModel,
    pricer::Pricer,
    series::{UsageRecord, UsageSeries},
    types::{
        electricity::{Kw, Kwh},
        money::Money,
    },
    Error,
};

pub struct JsonCase {
    pub path: PathBuf,
    pub model: PriceModel,
    pub readings: Vec<UsageRecord>,
    pub expected: Expected,
}

/// The values a fixture directory expects the pricer to produce.
#[derive(serde::Deserialize)]
pub struct Expected {
    pub total_energy: Kwh,
    pub fixed_fee: Money,
    /// Line cost per usage-fee name.
    pub usage: HashMap<String, Money>,
    /// Average top peak per demand-tariff name.
    pub peaks: HashMap<String, Kw>,
    pub subtotal: Money,
    pub vat: Money,
    pub total: Money,
}

pub fn collect_json_cases() -> Result<Vec<JsonCase>, Box<dyn std::error::Error>> {
    let mut cases = Vec::new();

    for case_dir in read_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))? {
        let case_dir_path = case_dir?.path();

        if !case_dir_path.is_dir() {
            continue;
        }

        let model = serde_json::from_reader(File::open(case_dir_path.join("model.json"))?)?;
        let readings = serde_json::from_reader(File::open(case_dir_path.join("readings.json"))?)?;
        let expected = serde_json::from_reader(File::open(case_dir_path.join("expected.json"))?)?;

        cases.push(JsonCase {
            path: case_dir_path,
            model,
            readings,
            expected,
        });
    }

    Ok(cases)
}

pub fn validate_case(case: &JsonCase) -> Result<(), Error> {
    let pricer = Pricer::new(&case.model, UsageSeries::new(case.readings.clone()))?;
    let report = pricer.build_report();
    let expected = &case.expected;

    assert_eq!(report.total_energy, expected.total_energy, "total_energy");
    assert_eq!(report.fixed_fee, expected.fixed_fee, "fixed_fee");

    assert_eq!(
        report.usage_lines.len(),
        expected.usage.len(),
        "number of usage lines"
    );
    for line in &report.usage_lines {
        let expected_cost = expected
            .usage
            .get(&line.name)
            .unwrap_or_else(|| panic!("unexpected usage line `{}`", line.name));
        assert_eq!(
            &line.cost, expected_cost,
            "cost of usage fee `{}`",
            line.name
        );
    }

    assert_eq!(
        report.demand_lines.len(),
        expected.peaks.len(),
        "number of demand lines"
    );
    for line in &report.demand_lines {
        let expected_peak = expected
            .peaks
            .get(&line.name)
            .unwrap_or_else(|| panic!("unexpected demand line `{}`", line.name));
        assert_eq!(
            &line.peak_average, expected_peak,
            "average peak of tariff `{}`",
            line.name
        );

        let lookup = pricer
            .average_peak(&line.name)
            .expect("tariff should be addressable by name");
        assert_eq!(&lookup, expected_peak, "lookup of tariff `{}`", line.name);
    }

    assert_eq!(report.subtotal, expected.subtotal, "subtotal");
    assert_eq!(report.vat, expected.vat, "vat");
    assert_eq!(report.total, expected.total, "total");

    Ok(())
}
