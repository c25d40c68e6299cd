use serde::Serialize;

use crate::model::PriceModel;
use crate::series::UsageSeries;
use crate::tariff::{DemandTariff, UsageFee};
use crate::types::{
    electricity::{Kw, Kwh},
    money::{Money, VatRate},
};
use crate::Result;

/// Pricer that encapsulates a single price model and a single usage series.
/// To run the pricer call `build_report`. The resulting report contains the
/// itemized lines, the subtotal, VAT and the grand total.
///
/// ```ignore
/// let pricer = Pricer::new(&model, UsageSeries::new(records))?;
/// let report = pricer.build_report();
/// ```
pub struct Pricer {
    currency: String,
    vat_rate: VatRate,
    prices_include_vat: bool,
    fixed_fee_per_month: Money,
    fees: Vec<UsageFee>,
    tariffs: Vec<DemandTariff>,
    series: UsageSeries,
}

impl Pricer {
    /// Compile `model` against `series`.
    ///
    /// The model is validated here: a model that passes makes every later
    /// evaluation total, so this is the only fallible step.
    pub fn new(model: &PriceModel, series: UsageSeries) -> Result<Self> {
        model.validate()?;

        Ok(Self {
            currency: model.currency.clone(),
            vat_rate: model.vat_rate,
            prices_include_vat: model.prices_include_vat,
            fixed_fee_per_month: model.fixed_fee_per_month,
            fees: model.usage_fees.iter().map(UsageFee::new).collect(),
            tariffs: model.power_tariffs.iter().map(DemandTariff::new).collect(),
            series,
        })
    }

    /// The prepared usage series.
    #[must_use]
    pub fn series(&self) -> &UsageSeries {
        &self.series
    }

    /// The compiled demand tariffs, in model order.
    #[must_use]
    pub fn tariffs(&self) -> &[DemandTariff] {
        &self.tariffs
    }

    /// The compiled usage fees, in model order.
    #[must_use]
    pub fn fees(&self) -> &[UsageFee] {
        &self.fees
    }

    /// Total energy matched by the usage fee named `name`.
    #[must_use]
    pub fn total_usage(&self, name: &str) -> Option<Kwh> {
        self.fees
            .iter()
            .find(|fee| fee.name == name)
            .map(|fee| fee.total_usage(&self.series))
    }

    /// Average top peak power for the demand tariff named `name`.
    #[must_use]
    pub fn average_peak(&self, name: &str) -> Option<Kw> {
        self.tariffs
            .iter()
            .find(|tariff| tariff.name == name)
            .map(|tariff| tariff.average_top_peaks(&self.series))
    }

    /// Compose the itemized bill.
    ///
    /// Rates configured inclusive of VAT are scaled back to their pre-tax
    /// value first; rates configured exclusive of VAT are used unchanged.
    /// VAT is then added once over the subtotal. Lines that matched no
    /// readings stay in the report with zero cost and are part of the
    /// subtotal; hiding them is up to the presentation.
    #[must_use]
    pub fn build_report(&self) -> Report {
        let factor = self.vat_rate.pretax_factor(self.prices_include_vat);

        let fixed_fee = self.fixed_fee_per_month * factor;
        let mut subtotal = fixed_fee;

        let mut usage_lines = Vec::with_capacity(self.fees.len());
        for fee in &self.fees {
            let energy = fee.total_usage(&self.series);
            let rate = fee.rate * factor;
            let cost = rate * energy;
            subtotal += cost;

            usage_lines.push(UsageLine {
                name: fee.name.clone(),
                energy,
                rate,
                cost,
            });
        }

        let mut demand_lines = Vec::with_capacity(self.tariffs.len());
        for tariff in &self.tariffs {
            let peak_average = tariff.average_top_peaks(&self.series);
            let rate = tariff.rate * factor;
            let cost = rate * peak_average;
            subtotal += cost;

            demand_lines.push(DemandLine {
                name: tariff.name.clone(),
                peak_average,
                top_peaks: tariff.top_peaks,
                rate,
                cost,
            });
        }

        let vat = self.vat_rate.vat_on(subtotal);

        Report {
            currency: self.currency.clone(),
            vat_rate: self.vat_rate,
            total_energy: self.series.total_energy(),
            fixed_fee,
            usage_lines,
            demand_lines,
            subtotal,
            vat,
            total: subtotal + vat,
        }
    }
}

/// The itemized bill for one usage series priced with one model.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Currency of every amount, taken from the model.
    pub currency: String,
    /// The model's VAT rate, for display.
    pub vat_rate: VatRate,
    /// Total metered energy over the series.
    pub total_energy: Kwh,
    /// The monthly fixed fee, pre-tax.
    pub fixed_fee: Money,
    /// One line per usage fee in model order.
    pub usage_lines: Vec<UsageLine>,
    /// One line per demand tariff in model order.
    pub demand_lines: Vec<DemandLine>,
    /// The fixed fee plus every line, pre-tax.
    pub subtotal: Money,
    /// VAT over the subtotal.
    pub vat: Money,
    /// Grand total including VAT.
    pub total: Money,
}

/// One billed usage fee.
#[derive(Debug, Serialize)]
pub struct UsageLine {
    /// Name of the fee in the model.
    pub name: String,
    /// Metered energy that matched the fee's window.
    pub energy: Kwh,
    /// Effective pre-tax rate per kWh.
    pub rate: Money,
    /// `energy` times `rate`.
    pub cost: Money,
}

/// One billed demand tariff.
#[derive(Debug, Serialize)]
pub struct DemandLine {
    /// Name of the tariff in the model.
    pub name: String,
    /// Average power of the highest daily peaks.
    pub peak_average: Kw,
    /// How many peaks the average was requested over.
    pub top_peaks: usize,
    /// Effective pre-tax rate per kW.
    pub rate: Money,
    /// `peak_average` times `rate`.
    pub cost: Money,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::Pricer;
    use crate::model::PriceModel;
    use crate::series::{UsageRecord, UsageSeries};
    use crate::Error;

    fn record(timestamp: &str, energy: &str) -> UsageRecord {
        UsageRecord {
            timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M").unwrap(),
            energy: energy.parse().unwrap(),
        }
    }

    fn money(value: &str) -> crate::types::money::Money {
        serde_json::from_str(value).unwrap()
    }

    fn kwh(value: &str) -> crate::types::electricity::Kwh {
        value.parse().unwrap()
    }

    /// One hundred kWh spread over four hours on two days.
    fn hundred_kwh() -> Vec<UsageRecord> {
        vec![
            record("2024-03-01 10:00", "20"),
            record("2024-03-01 11:00", "30"),
            record("2024-03-02 10:00", "40"),
            record("2024-03-02 11:00", "10"),
        ]
    }

    fn model(json: &str) -> PriceModel {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn included_vat_is_divided_out_and_added_back() {
        // rate 1.25 incl. 25% VAT is 1.00 pre-tax; 100 kWh bills 100.00
        let model = model(
            r#"{
                "name": "Incl",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": true,
                "fixed_fee_per_month": 0,
                "usage_fees": [{ "name": "Energy", "fee_per_kwh": 1.25 }]
            }"#,
        );

        let pricer = Pricer::new(&model, UsageSeries::new(hundred_kwh())).unwrap();
        let report = pricer.build_report();

        assert_eq!(report.total_energy, kwh("100"));
        assert_eq!(report.usage_lines[0].rate, money("1.0"));
        assert_eq!(report.usage_lines[0].cost, money("100.0"));
        assert_eq!(report.subtotal, money("100.0"));
        assert_eq!(report.vat, money("25.0"));
        assert_eq!(report.total, money("125.0"));
    }

    #[test]
    fn excluded_vat_keeps_the_nominal_rates() {
        let model = model(
            r#"{
                "name": "Excl",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": false,
                "fixed_fee_per_month": 80,
                "usage_fees": [{ "name": "Energy", "fee_per_kwh": 0.5 }]
            }"#,
        );

        let pricer = Pricer::new(&model, UsageSeries::new(hundred_kwh())).unwrap();
        let report = pricer.build_report();

        // nominal rates pass through unscaled
        assert_eq!(report.fixed_fee, money("80"));
        assert_eq!(report.usage_lines[0].rate, money("0.5"));
        assert_eq!(report.usage_lines[0].cost, money("50"));
        assert_eq!(report.subtotal, money("130"));
        assert_eq!(report.vat, money("32.5"));
        assert_eq!(report.total, money("162.5"));
    }

    #[test]
    fn demand_lines_bill_the_average_peak() {
        let model = model(
            r#"{
                "name": "Demand",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": true,
                "fixed_fee_per_month": 0,
                "power_tariffs": [{
                    "name": "Base",
                    "fee_per_kw": 45,
                    "number_of_top_peaks_to_average": 2
                }]
            }"#,
        );

        let pricer = Pricer::new(&model, UsageSeries::new(hundred_kwh())).unwrap();
        let report = pricer.build_report();

        // daily peaks 30 and 40 average to 35, billed at 45 * 0.8 = 36
        assert_eq!(
            pricer.average_peak("Base").unwrap(),
            serde_json::from_str("35").unwrap()
        );
        assert_eq!(report.demand_lines[0].rate, money("36"));
        assert_eq!(report.demand_lines[0].cost, money("1260"));
    }

    #[test]
    fn rules_matching_nothing_stay_in_the_report_at_zero() {
        let model = model(
            r#"{
                "name": "Mismatch",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": true,
                "fixed_fee_per_month": 40,
                "usage_fees": [{
                    "name": "Summer",
                    "fee_per_kwh": 0.5,
                    "time_limits": { "months": [6, 7, 8] }
                }],
                "power_tariffs": [{
                    "name": "Summer peak",
                    "fee_per_kw": 30,
                    "number_of_top_peaks_to_average": 1,
                    "time_limits": { "months": [6, 7, 8] }
                }]
            }"#,
        );

        // all readings are in March
        let pricer = Pricer::new(&model, UsageSeries::new(hundred_kwh())).unwrap();
        let report = pricer.build_report();

        assert_eq!(report.usage_lines.len(), 1);
        assert!(report.usage_lines[0].cost.is_zero());
        assert_eq!(report.demand_lines.len(), 1);
        assert!(report.demand_lines[0].cost.is_zero());

        // subtotal is the fixed fee alone: 40 * 0.8
        assert_eq!(report.subtotal, money("32"));
        assert_eq!(report.vat, money("8"));
        assert_eq!(report.total, money("40"));
    }

    #[test]
    fn lookup_by_unknown_name_is_none() {
        let model = model(
            r#"{
                "name": "Empty",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": true,
                "fixed_fee_per_month": 0
            }"#,
        );

        let pricer = Pricer::new(&model, UsageSeries::default()).unwrap();
        assert!(pricer.total_usage("nope").is_none());
        assert!(pricer.average_peak("nope").is_none());
    }

    #[test]
    fn invalid_model_is_rejected_at_construction() {
        let model = model(
            r#"{
                "name": "Invalid",
                "currency": "SEK",
                "vat_rate": 0.25,
                "prices_include_tax": true,
                "fixed_fee_per_month": 0,
                "power_tariffs": [{
                    "name": "Base",
                    "fee_per_kw": 45,
                    "number_of_top_peaks_to_average": 0
                }]
            }"#,
        );

        assert!(matches!(
            Pricer::new(&model, UsageSeries::default()),
            Err(Error::ZeroTopPeaks { .. })
        ));
    }
}
