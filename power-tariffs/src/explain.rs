use crate::model::{PowerTariff, PriceModel, Reduction, TimeLimits, UsageFee};
use crate::types::money::Money;

/// A price model turned into human readable rule descriptions.
#[derive(Debug)]
pub struct Explain {
    /// The monthly fixed fee as configured.
    pub fixed_fee_per_month: Money,
    /// One entry per usage fee.
    pub usage_fees: Vec<ExplainRule>,
    /// One entry per demand tariff.
    pub power_tariffs: Vec<ExplainRule>,
}

/// A single fee or tariff described in words.
#[derive(Debug)]
pub struct ExplainRule {
    /// Name of the rule in the model.
    pub name: String,
    /// The configured rate, before any VAT correction.
    pub rate: Money,
    /// When and how the rule applies, one clause per condition.
    pub conditions: Vec<String>,
}

/// Describe every rule of the given model.
pub fn explain(model: &PriceModel) -> Explain {
    Explain {
        fixed_fee_per_month: model.fixed_fee_per_month,
        usage_fees: model.usage_fees.iter().map(explain_usage_fee).collect(),
        power_tariffs: model.power_tariffs.iter().map(explain_power_tariff).collect(),
    }
}

fn explain_usage_fee(fee: &UsageFee) -> ExplainRule {
    let mut conditions = Vec::new();

    if let Some(limits) = &fee.time_limits {
        explain_limits(limits, &mut conditions);
    }

    ExplainRule {
        name: fee.name.clone(),
        rate: fee.fee_per_kwh,
        conditions,
    }
}

fn explain_power_tariff(tariff: &PowerTariff) -> ExplainRule {
    let mut conditions = vec![if tariff.number_of_top_peaks_to_average == 1 {
        "the highest daily peak".to_string()
    } else {
        format!(
            "average of the {} highest daily peaks",
            tariff.number_of_top_peaks_to_average
        )
    }];

    if let Some(limits) = &tariff.time_limits {
        explain_limits(limits, &mut conditions);
    }

    if let Some(reduction) = &tariff.reduction {
        conditions.push(explain_reduction(reduction));
    }

    ExplainRule {
        name: tariff.name.clone(),
        rate: tariff.fee_per_kw,
        conditions,
    }
}

fn explain_limits(limits: &TimeLimits, conditions: &mut Vec<String>) {
    if let Some((start, end)) = limits.start_time.zip(limits.end_time) {
        conditions.push(format!("between {start} and {end}"));
    }

    if !limits.months.is_empty() {
        let months = limits
            .months
            .iter()
            .map(month_name)
            .collect::<Vec<_>>()
            .join(", ");
        conditions.push(format!("in {months}"));
    }
}

fn explain_reduction(reduction: &Reduction) -> String {
    format!(
        "peaks between {} and {} count at factor {}",
        reduction.start_time, reduction.end_time, reduction.factor
    )
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "?",
    }
}
