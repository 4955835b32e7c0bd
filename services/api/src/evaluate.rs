use clap::Args;
use oala::assessment::{
    household_from_legacy_str, render_csv, render_summary, EligibilityEngine, HolderNames,
    HouseholdDeclaration, ThresholdTable,
};
use oala::config::AppConfig;
use oala::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Household declaration JSON file
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print the CSV report (line items, totals and verdict) instead of the text summary
    #[arg(long)]
    pub(crate) csv: bool,
    /// Read the file as a stored submission from the earlier wizard ({ p1, p2, isMarried })
    #[arg(long)]
    pub(crate) legacy: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.input)?;
    let output = render_evaluation(&raw, args.legacy, args.csv, config.thresholds)?;
    print!("{output}");
    Ok(())
}

pub(crate) fn run_thresholds() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    println!("{}", serde_json::to_string_pretty(&config.thresholds)?);
    Ok(())
}

fn render_evaluation(
    raw: &str,
    legacy: bool,
    csv: bool,
    thresholds: ThresholdTable,
) -> Result<String, AppError> {
    let declaration: HouseholdDeclaration = if legacy {
        household_from_legacy_str(raw)?
    } else {
        serde_json::from_str(raw)?
    };

    let result = EligibilityEngine::new(thresholds).evaluate(&declaration);
    if csv {
        Ok(render_csv(&result, &declaration)?)
    } else {
        Ok(render_summary(
            &result,
            &HolderNames::from_declaration(&declaration),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARATION: &str = r#"{
        "is_couple": false,
        "primary": {
            "name": "Chan Tai Man",
            "age": 72,
            "items": [
                { "category": "bank_deposit", "amount": 300000 },
                { "category": "property", "subtype": "self-occupied", "amount": 2000000 }
            ]
        }
    }"#;

    #[test]
    fn summary_reports_totals_and_verdict() {
        let output = render_evaluation(DECLARATION, false, false, ThresholdTable::default())
            .expect("evaluation renders");

        assert!(output.starts_with("Household: single (Chan Tai Man)"));
        assert!(output.contains("- Countable assets: $300000 of $406000"));
        assert!(output.ends_with("Result: eligible\n"));
    }

    #[test]
    fn csv_output_lists_line_items() {
        let output = render_evaluation(DECLARATION, false, true, ThresholdTable::default())
            .expect("evaluation renders");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "\u{feff}kind,item,holder,amount,exempt,note");
        assert_eq!(lines[5], "result,eligible,,,,");
    }

    #[test]
    fn legacy_blobs_are_converted_first() {
        let legacy = r#"{
            "isMarried": false,
            "p1": {
                "name": "Ho Wing",
                "age": "68",
                "income": { "work": { "value": "12000", "enabled": true } }
            }
        }"#;

        let output = render_evaluation(legacy, true, false, ThresholdTable::default())
            .expect("evaluation renders");

        assert!(output.contains("Result: not eligible: countable monthly income $12000"));
    }

    #[test]
    fn malformed_input_is_an_input_error() {
        let err = render_evaluation("{ nope", false, false, ThresholdTable::default())
            .expect_err("invalid json");
        assert!(matches!(err, AppError::Input(_)));

        let err = render_evaluation("[]", true, false, ThresholdTable::default())
            .expect_err("legacy blob must be an object");
        assert!(matches!(err, AppError::Legacy(_)));
    }
}
