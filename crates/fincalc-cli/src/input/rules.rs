use fincalc_core::tax::TaxRules;

use super::file::read_file;

/// Load tax rules from `path`, or the built-in FY 2023-24 rules when no path
/// is given. `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
pub fn load_rules(path: Option<&str>) -> Result<TaxRules, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(TaxRules::default());
    };

    let (canonical, contents) = read_file(path)?;
    let is_yaml = matches!(
        canonical.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let rules = parse_rules(&contents, is_yaml)
        .map_err(|e| format!("Invalid rules '{}': {}", canonical.display(), e))?;
    tracing::info!(financial_year = %rules.financial_year, path, "loaded tax rules");
    Ok(rules)
}

/// Parse and validate a rules document. Fields it leaves out keep their
/// FY 2023-24 defaults.
fn parse_rules(contents: &str, is_yaml: bool) -> Result<TaxRules, Box<dyn std::error::Error>> {
    let rules: TaxRules = if is_yaml {
        serde_yaml::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    rules.validate()?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_path_uses_defaults() {
        let rules = load_rules(None).unwrap();
        assert_eq!(rules, TaxRules::default());
    }

    #[test]
    fn test_yaml_override_keeps_other_defaults() {
        let yaml = r#"
financial_year: "2024-25"
cess_rate: "0.04"
new_regime_slabs:
  - { upto: "300000", rate: "0" }
  - { upto: "700000", rate: "0.05" }
  - { upto: "1000000", rate: "0.10" }
  - { upto: "1200000", rate: "0.15" }
  - { upto: "1500000", rate: "0.20" }
  - { upto: null, rate: "0.30" }
"#;
        let rules = parse_rules(yaml, true).unwrap();
        assert_eq!(rules.financial_year, "2024-25");
        assert_eq!(rules.new_regime_slabs[1].upto, Some(dec!(700000)));
        assert_eq!(rules.old_regime_slabs, TaxRules::default().old_regime_slabs);
    }

    #[test]
    fn test_json_override() {
        let rules = parse_rules(r#"{"cess_rate":"0.03"}"#, false).unwrap();
        assert_eq!(rules.cess_rate, dec!(0.03));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(parse_rules(r#"{"cess_rate":"1.5"}"#, false).is_err());
    }
}
