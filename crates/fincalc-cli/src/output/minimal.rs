use serde_json::{Map, Value};

/// Headline figure for each kind of result, checked in order.
const HEADLINE_KEYS: [&str; 11] = [
    "maturity_amount",
    "emi",
    "payment_amount",
    "new_tenure_months",
    "total_tax_liability",
    "income_from_house_property",
    "income_from_business",
    "total_potential_savings",
    "total_income_after_set_off",
    "net_capital_gain",
    "gain_amount",
];

/// Print only the headline answer, e.g. `107185.90312890625` for a deposit
/// or `NEW (saves 15600)` for a regime comparison. Results without a known
/// headline print their first field as `key: value`.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => println!("{}", headline(map)),
        other => println!("{}", scalar(other)),
    }
}

fn headline(map: &Map<String, Value>) -> String {
    if let (Some(regime), Some(savings)) = (map.get("recommended_regime"), map.get("savings")) {
        return format!("{} (saves {})", scalar(regime), scalar(savings));
    }

    HEADLINE_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()).map(scalar))
        .or_else(|| {
            map.iter()
                .next()
                .map(|(key, val)| format!("{}: {}", key, scalar(val)))
        })
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
