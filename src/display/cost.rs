#[derive(Clone, Copy)]
struct Price {
    input_per_1k: f64,
    output_per_1k: f64,
}

fn price_for(model: &str) -> Option<Price> {
    if model.starts_with("gpt-3.5-turbo") {
        Some(Price {
            input_per_1k: 0.0015,
            output_per_1k: 0.002,
        })
    } else if model.starts_with("gpt-4") || model.starts_with("o3") {
        Some(Price {
            input_per_1k: 0.03,
            output_per_1k: 0.06,
        })
    } else {
        None
    }
}

/// Estimated USD cost of one response.
///
/// `None` for unpriced models and for responses that report no tokens.
pub fn calculate_cost(model: &str, prompt_tokens: u64, completion_tokens: u64) -> Option<f64> {
    let price = price_for(model)?;
    if prompt_tokens == 0 && completion_tokens == 0 {
        return None;
    }
    let input = prompt_tokens as f64 / 1000.0 * price.input_per_1k;
    let output = completion_tokens as f64 / 1000.0 * price.output_per_1k;
    Some(input + output)
}

#[cfg(test)]
mod tests {
    use super::calculate_cost;

    #[test]
    fn o3_snapshot_names_are_priced() {
        let cost = calculate_cost("o3-2025-04-16", 1000, 500).expect("priced");
        assert!((cost - 0.06).abs() < 1e-9);
    }

    #[test]
    fn gpt35_is_cheaper_than_gpt4() {
        let cheap = calculate_cost("gpt-3.5-turbo", 2000, 2000).expect("priced");
        let pricey = calculate_cost("gpt-4", 2000, 2000).expect("priced");
        assert!(cheap < pricey);
    }

    #[test]
    fn unknown_model_or_no_tokens_has_no_cost() {
        assert_eq!(calculate_cost("mystery-model", 10, 10), None);
        assert_eq!(calculate_cost("gpt-4", 0, 0), None);
    }
}
