use claims_core::error::{ClaimsError, Result};
use claims_core::ClaimData;

/// Strip markdown code fences a model may wrap around its JSON.
pub fn strip_code_fences(raw: &str) -> &str {
    let cleaned = raw.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => &cleaned[start..=end],
        _ => cleaned
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim(),
    }
}

/// Parse raw model output into a JSON object.
///
/// The batch pipeline never calls this; it stores the text verbatim.
pub fn parse_model_json(raw: &str) -> Result<serde_json::Value> {
    let cleaned = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::warn!(error = %e, response_len = raw.len(), "Model output is not valid JSON");
        ClaimsError::Extraction(format!("Model output is not valid JSON: {e}"))
    })?;

    if !value.is_object() {
        return Err(ClaimsError::Extraction(
            "Model output is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Parse raw model output into the typed claim view.
pub fn parse_claim_data(raw: &str) -> Result<ClaimData> {
    let value = parse_model_json(raw)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let value = parse_model_json(r#"{"claim_number": "CLM-42"}"#).unwrap();
        assert_eq!(value["claim_number"], "CLM-42");
    }

    #[test]
    fn test_parse_with_code_fences() {
        let raw = "```json\n{\"vehicle_info\": {\"make\": \"Ford\"}}\n```";
        let data = parse_claim_data(raw).unwrap();
        assert_eq!(
            data.vehicle_info.unwrap().make.as_deref(),
            Some("Ford")
        );
    }

    #[test]
    fn test_parse_fenced_without_language() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_model_json("I could not read the image").unwrap_err();
        assert!(matches!(err, ClaimsError::Extraction(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_model_json("[1, 2, 3]").is_err());
        assert!(parse_model_json("\"text\"").is_err());
    }
}
