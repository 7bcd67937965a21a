//! Analysis response model and result formatting
//!
//! The endpoint returns two scores and four free-text sections. Scores come
//! back from a language model, so they may be numbers, numeric strings such as
//! `"85"` or `"85/100"`, or garbage; they are read with `parseInt` rules and
//! clamped into 0..=100. Text sections are paragraph lists separated by blank
//! lines, usually bulleted with `•`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AnalyzeError;

lazy_static! {
    /// A leading bullet and whatever whitespace follows it
    static ref BULLET_PREFIX: Regex = Regex::new(r"^•\s*").unwrap();
}

const BULLET_SPAN: &str = r#"<span class="bullet">•</span>"#;

/// Body of a successful `POST /analyze`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub score: Value,
    #[serde(rename = "ats-friendly", default)]
    pub ats_friendly: Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub matching_analysis: Option<String>,
    #[serde(rename = "ats-recommendation", default, deserialize_with = "lenient_text")]
    pub ats_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recommendation: Option<String>,
}

impl AnalysisResult {
    /// Parse a response body
    pub fn parse(body: &str) -> Result<Self, AnalyzeError> {
        serde_json::from_str(body).map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))
    }

    /// Text for a section, `None` when absent or empty
    pub fn section(&self, section: Section) -> Option<&str> {
        let text = match section {
            Section::MatchingAnalysis => self.matching_analysis.as_deref(),
            Section::AtsRecommendation => self.ats_recommendation.as_deref(),
            Section::Description => self.description.as_deref(),
            Section::Recommendation => self.recommendation.as_deref(),
        };
        text.filter(|t| !t.is_empty())
    }
}

/// Accepts strings, null, lists of paragraphs, or any other JSON value as text
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
        ),
        Some(other) => Some(other.to_string()),
    })
}

/// A score in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    /// Read a score the way `parseInt` would, defaulting to 0, then clamp
    pub fn from_json(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().and_then(float_leading_integer)),
            Value::String(text) => leading_integer(text),
            _ => None,
        };
        Self::clamped(parsed.unwrap_or(0))
    }

    pub fn clamped(value: i64) -> Self {
        Score(value.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `parseInt` of a float's JS string form
///
/// JS prints magnitudes from 1e21 up and below 1e-6 in exponent form, so only
/// the mantissa's integer part is read: `1e21` gives 1 and `5e-7` gives 5.
fn float_leading_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        leading_integer(&format!("{:e}", value))
    } else {
        Some(value.trunc() as i64)
    }
}

/// Optional sign then digits, after leading whitespace
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Overlong digit runs saturate; they clamp to 100 anyway
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Text sections of the results panel, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    MatchingAnalysis,
    AtsRecommendation,
    Description,
    Recommendation,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::MatchingAnalysis,
        Section::AtsRecommendation,
        Section::Description,
        Section::Recommendation,
    ];

    /// Id of the element the section renders into
    pub fn element_id(self) -> &'static str {
        match self {
            Section::MatchingAnalysis => "matchingAnalysis",
            Section::AtsRecommendation => "atsRecommendation",
            Section::Description => "description",
            Section::Recommendation => "recommendation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub section: Section,
    pub html: String,
}

/// Everything the results panel needs, already clamped and formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnalysis {
    pub score: Score,
    pub ats_score: Score,
    /// Only sections with content; absent ones keep their current markup
    pub sections: Vec<RenderedSection>,
}

impl From<&AnalysisResult> for RenderedAnalysis {
    fn from(result: &AnalysisResult) -> Self {
        let sections = Section::ALL
            .iter()
            .filter_map(|&section| {
                result.section(section).map(|text| RenderedSection {
                    section,
                    html: section_html(text),
                })
            })
            .collect();

        Self {
            score: Score::from_json(&result.score),
            ats_score: Score::from_json(&result.ats_friendly),
            sections,
        }
    }
}

/// Normalise paragraphs: trimmed, blank ones dropped, bullets as `• `
pub fn format_analysis(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| BULLET_PREFIX.replace(paragraph, "• ").into_owned())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Markup for a section: escaped text, `<br><br>` paragraph breaks, styled bullets
pub fn section_html(text: &str) -> String {
    escape_html(&format_analysis(text))
        .replace("\n\n", "<br><br>")
        .replace('•', BULLET_SPAN)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_full_response() {
        let body = json!({
            "score": 78,
            "ats-friendly": "64",
            "matching_analysis": "• Strong Rust background",
            "ats-recommendation": "• Add \"WebAssembly\"",
            "description": "Backend engineer",
            "recommendation": "• Quantify impact"
        })
        .to_string();

        let result = AnalysisResult::parse(&body).unwrap();
        assert_eq!(result.score, json!(78));
        assert_eq!(result.ats_friendly, json!("64"));
        assert_eq!(result.description.as_deref(), Some("Backend engineer"));
    }

    #[test]
    fn test_parse_fallback_response_without_ats_fields() {
        let body = r#"{"matching_analysis":"Error processing response","description":"Unable to analyze","score":0,"recommendation":"Please try again"}"#;
        let result = AnalysisResult::parse(body).unwrap();
        let rendered = RenderedAnalysis::from(&result);

        assert_eq!(rendered.ats_score, Score::clamped(0));
        assert_eq!(rendered.sections.len(), 3);
        assert!(rendered
            .sections
            .iter()
            .all(|s| s.section != Section::AtsRecommendation));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = AnalysisResult::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidResponse(_)));
    }

    #[test]
    fn test_lenient_text_joins_lists() {
        let body = r#"{"recommendation":["• one","• two"],"description":42}"#;
        let result = AnalysisResult::parse(body).unwrap();
        assert_eq!(result.recommendation.as_deref(), Some("• one\n\n• two"));
        assert_eq!(result.description.as_deref(), Some("42"));
    }

    #[test]
    fn test_score_parse_int_semantics() {
        assert_eq!(Score::from_json(&json!(85)).value(), 85);
        assert_eq!(Score::from_json(&json!(85.9)).value(), 85);
        assert_eq!(Score::from_json(&json!("85")).value(), 85);
        assert_eq!(Score::from_json(&json!("  72/100")).value(), 72);
        assert_eq!(Score::from_json(&json!("+40")).value(), 40);
        assert_eq!(Score::from_json(&json!("Numerical score 0-100")).value(), 0);
        assert_eq!(Score::from_json(&json!(null)).value(), 0);
        assert_eq!(Score::from_json(&json!(true)).value(), 0);
    }

    #[test]
    fn test_score_exponent_floats_read_mantissa() {
        assert_eq!(Score::from_json(&json!(1e21)).value(), 1);
        assert_eq!(Score::from_json(&json!(5e-7)).value(), 5);
        assert_eq!(Score::from_json(&json!(-2.5e22)).value(), 0);
        assert_eq!(Score::from_json(&json!(0.5)).value(), 0);
        assert_eq!(Score::from_json(&json!(1e20)).value(), 100);
    }

    #[test]
    fn test_score_clamps() {
        assert_eq!(Score::from_json(&json!(150)).value(), 100);
        assert_eq!(Score::from_json(&json!(-20)).value(), 0);
        assert_eq!(Score::from_json(&json!("-5")).value(), 0);
        assert_eq!(Score::from_json(&json!("99999999999999999999999")).value(), 100);
    }

    #[test]
    fn test_format_analysis_normalises_bullets() {
        let text = "  •Strong skills  \n\n\n\n•    Good layout\n\nPlain paragraph\n\n   ";
        assert_eq!(
            format_analysis(text),
            "• Strong skills\n\n• Good layout\n\nPlain paragraph"
        );
    }

    #[test]
    fn test_format_analysis_empty() {
        assert_eq!(format_analysis(""), "");
        assert_eq!(format_analysis("\n\n  \n\n"), "");
    }

    #[test]
    fn test_section_html() {
        assert_eq!(
            section_html("• One\n\n• Two"),
            r#"<span class="bullet">•</span> One<br><br><span class="bullet">•</span> Two"#
        );
    }

    #[test]
    fn test_section_html_escapes_markup() {
        let html = section_html("• Use <script>alert('x')</script> & more");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
    }

    #[test]
    fn test_rendered_analysis_skips_empty_sections() {
        let result = AnalysisResult {
            score: json!(50),
            ats_friendly: json!(60),
            matching_analysis: Some(String::new()),
            description: Some("Summary".to_string()),
            ..Default::default()
        };
        let rendered = RenderedAnalysis::from(&result);
        assert_eq!(rendered.score.value(), 50);
        assert_eq!(rendered.ats_score.value(), 60);
        assert_eq!(
            rendered.sections,
            vec![RenderedSection {
                section: Section::Description,
                html: "Summary".to_string(),
            }]
        );
    }
}
