//! Inspection submissions and the values they contribute to a report.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// Shown in the price block when no listing price was given.
pub const PRICE_PLACEHOLDER: &str = "$???,???";

/// Form fields exactly as they arrive from the browser (or a JSON file).
///
/// HTML forms post every input, so blank inputs arrive as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub city: Option<String>,
    pub address: Option<String>,
    pub build_year: Option<String>,
    pub lot_size: Option<String>,
    pub num_beds: Option<String>,
    pub num_baths: Option<String>,
    pub sqft: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "imgURL")]
    pub img_url: Option<String>,
    pub num_str: Option<String>,
    pub price: Option<String>,
    pub garage_space_num: Option<String>,
    pub above_grade_sqft: Option<String>,
}

/// One validated house-inspection submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldRecord {
    pub num_str: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub build_year: Option<String>,
    pub lot_size: Option<String>,
    pub num_beds: Option<String>,
    pub num_baths: Option<String>,
    pub sqft: Option<String>,
    pub url: Option<String>,
    pub img_url: Option<String>,
    pub price: Option<String>,
    pub garage_space_num: Option<String>,
    pub above_grade_sqft: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<Submission> for FieldRecord {
    type Error = ReportError;

    fn try_from(raw: Submission) -> ReportResult<Self> {
        let num_str = present(raw.num_str)
            .ok_or_else(|| ReportError::Validation("numStr is required".to_string()))?;
        Ok(FieldRecord {
            num_str,
            city: present(raw.city),
            address: present(raw.address),
            build_year: present(raw.build_year),
            lot_size: present(raw.lot_size),
            num_beds: present(raw.num_beds),
            num_baths: present(raw.num_baths),
            sqft: present(raw.sqft),
            url: present(raw.url),
            img_url: present(raw.img_url),
            price: present(raw.price),
            garage_space_num: present(raw.garage_space_num),
            above_grade_sqft: present(raw.above_grade_sqft),
        })
    }
}

impl FieldRecord {
    pub fn new(num_str: impl Into<String>) -> Self {
        FieldRecord {
            num_str: num_str.into(),
            ..Default::default()
        }
    }

    /// Identifier block text, e.g. `# A123`.
    pub fn identifier(&self) -> String {
        format!("# {}", self.num_str)
    }

    pub fn price_or_placeholder(&self) -> &str {
        self.price.as_deref().unwrap_or(PRICE_PLACEHOLDER)
    }

    pub fn file_name(&self) -> String {
        let stem: String = self
            .num_str
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}.pdf", stem)
    }
}

/// Text for an optional string field: blank when absent.
pub fn display_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Text for an optional numeric field.
///
/// * absent or blank: empty string
/// * parses as a finite number: its canonical form (`"03"` -> `"3"`, `"2.50"` -> `"2.5"`)
/// * anything else: the input, trimmed, unchanged
pub fn display_number(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return String::new();
    };
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", n as i64)
            } else {
                format!("{}", n)
            }
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(num_str: &str) -> Submission {
        Submission {
            num_str: Some(num_str.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_identifier_is_rejected() {
        let err = FieldRecord::try_from(Submission::default()).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let err = FieldRecord::try_from(submission("   ")).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn blank_optionals_become_absent() {
        let mut raw = submission("A123");
        raw.price = Some(String::new());
        raw.city = Some("  Springfield ".to_string());
        let record = FieldRecord::try_from(raw).unwrap();
        assert_eq!(record.price, None);
        assert_eq!(record.city.as_deref(), Some("Springfield"));
        assert_eq!(record.price_or_placeholder(), PRICE_PLACEHOLDER);
        assert_eq!(record.identifier(), "# A123");
    }

    #[test]
    fn zero_price_is_not_the_placeholder() {
        let mut record = FieldRecord::new("A1");
        record.price = Some("$0".to_string());
        assert_eq!(record.price_or_placeholder(), "$0");
    }

    #[test]
    fn form_field_names_match_browser() {
        let raw: Submission = serde_json::from_str(
            r#"{"numStr":"B7","imgURL":"http://h/p.png","garageSpaceNum":"2","aboveGradeSqft":"900"}"#,
        )
        .unwrap();
        let record = FieldRecord::try_from(raw).unwrap();
        assert_eq!(record.img_url.as_deref(), Some("http://h/p.png"));
        assert_eq!(record.garage_space_num.as_deref(), Some("2"));
        assert_eq!(record.above_grade_sqft.as_deref(), Some("900"));
    }

    #[test]
    fn numbers_are_canonicalised() {
        assert_eq!(display_number(None), "");
        assert_eq!(display_number(Some("")), "");
        assert_eq!(display_number(Some("3")), "3");
        assert_eq!(display_number(Some("03")), "3");
        assert_eq!(display_number(Some("2.50")), "2.5");
        assert_eq!(display_number(Some(" 4 ")), "4");
        assert_eq!(display_number(Some("two")), "two");
        assert_eq!(display_number(Some("NaN")), "NaN");
    }

    #[test]
    fn file_name_is_path_safe() {
        assert_eq!(FieldRecord::new("A123").file_name(), "A123.pdf");
        assert_eq!(FieldRecord::new("../x y").file_name(), "___x_y.pdf");
    }
}
