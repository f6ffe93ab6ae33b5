use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Structured profile emitted by the extraction stage.
///
/// `id` and `url` are always present; every other field is best-effort.
/// The nested collections are passed through unvalidated from whatever the
/// extraction stage could recover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub connections: Option<u32>,
    #[serde(default)]
    pub experience: Vec<Value>,
    #[serde(default)]
    pub career_break: Option<Value>,
    #[serde(default)]
    pub services: Vec<Value>,
    #[serde(default)]
    pub featured: Vec<Value>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub endorsements: Vec<Value>,
    #[serde(default)]
    pub licenses_certifications: Vec<Value>,
    #[serde(default)]
    pub projects: Vec<Value>,
    #[serde(default)]
    pub courses: Vec<Value>,
    #[serde(default)]
    pub recommendations: Vec<Value>,
    #[serde(default)]
    pub volunteer_experience: Vec<Value>,
    #[serde(default)]
    pub publications: Vec<Value>,
    #[serde(default)]
    pub patents: Vec<Value>,
    #[serde(default)]
    pub honors_awards: Vec<Value>,
    #[serde(default)]
    pub test_scores: Vec<Value>,
    #[serde(default)]
    pub languages: Vec<Value>,
    #[serde(default)]
    pub organizations: Vec<Value>,
    #[serde(default)]
    pub causes: Vec<Value>,
    #[serde(default)]
    pub interests: Vec<Value>,
    #[serde(default)]
    pub open_to: Option<Value>,
}

/// One entry of the internal-field to export-label mapping.
pub struct Column {
    pub field: &'static str,
    pub label: &'static str,
}

/// Fixed, order-stable export header. `id` is the row-store primary key and
/// is deliberately not an export column.
pub const EXPORT_COLUMNS: &[Column] = &[
    Column { field: "headline", label: "Headline" },
    Column { field: "pronouns", label: "Pronouns" },
    Column { field: "url", label: "Custom public profile URL" },
    Column { field: "industry", label: "Industry" },
    Column { field: "about", label: "About (Summary)" },
    Column { field: "experience", label: "Experience (past positions)" },
    Column { field: "career_break", label: "Career break" },
    Column { field: "services", label: "Services" },
    Column { field: "featured", label: "Featured" },
    Column { field: "skills", label: "Skills" },
    Column { field: "endorsements", label: "Endorsements" },
    Column { field: "licenses_certifications", label: "Licenses & Certifications" },
    Column { field: "projects", label: "Projects" },
    Column { field: "courses", label: "Courses" },
    Column { field: "recommendations", label: "Recommendations" },
    Column { field: "volunteer_experience", label: "Volunteer Experience" },
    Column { field: "publications", label: "Publications" },
    Column { field: "patents", label: "Patents" },
    Column { field: "honors_awards", label: "Honors & Awards" },
    Column { field: "test_scores", label: "Test Scores" },
    Column { field: "languages", label: "Languages" },
    Column { field: "organizations", label: "Organizations" },
    Column { field: "causes", label: "Causes" },
    Column { field: "interests", label: "Interests" },
    Column { field: "connections", label: "Connections / Follower count" },
    Column { field: "open_to", label: "Open to (Work / Hiring / Providing Services)" },
];

/// Check the mapping table is bidirectionally unique and the CSV row shape
/// agrees with it. Run once at startup instead of trusting runtime lookups.
pub fn validate_export_columns() -> Result<()> {
    let mut fields = std::collections::HashSet::new();
    let mut labels = std::collections::HashSet::new();
    for column in EXPORT_COLUMNS {
        if !fields.insert(column.field) {
            return Err(ScrapeError::Other(format!(
                "duplicate export field: {}",
                column.field
            )));
        }
        if !labels.insert(column.label) {
            return Err(ScrapeError::Other(format!(
                "duplicate export label: {}",
                column.label
            )));
        }
    }
    let row = ProfileRecord::default().to_csv_row();
    if row.len() != EXPORT_COLUMNS.len() {
        return Err(ScrapeError::Other(format!(
            "export row has {} cells for {} columns",
            row.len(),
            EXPORT_COLUMNS.len()
        )));
    }
    Ok(())
}

/// Deterministic record id: the last non-empty path segment of the
/// canonical profile URL.
pub fn profile_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(String::from)
}

impl ProfileRecord {
    /// Schema contract: `id` and `url` must both be present.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.id.is_empty() {
            return Err("missing id");
        }
        if self.url.is_empty() {
            return Err("missing url");
        }
        Ok(())
    }

    /// Cell values in [`EXPORT_COLUMNS`] order. Nested lists and objects are
    /// encoded as compact JSON; absent scalars become empty cells.
    pub fn to_csv_row(&self) -> Vec<String> {
        vec![
            text_cell(&self.headline),
            text_cell(&self.pronouns),
            self.url.clone(),
            text_cell(&self.industry),
            text_cell(&self.about),
            list_cell(&self.experience),
            value_cell(&self.career_break),
            list_cell(&self.services),
            list_cell(&self.featured),
            json_cell(&self.skills),
            list_cell(&self.endorsements),
            list_cell(&self.licenses_certifications),
            list_cell(&self.projects),
            list_cell(&self.courses),
            list_cell(&self.recommendations),
            list_cell(&self.volunteer_experience),
            list_cell(&self.publications),
            list_cell(&self.patents),
            list_cell(&self.honors_awards),
            list_cell(&self.test_scores),
            list_cell(&self.languages),
            list_cell(&self.organizations),
            list_cell(&self.causes),
            list_cell(&self.interests),
            self.connections.map(|n| n.to_string()).unwrap_or_default(),
            value_cell(&self.open_to),
        ]
    }
}

fn text_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn value_cell(value: &Option<Value>) -> String {
    value.as_ref().map(Value::to_string).unwrap_or_default()
}

fn list_cell(values: &[Value]) -> String {
    json_cell(values)
}

fn json_cell<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}
