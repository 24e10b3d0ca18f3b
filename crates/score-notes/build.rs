//! Generates the `Note` enum from `notes.csv`.
//!
//! The CSV is the contract (spec.md §6): each row becomes one compile-time
//! enum variant, while `group`/`category`/`description`/`oss_risk` stay
//! data rather than code, so adding a note is a one-line CSV edit.

use std::env;
use std::fs;
use std::path::Path;

struct Row {
    code: String,
    group: String,
    category: String,
    description: String,
    oss_risk: Option<String>,
}

fn pascal_case(code: &str) -> String {
    code.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect()
}

fn group_variant(group: &str) -> &'static str {
    match group {
        "Any" => "Any",
        "Health" => "Health",
        "Legal" => "Legal",
        "Maturity" => "Maturity",
        "Security" => "Security",
        other => panic!("unknown note group in notes.csv: {other}"),
    }
}

fn category_variant(category: &str) -> &'static str {
    match category {
        "Healthy" => "Healthy",
        "Mature" => "Mature",
        "Caution Needed" => "CautionNeeded",
        "Moderate Risk" => "ModerateRisk",
        "High Risk" => "HighRisk",
        "Experimental" => "Experimental",
        "Stale" => "Stale",
        "Legacy" => "Legacy",
        "Unknown" => "Unknown",
        "Placeholder" => "Placeholder",
        other => panic!("unknown note category in notes.csv: {other}"),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let csv_path = Path::new(&manifest_dir).join("notes.csv");
    println!("cargo:rerun-if-changed={}", csv_path.display());

    let mut reader = csv::Reader::from_path(&csv_path)
        .unwrap_or_else(|err| panic!("failed to open {}: {err}", csv_path.display()));

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.expect("malformed row in notes.csv");
        let code = record.get(0).unwrap().trim().to_string();
        if code.is_empty() {
            continue;
        }
        let group = record.get(1).unwrap().trim().to_string();
        let category = record.get(2).unwrap().trim().to_string();
        let description = record.get(3).unwrap_or("").trim().to_string();
        let oss_risk = record.get(4).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        rows.push(Row { code, group, category, description, oss_risk });
    }

    assert!(!rows.is_empty(), "notes.csv produced no note rows");

    let mut variants = String::new();
    let mut all_entries = String::new();
    let mut code_arms = String::new();
    let mut group_arms = String::new();
    let mut category_arms = String::new();
    let mut description_arms = String::new();
    let mut oss_risk_arms = String::new();
    let mut from_code_arms = String::new();

    for row in &rows {
        let variant = pascal_case(&row.code);
        variants.push_str(&format!("    {variant},\n"));
        all_entries.push_str(&format!("    Note::{variant},\n"));
        code_arms.push_str(&format!("            Note::{variant} => \"{}\",\n", row.code));
        group_arms.push_str(&format!(
            "            Note::{variant} => ScoreGroup::{},\n",
            group_variant(&row.group)
        ));
        category_arms.push_str(&format!(
            "            Note::{variant} => ScoreCategory::{},\n",
            category_variant(&row.category)
        ));
        description_arms.push_str(&format!(
            "            Note::{variant} => \"{}\",\n",
            escape(&row.description)
        ));
        oss_risk_arms.push_str(&format!(
            "            Note::{variant} => {},\n",
            match &row.oss_risk {
                Some(v) => format!("Some(\"{}\")", escape(v)),
                None => "None".to_string(),
            }
        ));
        from_code_arms.push_str(&format!(
            "            \"{}\" => Some(Note::{variant}),\n",
            row.code
        ));
    }

    let generated = format!(
        r#"// @generated by build.rs from notes.csv. Do not edit by hand.

/// A single catalog entry; one variant per row of `notes.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Note {{
{variants}}}

impl Note {{
    /// All notes in the catalog, in CSV order.
    pub const ALL: &'static [Note] = &[
{all_entries}    ];

    /// The stable string identifier for this note, as it appears in `notes.csv`.
    #[must_use]
    pub fn code(self) -> &'static str {{
        match self {{
{code_arms}        }}
    }}

    /// Which sub-score(s) this note contributes to.
    #[must_use]
    pub fn group(self) -> ScoreGroup {{
        match self {{
{group_arms}        }}
    }}

    /// The severity category this note carries.
    #[must_use]
    pub fn category(self) -> ScoreCategory {{
        match self {{
{category_arms}        }}
    }}

    /// Human-readable description, for the `/notes/categories` endpoint.
    #[must_use]
    pub fn description(self) -> &'static str {{
        match self {{
{description_arms}        }}
    }}

    /// Optional OSS-risk annotation from the catalog.
    #[must_use]
    pub fn oss_risk(self) -> Option<&'static str> {{
        match self {{
{oss_risk_arms}        }}
    }}

    /// Look up a note by its stable code string. Returns `None` for codes
    /// not present in `notes.csv` — callers that emit a note built from a
    /// dynamic string must validate it this way rather than trusting it.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Note> {{
        match code {{
{from_code_arms}            _ => None,
        }}
    }}
}}
"#
    );

    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(Path::new(&out_dir).join("notes_generated.rs"), generated).unwrap();
}
