use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{EmployeeLabel, PaymentMethod, RawRow};

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"%([A-Z])").expect("tag pattern compiles"))
}

/// Case-insensitive substring filter for bookkeeper summary rows.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    keywords: Vec<String>,
}

impl NoiseFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Returns the first keyword found in `description`, if any.
    pub fn matched<'a>(&'a self, description: &str) -> Option<&'a str> {
        let upper = description.to_uppercase();
        self.keywords
            .iter()
            .find(|k| upper.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Tag letter -> employee name lookup.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: HashMap<char, String>,
}

impl Roster {
    pub fn from_settings(employees: &BTreeMap<String, String>) -> Self {
        let names = employees
            .iter()
            .filter_map(|(tag, name)| {
                let c = tag.trim().chars().next()?.to_ascii_uppercase();
                Some((c, name.trim().to_string()))
            })
            .collect();
        Self { names }
    }

    pub fn label_for(&self, tag: char) -> EmployeeLabel {
        match self.names.get(&tag) {
            Some(name) => EmployeeLabel::new(name.clone(), tag),
            None => EmployeeLabel::generic(tag),
        }
    }
}

/// Payment channel by priority: NEQUI, then QR/BANCOLOMBIA, then any transfer, then cash.
pub fn payment_method(row: &RawRow) -> PaymentMethod {
    let desc = row.description.to_uppercase();
    let hint = row.type_hint.as_deref().unwrap_or("").to_uppercase();
    let mentions = |token: &str| desc.contains(token) || hint.contains(token);

    if mentions("NEQUI") {
        PaymentMethod::Nequi
    } else if mentions("QR") || mentions("BANCOLOMBIA") {
        PaymentMethod::QrBancolombia
    } else if row.transfer_amount > 0.0 {
        if desc.trim().is_empty() && hint.trim().is_empty() {
            PaymentMethod::TransferUnidentified
        } else {
            PaymentMethod::TransferOther
        }
    } else {
        PaymentMethod::Cash
    }
}

/// First `%<letter>` tag in the description. Lowercase tags count once uppercased.
pub fn employee_tag(description: &str, roster: &Roster) -> Option<EmployeeLabel> {
    let upper = description.to_uppercase();
    let caps = tag_pattern().captures(&upper)?;
    let tag = caps.get(1)?.as_str().chars().next()?;
    Some(roster.label_for(tag))
}

pub fn classify(row: &RawRow, roster: &Roster) -> (PaymentMethod, Option<EmployeeLabel>) {
    (payment_method(row), employee_tag(&row.description, roster))
}
