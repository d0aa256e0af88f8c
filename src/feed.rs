use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Raw price strings straight from a menu table, one per OpenMensa role.
/// Nothing is parsed here; normalization happens only when rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prices {
    pub student: String,
    pub employee: String,
    pub other: String,
}

/// One menu line as handed downstream. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    pub date: NaiveDate,
    pub category: String,
    pub name: String,
    pub notes: Vec<String>,
    pub prices: Prices,
}

/// Accumulates meals across week pages and renders the OpenMensa v2
/// document for one canteen. Days are ordered by date; categories within a
/// day keep first-emission order; duplicates are recorded as-is.
#[derive(Debug, Default)]
pub struct FeedBuilder {
    days: BTreeMap<NaiveDate, Vec<Meal>>,
}

impl FeedBuilder {
    pub fn add_meal(&mut self, meal: Meal) {
        self.days.entry(meal.date).or_default().push(meal);
    }

    pub fn meal_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(concat!(
            "<openmensa version=\"2.1\"",
            " xmlns=\"http://openmensa.org/open-mensa-v2\"",
            " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
            " xsi:schemaLocation=\"http://openmensa.org/open-mensa-v2",
            " http://openmensa.org/open-mensa-v2.xsd\">\n",
        ));
        out.push_str("  <canteen>\n");

        for (date, meals) in &self.days {
            out.push_str(&format!("    <day date=\"{date}\">\n"));
            for (category, members) in group_by_category(meals) {
                out.push_str(&format!(
                    "      <category name=\"{}\">\n",
                    escape(category)
                ));
                for meal in members {
                    out.push_str("        <meal>\n");
                    out.push_str(&format!(
                        "          <name>{}</name>\n",
                        escape(&meal.name)
                    ));
                    for note in &meal.notes {
                        out.push_str(&format!("          <note>{}</note>\n", escape(note)));
                    }
                    for (role, raw) in [
                        ("student", &meal.prices.student),
                        ("employee", &meal.prices.employee),
                        ("other", &meal.prices.other),
                    ] {
                        if let Some(price) = price_value(raw) {
                            out.push_str(&format!(
                                "          <price role=\"{role}\">{price}</price>\n"
                            ));
                        }
                    }
                    out.push_str("        </meal>\n");
                }
                out.push_str("      </category>\n");
            }
            out.push_str("    </day>\n");
        }

        out.push_str("  </canteen>\n");
        out.push_str("</openmensa>\n");
        out
    }
}

fn group_by_category(meals: &[Meal]) -> Vec<(&str, Vec<&Meal>)> {
    let mut groups: Vec<(&str, Vec<&Meal>)> = Vec::new();
    for meal in meals {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == meal.category)
        {
            Some((_, members)) => members.push(meal),
            None => groups.push((meal.category.as_str(), vec![meal])),
        }
    }
    groups
}

// "2,50 €" → "2.50". A string with no digit carries no price.
fn price_value(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = cleaned.replace(',', ".");
    normalized.parse::<f64>().ok()?;
    Some(normalized)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
