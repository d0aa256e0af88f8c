use std::collections::HashMap;

use anyhow::Context as _;
use regex::Regex;
use scraper::{Html, Selector};

use crate::cli::LegendArgs;
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::registry;

/// Extraction patterns for the operator's legend page, one per code table.
pub struct LegendPatterns {
    pub allergen: &'static str,
    pub additive: &'static str,
}

/// German phrasing used on stw-on.de: a code, a run of at least two
/// delimiter characters, then "enthält" and the description.
pub const GERMAN_LEGEND: LegendPatterns = LegendPatterns {
    allergen: r"(?P<name>[A-Z]+)_{2,} enthält (?P<value>\w+( |\t|\w)*)",
    additive: r"(?P<name>\d+)_{2,} (enthält )?(?P<value>\w+( |\t|\w)*)",
};

/// Allergen and additive code tables resolved from one legend page.
/// Built once per feed build and read by every week parse.
#[derive(Debug, Clone, Default)]
pub struct Legend {
    pub allergens: HashMap<String, String>,
    pub additives: HashMap<String, String>,
}

impl Legend {
    pub fn resolve(text: &str) -> Result<Self, regex::Error> {
        Self::resolve_with(text, &GERMAN_LEGEND)
    }

    pub fn resolve_with(text: &str, patterns: &LegendPatterns) -> Result<Self, regex::Error> {
        // The site separates a code from its description with runs of
        // non-breaking spaces; fold them into the delimiter the patterns
        // expect.
        let text = text.replace('\u{a0}', "_");

        let mut allergens = extract(&text, &Regex::new(patterns.allergen)?);
        let additives = extract(&text, &Regex::new(patterns.additive)?);

        // The legend encodes egg inconsistently; the allergen pattern misses
        // it in practice.
        allergens.insert("EI".to_owned(), "Ei".to_owned());

        Ok(Self {
            allergens,
            additives,
        })
    }

    pub fn allergen(&self, code: &str) -> Option<&str> {
        lookup(&self.allergens, code)
    }

    pub fn additive(&self, code: &str) -> Option<&str> {
        lookup(&self.additives, code)
    }
}

/// Text of the legend page's article section, the block both code tables
/// live in.
pub fn article_text(html: &str) -> Option<String> {
    let article = Selector::parse("#artikel").expect("legend article selector");
    let document = Html::parse_document(html);
    let element = document.select(&article).next()?;
    Some(element.text().collect::<String>())
}

fn extract(text: &str, pattern: &Regex) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for captures in pattern.captures_iter(text) {
        let (Some(name), Some(value)) = (captures.name("name"), captures.name("value")) else {
            continue;
        };
        map.insert(name.as_str().to_owned(), value.as_str().trim().to_owned());
    }
    map
}

// Codes arrive from icon titles with stray whitespace and mixed case.
fn lookup<'a>(map: &'a HashMap<String, String>, code: &str) -> Option<&'a str> {
    let code = code.trim();
    if let Some(value) = map.get(code) {
        return Some(value.as_str());
    }
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, value)| value.as_str())
}

pub fn run(args: LegendArgs) -> anyhow::Result<()> {
    let city = registry::city(&args.city)
        .ok_or_else(|| anyhow::anyhow!("unknown city: {}", args.city))?;

    let fetcher = Fetcher::new().context("build http client")?;
    let url = registry::legend_url(city);
    let html = fetcher
        .get_text(&url)
        .with_context(|| format!("fetch legend page: {url}"))?;
    let text = article_text(&html).ok_or(ScrapeError::LegendText { url: url.clone() })?;
    let legend = Legend::resolve(&text).context("compile legend patterns")?;

    print_table("Allergene", &legend.allergens);
    print_table("Zusatzstoffe", &legend.additives);
    Ok(())
}

fn print_table(heading: &str, map: &HashMap<String, String>) {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort();
    println!("# {heading}");
    for (code, description) in entries {
        println!("{code}\t{description}");
    }
}
