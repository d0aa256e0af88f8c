use anyhow::Context as _;

use crate::cli::FeedArgs;
use crate::error::{ParseWarning, ScrapeError};
use crate::feed::FeedBuilder;
use crate::fetch::Fetcher;
use crate::legend::{self, Legend};
use crate::registry;
use crate::week::WeekParser;

/// URL suffix of the operator's default coming-week page.
const NEXT_WEEK_SUFFIX: &str = "-kommende-woche";

/// The legend page hangs off the same path segment every canteen URL
/// contains.
pub(crate) const LEGEND_BASE_SEGMENT: &str = "essen/";
pub(crate) const LEGEND_PAGE: &str = "lebensmittelkennzeichnung";

/// Which coming-week page to parse in addition to the current week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextWeek {
    /// The operator's default `-kommende-woche` page.
    Include,
    Skip,
    /// A canteen-specific URL suffix.
    Suffix(String),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Restrict the feed to the current week page.
    pub today: bool,
    /// Suffix appended to the base URL for the current-week page.
    pub this_week: String,
    pub next_week: NextWeek,
    /// Explicit legend page URL; derived from the base URL when absent.
    pub legend_url: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            today: false,
            this_week: String::new(),
            next_week: NextWeek::Include,
            legend_url: None,
        }
    }
}

#[derive(Debug)]
pub struct BuildReport {
    pub xml: String,
    pub meals: usize,
    pub warnings: Vec<ParseWarning>,
}

/// Builds the feed for one canteen/meal-period combination. Resolves the
/// legend once, then parses the current week and, depending on the options,
/// one coming-week page into a fresh accumulator. Every fetch or parse
/// failure aborts the build as a whole.
pub fn build_feed(
    fetcher: &Fetcher,
    url_base: &str,
    meal_period: &str,
    options: &BuildOptions,
) -> anyhow::Result<BuildReport> {
    let parsed = url::Url::parse(url_base).with_context(|| format!("parse canteen url: {url_base}"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("canteen url must be http/https: {url_base}");
    }

    let legend_url = match &options.legend_url {
        Some(url) => url.clone(),
        None => derive_legend_url(url_base)?,
    };
    let legend_html = fetcher
        .get_text(&legend_url)
        .context("fetch legend page")?;
    let legend_text = legend::article_text(&legend_html).ok_or(ScrapeError::LegendText {
        url: legend_url.clone(),
    })?;
    let legend = Legend::resolve(&legend_text).context("compile legend patterns")?;
    tracing::debug!(
        allergens = legend.allergens.len(),
        additives = legend.additives.len(),
        url = %legend_url,
        "resolved legend"
    );

    let parser = WeekParser::new();
    let mut feed = FeedBuilder::default();
    let mut warnings = Vec::new();

    let this_week_url = format!("{url_base}{}", options.this_week);
    parse_week_page(
        fetcher,
        &parser,
        &this_week_url,
        meal_period,
        &legend,
        &mut feed,
        &mut warnings,
    )?;

    if !options.today {
        let next_week_url = match &options.next_week {
            NextWeek::Include => Some(format!("{url_base}{NEXT_WEEK_SUFFIX}")),
            NextWeek::Suffix(suffix) => Some(format!("{url_base}{suffix}")),
            NextWeek::Skip => None,
        };
        if let Some(url) = next_week_url {
            parse_week_page(
                fetcher,
                &parser,
                &url,
                meal_period,
                &legend,
                &mut feed,
                &mut warnings,
            )?;
        }
    }

    for warning in &warnings {
        tracing::warn!(%warning, "week page warning");
    }

    Ok(BuildReport {
        meals: feed.meal_count(),
        xml: feed.to_xml(),
        warnings,
    })
}

fn parse_week_page(
    fetcher: &Fetcher,
    parser: &WeekParser,
    url: &str,
    meal_period: &str,
    legend: &Legend,
    feed: &mut FeedBuilder,
    warnings: &mut Vec<ParseWarning>,
) -> anyhow::Result<()> {
    let html = fetcher.get_text(url)?;
    let page_warnings = parser
        .parse(&html, meal_period, legend, |meal| feed.add_meal(meal))
        .with_context(|| format!("parse week page: {url}"))?;
    warnings.extend(page_warnings);
    Ok(())
}

fn derive_legend_url(url_base: &str) -> Result<String, ScrapeError> {
    let Some(position) = url_base.find(LEGEND_BASE_SEGMENT) else {
        return Err(ScrapeError::LegendUrl {
            url: url_base.to_owned(),
        });
    };
    let prefix = &url_base[..position + LEGEND_BASE_SEGMENT.len()];
    Ok(format!("{prefix}{LEGEND_PAGE}"))
}

pub fn run(args: FeedArgs) -> anyhow::Result<()> {
    let (city, canteen) = registry::find(&args.city, &args.canteen)
        .ok_or_else(|| anyhow::anyhow!("unknown canteen: {}/{}", args.city, args.canteen))?;

    let url_base = args
        .url
        .clone()
        .unwrap_or_else(|| registry::url_base(city, canteen));
    let mut options = registry::options_for(city, canteen, args.today);
    if args.legend_url.is_some() {
        options.legend_url = args.legend_url.clone();
    }

    let fetcher = Fetcher::new()?;
    let report = build_feed(&fetcher, &url_base, canteen.meal_period, &options)?;
    tracing::info!(
        canteen = %args.canteen,
        meals = report.meals,
        warnings = report.warnings.len(),
        "built feed"
    );

    match &args.out {
        Some(path) => std::fs::write(path, &report.xml)
            .with_context(|| format!("write feed: {path}"))?,
        None => print!("{}", report.xml),
    }
    Ok(())
}
