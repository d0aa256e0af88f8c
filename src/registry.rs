use anyhow::Context as _;
use serde::Serialize;

use crate::build::{BuildOptions, LEGEND_BASE_SEGMENT, LEGEND_PAGE, NextWeek};
use crate::cli::CanteensArgs;

const OPERATOR_BASE: &str = "http://www.stw-on.de";

/// Per-city next-week handling when a canteen has no suffix of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextWeekOverride {
    /// The city publishes no coming-week pages.
    Skip,
    /// The city uses a non-standard coming-week URL suffix.
    Suffix(&'static str),
}

#[derive(Debug)]
pub struct City {
    pub name: &'static str,
    /// Path between "essen/" and the canteen segment.
    pub prefix: &'static str,
    pub legend_url: Option<&'static str>,
    pub next_week: Option<NextWeekOverride>,
    pub canteens: &'static [Canteen],
}

#[derive(Debug)]
pub struct Canteen {
    pub key: &'static str,
    pub path: &'static str,
    pub meal_period: &'static str,
    pub this_week: &'static str,
    pub next_week: Option<&'static str>,
}

impl Canteen {
    const fn new(key: &'static str, path: &'static str) -> Self {
        Self {
            key,
            path,
            meal_period: "Mittagsmensa",
            this_week: "",
            next_week: None,
        }
    }

    const fn with_period(
        key: &'static str,
        path: &'static str,
        meal_period: &'static str,
    ) -> Self {
        Self {
            key,
            path,
            meal_period,
            this_week: "",
            next_week: None,
        }
    }
}

pub const CITIES: &[City] = &[
    City {
        name: "braunschweig",
        prefix: "menus/",
        legend_url: Some(
            "http://www.stw-on.de/braunschweig/essen/wissenswertes/lebensmittelkennzeichnung",
        ),
        next_week: None,
        canteens: &[
            Canteen::with_period("mensa1-mittag", "mensa-1", "Mittagsmensa"),
            Canteen::with_period("mensa1-abend", "mensa-1", "Abendmensa"),
            Canteen {
                key: "mensa360",
                path: "360",
                meal_period: "Pizza",
                this_week: "-2",
                next_week: Some("-nachste-woche"),
            },
            Canteen::new("mensa2", "mensa-2"),
            Canteen::new("hbk", "mensa-hbk"),
        ],
    },
    City {
        name: "clausthal",
        prefix: "menus/mensa-",
        legend_url: None,
        next_week: Some(NextWeekOverride::Suffix("-kommend-woche")),
        canteens: &[Canteen::new("clausthal", "clausthal")],
    },
    City {
        name: "hildesheim",
        prefix: "menus/",
        legend_url: None,
        next_week: None,
        canteens: &[
            Canteen::new("uni", "mensa-uni"),
            Canteen::new("hohnsen", "mensa-hohnsen"),
            Canteen::with_period("luebecker-strasse", "luebecker-strasse", "Mittagsausgabe"),
        ],
    },
    City {
        name: "holzminden",
        prefix: "menus/mensa-",
        legend_url: None,
        next_week: Some(NextWeekOverride::Skip),
        canteens: &[Canteen::new("hawk", "hawk")],
    },
    City {
        name: "lueneburg",
        prefix: "speiseplaene/",
        legend_url: None,
        next_week: None,
        canteens: &[
            Canteen::new("campus", "mensa-campus"),
            Canteen::new("rotes-feld", "rotes-feld"),
        ],
    },
    City {
        name: "suderburg",
        prefix: "menus/mensa-",
        legend_url: None,
        next_week: None,
        canteens: &[Canteen::new("suderburg", "suderburg")],
    },
    City {
        name: "wolfenbuettel",
        prefix: "menus/mensa-",
        legend_url: None,
        next_week: None,
        canteens: &[Canteen::new("ostfalia", "ostfalia")],
    },
];

pub fn city(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.name == name)
}

pub fn find(city_name: &str, canteen_key: &str) -> Option<(&'static City, &'static Canteen)> {
    let city = city(city_name)?;
    let canteen = city.canteens.iter().find(|c| c.key == canteen_key)?;
    Some((city, canteen))
}

pub fn url_base(city: &City, canteen: &Canteen) -> String {
    format!(
        "{OPERATOR_BASE}/{}/{LEGEND_BASE_SEGMENT}{}{}",
        city.name, city.prefix, canteen.path
    )
}

pub fn legend_url(city: &City) -> String {
    match city.legend_url {
        Some(url) => url.to_owned(),
        None => format!("{OPERATOR_BASE}/{}/{LEGEND_BASE_SEGMENT}{LEGEND_PAGE}", city.name),
    }
}

/// Build options a canteen's registry entry resolves to. The per-canteen
/// suffix wins over the city override, which wins over the default
/// coming-week page.
pub fn options_for(city: &City, canteen: &Canteen, today: bool) -> BuildOptions {
    let next_week = match (canteen.next_week, city.next_week) {
        (Some(suffix), _) => NextWeek::Suffix(suffix.to_owned()),
        (None, Some(NextWeekOverride::Suffix(suffix))) => NextWeek::Suffix(suffix.to_owned()),
        (None, Some(NextWeekOverride::Skip)) => NextWeek::Skip,
        (None, None) => NextWeek::Include,
    };

    BuildOptions {
        today,
        this_week: canteen.this_week.to_owned(),
        next_week,
        legend_url: city.legend_url.map(str::to_owned),
    }
}

#[derive(Debug, Serialize)]
pub struct CanteenListing {
    pub id: String,
    pub meal_period: &'static str,
    pub url: String,
}

pub fn listings() -> Vec<CanteenListing> {
    let mut entries = Vec::new();
    for city in CITIES {
        for canteen in city.canteens {
            entries.push(CanteenListing {
                id: format!("{}/{}", city.name, canteen.key),
                meal_period: canteen.meal_period,
                url: url_base(city, canteen),
            });
        }
    }
    entries
}

pub fn run(args: CanteensArgs) -> anyhow::Result<()> {
    let entries = listings();

    if args.json {
        let json = serde_json::to_string_pretty(&entries).context("serialize canteen listing")?;
        println!("{json}");
        return Ok(());
    }

    for entry in entries {
        println!("{}\t{}\t{}", entry.id, entry.meal_period, entry.url);
    }
    Ok(())
}
