use chrono::NaiveDate;
use mensa_on::error::{LegendKind, ParseWarning, ScrapeError};
use mensa_on::feed::Meal;
use mensa_on::legend::Legend;
use mensa_on::week::WeekParser;

fn legend_with(allergens: &[(&str, &str)], additives: &[(&str, &str)]) -> Legend {
    let mut legend = Legend::default();
    for (code, description) in allergens {
        legend
            .allergens
            .insert((*code).to_owned(), (*description).to_owned());
    }
    for (code, description) in additives {
        legend
            .additives
            .insert((*code).to_owned(), (*description).to_owned());
    }
    legend
}

fn parse(
    html: &str,
    meal_period: &str,
    legend: &Legend,
) -> Result<(Vec<Meal>, Vec<ParseWarning>), ScrapeError> {
    let parser = WeekParser::new();
    let mut meals = Vec::new();
    let warnings = parser.parse(html, meal_period, legend, |meal| meals.push(meal))?;
    Ok((meals, warnings))
}

fn day_table(caption: &str, rows: &str) -> String {
    format!(
        "<table class=\"day-menu-table\">\
         <tr><th class=\"day-menu-head\">{caption}</th></tr>{rows}</table>"
    )
}

fn page(tables: &str) -> String {
    format!("<html><body>{tables}</body></html>")
}

fn meal_row(category: &str, name: &str, icons: &str) -> String {
    format!(
        "<tr><td>{category}</td><td>{name}</td><td>{icons}</td>\
         <td>2,50 €</td><td>3,50 €</td><td>4,50 €</td></tr>"
    )
}

#[test]
fn emits_one_meal_with_resolved_notes_and_raw_prices() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row(
            "Hauptgericht (2)",
            "Nudelauflauf",
            "<img title=\"Allergene:ABC\">",
        ),
    ));
    let legend = legend_with(&[("ABC", "Gluten")], &[]);

    let (meals, warnings) = parse(&html, "Mittagsmensa", &legend)?;

    assert!(warnings.is_empty());
    assert_eq!(meals.len(), 1);
    let meal = &meals[0];
    assert_eq!(meal.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(meal.category, "Hauptgericht");
    assert_eq!(meal.name, "Nudelauflauf");
    assert_eq!(meal.notes, vec!["Gluten"]);
    assert_eq!(meal.prices.student, "2,50 €");
    assert_eq!(meal.prices.employee, "3,50 €");
    assert_eq!(meal.prices.other, "4,50 €");
    Ok(())
}

#[test]
fn category_without_annotation_is_unchanged() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row("Suppe", "Linsensuppe", ""),
    ));

    let (meals, _) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals[0].category, "Suppe");
    Ok(())
}

#[test]
fn continuation_row_merges_into_the_preceding_meal() -> anyhow::Result<()> {
    let rows = format!(
        "{}<tr><td> </td><td><img title=\"Schwein\"><img title=\"enthält Knoblauch\"></td></tr>",
        meal_row(
            "Hauptgericht",
            "Schnitzel",
            "<img title=\"Allergene:ABC\">"
        )
    );
    let html = page(&day_table("Mittagsmensa Montag, 01.01.2024", &rows));
    let legend = legend_with(&[("ABC", "Gluten")], &[]);

    let (meals, warnings) = parse(&html, "Mittagsmensa", &legend)?;

    assert!(warnings.is_empty());
    assert_eq!(meals.len(), 1, "continuation row must not become a meal");
    // Continuation titles come verbatim, after the parent row's notes.
    assert_eq!(meals[0].notes, vec!["Gluten", "Schwein", "enthält Knoblauch"]);
    Ok(())
}

#[test]
fn only_sections_matching_the_meal_period_are_parsed() -> anyhow::Result<()> {
    let tables = format!(
        "{}{}",
        day_table(
            "Mittagsmensa Montag, 01.01.2024",
            &meal_row("Hauptgericht", "Nudelauflauf", ""),
        ),
        day_table(
            "Abendmensa Montag, 01.01.2024",
            &meal_row("Hauptgericht", "Abendbrot", ""),
        )
    );
    let html = page(&tables);

    let (meals, _) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].name, "Nudelauflauf");
    Ok(())
}

#[test]
fn unknown_icon_kind_warns_and_parsing_continues() -> anyhow::Result<()> {
    let rows = format!(
        "{}{}",
        meal_row("Hauptgericht", "Nudelauflauf", "<img title=\"Farbe:Rot\">"),
        meal_row("Suppe", "Linsensuppe", "")
    );
    let html = page(&day_table("Mittagsmensa Montag, 01.01.2024", &rows));

    let (meals, warnings) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals.len(), 2);
    assert!(meals[0].notes.is_empty());
    assert_eq!(
        warnings,
        vec![ParseWarning::UnrecognizedIcon {
            kind: "Farbe".to_owned(),
            title: "Farbe:Rot".to_owned(),
        }]
    );
    Ok(())
}

#[test]
fn missing_legend_code_aborts_the_page() {
    let rows = format!(
        "{}{}",
        meal_row(
            "Hauptgericht",
            "Nudelauflauf",
            "<img title=\"Allergene:XYZ\">"
        ),
        meal_row("Suppe", "Linsensuppe", "")
    );
    let html = page(&day_table("Mittagsmensa Montag, 01.01.2024", &rows));

    let parser = WeekParser::new();
    let mut meals = Vec::new();
    let err = parser
        .parse(&html, "Mittagsmensa", &Legend::default(), |meal| {
            meals.push(meal)
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::LegendLookup {
            kind: LegendKind::Allergen,
            ref code,
        } if code == "XYZ"
    ));
    assert!(meals.is_empty(), "no meal from the failing or later rows");
}

#[test]
fn additive_codes_resolve_with_surrounding_whitespace() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row(
            "Hauptgericht",
            "Currywurst",
            "<img title=\"Zusatzstoffe:2, 9\">",
        ),
    ));
    let legend = legend_with(&[], &[("2", "Farbstoff"), ("9", "Süßungsmittel")]);

    let (meals, _) = parse(&html, "Mittagsmensa", &legend)?;

    assert_eq!(meals[0].notes, vec!["Farbstoff", "Süßungsmittel"]);
    Ok(())
}

#[test]
fn colonless_icon_titles_lose_their_contains_prefix() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row(
            "Hauptgericht",
            "Zigeunerschnitzel",
            "<img title=\"enthält Knoblauch\"><img title=\"Schwein\">",
        ),
    ));

    let (meals, _) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals[0].notes, vec!["Knoblauch", "Schwein"]);
    Ok(())
}

#[test]
fn program_link_prepends_the_program_note() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row(
            "Hauptgericht",
            "<a href=\"http://www.stw-on.de/mensavital\">Gemüsepfanne</a>",
            "<img title=\"Allergene:ABC\">",
        ),
    ));
    let legend = legend_with(&[("ABC", "Gluten")], &[]);

    let (meals, _) = parse(&html, "Mittagsmensa", &legend)?;

    assert_eq!(meals[0].name, "Gemüsepfanne");
    assert_eq!(meals[0].notes, vec!["MensaVital", "Gluten"]);
    Ok(())
}

#[test]
fn untitled_icons_warn_but_do_not_note() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        &meal_row("Hauptgericht", "Nudelauflauf", "<img src=\"pork.png\">"),
    ));

    let (meals, warnings) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert!(meals[0].notes.is_empty());
    assert_eq!(warnings, vec![ParseWarning::UntitledIcon]);
    Ok(())
}

#[test]
fn rows_without_cells_are_skipped() -> anyhow::Result<()> {
    let rows = format!(
        "<tr><th>Beilagen</th></tr>{}",
        meal_row("Beilage", "Reis", "")
    );
    let html = page(&day_table("Mittagsmensa Montag, 01.01.2024", &rows));

    let (meals, _) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].name, "Reis");
    Ok(())
}

#[test]
fn short_data_rows_are_fatal() {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        "<tr><td>Hauptgericht</td><td>Nudelauflauf</td><td></td></tr>",
    ));

    let err = parse(&html, "Mittagsmensa", &Legend::default()).unwrap_err();

    assert!(matches!(err, ScrapeError::MalformedRow { cells: 3, .. }));
}

#[test]
fn matching_caption_without_date_is_fatal() {
    let html = page(&day_table(
        "Mittagsmensa Montag",
        &meal_row("Hauptgericht", "Nudelauflauf", ""),
    ));

    let err = parse(&html, "Mittagsmensa", &Legend::default()).unwrap_err();

    assert!(matches!(err, ScrapeError::CaptionDate { .. }));
}

#[test]
fn non_matching_sections_are_skipped_before_date_extraction() -> anyhow::Result<()> {
    // A dateless caption for another meal period must not abort the page.
    let html = page(&day_table(
        "Abendmensa Montag",
        &meal_row("Hauptgericht", "Abendbrot", ""),
    ));

    let (meals, warnings) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert!(meals.is_empty());
    assert!(warnings.is_empty());
    Ok(())
}

#[test]
fn blank_category_and_name_rows_are_still_emitted() -> anyhow::Result<()> {
    let html = page(&day_table(
        "Mittagsmensa Montag, 01.01.2024",
        "<tr><td></td><td></td><td></td><td></td><td></td><td></td></tr>",
    ));

    let (meals, _) = parse(&html, "Mittagsmensa", &Legend::default())?;

    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].category, "");
    assert_eq!(meals[0].name, "");
    Ok(())
}
