use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::date::extract_date;
use crate::error::{LegendKind, MEAL_ROW_CELLS, ParseWarning, ScrapeError};
use crate::feed::{Meal, Prices};
use crate::legend::Legend;

/// Meals whose name cell links here belong to the operator's MensaVital
/// dietary program.
const MENSA_VITAL_URL: &str = "http://www.stw-on.de/mensavital";
const MENSA_VITAL_NOTE: &str = "MensaVital";

/// Leading phrase on colon-less icon titles ("enthält Knoblauch").
const CONTAINS_PREFIX: &str = "enthält ";

const ALLERGEN_KIND: &str = "Allergene";
const ADDITIVE_KIND: &str = "Zusatzstoffe";

/// Parser for one operator week page: a `day-menu-table` per day, a
/// `day-menu-head` caption cell naming date and meal period, and rows of
/// six cells (category, name, icons, three prices).
pub struct WeekParser {
    day_table: Selector,
    day_head: Selector,
    row: Selector,
    cell: Selector,
    icon: Selector,
    program_link: Selector,
    category_note: Regex,
}

impl WeekParser {
    pub fn new() -> Self {
        Self {
            day_table: Selector::parse("table.day-menu-table").expect("day table selector"),
            day_head: Selector::parse("th.day-menu-head").expect("day head selector"),
            row: Selector::parse("tr").expect("row selector"),
            cell: Selector::parse("td").expect("cell selector"),
            icon: Selector::parse("img").expect("icon selector"),
            program_link: Selector::parse(&format!("a[href=\"{MENSA_VITAL_URL}\"]"))
                .expect("program link selector"),
            category_note: Regex::new(r" \(\d\)").expect("category note pattern"),
        }
    }

    /// Walks every day section whose caption contains `meal_period`,
    /// emitting meals in document order. Warnings collect the non-fatal
    /// oddities; every error aborts the whole page.
    pub fn parse(
        &self,
        html: &str,
        meal_period: &str,
        legend: &Legend,
        mut emit: impl FnMut(Meal),
    ) -> Result<Vec<ParseWarning>, ScrapeError> {
        let document = Html::parse_document(html);
        let mut warnings = Vec::new();

        for table in document.select(&self.day_table) {
            let Some(head) = table.select(&self.day_head).next() else {
                continue;
            };
            let caption = text_of(head);
            if !caption.contains(meal_period) {
                continue;
            }
            let date = extract_date(&caption).ok_or_else(|| ScrapeError::CaptionDate {
                caption: caption.trim().to_owned(),
            })?;

            self.parse_day(table, date, legend, &mut emit, &mut warnings)?;
        }

        Ok(warnings)
    }

    fn parse_day(
        &self,
        table: ElementRef,
        date: NaiveDate,
        legend: &Legend,
        emit: &mut impl FnMut(Meal),
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ScrapeError> {
        let rows: Vec<ElementRef> = table.select(&self.row).collect();

        let mut pos = 0;
        while pos < rows.len() {
            let cells: Vec<ElementRef> = rows[pos].select(&self.cell).collect();
            pos += 1;

            // Sub-headings and the caption row carry no data cells.
            if cells.is_empty() {
                continue;
            }
            if cells.len() < MEAL_ROW_CELLS {
                return Err(ScrapeError::MalformedRow {
                    date,
                    cells: cells.len(),
                });
            }

            let category = self
                .category_note
                .replace_all(text_of(cells[0]).trim(), "")
                .into_owned();
            let name = text_of(cells[1]).trim().to_owned();

            let mut notes = Vec::new();
            if cells[1].select(&self.program_link).next().is_some() {
                notes.push(MENSA_VITAL_NOTE.to_owned());
            }
            self.resolve_icons(cells[2], legend, &mut notes, warnings)?;

            let prices = Prices {
                student: text_of(cells[3]),
                employee: text_of(cells[4]),
                other: text_of(cells[5]),
            };

            // A following row whose first cell is blank only carries extra
            // note icons for this meal; consume it instead of emitting it.
            if let Some(next) = rows.get(pos) {
                let next_cells: Vec<ElementRef> = next.select(&self.cell).collect();
                let continues = next_cells
                    .first()
                    .is_some_and(|cell| text_of(*cell).trim().is_empty());
                if continues {
                    if let Some(icon_cell) = next_cells.get(1) {
                        for icon in icon_cell.select(&self.icon) {
                            match icon.value().attr("title") {
                                Some(title) => notes.push(title.to_owned()),
                                None => warnings.push(ParseWarning::UntitledIcon),
                            }
                        }
                    }
                    pos += 1;
                }
            }

            emit(Meal {
                date,
                category,
                name,
                notes,
                prices,
            });
        }

        Ok(())
    }

    fn resolve_icons(
        &self,
        cell: ElementRef,
        legend: &Legend,
        notes: &mut Vec<String>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ScrapeError> {
        for icon in cell.select(&self.icon) {
            let Some(title) = icon.value().attr("title") else {
                warnings.push(ParseWarning::UntitledIcon);
                continue;
            };

            match title.split_once(':') {
                Some((kind, codes)) if kind == ALLERGEN_KIND => {
                    resolve_codes(codes, LegendKind::Allergen, |code| legend.allergen(code), notes)?;
                }
                Some((kind, codes)) if kind == ADDITIVE_KIND => {
                    resolve_codes(codes, LegendKind::Additive, |code| legend.additive(code), notes)?;
                }
                Some((kind, _)) => {
                    warnings.push(ParseWarning::UnrecognizedIcon {
                        kind: kind.to_owned(),
                        title: title.to_owned(),
                    });
                }
                None => {
                    let note = title.strip_prefix(CONTAINS_PREFIX).unwrap_or(title);
                    notes.push(note.to_owned());
                }
            }
        }

        Ok(())
    }
}

impl Default for WeekParser {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_codes<'a>(
    codes: &str,
    kind: LegendKind,
    resolve: impl Fn(&str) -> Option<&'a str>,
    notes: &mut Vec<String>,
) -> Result<(), ScrapeError> {
    for code in codes.split(',') {
        let description = resolve(code).ok_or_else(|| ScrapeError::LegendLookup {
            kind,
            code: code.trim().to_owned(),
        })?;
        notes.push(description.to_owned());
    }
    Ok(())
}

// Concatenated text of every text node under the element.
fn text_of(node: ElementRef) -> String {
    node.text().collect::<String>()
}
