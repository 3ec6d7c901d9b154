//! HTML parsers for mtgtop8 pages.
//!
//! Pure functions from page HTML to structured records. Every DOM class
//! name, URL pattern, and markup quirk of the site lives here so a site
//! redesign only touches this file.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::{normalize_split_name, CardLine, Deck, Event, Rank};

/// One parsed page of the format listing.
#[derive(Debug, Clone)]
pub struct FormatPage {
    /// Dated event rows in listing order. Duplicate ids are kept; the
    /// caller tracks which ids it has already seen across pages.
    pub events: Vec<Event>,

    /// Whether the page links to `cp=<next_page>`.
    pub has_next: bool,
}

/// Parse a format listing page.
///
/// Rows without a trailing DD/MM/YY date cell are upcoming events and
/// are skipped. `next_page` is the `cp` value to probe for when deciding
/// whether another page exists.
pub fn parse_format_page(html: &str, format_id: &str, next_page: u32) -> FormatPage {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    let link_sel = Selector::parse("a").unwrap();

    let event_href_re = Regex::new(r"event\?e=\d+").unwrap();
    let event_id_re = Regex::new(r"e=(\d+)").unwrap();
    let date_re = Regex::new(r"^\d{2}/\d{2}/\d{2}$").unwrap();
    let new_suffix_re = Regex::new(r"\s*NEW\s*$").unwrap();

    let mut events = Vec::new();
    for row in document.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.len() < 2 {
            continue;
        }

        let Some(link) = row.select(&link_sel).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|h| event_href_re.is_match(h))
        }) else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or("");
        let Some(event_id) = event_id_re
            .captures(href)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        else {
            continue;
        };

        // The event name is the link's whole cell, which may carry extra
        // markup like the "NEW" badge.
        let name_cell = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "td");
        let raw_name = match name_cell {
            Some(cell) => collapse_ws(&cell.text().collect::<String>()),
            None => collapse_ws(&link.text().collect::<String>()),
        };
        let name = new_suffix_re.replace(&raw_name, "").into_owned();

        let Some(date) = cells
            .iter()
            .rev()
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .find(|text| date_re.is_match(text))
        else {
            continue;
        };

        events.push(Event::new(event_id, format_id).with_name(name).with_date(date));
    }

    let next_marker = format!("cp={}", next_page);
    let has_next = document.select(&link_sel).any(|a| {
        a.value()
            .attr("href")
            .is_some_and(|h| h.contains(&next_marker))
    });

    FormatPage { events, has_next }
}

/// Parse an event page and return its deck ids in listing order.
pub fn parse_event_page(html: &str, event_id: u64) -> Vec<u64> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse("a").unwrap();
    let deck_href_re = Regex::new(&format!(r"e={}&d=\d+", event_id)).unwrap();
    let deck_id_re = Regex::new(r"d=(\d+)").unwrap();

    let mut deck_ids: Vec<u64> = Vec::new();
    for link in document.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !deck_href_re.is_match(href) {
            continue;
        }
        let Some(deck_id) = deck_id_re
            .captures(href)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        else {
            continue;
        };
        if !deck_ids.contains(&deck_id) {
            deck_ids.push(deck_id);
        }
    }
    deck_ids
}

/// Everything parsed from a single deck page.
#[derive(Debug, Clone, Default)]
pub struct DeckPage {
    pub name: String,
    pub player: String,
    pub event_name: String,
    pub date: String,
    pub rank: Rank,
    pub player_count: u32,
    pub mainboard: Vec<CardLine>,
    pub sideboard: Vec<CardLine>,
    pub commanders: Vec<String>,
    pub archetype: Option<String>,
}

impl DeckPage {
    /// Attach site ids and apply the site's fallback values.
    pub fn into_deck(self, deck_id: u64, event_id: u64, format_id: &str) -> Deck {
        Deck {
            deck_id,
            event_id,
            format_id: format_id.to_string(),
            name: non_empty_or(self.name, "Unknown"),
            player: non_empty_or(self.player, "Unknown"),
            event_name: non_empty_or(self.event_name, "Unknown"),
            date: self.date,
            rank: self.rank,
            player_count: self.player_count,
            mainboard: self.mainboard,
            sideboard: self.sideboard,
            commanders: self.commanders,
            archetype: self.archetype,
        }
    }
}

/// Parse a deck page.
pub fn parse_deck_page(html: &str) -> DeckPage {
    let document = Html::parse_document(html);
    let mut page = DeckPage::default();

    let player_sel = Selector::parse("a.player_big").unwrap();
    if let Some(el) = document.select(&player_sel).next() {
        page.player = el.text().collect::<String>().trim().to_string();
    }

    // The page title reads "<deck> - <player> @ mtgtop8.com".
    let title_sel = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&title_sel).next() {
        let title = el.text().collect::<String>();
        let title_re = Regex::new(r"^(.+)\s+-\s+(.+?)\s*@\s*mtgtop8\.com").unwrap();
        if let Some(caps) = title_re.captures(&title) {
            page.name = caps[1].trim().to_string();
            if page.player.is_empty() {
                page.player = caps[2].trim().to_string();
            }
        } else if let Some((name, rest)) = title.rsplit_once(" - ") {
            page.name = name.trim().to_string();
            if page.player.is_empty() {
                page.player = rest.replace("@ mtgtop8.com", "").trim().to_string();
            }
        }
    }

    // Field size and date sit in free text, not in any addressable node.
    let full_text = document.root_element().text().collect::<String>();
    let players_re = Regex::new(r"(\d+)\s*players\s*-\s*(\d{2}/\d{2}/\d{2})").unwrap();
    if let Some(caps) = players_re.captures(&full_text) {
        page.player_count = caps[1].parse().unwrap_or(0);
        page.date = caps[2].to_string();
    }

    // The deck's own row in the standings strip is highlighted with
    // chosen_tr; its S14 cell holds the finishing bracket.
    let chosen_sel = Selector::parse("div.chosen_tr").unwrap();
    let s14_sel = Selector::parse("div.S14").unwrap();
    if let Some(chosen) = document.select(&chosen_sel).next() {
        for el in chosen.select(&s14_sel) {
            let text = el.text().collect::<String>();
            let rank = Rank::parse(text.trim());
            if rank != Rank::Unranked {
                page.rank = rank;
                break;
            }
        }
    }

    // Archetype link text reads like "UR Aggro decks".
    let link_sel = Selector::parse("a").unwrap();
    let decks_suffix_re = Regex::new(r"\s+decks$").unwrap();
    if let Some(el) = document.select(&link_sel).find(|a| {
        a.value()
            .attr("href")
            .is_some_and(|h| h.contains("archetype?a="))
    }) {
        let text = el.text().collect::<String>();
        let archetype = decks_suffix_re.replace(text.trim(), "").into_owned();
        if !archetype.is_empty() {
            page.archetype = Some(archetype);
        }
    }

    let event_title_sel = Selector::parse("div.event_title").unwrap();
    if let Some(el) = document.select(&event_title_sel).next() {
        page.event_name = el.text().collect::<String>().trim().to_string();
    }

    // The list is a flat run of divs: "O14" section headers followed by
    // "deck_line" card rows. Walking every div in document order keeps
    // headers and their cards together. When a header is missing, card
    // div ids distinguish boards: md* mainboard, sb* sideboard.
    let div_sel = Selector::parse("div").unwrap();
    let icon_re = Regex::new(r"^\s*\u{E001}\s*").unwrap();
    let mut section = String::new();
    for div in document.select(&div_sel) {
        let classes = div.value().attr("class").unwrap_or("");
        if classes.is_empty() {
            continue;
        }

        if classes.split_whitespace().any(|c| c == "O14") {
            let raw = div.text().collect::<String>();
            let cleaned = icon_re.replace(raw.trim(), "");
            if let Some(detected) = detect_section(&cleaned) {
                section = detected;
            }
            continue;
        }

        if classes.contains("deck_line") {
            let text = collapse_ws(&div.text().collect::<String>());
            let Some(line) = parse_card_line(&text) else {
                continue;
            };
            let div_id = div.value().attr("id").unwrap_or("");
            if section == "COMMANDER" {
                page.commanders.push(line.card);
            } else if section == "COMPANION" || section == "SIDEBOARD" || div_id.starts_with("sb") {
                page.sideboard.push(line);
            } else {
                page.mainboard.push(line);
            }
        }
    }

    page
}

/// Parse a "N Card Name" line. Split card names are canonicalized on
/// the way in.
fn parse_card_line(text: &str) -> Option<CardLine> {
    let re = Regex::new(r"^(\d+)\s+(.+)$").unwrap();
    let caps = re.captures(text.trim())?;
    let qty: u32 = caps[1].parse().ok()?;
    let card = normalize_split_name(caps[2].trim());
    Some(CardLine::new(qty, card))
}

/// Section name when the text is a list section header, else `None`.
///
/// Headers may carry a leading quantity and a trailing card count, as in
/// "10 CREATURES" or "LANDS (38)".
fn detect_section(text: &str) -> Option<String> {
    let re = Regex::new(
        r"(?i)^(\d+\s+)?(COMMANDER|COMPANION|LANDS|CREATURES|INSTANTS\s+and\s+SORC\.|OTHER\s+SPELLS|SIDEBOARD)(\s*\(\d+\))?$",
    )
    .unwrap();
    re.captures(text.trim()).map(|caps| caps[2].to_uppercase())
}

fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
