//! Date helpers for the site's DD/MM/YY strings.
//!
//! Deck dates are never parsed into calendar types; ordering and range
//! checks work on a YYMMDD transposition, and anything malformed degrades
//! instead of failing.

/// Reorder `DD/MM/YY` into a sortable `YYMMDD` string. Inputs that do not
/// split into three parts come back unchanged.
pub fn date_sortkey(date: &str) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    if let [dd, mm, yy] = parts.as_slice() {
        format!("{yy}{mm}{dd}")
    } else {
        date.to_string()
    }
}

/// Numeric form of the sortkey; malformed dates sort as 0 (oldest).
pub fn sortkey_value(date: &str) -> i64 {
    date_sortkey(date).parse().unwrap_or(0)
}

/// Inclusive range check on DD/MM/YY strings.
///
/// A deck date that does not parse always passes; a bound that does not
/// parse is ignored.
pub fn date_in_range(date: &str, from: Option<&str>, to: Option<&str>) -> bool {
    let val: i64 = match date_sortkey(date).parse() {
        Ok(v) => v,
        Err(_) => return true,
    };
    if let Some(from) = from {
        if let Ok(lo) = date_sortkey(from).parse::<i64>() {
            if val < lo {
                return false;
            }
        }
    }
    if let Some(to) = to {
        if let Ok(hi) = date_sortkey(to).parse::<i64>() {
            if val > hi {
                return false;
            }
        }
    }
    true
}
