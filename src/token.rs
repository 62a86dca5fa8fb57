//! Country hints carried as a `.<code>` suffix on bearer tokens.
//!
//! Operators annotate tokens locally (for example `eyJ...abc.wr`) so the tester can
//! pre-fill the `country` filter. The annotation is removed again before the token is
//! sent.
//!
//! Two separate code lists exist. [`COUNTRY_CODES`] drives inference and
//! [`STRIPPED_SUFFIXES`] drives removal; the second one only covers part of the first,
//! so a token ending in `.rf`, `.eht` or `.bl` infers a country but is sent unchanged.
//! The lists are kept apart until the intended set is confirmed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Inference table: trailing code -> country name.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("wr", "Rwanda"),
    ("hg", "Ghana"),
    ("bg", "Gabon"),
    ("cd", "DRC"),
    ("rf", "France"),
    ("eht", "Ethiopia"),
    ("bl", "Libya"),
];

/// Suffixes removed from the token before it goes on the wire.
pub const STRIPPED_SUFFIXES: &[&str] = &["wr", "hg", "bg", "cd"];

static TRAILING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([A-Za-z]{2,3})$").expect("valid trailing code regex"));

static STRIPPABLE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    let alternatives = STRIPPED_SUFFIXES.join("|");
    Regex::new(&format!(r"(?i)^(.+?)(?:\.(?:{}))+$", alternatives))
        .expect("valid suffix regex")
});

/// Country name for a token's trailing `.<code>`, if the code is known.
pub fn infer_country(token: &str) -> Option<&'static str> {
    let caps = TRAILING_CODE.captures(token.trim())?;
    let code = caps[1].to_ascii_lowercase();
    COUNTRY_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, country)| *country)
}

/// Token with any trailing recognised suffixes removed.
///
/// Repeated suffixes (`abc.wr.wr`) are removed together, so the result is stable
/// under repeated application. Matching ignores surrounding whitespace the same way
/// [`infer_country`] does, so a token that infers a country is also stripped.
pub fn strip_country_suffix(token: &str) -> String {
    match STRIPPABLE_SUFFIX.captures(token.trim()) {
        Some(caps) => caps[1].to_string(),
        None => token.to_string(),
    }
}
