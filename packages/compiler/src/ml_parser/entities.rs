//! HTML character references.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static NAMED_ENTITIES: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    [
        ("amp", '&'),
        ("lt", '<'),
        ("gt", '>'),
        ("quot", '"'),
        ("apos", '\''),
        ("nbsp", '\u{00A0}'),
        ("copy", '\u{00A9}'),
        ("reg", '\u{00AE}'),
        ("trade", '\u{2122}'),
        ("hellip", '\u{2026}'),
        ("mdash", '\u{2014}'),
        ("ndash", '\u{2013}'),
        ("laquo", '\u{00AB}'),
        ("raquo", '\u{00BB}'),
        ("lsquo", '\u{2018}'),
        ("rsquo", '\u{2019}'),
        ("ldquo", '\u{201C}'),
        ("rdquo", '\u{201D}'),
        ("middot", '\u{00B7}'),
        ("times", '\u{00D7}'),
        ("divide", '\u{00F7}'),
        ("euro", '\u{20AC}'),
        ("ngsp", '\u{E500}'),
    ]
    .into_iter()
    .collect()
});

static ENTITY_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([a-zA-Z][a-zA-Z0-9]*));").expect("valid entity regex")
});

/// Error for a character reference that does not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntity(pub String);

/// Decodes named and numeric character references in `text`. Unknown names
/// are left in place and reported.
pub fn decode_entities(text: &str) -> (String, Vec<UnknownEntity>) {
    if !text.contains('&') {
        return (text.to_string(), Vec::new());
    }
    let mut unknown = Vec::new();
    let decoded = ENTITY_REGEXP.replace_all(text, |caps: &Captures| {
        let decoded = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else {
            caps.get(3).and_then(|name| NAMED_ENTITIES.get(name.as_str()).copied())
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => {
                unknown.push(UnknownEntity(caps[0].to_string()));
                caps[0].to_string()
            }
        }
    });
    (decoded.into_owned(), unknown)
}
