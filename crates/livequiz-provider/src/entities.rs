//! HTML entity decoding for provider payloads.
//!
//! The Open Trivia Database serves question and answer text with HTML
//! entities baked in (`&quot;`, `&#039;`, `&eacute;`, ...). Participants
//! see this text verbatim, so it gets decoded once, at fetch time.

/// Decodes the named and numeric HTML entities that appear in trivia
/// payloads. Unknown entities are left as-is rather than dropped.
pub fn decode_html_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        // Byte search keeps multibyte text safe; ';' is ASCII.
        let Some(end) = rest.bytes().take(12).position(|b| b == b';') else {
            // No terminator in range: not an entity.
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..end];
        match decode_entity(entity) {
            Some(decoded) => out.push(decoded),
            None => out.push_str(&rest[..=end]),
        }
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(num, 16).ok().and_then(char::from_u32);
    }
    if let Some(num) = entity.strip_prefix('#') {
        return num.parse::<u32>().ok().and_then(char::from_u32);
    }

    // The named entities OpenTDB actually emits.
    let decoded = match entity {
        "quot" => '"',
        "apos" => '\'',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{a0}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "eacute" => 'é',
        "egrave" => 'è',
        "agrave" => 'à',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "auml" => 'ä',
        "ntilde" => 'ñ',
        "ccedil" => 'ç',
        "aring" => 'å',
        "oslash" => 'ø',
        "deg" => '°',
        "pound" => '£',
        "euro" => '€',
        _ => return None,
    };
    Some(decoded)
}
