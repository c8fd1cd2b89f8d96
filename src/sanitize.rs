// Sanitizer — span-based redaction of the original text.
//
// Applies every flag that carries both a position and a suggested
// replacement (profanity masks, PII placeholders). Overlapping spans
// keep the earliest; a span that runs past the text is ignored rather
// than trusted. Returns Some only when the output actually differs, so
// callers can test redaction by field presence.

use crate::models::{ModerationFlag, Span};

/// Produce a sanitized copy of `text` from the flags' redaction spans.
pub fn apply(text: &str, flags: &[ModerationFlag]) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    let mut redactions: Vec<(Span, &str)> = flags
        .iter()
        .filter_map(|f| match (&f.position, &f.suggested_replacement) {
            (Some(span), Some(replacement))
                if !span.is_empty() && span.end <= chars.len() =>
            {
                Some((*span, replacement.as_str()))
            }
            _ => None,
        })
        .collect();

    if redactions.is_empty() {
        return None;
    }

    redactions.sort_by_key(|(span, _)| (span.start, span.end));

    let mut selected: Vec<(Span, &str)> = Vec::with_capacity(redactions.len());
    let mut last_end = 0;
    for (span, replacement) in redactions {
        if span.start < last_end {
            continue;
        }
        last_end = span.end;
        selected.push((span, replacement));
    }

    let mut out = String::with_capacity(text.len());
    let mut next = 0;
    let mut i = 0;
    while i < chars.len() {
        if next < selected.len() && selected[next].0.start == i {
            out.push_str(selected[next].1);
            i = selected[next].0.end;
            next += 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    if out == text {
        None
    } else {
        Some(out)
    }
}
