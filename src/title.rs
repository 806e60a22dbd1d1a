//! Title extraction from generated HTML.
//!
//! The generator is asked to format articles as HTML, and the publishing
//! platform wants the title as a separate field, so the document title has
//! to be pulled back out of the markup. The scan is a small state machine
//! driven by the tag-event stream from [`quick_xml`]: a `<title>` start tag
//! flips it into [`ScanState::Recording`], text events append while
//! recording, and the matching end tag commits whatever accumulated.
//!
//! Generated markup is not guaranteed to be well formed, so the reader is
//! configured to tolerate mismatched end tags and dangling ampersands, any
//! read error simply ends the scan, and a document without a title element
//! yields an empty string rather than an error.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

/// Scanner state: nesting is tracked only for the `title` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Recording,
}

/// Extract the text of the document's `<title>` element.
///
/// Text encountered while recording is concatenated, so a title split
/// across several text events comes back whole. When the document contains
/// more than one title element (malformed, but generators do produce it),
/// recording toggles per start/end pair in document order and the last
/// committed title wins.
///
/// Returns an empty string when no title element is present.
pub fn extract_title(html: &str) -> String {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_dangling_amp = true;

    let mut state = ScanState::Idle;
    let mut acc = String::new();
    let mut title = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref().eq_ignore_ascii_case(b"title") => {
                state = ScanState::Recording;
                acc.clear();
            }
            Ok(Event::End(e)) if e.local_name().as_ref().eq_ignore_ascii_case(b"title") => {
                if state == ScanState::Recording {
                    title = std::mem::take(&mut acc);
                    state = ScanState::Idle;
                }
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref().eq_ignore_ascii_case(b"title") => {
                title.clear();
            }
            Ok(Event::Text(t)) if state == ScanState::Recording => {
                acc.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Ok(Event::CData(c)) if state == ScanState::Recording => {
                acc.push_str(&String::from_utf8_lossy(c.as_ref()));
            }
            Ok(Event::GeneralRef(r)) if state == ScanState::Recording => {
                if let Some(ch) = resolve_reference(r.as_ref()) {
                    acc.push(ch);
                }
            }
            Ok(Event::Eof) => {
                // An unterminated title still counts for what it captured.
                if state == ScanState::Recording && !acc.is_empty() {
                    title = acc;
                }
                break;
            }
            Err(e) => {
                warn!(error = %e, "HTML scan stopped early");
                if state == ScanState::Recording && !acc.is_empty() {
                    title = acc;
                }
                break;
            }
            _ => {}
        }
    }

    debug!(title = %title, "Extracted document title");
    title
}

/// Resolve the predefined XML entities and numeric character references.
/// Anything else (HTML named entities like `&nbsp;`) is dropped.
fn resolve_reference(raw: &[u8]) -> Option<char> {
    match raw {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"apos" => Some('\''),
        b"quot" => Some('"'),
        [b'#', b'x' | b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|s| u32::from_str_radix(s, 16).ok())
            .and_then(char::from_u32),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .and_then(char::from_u32),
        _ => None,
    }
}
