//! MusicXML rewriting for edited directions
//!
//! Streaming rewrite with quick-xml: everything outside `<direction>`
//! elements is copied through untouched, including the XML declaration and
//! DOCTYPE.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashSet;

use crate::error::{EditorError, Result};
use crate::models::edit::EditMap;

/// A buffered `<direction>` element
struct Direction<'a> {
    start: BytesStart<'a>,
    events: Vec<Event<'a>>,
    words: Option<String>,
}

impl<'a> Direction<'a> {
    fn attribute(&self, name: &[u8]) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == name)
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    fn placement(&self) -> String {
        self.attribute(b"placement").unwrap_or_else(|| "above".to_string())
    }

    fn set_attributes(&mut self, updates: &[(&str, String)]) {
        let keep: Vec<(Vec<u8>, Vec<u8>)> = self
            .start
            .attributes()
            .flatten()
            .filter(|a| !updates.iter().any(|(k, _)| a.key.as_ref() == k.as_bytes()))
            .map(|a| (a.key.as_ref().to_vec(), a.value.to_vec()))
            .collect();
        let mut start = BytesStart::new(String::from_utf8_lossy(self.start.name().as_ref()).into_owned());
        for (k, v) in &keep {
            start.push_attribute((k.as_slice(), v.as_slice()));
        }
        for (k, v) in updates {
            start.push_attribute((*k, v.as_str()));
        }
        self.start = start;
    }
}

/// What to do with each buffered direction
enum Verdict {
    Keep,
    Drop,
}

/// Stream `xml`, handing every `<direction>` to `decide`; `measure_start`
/// is called when a `<measure>` opens
fn rewrite_directions<D, M>(xml: &str, mut decide: D, mut measure_start: M) -> Result<String>
where
    D: FnMut(&mut Direction) -> Verdict,
    M: FnMut(),
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::new());

    let mut current: Option<Direction> = None;
    let mut depth = 0usize;
    let mut in_words = false;

    loop {
        let event = reader.read_event()?;
        if let Event::Eof = event {
            break;
        }

        if let Some(mut direction) = current.take() {
            let mut closes = false;
            match &event {
                Event::Start(e) => {
                    depth += 1;
                    in_words = e.name().as_ref() == b"words";
                }
                Event::End(e) => {
                    if e.name().as_ref() == b"words" {
                        in_words = false;
                    }
                    if e.name().as_ref() == b"direction" && depth == 0 {
                        closes = true;
                    } else {
                        depth = depth.saturating_sub(1);
                    }
                }
                Event::Text(t) if in_words => {
                    let text = t.unescape()?.into_owned();
                    direction.words.get_or_insert_with(String::new).push_str(&text);
                }
                _ => {}
            }

            if !closes {
                direction.events.push(event);
                current = Some(direction);
            } else if let Verdict::Keep = decide(&mut direction) {
                writer.write_event(Event::Start(direction.start))?;
                for buffered in direction.events {
                    writer.write_event(buffered)?;
                }
                writer.write_event(event)?;
            }
            continue;
        }

        match &event {
            Event::Start(e) if e.name().as_ref() == b"direction" => {
                current = Some(Direction {
                    start: e.clone(),
                    events: Vec::new(),
                    words: None,
                });
                depth = 0;
                in_words = false;
                continue;
            }
            Event::Start(e) if e.name().as_ref() == b"measure" => measure_start(),
            _ => {}
        }
        writer.write_event(event)?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| EditorError::Xml(e.to_string()))
}

/// Set `default-x`/`default-y` (tenths) on every `<direction>` whose words
/// appear in the id of an edited element
///
/// The first matching edit wins; directions without words are untouched.
pub fn apply_tenths_edits(xml: &str, edits: &EditMap) -> Result<String> {
    let mut applied = 0usize;
    let out = rewrite_directions(
        xml,
        |direction| {
            let Some(words) = direction.words.as_ref().map(|w| w.trim().to_string()) else {
                return Verdict::Keep;
            };
            if words.is_empty() {
                return Verdict::Keep;
            }
            if let Some((id, edit)) = edits.iter().find(|(id, _)| id.contains(&words)) {
                direction.set_attributes(&[
                    ("default-x", edit.x_tenths.to_string()),
                    ("default-y", edit.y_tenths.to_string()),
                ]);
                log::debug!("render: '{}' -> x={}, y={}", id, edit.x_tenths, edit.y_tenths);
                applied += 1;
            }
            Verdict::Keep
        },
        || {},
    )?;
    log::info!("render: tenths applied to {} direction(s)", applied);
    Ok(out)
}

/// Drop `<direction>`s repeating the words and placement of an earlier one
/// in the same measure
pub fn dedupe_direction_words(xml: &str) -> Result<String> {
    let seen = std::cell::RefCell::new(HashSet::<(String, String)>::new());
    let mut removed = 0usize;
    let out = rewrite_directions(
        xml,
        |direction| {
            let Some(words) = direction.words.as_ref() else {
                return Verdict::Keep;
            };
            let signature = (words.trim().to_string(), direction.placement());
            if seen.borrow_mut().insert(signature) {
                Verdict::Keep
            } else {
                removed += 1;
                Verdict::Drop
            }
        },
        || seen.borrow_mut().clear(),
    )?;
    log::info!("render: {} duplicate direction(s) removed", removed);
    Ok(out)
}
