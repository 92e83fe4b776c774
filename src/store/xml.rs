//! Reading and writing the `SignInList` document.
//!
//! ```xml
//! <SignInList>
//!   <Person lastName="Doe" firstName="Jane" role="Student">
//!     <Scans>
//!       <SignInEntry in="2025-01-11T18:00:00" out="2025-01-11T21:00:00"/>
//!     </Scans>
//!   </Person>
//! </SignInList>
//! ```
//!
//! Older files list single `<Scan direction="In" timestamp="..."/>` events
//! instead of entries; those are paired up on load and written back in the
//! entry shape.

use crate::errors::{AppError, AppResult};
use crate::models::{LedgerEntry, Person, Role};
use crate::utils::time::{format_ledger, parse_ledger};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::fs;
use std::path::Path;

fn xml_err(e: impl std::fmt::Display) -> AppError {
    AppError::Xml(e.to_string())
}

fn attr(e: &BytesStart<'_>, name: &str) -> AppResult<Option<String>> {
    match e.try_get_attribute(name).map_err(xml_err)? {
        Some(a) => Ok(Some(a.unescape_value().map_err(xml_err)?.into_owned())),
        None => Ok(None),
    }
}

fn required_attr(e: &BytesStart<'_>, name: &str) -> AppResult<String> {
    attr(e, name)?.ok_or_else(|| {
        AppError::Xml(format!(
            "<{}> is missing the '{}' attribute",
            String::from_utf8_lossy(e.name().as_ref()),
            name
        ))
    })
}

/// Person being read, with entries and legacy scans collected so far.
struct PersonRecord {
    last_name: String,
    first_name: String,
    role: Role,
    entries: Vec<LedgerEntry>,
    scans: Vec<(NaiveDateTime, bool)>,
}

impl PersonRecord {
    fn from_element(e: &BytesStart<'_>) -> AppResult<Self> {
        Ok(Self {
            last_name: required_attr(e, "lastName")?,
            first_name: required_attr(e, "firstName")?,
            role: Role::from_attr(attr(e, "role")?.as_deref()),
            entries: Vec::new(),
            scans: Vec::new(),
        })
    }

    fn finish(mut self) -> Person {
        self.entries.extend(pair_scans(self.scans));
        Person::with_entries(&self.last_name, &self.first_name, self.role, self.entries)
    }
}

/// Pair legacy single scans into entries: an In opens an entry, the next Out
/// closes it. An Out with nothing open is dropped.
fn pair_scans(mut scans: Vec<(NaiveDateTime, bool)>) -> Vec<LedgerEntry> {
    scans.sort_by_key(|(t, _)| *t);

    let mut entries = Vec::new();
    let mut open: Option<NaiveDateTime> = None;
    for (at, is_in) in scans {
        match (is_in, open) {
            (true, Some(prev)) => {
                entries.push(LedgerEntry::open(prev));
                open = Some(at);
            }
            (true, None) => open = Some(at),
            (false, Some(prev)) => {
                entries.push(LedgerEntry::closed(prev, at));
                open = None;
            }
            (false, None) => {}
        }
    }
    if let Some(prev) = open {
        entries.push(LedgerEntry::open(prev));
    }
    entries
}

fn read_entry(e: &BytesStart<'_>) -> AppResult<LedgerEntry> {
    let time_in = parse_ledger(&required_attr(e, "in")?)?;
    match attr(e, "out")? {
        Some(out) if !out.trim().is_empty() => Ok(LedgerEntry::closed(time_in, parse_ledger(&out)?)),
        _ => Ok(LedgerEntry::open(time_in)),
    }
}

fn read_scan(e: &BytesStart<'_>) -> AppResult<(NaiveDateTime, bool)> {
    let at = parse_ledger(&required_attr(e, "timestamp")?)?;
    let is_in = required_attr(e, "direction")?.eq_ignore_ascii_case("in");
    Ok((at, is_in))
}

fn on_element(
    e: &BytesStart<'_>,
    self_closing: bool,
    current: &mut Option<PersonRecord>,
    people: &mut Vec<Person>,
) -> AppResult<()> {
    match e.name().as_ref() {
        b"Person" => {
            let record = PersonRecord::from_element(e)?;
            if self_closing {
                people.push(record.finish());
            } else {
                *current = Some(record);
            }
        }
        b"SignInEntry" => {
            if let Some(record) = current.as_mut() {
                record.entries.push(read_entry(e)?);
            }
        }
        b"Scan" => {
            if let Some(record) = current.as_mut() {
                record.scans.push(read_scan(e)?);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn parse_people(xml: &str) -> AppResult<Vec<Person>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut people = Vec::new();
    let mut current: Option<PersonRecord> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => on_element(&e, false, &mut current, &mut people)?,
            Event::Empty(e) => on_element(&e, true, &mut current, &mut people)?,
            Event::End(e) if e.name().as_ref() == b"Person" => {
                if let Some(record) = current.take() {
                    people.push(record.finish());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(people)
}

pub fn read_people(path: &Path) -> AppResult<Vec<Person>> {
    let content = fs::read_to_string(path)?;
    parse_people(&content)
}

/// Render people with at least one entry, ordered by role then full name.
pub fn render_people(people: &[&Person]) -> AppResult<String> {
    let mut list: Vec<&Person> = people.iter().copied().filter(|p| p.has_entries()).collect();
    list.sort_by(|a, b| {
        a.role()
            .cmp(&b.role())
            .then_with(|| a.full_name().cmp(&b.full_name()))
    });

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("SignInList")))
        .map_err(xml_err)?;

    for person in list {
        let mut el = BytesStart::new("Person");
        el.push_attribute(("lastName", person.last_name()));
        el.push_attribute(("firstName", person.first_name()));
        el.push_attribute(("role", person.role().as_str()));
        writer.write_event(Event::Start(el)).map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("Scans")))
            .map_err(xml_err)?;

        for entry in person.entries() {
            let mut el = BytesStart::new("SignInEntry");
            let time_in = format_ledger(entry.time_in);
            el.push_attribute(("in", time_in.as_str()));
            if let Some(out) = entry.time_out {
                let time_out = format_ledger(out);
                el.push_attribute(("out", time_out.as_str()));
            }
            writer.write_event(Event::Empty(el)).map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("Scans")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("Person")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("SignInList")))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

pub fn write_people(path: &Path, people: &[&Person]) -> AppResult<()> {
    let xml = render_people(people)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, xml)?;
    Ok(())
}
