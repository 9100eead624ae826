//! Multistatus response parsing (RFC 4918 §13).

use quick_xml::Reader;
use quick_xml::events::{BytesRef, Event};

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{DavProperty, DavResponse, Multistatus};

/// Parses a `DAV:multistatus` response body.
///
/// ## Summary
/// Collects each `DAV:response` with its href and the properties of its
/// successful propstats. Text content (including `calendar-data`) is kept
/// verbatim, with entity and character references resolved.
///
/// ## Errors
/// Returns an error if the XML is malformed or has no `multistatus` root.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_multistatus(xml: &[u8]) -> ParseResult<Multistatus> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut builder = MultistatusBuilder::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
                builder.open(name);
            }
            Event::Empty(ref e) => {
                let name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
                builder.open(name);
                builder.close();
            }
            Event::End(_) => builder.close(),
            Event::Text(ref e) => {
                let decoded = reader.decoder().decode(e.as_ref())?;
                builder.text.push_str(&decoded);
            }
            Event::CData(ref e) => {
                let decoded = reader.decoder().decode(e.as_ref())?;
                builder.text.push_str(&decoded);
            }
            Event::GeneralRef(ref e) => {
                push_reference(&mut builder.text, e)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !builder.saw_root {
        return Err(ParseError::missing_element("multistatus"));
    }

    tracing::debug!(count = builder.responses.len(), "Parsed multistatus");

    Ok(Multistatus {
        responses: builder.responses,
    })
}

/// Appends the text an `&...;` reference stands for.
fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> ParseResult<()> {
    if let Some(ch) = reference.resolve_char_ref()? {
        text.push(ch);
        return Ok(());
    }

    let name = reference.decode()?;
    match quick_xml::escape::resolve_xml_entity(&name) {
        Some(resolved) => text.push_str(resolved),
        None => {
            return Err(ParseError::xml(format!("unknown entity: &{name};")));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct MultistatusBuilder {
    saw_root: bool,
    stack: Vec<String>,
    text: String,
    responses: Vec<DavResponse>,
    response: Option<DavResponse>,
    propstat: Option<Propstat>,
    /// Open property and the stack depth of its element.
    prop: Option<(usize, DavProperty)>,
}

#[derive(Debug, Default)]
struct Propstat {
    properties: Vec<DavProperty>,
    status: Option<u16>,
}

impl MultistatusBuilder {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn open(&mut self, name: String) {
        let depth = self.stack.len();

        if let Some((prop_depth, prop)) = &mut self.prop {
            if depth == *prop_depth + 1 && name != "href" {
                prop.children.push(name.clone());
            }
        } else {
            match name.as_str() {
                "multistatus" if depth == 0 => self.saw_root = true,
                "response" => self.response = Some(DavResponse::default()),
                "propstat" if self.response.is_some() => self.propstat = Some(Propstat::default()),
                _ if self.propstat.is_some() && self.parent() == Some("prop") => {
                    self.prop = Some((depth, DavProperty::new(name.clone())));
                }
                _ => {}
            }
        }

        self.stack.push(name);
        self.text.clear();
    }

    fn close(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        let text = std::mem::take(&mut self.text);
        let depth = self.stack.len();

        if let Some(prop_depth) = self.prop.as_ref().map(|(d, _)| *d) {
            if depth == prop_depth {
                if let Some((_, mut prop)) = self.prop.take() {
                    prop.text = text;
                    if let Some(propstat) = &mut self.propstat {
                        propstat.properties.push(prop);
                    }
                }
            } else if name == "href"
                && let Some((_, prop)) = &mut self.prop
            {
                prop.hrefs.push(text.trim().to_string());
            }
            return;
        }

        match (name.as_str(), self.parent()) {
            ("href", Some("response")) => {
                if let Some(response) = &mut self.response {
                    response.href = text.trim().to_string();
                }
            }
            ("status", Some("propstat")) => {
                if let Some(propstat) = &mut self.propstat {
                    propstat.status = parse_status_line(&text);
                }
            }
            ("status", Some("response")) => {
                if let Some(response) = &mut self.response {
                    response.status = parse_status_line(&text);
                }
            }
            ("propstat", _) => {
                if let Some(propstat) = self.propstat.take()
                    && let Some(response) = &mut self.response
                {
                    if propstat.status.is_none_or(|s| (200..300).contains(&s)) {
                        response.properties.extend(propstat.properties);
                    } else {
                        tracing::trace!(
                            href = %response.href,
                            status = ?propstat.status,
                            "Skipping failed propstat"
                        );
                    }
                }
            }
            ("response", _) => {
                if let Some(response) = self.response.take() {
                    if response.href.is_empty() {
                        tracing::debug!("Skipping response without href");
                    } else {
                        self.responses.push(response);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Extracts the code from `HTTP/1.1 200 OK`.
fn parse_status_line(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCIPAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<multistatus xmlns="DAV:">
  <response>
    <href>/</href>
    <propstat>
      <prop>
        <current-user-principal><href>/123456/principal/</href></current-user-principal>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

    const CALENDARS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav" xmlns:ic="http://apple.com/ns/ical/">
  <d:response>
    <d:href>/123456/calendars/</d:href>
    <d:propstat>
      <d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/123456/calendars/work/</d:href>
    <d:propstat>
      <d:prop>
        <d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>
        <d:displayname>Work &amp; Meetings</d:displayname>
        <ic:calendar-color>#FF2968FF</ic:calendar-color>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
    <d:propstat>
      <d:prop><cal:calendar-description/></d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

    #[test]
    fn parses_nested_href_property() {
        let ms = parse_multistatus(PRINCIPAL.as_bytes()).unwrap();
        assert_eq!(ms.responses.len(), 1);
        let response = &ms.responses[0];
        assert_eq!(response.href, "/");
        assert_eq!(
            response.href_of("current-user-principal"),
            Some("/123456/principal/")
        );
    }

    #[test]
    fn parses_resource_types_and_prefixed_names() {
        let ms = parse_multistatus(CALENDARS.as_bytes()).unwrap();
        assert_eq!(ms.responses.len(), 2);

        assert!(!ms.responses[0].has_resource_type("calendar"));

        let work = &ms.responses[1];
        assert!(work.has_resource_type("calendar"));
        assert!(work.has_resource_type("collection"));
        assert_eq!(work.text("displayname"), Some("Work & Meetings"));
        assert_eq!(work.text("calendar-color"), Some("#FF2968FF"));
    }

    #[test]
    fn failed_propstats_are_dropped() {
        let ms = parse_multistatus(CALENDARS.as_bytes()).unwrap();
        assert!(ms.responses[1].property("calendar-description").is_none());
    }

    #[test]
    fn calendar_data_keeps_line_breaks_and_references() {
        let xml = "<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">\
            <D:response><D:href>/cal/a.ics</D:href><D:propstat><D:prop>\
            <D:getetag>\"abc\"</D:getetag>\
            <C:calendar-data>BEGIN:VCALENDAR&#13;\nSUMMARY:R&amp;D\r\nEND:VCALENDAR\r\n</C:calendar-data>\
            </D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>\
            </D:multistatus>";

        let ms = parse_multistatus(xml.as_bytes()).unwrap();
        let response = &ms.responses[0];
        assert_eq!(response.text("getetag"), Some("\"abc\""));
        assert_eq!(
            response.property("calendar-data").unwrap().text,
            "BEGIN:VCALENDAR\r\nSUMMARY:R&D\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn calendar_data_in_cdata() {
        let xml = "<multistatus xmlns=\"DAV:\"><response><href>/x.ics</href><propstat><prop>\
            <calendar-data xmlns=\"urn:ietf:params:xml:ns:caldav\"><![CDATA[BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n]]></calendar-data>\
            </prop></propstat></response></multistatus>";

        let ms = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(
            ms.responses[0].property("calendar-data").unwrap().text,
            "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn response_level_status() {
        let xml = "<multistatus xmlns=\"DAV:\"><response><href>/gone.ics</href>\
            <status>HTTP/1.1 404 Not Found</status></response></multistatus>";
        let ms = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(ms.responses[0].status, Some(404));
        assert!(ms.responses[0].properties.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(parse_multistatus(b"<error xmlns=\"DAV:\"/>").is_err());
        assert!(parse_multistatus(b"").is_err());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_multistatus(b"<multistatus><response></multistatus>").is_err());
    }
}
