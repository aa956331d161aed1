//! Character-list documents returned by the account service.
//!
//! The service answers with a small XML document. Somewhere in it there is
//! either an `error` element:
//!
//! ```xml
//! <response><error id="3"/></response>
//! ```
//!
//! or a `chars` element listing the account's characters:
//!
//! ```xml
//! <chars lang="de">
//!   <char status="0" server="illarionserver">Ada</char>
//!   <char status="1" server="testserver">Bob</char>
//! </chars>
//! ```
//!
//! The first of the two found in document order decides the result.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// A character the player can log in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharEntry {
    pub name: String,
    pub status: i32,
}

/// A character as listed by the service, before server filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedCharacter {
    pub name: String,
    pub status: i32,
    /// Which deployment the character lives on, e.g. `illarionserver`.
    pub server: String,
}

/// A parsed character-list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharListDocument {
    /// The service refused; `code` is the numeric error id.
    Error { code: i32 },
    Characters {
        /// The account's language as the service reports it (`de`, `us`).
        lang: Option<String>,
        characters: Vec<ListedCharacter>,
    },
}

fn invalid(reason: impl Into<String>) -> SessionError {
    SessionError::Document(reason.into())
}

fn xml_err(e: impl std::fmt::Display) -> SessionError {
    SessionError::Document(e.to_string())
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, SessionError> {
    element
        .try_get_attribute(name)
        .map_err(xml_err)?
        .map(|attr| attr.unescape_value().map(Cow::into_owned).map_err(xml_err))
        .transpose()
}

fn required_int(element: &BytesStart<'_>, name: &str) -> Result<i32, SessionError> {
    let raw = attribute(element, name)?.ok_or_else(|| invalid(format!("missing `{name}` attribute")))?;
    raw.trim()
        .parse()
        .map_err(|_| invalid(format!("`{name}` attribute is not a number: {raw:?}")))
}

/// Parses a character-list response body.
///
/// # Errors
/// [`SessionError::Document`] if the XML is broken, neither `error` nor
/// `chars` appears, or a required attribute is missing or not a number.
pub fn parse_charlist(xml: &str) -> Result<CharListDocument, SessionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"error" => return Ok(CharListDocument::Error { code: required_int(&e, "id")? }),
                b"chars" => return read_chars(&mut reader, &e),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"error" => return Ok(CharListDocument::Error { code: required_int(&e, "id")? }),
                b"chars" => {
                    return Ok(CharListDocument::Characters {
                        lang: attribute(&e, "lang")?,
                        characters: Vec::new(),
                    });
                }
                _ => {}
            },
            Event::Eof => return Err(invalid("neither `chars` nor `error` element found")),
            _ => {}
        }
    }
}

/// Reads the children of an open `chars` element up to its end tag.
fn read_chars(reader: &mut Reader<&[u8]>, chars: &BytesStart<'_>) -> Result<CharListDocument, SessionError> {
    let lang = attribute(chars, "lang")?;
    let mut characters = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let status = required_int(&e, "status")?;
                let server = attribute(&e, "server")?
                    .ok_or_else(|| invalid("missing `server` attribute"))?;
                let name = read_text_content(reader)?;
                characters.push(ListedCharacter {
                    name,
                    status,
                    server,
                });
            }
            Event::Empty(e) => {
                let status = required_int(&e, "status")?;
                let server = attribute(&e, "server")?
                    .ok_or_else(|| invalid("missing `server` attribute"))?;
                characters.push(ListedCharacter {
                    name: String::new(),
                    status,
                    server,
                });
            }
            Event::End(_) => return Ok(CharListDocument::Characters { lang, characters }),
            Event::Eof => return Err(invalid("unterminated `chars` element")),
            _ => {}
        }
    }
}

/// Collects all text below the element just opened, up to its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, SessionError> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(xml_err)?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(invalid("unterminated character element")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_document() {
        let doc = parse_charlist(r#"<?xml version="1.0"?><response><error id="3"/></response>"#).unwrap();
        assert_eq!(doc, CharListDocument::Error { code: 3 });
    }

    #[test]
    fn test_parse_chars_document() {
        let xml = r#"
            <response>
              <chars lang="us">
                <char status="0" server="illarionserver">Ada &amp; Co</char>
                <char status="2" server="testserver"><![CDATA[Bob]]></char>
              </chars>
            </response>"#;

        let doc = parse_charlist(xml).unwrap();

        assert_eq!(
            doc,
            CharListDocument::Characters {
                lang: Some("us".into()),
                characters: vec![
                    ListedCharacter {
                        name: "Ada & Co".into(),
                        status: 0,
                        server: "illarionserver".into(),
                    },
                    ListedCharacter {
                        name: "Bob".into(),
                        status: 2,
                        server: "testserver".into(),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_parse_empty_chars() {
        let doc = parse_charlist(r#"<chars lang="de"/>"#).unwrap();
        assert_eq!(
            doc,
            CharListDocument::Characters {
                lang: Some("de".into()),
                characters: vec![],
            }
        );
    }

    #[test]
    fn test_parse_first_match_wins() {
        let doc = parse_charlist(r#"<r><error id="7"/><chars lang="de"/></r>"#).unwrap();
        assert_eq!(doc, CharListDocument::Error { code: 7 });
    }

    #[test]
    fn test_parse_rejects_documents_without_result() {
        assert!(parse_charlist("<html><body>maintenance</body></html>").is_err());
        assert!(parse_charlist("").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(parse_charlist(r#"<error id="x"/>"#).is_err());
        assert!(parse_charlist(r#"<chars><char server="s">A</char></chars>"#).is_err());
    }
}
