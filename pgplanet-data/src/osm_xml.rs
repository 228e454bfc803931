//! Streaming OSM XML tokenizer.
//!
//! Wraps a `quick-xml` pull reader and reduces the document to a flat
//! sequence of element start and end events. Self-closing elements are
//! reported as a start immediately followed by an end so that end-of-record
//! logic always runs. Text, comments, declarations and processing
//! instructions are skipped.

use std::io::BufRead;

use pgplanet_core::AttributeList;
use quick_xml::{Reader, events::BytesStart, events::Event};

use crate::ConvertError;

/// One structural event from the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementEvent {
    /// An element opened; its attributes are available from
    /// [`OsmXmlReader::attributes`] until the next call to
    /// [`OsmXmlReader::next_event`].
    Start(String),
    /// An element closed.
    End(String),
}

/// Pull reader producing [`ElementEvent`]s.
///
/// # Examples
/// ```
/// use pgplanet_data::osm_xml::{ElementEvent, OsmXmlReader};
///
/// let mut reader = OsmXmlReader::new(&b"<osm><tag k=\"a\" v=\"b &amp; c\"/></osm>"[..]);
/// assert_eq!(reader.next_event()?, Some(ElementEvent::Start("osm".into())));
/// assert_eq!(reader.next_event()?, Some(ElementEvent::Start("tag".into())));
/// assert_eq!(reader.attributes().get("v"), Some("b & c"));
/// assert_eq!(reader.next_event()?, Some(ElementEvent::End("tag".into())));
/// assert_eq!(reader.next_event()?, Some(ElementEvent::End("osm".into())));
/// assert_eq!(reader.next_event()?, None);
/// # Ok::<(), pgplanet_data::ConvertError>(())
/// ```
pub struct OsmXmlReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    attributes: AttributeList,
    pending_end: Option<String>,
}

impl<R: BufRead> OsmXmlReader<R> {
    /// Wrap a buffered input stream.
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            attributes: AttributeList::default(),
            pending_end: None,
        }
    }

    /// Attributes of the most recent [`ElementEvent::Start`].
    #[must_use]
    pub const fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    /// Byte offset of the reader within the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    /// Advance to the next element event; `None` at end of input.
    ///
    /// # Errors
    /// Returns [`ConvertError::Read`] when the input is not well-formed XML,
    /// cannot be read, or carries an attribute that cannot be unescaped.
    pub fn next_event(&mut self) -> Result<Option<ElementEvent>, ConvertError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(ElementEvent::End(name)));
        }
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|source| ConvertError::Read {
                    position: self.reader.buffer_position(),
                    source,
                })?;
            match event {
                Event::Start(element) => {
                    let name = element_name(&element);
                    let attributes = collect_attributes(&element);
                    return self.open(name, attributes).map(Some);
                }
                Event::Empty(element) => {
                    let name = element_name(&element);
                    let attributes = collect_attributes(&element);
                    self.pending_end = Some(name.clone());
                    return self.open(name, attributes).map(Some);
                }
                Event::End(element) => {
                    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                    return Ok(Some(ElementEvent::End(name)));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn open(
        &mut self,
        name: String,
        attributes: Result<Vec<(String, String)>, quick_xml::Error>,
    ) -> Result<ElementEvent, ConvertError> {
        let pairs = attributes.map_err(|source| ConvertError::Read {
            position: self.reader.buffer_position(),
            source,
        })?;
        self.attributes.clear();
        for (key, value) in pairs {
            self.attributes.push(key, value);
        }
        Ok(ElementEvent::Start(name))
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn collect_attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, quick_xml::Error> {
    element
        .attributes()
        .with_checks(false)
        .map(|attribute| {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            Ok((key, value))
        })
        .collect()
}
