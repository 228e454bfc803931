//! Input tokenizing, record assembly and SQL emission for pgplanet.
//!
//! Responsibilities:
//! - Turn an OSM XML byte stream into element events ([`osm_xml`]).
//! - Drive the record state machine over those events ([`Converter`]).
//! - Assemble shape edges into WKT ([`SegmentAssembler`]).
//! - Write the PostGIS load script ([`emit`]).
//!
//! Boundaries:
//! - Entity storage, canonicalization and the export schema live in
//!   `pgplanet-core`.
//! - Opening files and decompression live in `pgplanet-fs`.
//!
//! Invariants:
//! - One pass over the input; memory is bounded by the entity store and the
//!   canonicalization sets.
//! - No global mutable state.

use std::io::{self, BufRead, Write};

use log::{info, warn};
use pgplanet_core::{CancelFlag, ConversionOptions, EntityKind, RunStats};
use thiserror::Error;

pub mod assembler;
pub mod convert;
pub mod emit;
pub mod osm_xml;
pub mod wkt;

pub use assembler::SegmentAssembler;
pub use convert::Converter;

use osm_xml::{ElementEvent, OsmXmlReader};

/// Fatal conditions that stop a run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input could not be read or is not well-formed XML.
    #[error("failed to parse OSM XML near byte {position}: {source}")]
    Read {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    /// The output sink rejected a write.
    #[error("failed to write SQL output: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
    /// Entity storage could not grow.
    #[error("out of memory while storing {kind} entities ({requested} slots requested)")]
    ResourceExhausted { kind: EntityKind, requested: usize },
}

impl ConvertError {
    pub(crate) const fn write(source: io::Error) -> Self {
        Self::Write { source }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The whole input was consumed.
    Completed,
    /// The cancel flag was raised; output covers every record closed before
    /// the flag was observed.
    Cancelled,
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub stats: RunStats,
    pub outcome: RunOutcome,
}

/// Convert an OSM XML stream into a PostGIS load script.
///
/// The cancel flag is polled before every element that opens at the top
/// level. A cancelled run still commits and writes the postamble, so the
/// script stays loadable. Fatal errors discard buffered output.
///
/// # Examples
/// ```
/// use pgplanet_core::{CancelFlag, ConversionOptions};
/// use pgplanet_data::{RunOutcome, convert};
///
/// let input = br#"<osm><node id="1" lon="10" lat="20"><tag k="name" v="Foo"/></node></osm>"#;
/// let mut output = Vec::new();
/// let report = convert(&input[..], &mut output, &ConversionOptions::default(), &CancelFlag::default())?;
/// assert_eq!(report.outcome, RunOutcome::Completed);
/// assert_eq!(report.stats.points.emitted, 1);
/// let script = String::from_utf8(output).expect("utf-8 output");
/// assert!(script.contains("VALUES (1,$$Foo$$,ST_GeomFromText('POINT(10 20)',4326));"));
/// # Ok::<(), pgplanet_data::ConvertError>(())
/// ```
///
/// # Errors
/// Returns [`ConvertError`] when reading, writing or storage growth fails.
pub fn convert<R: BufRead, W: Write>(
    input: R,
    output: W,
    options: &ConversionOptions,
    cancel: &CancelFlag,
) -> Result<RunReport, ConvertError> {
    let mut events = OsmXmlReader::new(input);
    let mut converter = Converter::new(output, options);
    match drive(&mut events, &mut converter, cancel) {
        Ok(outcome) => {
            let (stats, _) = converter.finish()?;
            if outcome == RunOutcome::Cancelled {
                warn!("Conversion cancelled; output ends at the last complete record");
            }
            stats.log_summary();
            Ok(RunReport { stats, outcome })
        }
        Err(error) => {
            let (stats, _) = converter.abandon();
            info!(
                "Aborted after {} nodes, {} segments and {} ways",
                stats.points.total, stats.edges.total, stats.shapes.total
            );
            Err(error)
        }
    }
}

fn drive<R: BufRead, W: Write>(
    events: &mut OsmXmlReader<R>,
    converter: &mut Converter<W>,
    cancel: &CancelFlag,
) -> Result<RunOutcome, ConvertError> {
    converter.begin()?;
    while let Some(event) = events.next_event()? {
        match event {
            ElementEvent::Start(name) => {
                if converter.state() == convert::State::TopLevel && cancel.is_cancelled() {
                    return Ok(RunOutcome::Cancelled);
                }
                converter.start_element(&name, events.attributes())?;
            }
            ElementEvent::End(name) => converter.end_element(&name)?,
        }
    }
    Ok(RunOutcome::Completed)
}
