//! SQL load-script emission.
//!
//! The script drops and recreates one table with an `osm_id` column followed
//! by one text column per export schema entry, registers a 2D geometry
//! column in SRID 4326, then wraps every row insert in a single transaction.
//! The postamble adds the spatial index, the not-null constraint and
//! clusters the table on the index.

use std::io::{self, BufWriter, Write};

use pgplanet_core::{AttributeTuple, EXPORT_COLUMNS, TableName};

/// Spatial reference identifier of every emitted geometry.
pub const SRID: u32 = 4326;

/// Quote `value` as a PostgreSQL dollar-quoted string literal.
///
/// Uses `$$` unless the body would end the literal early, in which case the
/// smallest `$pgN$` tag that only matches at the real end is chosen. NUL
/// characters are removed because PostgreSQL text cannot store them.
///
/// # Examples
/// ```
/// use pgplanet_data::emit::quote_literal;
///
/// assert_eq!(quote_literal("Foo"), "$$Foo$$");
/// assert_eq!(quote_literal("costs $$"), "$pg0$costs $$$pg0$");
/// ```
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let body: String = value.chars().filter(|&ch| ch != '\0').collect();
    let tag = std::iter::once(String::from("$$"))
        .chain((0_u32..).map(|n| format!("$pg{n}$")))
        .find(|tag| closes_at_end(&body, tag))
        .unwrap_or_default();
    format!("{tag}{body}{tag}")
}

fn closes_at_end(body: &str, tag: &str) -> bool {
    format!("{body}{tag}").find(tag) == Some(body.len())
}

/// Buffered writer of the load script.
///
/// Dropping a sink flushes whatever is buffered. Call
/// [`abandon`](Self::abandon) on fatal errors so a possibly inconsistent
/// tail is not written.
pub struct SqlSink<W: Write> {
    out: BufWriter<W>,
    table: TableName,
}

impl<W: Write> SqlSink<W> {
    /// Wrap `writer`, targeting `table`.
    pub fn new(writer: W, table: TableName) -> Self {
        Self {
            out: BufWriter::new(writer),
            table,
        }
    }

    /// Output table name.
    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    /// Write the table definition and open the transaction.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    pub fn write_preamble(&mut self) -> io::Result<()> {
        let table = &self.table;
        writeln!(self.out, "DROP TABLE IF EXISTS {table};")?;
        write!(self.out, "CREATE TABLE {table} ( osm_id int8")?;
        for column in &EXPORT_COLUMNS {
            write!(self.out, ",\"{}\" {}", column.name, column.sql_type)?;
        }
        writeln!(self.out, " );")?;
        writeln!(
            self.out,
            "SELECT AddGeometryColumn('{table}', 'way', {SRID}, 'GEOMETRY', 2 );"
        )?;
        writeln!(self.out, "BEGIN;")
    }

    /// Write one insert statement.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    pub fn write_row(&mut self, osm_id: u64, tuple: &AttributeTuple, wkt: &str) -> io::Result<()> {
        write!(self.out, "INSERT INTO {} (osm_id", self.table)?;
        for (column, _) in tuple.columns() {
            write!(self.out, ",\"{}\"", column.name)?;
        }
        write!(self.out, ",way) VALUES ({osm_id}")?;
        for (_, value) in tuple.columns() {
            write!(self.out, ",{}", quote_literal(value))?;
        }
        writeln!(self.out, ",ST_GeomFromText('{wkt}',{SRID}));")
    }

    /// Commit the transaction and write the maintenance statements.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    pub fn write_postamble(&mut self) -> io::Result<()> {
        let table = &self.table;
        writeln!(self.out, "COMMIT;")?;
        writeln!(self.out, "VACUUM ANALYZE {table};")?;
        writeln!(
            self.out,
            "CREATE INDEX {table}_way_index ON {table} USING GIST (way);"
        )?;
        writeln!(self.out, "ALTER TABLE {table} ALTER COLUMN way SET NOT NULL;")?;
        writeln!(self.out, "CLUSTER {table} USING {table}_way_index;")?;
        writeln!(self.out, "VACUUM ANALYZE {table};")
    }

    /// Flush all buffered output and return the inner writer.
    ///
    /// # Errors
    /// Returns the flush error; the unwritten buffer is discarded.
    pub fn finish(self) -> io::Result<W> {
        match self.out.into_inner() {
            Ok(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Err(error) => {
                let (source, out) = error.into_parts();
                drop(out.into_parts());
                Err(source)
            }
        }
    }

    /// Discard buffered output without writing it.
    pub fn abandon(self) -> W {
        let (writer, _unwritten) = self.out.into_parts();
        writer
    }
}
