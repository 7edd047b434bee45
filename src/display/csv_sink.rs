use crate::error::OutputError;
use crate::pattern::OutputSchema;
use crate::types::MatchRecord;
use std::io::Write;

/// CSV出力（ヘッダー1回、レコード毎にflush）
///
/// The csv writer rejects records whose length differs from the header, so
/// a record that does not fit the schema surfaces as an [`OutputError`].
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    records: usize,
}

impl<W: Write> CsvSink<W> {
    /// Write the header and flush it before any record
    pub fn new(out: W, schema: OutputSchema) -> Result<Self, OutputError> {
        let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(out);
        writer.write_record(schema.columns())?;
        writer.flush()?;

        Ok(Self {
            writer,
            records: 0,
        })
    }

    /// Number of records written so far, header excluded
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn write(&mut self, record: &MatchRecord) -> Result<(), OutputError> {
        self.writer.write_field(record.repository.as_bytes())?;
        self.writer.write_field(record.file.as_bytes())?;
        for value in &record.values {
            self.writer.write_field(value)?;
        }
        self.writer.write_record(None::<&[u8]>)?;
        self.writer.flush()?;

        self.records += 1;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, OutputError> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn record(values: &[&[u8]]) -> MatchRecord {
        MatchRecord {
            repository: "R".to_string(),
            file: "pkg/x.go".to_string(),
            values: values.iter().map(|v| v.to_vec()).collect(),
        }
    }

    #[test]
    fn test_header_only() {
        let sink = CsvSink::new(Vec::new(), OutputSchema::for_group_count(0)).unwrap();
        assert_eq!(sink.into_inner().unwrap(), b"repo,file,line\n");
    }

    #[test]
    fn test_group_record() {
        let mut sink = CsvSink::new(Vec::new(), OutputSchema::for_group_count(1)).unwrap();
        sink.write(&record(&[b"alice"])).unwrap();

        assert_eq!(sink.records(), 1);
        assert_eq!(
            String::from_utf8(sink.into_inner().unwrap()).unwrap(),
            "repo,file,group1\nR,pkg/x.go,alice\n"
        );
    }

    #[test]
    fn test_fields_are_quoted() {
        let mut sink = CsvSink::new(Vec::new(), OutputSchema::for_group_count(0)).unwrap();
        sink.write(&record(&[b"a, \"quoted\" line"])).unwrap();

        assert_eq!(
            String::from_utf8(sink.into_inner().unwrap()).unwrap(),
            "repo,file,line\nR,pkg/x.go,\"a, \"\"quoted\"\" line\"\n"
        );
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let mut sink = CsvSink::new(Vec::new(), OutputSchema::for_group_count(2)).unwrap();
        assert!(sink.write(&record(&[b"only one"])).is_err());
    }

    /// Records how many bytes were visible after each flush
    struct FlushProbe {
        buf: Vec<u8>,
        flushed: Vec<usize>,
    }

    impl Write for FlushProbe {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed.push(self.buf.len());
            Ok(())
        }
    }

    #[test]
    fn test_every_record_is_flushed() {
        let probe = FlushProbe { buf: Vec::new(), flushed: Vec::new() };
        let mut sink = CsvSink::new(probe, OutputSchema::for_group_count(0)).unwrap();
        sink.write(&record(&[b"one"])).unwrap();
        sink.write(&record(&[b"two"])).unwrap();

        let probe = sink.into_inner().unwrap();
        let header = "repo,file,line\n".len();
        let line = "R,pkg/x.go,one\n".len();
        assert!(probe.flushed.starts_with(&[header, header + line, header + 2 * line]));
    }
}
