use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Returns a tab-separated writer in the flavor Circos reads: no quoting, no
/// implicit header, and rows of differing widths allowed.
#[must_use]
pub(crate) fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .flexible(true)
        .from_writer(writer)
}

/// Opens a file for appending, creating it if it does not exist.
pub(crate) fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use crate::tsv::tsv_writer;

    #[test]
    fn test_tsv_writer_does_not_quote() {
        let mut data = Vec::new();
        {
            let mut writer = tsv_writer(&mut data);
            writer.write_record(["#chr", "-", "ID"]).unwrap();
            writer.write_record(["chr", "d 1", "a\"b", "x"]).unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(
            String::from_utf8(data).unwrap(),
            "#chr\t-\tID\nchr\td 1\ta\"b\tx\n"
        );
    }
}
