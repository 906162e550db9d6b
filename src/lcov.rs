/// Writer for the LCOV tracefile format (line coverage only).
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Records emitted per file, in this order:
///   SF:<source file>
///   DA:<line number>,<execution count>   (one per source line, ascending)
///   LF:<lines found>
///   LH:<lines hit>
///   end_of_record
///
/// Every source line gets a `DA` record. Lines with no counter are written
/// with a count of 0 rather than omitted.
use std::io::{self, Write};

use crate::model::{FileReport, Report};

/// Write the record for a single file.
pub fn write_file<W: Write + ?Sized>(out: &mut W, file: &FileReport) -> io::Result<()> {
    writeln!(out, "SF:{}", file.filename)?;
    for (line_number, entry) in &file.source {
        writeln!(out, "DA:{},{}", line_number, entry.hits.lcov_count())?;
    }
    writeln!(out, "LF:{}", file.sloc)?;
    writeln!(out, "LH:{}", file.hits)?;
    writeln!(out, "end_of_record")?;
    Ok(())
}

/// Write one record per file, in report order, back to back.
pub fn write_report<W: Write + ?Sized>(out: &mut W, report: &Report) -> io::Result<()> {
    for file in &report.files {
        write_file(out, file)?;
    }
    Ok(())
}

/// Render a whole report as LCOV text.
#[must_use]
pub fn to_string(report: &Report) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(&mut buf, report);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{map_file, map_report};
    use crate::model::{CoverageMap, RawFileCoverage};

    fn render_file(file: &FileReport) -> String {
        let mut buf = Vec::new();
        write_file(&mut buf, file).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_file_record() {
        let raw = RawFileCoverage::new(["x=1;", "y=2;"])
            .with_hit(1, 1)
            .with_hit(2, 0);
        let out = render_file(&map_file("a.js", &raw));
        assert_eq!(out, "SF:a.js\nDA:1,1\nDA:2,0\nLF:2\nLH:1\nend_of_record\n");
    }

    #[test]
    fn test_non_executable_lines_written_as_zero() {
        let raw = RawFileCoverage::new(["// doc", "go();"]).with_hit(2, 12);
        let out = render_file(&map_file("b.js", &raw));
        assert_eq!(out, "SF:b.js\nDA:1,0\nDA:2,12\nLF:1\nLH:1\nend_of_record\n");
    }

    #[test]
    fn test_record_has_one_da_line_per_source_line() {
        let source: Vec<String> = (0..12).map(|i| format!("stmt{i};")).collect();
        let mut raw = RawFileCoverage::new(source);
        for n in (1..=12).step_by(2) {
            raw = raw.with_hit(n, 1);
        }
        let out = render_file(&map_file("many.js", &raw));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4 + 12);
        assert_eq!(lines[0], "SF:many.js");
        assert_eq!(lines.iter().filter(|l| l.starts_with("DA:")).count(), 12);
        // Line numbers ascend numerically, so 10 comes after 9.
        assert_eq!(lines[9], "DA:9,1");
        assert_eq!(lines[10], "DA:10,0");
        assert_eq!(lines[13], "LF:6");
        assert_eq!(lines[14], "LH:6");
        assert_eq!(lines[15], "end_of_record");
    }

    #[test]
    fn test_multi_file_report_has_no_separators() {
        let mut cov = CoverageMap::new();
        cov.insert("z.js".to_string(), RawFileCoverage::new(["z();"]).with_hit(1, 0));
        cov.insert("a.js".to_string(), RawFileCoverage::new(["a();"]).with_hit(1, 3));
        let out = to_string(&map_report(&cov));
        assert_eq!(
            out,
            "SF:a.js\nDA:1,3\nLF:1\nLH:1\nend_of_record\n\
             SF:z.js\nDA:1,0\nLF:1\nLH:0\nend_of_record\n"
        );
    }

    #[test]
    fn test_empty_report_writes_nothing() {
        assert_eq!(to_string(&Report::default()), "");
    }
}
