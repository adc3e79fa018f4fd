//! Console output for a finished or failed conversion.

use std::io::{self, Write};

use crate::application::{convert::ConversionReport, error::ErrorReport};

pub fn write_success<W: Write>(out: &mut W, report: &ConversionReport) -> io::Result<()> {
    let output_name = report
        .output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.output_path.display().to_string());

    writeln!(out, "✅ HTML generated successfully!")?;
    writeln!(out, "📄 Location: {}", report.output_path.display())?;
    writeln!(out, "📊 Size: {} KB", format_kilobytes(report.bytes_written))?;
    if report.diagrams_stripped > 0 {
        writeln!(
            out,
            "📎 Diagrams replaced by notes: {}",
            report.diagrams_stripped
        )?;
    }
    writeln!(out)?;
    writeln!(out, "🖨️  To create PDF:")?;
    writeln!(out, "   1. Open {output_name} in your browser")?;
    writeln!(out, "   2. Press Ctrl+P (or click the Print button)")?;
    writeln!(out, "   3. Select 'Save as PDF' as the printer")?;
    writeln!(out, "   4. Click 'Save'")?;
    writeln!(out)?;
    writeln!(out, "💡 The HTML file is fully styled and ready for printing!")?;
    Ok(())
}

pub fn write_failure<W: Write>(out: &mut W, report: &ErrorReport) -> io::Result<()> {
    writeln!(out, "❌ Error: {}", report.summary())?;
    for cause in report.causes() {
        writeln!(out, "   caused by: {cause}")?;
    }
    Ok(())
}

/// Size in kilobytes (1024 bytes) with two decimals.
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::application::error::AppError;
    use crate::infra::error::InfraError;

    fn report(bytes_written: u64, diagrams_stripped: usize) -> ConversionReport {
        ConversionReport {
            source_path: PathBuf::from("/docs/system_design.md"),
            output_path: PathBuf::from("/docs/system_design.html"),
            bytes_written,
            diagrams_stripped,
            headings: 4,
        }
    }

    #[test]
    fn kilobytes_have_two_decimals() {
        assert_eq!(format_kilobytes(0), "0.00");
        assert_eq!(format_kilobytes(1536), "1.50");
        assert_eq!(format_kilobytes(10_000), "9.77");
    }

    #[test]
    fn success_report_lists_location_size_and_instructions() {
        let mut out = Vec::new();
        write_success(&mut out, &report(2048, 0)).expect("write");
        let text = String::from_utf8(out).expect("utf-8");

        assert!(text.starts_with("✅ HTML generated successfully!\n"));
        assert!(text.contains("📄 Location: /docs/system_design.html\n"));
        assert!(text.contains("📊 Size: 2.00 KB\n"));
        assert!(text.contains("1. Open system_design.html in your browser"));
        assert!(!text.contains("Diagrams replaced"));
    }

    #[test]
    fn success_report_mentions_stripped_diagrams() {
        let mut out = Vec::new();
        write_success(&mut out, &report(100, 2)).expect("write");
        let text = String::from_utf8(out).expect("utf-8");

        assert!(text.contains("Diagrams replaced by notes: 2"));
    }

    #[test]
    fn failure_report_prints_the_cause_chain() {
        let error = AppError::from(InfraError::write(
            "/docs/system_design.html",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        ));

        let mut out = Vec::new();
        write_failure(&mut out, &error.report()).expect("write");
        let text = String::from_utf8(out).expect("utf-8");

        assert_eq!(
            text,
            "❌ Error: failed to write /docs/system_design.html\n   caused by: permission denied\n"
        );
    }
}
