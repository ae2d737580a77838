use crate::runner::state::{ExecutionReport, ExecutionResult, TestStatus};
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Seconds from a `"1.25s"` style duration; 0 when unparsable
fn seconds(formatted: &str) -> String {
    formatted
        .trim()
        .trim_end_matches('s')
        .parse::<f64>()
        .unwrap_or(0.0)
        .to_string()
}

/// Generate JUnit XML for an execution report
pub fn generate_junit_xml(report: &ExecutionReport) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let summary = &report.summary;
    let total_tests = summary.total_tests.to_string();
    let failures = summary.failed.to_string();
    let time = seconds(&summary.execution_time);

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "scout-tester-run"));
    suites_start.push_attribute(("tests", total_tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // Categories become classnames; one suite per batch
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "execution"));
    suite_start.push_attribute(("tests", total_tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("errors", "0"));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", summary.timestamp.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for result in &report.results {
        write_test_case(&mut writer, result)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    result: &ExecutionResult,
) -> Result<()> {
    let classname = format!("{}.{}", result.category.to_lowercase().replace(' ', "_"), result.test_id);
    let time = seconds(&result.execution_time);

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.test_name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case_start))?;

    if result.status == TestStatus::Failed {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", result.details.as_str()));
        fail_start.push_attribute((
            "type",
            if result.error.is_some() {
                "ExecutionError"
            } else {
                "AssertionError"
            },
        ));
        writer.write_event(Event::Start(fail_start))?;
        if let Some(err) = &result.error {
            writer.write_event(Event::Text(BytesText::new(err)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&result.details)))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write `junit.xml` into `output_dir`
pub fn write_report(report: &ExecutionReport, output_dir: &Path) -> Result<PathBuf> {
    let xml = generate_junit_xml(report)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
