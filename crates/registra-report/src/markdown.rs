//! Markdown rendering for period reports.

use std::fmt::Write;

use crate::model::PeriodReport;

/// Render a period report as a markdown document.
pub fn render_markdown(report: &PeriodReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Period Report — {}", report.period.name);
    let _ = writeln!(
        output,
        "State: {} | {} to {} | generated {}",
        report.period.state,
        report.period.start_date,
        report.period.end_date,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Outcomes");

    if report.courses.is_empty() {
        let _ = writeln!(output, "No enrollments recorded in this period.");
    } else {
        let _ = writeln!(
            output,
            "| Course | Enrolled | Withdrawn | Graded | Passed | Average |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for course in &report.courses {
            let average = course
                .average
                .map(|a| format!("{a:.2}"))
                .unwrap_or_else(|| "-".into());
            let _ = writeln!(
                output,
                "| {} {} | {} | {} | {} | {} | {} |",
                course.code,
                course.name,
                course.enrolled,
                course.withdrawn,
                course.graded,
                course.passed,
                average
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Merit Ranking");

    if report.standings.is_empty() {
        let _ = writeln!(output, "No frozen grades to rank.");
    } else {
        let _ = writeln!(output, "| Rank | Student | Average | Graded Courses |");
        let _ = writeln!(output, "|---|---|---|---|");
        for standing in &report.standings {
            let _ = writeln!(
                output,
                "| {} | {} | {:.2} | {} |",
                standing.rank, standing.student_name, standing.average, standing.graded_courses
            );
        }
    }

    output
}
