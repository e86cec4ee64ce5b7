//! The `registra init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    std::fs::create_dir_all("schemes")?;
    let example_path = std::path::Path::new("schemes/example.toml");
    if example_path.exists() {
        println!("schemes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCHEME)?;
        println!("Created schemes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: registra seed");
    println!("  2. Edit schemes/example.toml for your course");
    println!("  3. Run: registra validate --scheme schemes/example.toml");
    println!("  4. Run: registra configure --scheme schemes/example.toml");

    Ok(())
}

const EXAMPLE_SCHEME: &str = r#"# registra evaluation scheme
#
# Weights are percentages and must total 100 across active entries.

[scheme]
course = "MATH-201"
description = "Calculus II grading"

[[entries]]
label = "Midterm 1"
weight = 10.0

[[entries]]
label = "Midterm 2"
weight = 10.0

[[entries]]
label = "Labs"
weight = 20.0

[[entries]]
label = "Midpoint Exam"
weight = 20.0

[[entries]]
label = "Final Exam"
weight = 20.0

[[entries]]
label = "Attitude"
weight = 5.0

[[entries]]
label = "Assignments"
weight = 15.0
"#;
