//! The `knowcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create knowcheck.toml
    if std::path::Path::new("knowcheck.toml").exists() {
        println!("knowcheck.toml already exists, skipping.");
    } else {
        std::fs::write("knowcheck.toml", SAMPLE_CONFIG)?;
        println!("Created knowcheck.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/example.toml with your own scenarios");
    println!("  2. Run: knowcheck validate --bank banks/example.toml");
    println!("  3. Run: knowcheck take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# knowcheck configuration

bank = "banks/example.toml"
output_dir = "./knowcheck-results"
pass_threshold = 70
typewriter_ms = 15
show_theory = true
formats = ["json", "html"]
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Knowledge Check"
description = "A two-question bank to get started"
categories = ["Data Privacy", "Prompt Design"]

[[questions]]
id = 1
category = "Data Privacy"
scenario = "Your school wants an AI assistant, but student data must stay on school hardware."
prompt = "Which option keeps the data local?"
theory = "Local-First Architecture"
feedback_correct = "Correct. A local model never sends student data to an outside server."
feedback_incorrect = "Cloud services move data off-site. Choose a local-first model."
module = { id = "module-1", title = "Module 1: Sovereign AI", path = "/module-1" }

[[questions.options]]
id = "a"
text = "A hosted chat API"

[[questions.options]]
id = "b"
text = "An open-weight model running on a classroom laptop"
correct = true

[[questions.options]]
id = "c"
text = "A shared online document"

[[questions.options]]
id = "d"
text = "A messaging app bot"

[[questions]]
id = 2
category = "Prompt Design"
scenario = "You need a game interaction that teaches fractions."
prompt = "Which prompt starts from the learning goal?"
theory = "Outcome-First Prompting"
feedback_correct = "Yes. The prompt states what students should learn and how the interaction supports it."
feedback_incorrect = "That prompt is about mechanics. Lead with the learning outcome."
module = { id = "module-2", title = "Module 2: Prompting for Learning", path = "/module-2" }

[[questions.options]]
id = "a"
text = "Make a pizza game with a score counter."

[[questions.options]]
id = "b"
text = "Give me code for a game character."

[[questions.options]]
id = "c"
text = "I'm teaching equivalent fractions. Let players split pizzas and check that 2/4 matches 1/2 before serving."
correct = true

[[questions.options]]
id = "d"
text = "Map the space bar to a jump."
"#;
