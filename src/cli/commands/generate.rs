//! Generate command - run the pipeline once from the terminal.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{DocumentSource, Orchestrator};
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(topic: &str, output: Option<String>, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner(&format!("Generating study guide for '{}'...", topic));

    let result = match orchestrator.run(topic).await {
        Ok(result) => {
            spinner.finish_and_clear();
            result
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Pipeline failed: {}", e));
            return Err(e.into());
        }
    };

    Output::header("Stages");
    for stage in &result.stages {
        Output::stage_summary(stage);
    }
    println!();

    match result.source {
        DocumentSource::File => {
            Output::success(&format!("Study guide written to {}", result.output_path.display()))
        }
        DocumentSource::StageOutput => Output::warning(&format!(
            "{} was not written; showing the format stage's answer",
            result.output_path.display()
        )),
        DocumentSource::Sentinel => Output::error("The pipeline produced no study guide."),
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &result.markdown)?;
            Output::success(&format!("Copied markdown to {}", path));
        }
        None => println!("\n{}\n", result.markdown),
    }

    Ok(())
}
