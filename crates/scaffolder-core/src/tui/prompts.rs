//! Charm-style CLI prompts using cliclack

use crate::logger::Logger;
use crate::pipeline::{InitArgs, InitReport, Pipeline};
use crate::product::ProductConfig;
use crate::prompt::{Choice, InputQuestion, Prompter};
use anyhow::Result;

/// [`Prompter`] backed by cliclack
///
/// cliclack lists have no non-selectable rows, so separators are not drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn select(&self, message: &str, choices: &[Choice]) -> Result<usize> {
        let mut select = cliclack::select(message);
        for (idx, choice) in choices.iter().enumerate() {
            if let Choice::Item(label) = choice {
                select = select.item(idx, label, "");
            }
        }
        Ok(select.interact()?)
    }

    fn input(&self, question: &InputQuestion) -> Result<String> {
        let mut input = cliclack::input(&question.message).required(false);
        if let Some(default) = &question.default {
            input = input.placeholder(default).default_input(default);
        }

        let check = question.clone();
        input = input.validate(move |raw: &String| check.finish(raw).map(|_| ()));

        let raw: String = input.interact()?;
        question.finish(&raw).map_err(|e| anyhow::anyhow!(e))
    }
}

/// Run the scaffolding pipeline with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: InitArgs) -> Result<InitReport> {
    cliclack::intro(config.display_name())?;

    let prompter = CliclackPrompter;
    let logger = Logger::new(config.name());
    let pipeline = Pipeline::new(config, &prompter, logger.clone())?;

    match pipeline.run(&args).await {
        Ok(report) => {
            cliclack::outro(format!(
                "Created {} files in {}",
                report.files.len(),
                report.target_dir.display()
            ))?;
            Ok(report)
        }
        Err(e) => {
            logger.error(format!("{:#}", e));
            cliclack::outro_cancel("Setup failed.")?;
            Err(e)
        }
    }
}
