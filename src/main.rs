use clap::Parser;
use llm_tester::{
    cli::Args,
    errors::TesterError,
    openai::OpenAiClient,
    options::Settings,
    prompt::TerminalPrompter,
    transcript::fill_output_file,
};

fn run(args: Args) -> Result<(), TesterError> {
    let settings = Settings::collect(&args, &mut TerminalPrompter::stdio())?;
    log::debug!("using endpoint {}", settings.connection.base_url);

    let client = OpenAiClient::new(&settings.connection)?;
    let answered = fill_output_file(
        &client,
        &settings.options,
        settings.paths.system_message.as_deref(),
        &settings.paths.input,
        &settings.paths.output,
    )?;
    println!(
        "Wrote {} answers to {}",
        answered,
        settings.paths.output.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    run(args).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
}
