mod check;
mod cli;
mod config;
mod generate;
mod logging;
mod queries;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    logging::init();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Generate(args) => generate::run(args).await,
        cli::Command::Check(args) => check::run(args),
    }
}
