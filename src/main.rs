use clap::Parser;
use tracing_subscriber::EnvFilter;
use velano::cli::commands::generate::ClassFlags;
use velano::cli::{Cli, Commands};
use velano::crypto::PassphraseOptions;

/// Install the log subscriber.  `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("velano=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Init => velano::cli::commands::init::execute(&cli),
        Commands::Add {
            ref title,
            ref kind,
            favorite,
            ref fields,
        } => velano::cli::commands::add::execute(&cli, title, kind, favorite, fields),
        Commands::List {
            ref kind,
            favorites,
            ref query,
        } => velano::cli::commands::list::execute(&cli, kind.as_deref(), favorites, query.as_deref()),
        Commands::Show { ref id, reveal } => velano::cli::commands::show::execute(&cli, id, reveal),
        Commands::Edit {
            ref id,
            ref title,
            ref kind,
            password,
            ref fields,
        } => velano::cli::commands::edit::execute(
            &cli,
            id,
            title.as_deref(),
            kind.as_deref(),
            password,
            fields,
        ),
        Commands::Delete { ref id, force } => velano::cli::commands::delete::execute(&cli, id, force),
        Commands::Favorite { ref id } => velano::cli::commands::favorite::execute(&cli, id),
        Commands::Passwd => velano::cli::commands::passwd::execute(&cli),
        Commands::RecoveryKey => velano::cli::commands::recovery_key::execute(&cli),
        Commands::Generate {
            length,
            no_symbols,
            no_numbers,
            no_uppercase,
            no_lowercase,
            words,
            ref separator,
            no_capitalize,
        } => velano::cli::commands::generate::execute(
            &cli,
            length,
            ClassFlags {
                no_symbols,
                no_numbers,
                no_uppercase,
                no_lowercase,
            },
            words.map(|words| PassphraseOptions {
                words,
                separator: separator.clone(),
                capitalize: !no_capitalize,
            }),
        ),
        Commands::Completions { shell } => velano::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        velano::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
