use std::error::Error;
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use isogram_finder::cli::{self, Cli, RunOutcome, SearchRequest};
use isogram_finder::logging::init_logger;
use isogram_finder::tui::TuiInterface;
use isogram_finder::view::SearchView;
use isogram_finder::wordlist::{default_wordlist_path, load_wordlist_from_file, prepare_wordlist};
use isogram_finder::{Session, SearchWorker};

fn main() -> ExitCode {
    let cli = cli::parse_cli();
    init_logger(cli.debug);

    if let Err(e) = try_main(&cli) {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let raw = read_wordlist(cli)?;

    if cli.prepare {
        let words = prepare_wordlist(&raw, cli.language);
        cli::display_prepared(&mut io::stdout().lock(), &words)?;
        eprintln!("Prepared wordlist: {} unique isograms found.", words.len());
        return Ok(());
    }

    let settings = cli.settings();
    settings.validate()?;
    let session = Session::new().with_language(cli.language);
    let (worker, events) = SearchWorker::spawn(session)?;

    if cli.tui {
        let mut tui = TuiInterface::new(SearchView::new(cli.sort, settings.top_n))?;
        let result = tui.run(&worker, &events, &raw, &settings);
        tui.cleanup()?;
        worker.shutdown();
        return Ok(result?);
    }

    let request = SearchRequest {
        word_list: raw,
        settings,
        ranking: cli.sort,
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let outcome = cli::run_search(
        &worker,
        &events,
        request,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;
    worker.shutdown();

    let at = Local::now().format("%Y-%m-%d %H:%M:%S");
    match outcome {
        RunOutcome::Finished => eprintln!("Search finished at {at}."),
        RunOutcome::TimedOut => eprintln!("Search cancelled after timeout at {at}."),
        RunOutcome::Failed(message) => return Err(message.into()),
    }
    Ok(())
}

/// `--input`, else the language's default list, else stdin.
fn read_wordlist(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.wordlist_path {
        return Ok(load_wordlist_from_file(path).inspect_err(|_| {
            log::error!("Failed to load word list from '{}'", path.display());
        })?);
    }
    if let Some(path) = default_wordlist_path(cli.language)
        && path.exists()
    {
        log::info!("Using default word list {}", path.display());
        return Ok(load_wordlist_from_file(&path)?);
    }
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    Ok(raw)
}
