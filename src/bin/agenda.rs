//! Prints the next two weeks of tasks, and the tasks of a given day.
//!
//! Every option can also be set from the environment, see `taskify-agenda --help`.
//! Log verbosity is set with `RUST_LOG`.

use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use taskify::agenda::Agenda;
use taskify::client::Client;
use taskify::credentials::{FileTokenStore, TokenStore};


#[derive(Parser)]
#[command(name = "taskify-agenda")]
#[command(about = "Print the next two weeks of tasks, and the tasks of a given day")]
struct Cli {
    /// The day whose tasks are listed (YYYY-MM-DD). Defaults to today
    date: Option<NaiveDate>,

    /// Root of the task API (defaults to http://localhost:8080/api)
    #[arg(long, env = "TASKIFY_API_URL")]
    api_url: Option<String>,

    /// Used to log in when no session is stored
    #[arg(long, env = "TASKIFY_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "TASKIFY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Where the tokens are stored (defaults to the user config folder)
    #[arg(long, env = "TASKIFY_CREDENTIALS")]
    credentials: Option<PathBuf>,
}


#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(url) = cli.api_url {
        if let Ok(mut api_url) = taskify::config::API_URL.lock() {
            *api_url = url;
        }
    }

    let credentials_path = cli.credentials.unwrap_or_else(taskify::config::default_credentials_file);
    let tokens = FileTokenStore::open(&credentials_path);

    let client = Client::from_config(tokens)?
        .with_session_end_hook(|| eprintln!("Your session has expired. Pass --email and --password to log in again."));

    if client.tokens().is_authenticated() == false {
        match (cli.email, cli.password) {
            (Some(email), Some(password)) => client.login(&email, &password).await?,
            _ => return Err("Not logged in: pass --email and --password (or set TASKIFY_EMAIL and TASKIFY_PASSWORD)".into()),
        }
    }

    let mut agenda = Agenda::new(client);
    if let Some(date) = cli.date {
        if agenda.select_day(date) == false {
            log::warn!("{} is not within the next two weeks, showing today instead", date);
        }
        agenda.days_mut().show_selected_week();
    }

    if let Err(err) = agenda.load().await {
        eprintln!("{}", agenda.last_error().unwrap_or("Something went wrong"));
        return Err(err.into());
    }

    taskify::utils::print_day_strip(&agenda);
    println!();
    taskify::utils::print_selected_day(&agenda);

    Ok(())
}
