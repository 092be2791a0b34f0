use clap::{Parser, Subcommand};
use serde::Serialize;

use reqtrace::client::{ReqtraceClient, Traced};

#[derive(Parser)]
#[command(name = "reqtrace-cli")]
#[command(about = "Command-line client for the reqtrace server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the welcome message
    Index,
    /// Show the headers the server received
    Headers,
    /// Send a body and print the request as the server saw it
    Echo {
        #[arg(default_value = "")]
        body: String,
    },
    /// List registered borgs
    Borgs,
    /// Register or refresh a borg
    Ping {
        #[arg(long)]
        borgid: String,
        #[arg(long)]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = ReqtraceClient::new(&cli.url);

    match cli.command {
        Commands::Index => print_json(client.index().await?)?,
        Commands::Headers => print_text(client.headers().await?),
        Commands::Echo { body } => print_text(client.echo(body).await?),
        Commands::Borgs => print_json(client.borgs().await?)?,
        Commands::Ping { borgid, addr } => print_json(client.ping(&borgid, &addr).await?)?,
    }

    Ok(())
}

fn print_request_id(request_id: Option<&str>) {
    if let Some(id) = request_id {
        eprintln!("x-request-id: {id}");
    }
}

fn print_text(resp: Traced<String>) {
    print_request_id(resp.request_id.as_deref());
    print!("{}", resp.body);
}

fn print_json<T: Serialize>(resp: Traced<T>) -> Result<(), serde_json::Error> {
    print_request_id(resp.request_id.as_deref());
    println!("{}", serde_json::to_string_pretty(&resp.body)?);
    Ok(())
}
