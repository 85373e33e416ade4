use anyhow::Result;
use clap::Parser;
use godev_oracle::roots::SourceRoots;
use godev_oracle::router::{Request, Response, Router};
use godev_oracle::{cgi, cli};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the CGI response, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = cli::Args::parse();
    let config = args.config();

    if args.godev {
        let request = cgi::request_from_env()?;
        let response = match SourceRoots::discover() {
            Ok(roots) => Router::new(&config, &roots).handle(&request),
            Err(err) => {
                tracing::error!("source root discovery failed: {err:#}");
                Response::error(
                    500,
                    "Unable to determine Go source roots.",
                    Some(format!("{err:#}")),
                )
            }
        };
        return cgi::write_response(&mut io::stdout().lock(), &response);
    }

    match args.command {
        Some(cli::Command::Request {
            path,
            query,
            method,
        }) => {
            let roots = SourceRoots::discover()?;
            let response = Router::new(&config, &roots).handle(&Request::new(&method, &path, &query));
            cgi::write_response(&mut io::stdout().lock(), &response)
        }
        Some(cli::Command::Roots) => {
            let roots = SourceRoots::discover()?;
            println!("{}", serde_json::to_string_pretty(&roots)?);
            Ok(())
        }
        None => {
            println!("This is a CGI program meant to be plugged into the godev IDE (run with --godev)");
            Ok(())
        }
    }
}
