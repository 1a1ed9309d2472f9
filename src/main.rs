//! Dojokit CLI - companion for the Dojokit gym and dojo management platform

use clap::Parser;
use log::LevelFilter;

mod audit;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod ratelimit;

use cli::args::GlobalOptions;
use cli::{ClassCommands, Cli, Commands, LimitCommands, ListCommands, MemberCommands, OrgCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `--debug` forces debug output; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("dojokit", LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("dojokit version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Org(org_cmd) => match org_cmd {
            OrgCommands::List => cli::org::list(&opts).await,
            OrgCommands::Set { org_id } => cli::org::set(&opts, org_id).await,
            OrgCommands::Get => cli::org::get(&opts).await,
        },
        Commands::Member(member_cmd) => match member_cmd {
            MemberCommands::List { list } => cli::member::list(&opts, &list).await,
            MemberCommands::Add(args) => cli::member::add(&opts, args.into()).await,
        },
        Commands::Class(class_cmd) => match class_cmd {
            ClassCommands::List { list } => cli::class::list(&opts, &list).await,
            ClassCommands::Add(args) => cli::class::add(&opts, args.into()).await,
        },
        Commands::Membership(ListCommands::List { list }) => {
            cli::billing::memberships(&opts, &list).await
        }
        Commands::Transaction(ListCommands::List { list }) => {
            cli::billing::transactions(&opts, &list).await
        }
        Commands::Catalog(ListCommands::List { list }) => cli::billing::catalog(&opts, &list).await,
        Commands::Coupon(ListCommands::List { list }) => cli::billing::coupons(&opts, &list).await,
        Commands::Tag(ListCommands::List { list }) => cli::member::tags(&opts, &list).await,
        Commands::Event(ListCommands::List { list }) => cli::class::events(&opts, &list).await,
        Commands::Dashboard { refresh } => cli::dashboard::run(&opts, refresh).await,
        Commands::Watch { entity, interval } => cli::watch::run(&opts, entity, interval).await,
        Commands::Limit(limit_cmd) => match limit_cmd {
            LimitCommands::Check {
                class,
                ip,
                for_org,
                count,
            } => cli::limit::check(&opts, class, ip, for_org, count).await,
            LimitCommands::Identify { headers } => cli::limit::identify(&opts, &headers),
            LimitCommands::Request {
                path,
                method,
                headers,
                for_org,
                count,
            } => {
                cli::limit::request(&opts, &method, &path, &headers, for_org.as_deref(), count)
                    .await
            }
        },
    }
}
