//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};

use crate::cache::EntityKind;
use crate::client::{NewClass, NewMember};
use crate::ratelimit::EndpointClass;

pub mod args;
pub mod billing;
pub mod class;
pub mod context;
pub mod dashboard;
pub mod handlers;
pub mod init;
pub mod limit;
pub mod member;
pub mod org;
pub mod status;
pub mod watch;

pub use args::{ListArgs, OutputFormat};
pub use context::CommandContext;

/// Upper bound for `limit check --count` and `limit request --count`
const MAX_LIMIT_ATTEMPTS: i64 = 10_000;

/// Dojokit CLI - companion for the Dojokit gym and dojo management platform
#[derive(Parser, Debug)]
#[command(name = "dojokit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "DOJOKIT_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override default organization
    #[arg(long, global = true, env = "DOJOKIT_ORG_ID", hide_env = true)]
    pub org: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "DOJOKIT_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the platform API host
    #[arg(long, global = true, env = "DOJOKIT_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "DOJOKIT_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Dojokit configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Manage organizations
    #[command(subcommand)]
    Org(OrgCommands),

    /// List and add members
    #[command(subcommand)]
    Member(MemberCommands),

    /// List and schedule classes
    #[command(subcommand)]
    Class(ClassCommands),

    /// List membership plans
    #[command(subcommand)]
    Membership(ListCommands),

    /// List payments and refunds
    #[command(subcommand)]
    Transaction(ListCommands),

    /// List retail catalog items
    #[command(subcommand)]
    Catalog(ListCommands),

    /// List coupons
    #[command(subcommand)]
    Coupon(ListCommands),

    /// List member tags
    #[command(subcommand)]
    Tag(ListCommands),

    /// List scheduled events
    #[command(subcommand)]
    Event(ListCommands),

    /// Show headline numbers for the organization
    Dashboard {
        /// Revalidate instead of serving a cached copy
        #[arg(long)]
        refresh: bool,
    },

    /// Keep an entity view open and refresh it periodically
    Watch {
        /// Entity to watch
        #[arg(value_enum)]
        entity: EntityKind,

        /// Seconds between revalidations
        #[arg(long, short = 'i', default_value_t = 30)]
        interval: u64,
    },

    /// Exercise the RPC rate-limit guard with the configured quotas
    #[command(subcommand)]
    Limit(LimitCommands),
}

/// Organization management subcommands
#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List all accessible organizations
    List,

    /// Set default organization
    Set {
        /// Organization ID to set as default
        org_id: String,
    },

    /// Show current default organization
    Get,
}

/// Read-only resource subcommands
#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List all entries in the current organization
    List {
        #[command(flatten)]
        list: ListArgs,
    },
}

/// Member subcommands
#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List members of the current organization
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Add a member
    Add(NewMemberArgs),
}

#[derive(Args, Debug)]
pub struct NewMemberArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Initial status (e.g. active, trial)
    #[arg(long)]
    pub status: Option<String>,
}

impl From<NewMemberArgs> for NewMember {
    fn from(args: NewMemberArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            status: args.status,
        }
    }
}

/// Class subcommands
#[derive(Subcommand, Debug)]
pub enum ClassCommands {
    /// List classes of the current organization
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Schedule a new class
    Add(NewClassArgs),
}

#[derive(Args, Debug)]
pub struct NewClassArgs {
    /// Class name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub instructor: Option<String>,

    /// Day of week (e.g. Mon)
    #[arg(long)]
    pub day: Option<String>,

    /// Start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,

    /// Length in minutes
    #[arg(long, default_value_t = 60)]
    pub duration: u32,

    /// Maximum attendees
    #[arg(long)]
    pub capacity: Option<u32>,
}

impl From<NewClassArgs> for NewClass {
    fn from(args: NewClassArgs) -> Self {
        Self {
            name: args.name,
            instructor: args.instructor,
            day_of_week: args.day,
            start_time: args.start,
            duration_minutes: args.duration,
            capacity: args.capacity,
        }
    }
}

/// Rate-limit subcommands
#[derive(Subcommand, Debug)]
pub enum LimitCommands {
    /// Count requests for one identifier against a class quota
    Check {
        /// Endpoint class
        #[arg(long, value_enum, default_value = "rpc")]
        class: EndpointClass,

        /// Client address
        #[arg(long, conflicts_with = "for_org", required_unless_present = "for_org")]
        ip: Option<String>,

        /// Organization ID
        #[arg(long)]
        for_org: Option<String>,

        /// Number of requests to make
        #[arg(
            long,
            short = 'c',
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=MAX_LIMIT_ATTEMPTS)
        )]
        count: u32,
    },

    /// Print the client identifier derived from request headers
    Identify {
        /// Header as 'name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Classify a request and pass it through the guard
    Request {
        /// Request path or URL, e.g. /api/members
        path: String,

        #[arg(long, short = 'X', default_value = "POST")]
        method: String,

        /// Header as 'name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Authenticated organization, if any
        #[arg(long)]
        for_org: Option<String>,

        /// Number of requests to make
        #[arg(
            long,
            short = 'c',
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=MAX_LIMIT_ATTEMPTS)
        )]
        count: u32,
    },
}
