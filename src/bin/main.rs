use std::process::ExitCode;

use async_trait::async_trait;
use clap::{ArgAction, CommandFactory, Parser};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use assume_role::assume_role::aws_cli::AwsCliAssumeRole;
use assume_role::context::InvocationContext;
use assume_role::external::{defaults, ExternalCli};
use assume_role::handler::shell::ShellProfileActivator;
use assume_role::mfa::{ReadMfaToken, StaticMfaTokenReader, StdinMfaTokenReader};
use assume_role::profile::aws_cli::AwsCliProfileWriter;
use assume_role::role::load::yaml::YamlRoleLoader;
use assume_role::role::load::LoadRoles;
use assume_role::run::AssumeRoleRunner;
use assume_role::session::SessionCache;

#[derive(Parser, Debug)]
#[command(
    name = "assume-role",
    version,
    about = "Assume a role from ~/.aws/roles and start a shell using it"
)]
struct Args {
    /// Role name, as configured in ~/.aws/roles.
    #[arg()]
    role: Option<String>,

    /// Token code provided by the MFA device; prompts when omitted.
    #[arg(short, long)]
    token: Option<String>,

    /// Fetch new credentials even if the recorded session is still valid.
    #[arg(short, long)]
    force: bool,

    /// Show configured roles.
    #[arg(short, long, conflicts_with_all = ["role", "token", "force"])]
    list: bool,

    /// Command used to reach the AWS CLI.
    #[arg(
        long,
        env = "ASSUME_ROLE_AWS_CLI",
        default_value = defaults::PROGRAM,
        value_parser = parse_aws_cli
    )]
    aws_cli: ExternalCli,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_aws_cli(value: &str) -> Result<ExternalCli, String> {
    ExternalCli::from_command_line(value)
        .ok_or_else(|| "expected a command, e.g. `aws`".to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

enum MfaReader {
    Stdin(StdinMfaTokenReader),
    Static(StaticMfaTokenReader),
}

#[async_trait]
impl ReadMfaToken for MfaReader {
    async fn read_mfa_token(&self, mfa_serial: &str) -> assume_role::Result<String> {
        use MfaReader::*;
        match self {
            Stdin(r) => r.read_mfa_token(mfa_serial).await,
            Static(r) => r.read_mfa_token(mfa_serial).await,
        }
    }
}

fn mfa_reader_from(args: &Args) -> MfaReader {
    if let Some(token) = args.token.as_ref() {
        MfaReader::Static(StaticMfaTokenReader::from(token))
    } else {
        MfaReader::Stdin(StdinMfaTokenReader)
    }
}

async fn run(args: Args) -> assume_role::Result<ExitCode> {
    if args.role.is_none() && !args.list {
        eprintln!("{}", Args::command().render_usage());
        return Ok(ExitCode::FAILURE);
    }

    let context = InvocationContext::from_env(args.aws_cli.clone())?;
    let loader = YamlRoleLoader::new(context.roles_path());

    let role = match args.role.as_deref() {
        Some(role) => role,
        None => {
            let registry = loader.load_roles().await?;
            for name in registry.names() {
                println!("{}", name);
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    let handler = ShellProfileActivator::new(context.shell()?);
    let sessions = SessionCache::new(context.aws_dir());
    let runner = AssumeRoleRunner::new(
        loader,
        mfa_reader_from(&args),
        AwsCliAssumeRole::new(context.aws_cli().clone()),
        AwsCliProfileWriter::new(context.aws_cli().clone(), sessions.clone()),
        handler,
        sessions,
    )
    .force_refresh(args.force);

    match runner.run(role).await? {}
}
