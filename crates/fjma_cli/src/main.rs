//! Command-line entry point for the FJMA records store.
//!
//! # Responsibility
//! - Parse admin/officer/member commands and dispatch to core services.
//! - Render list results as tables on stdout.

mod table;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fjma_core::db::open_db;
use fjma_core::{
    init_logging_from_config, CoreConfig, CredentialService, DeleteOutcome, Member, MemberDraft,
    MemberService, Officer, OfficerService, SqliteCredentialRepository, SqliteMemberRepository,
    SqliteOfficerRepository, Tribe, TribeMember,
};
use rusqlite::Connection;
use std::io::{self, BufRead, IsTerminal};
use std::process::ExitCode;
use table::render_table;

const OFFICER_HEADERS: &[&str] = &[
    "School ID",
    "First Name",
    "Middle Name",
    "Last Name",
    "Position",
    "Date Appointed",
    "Date Joined",
    "Email",
    "Phone",
];

const MEMBER_HEADERS: &[&str] = &[
    "School ID",
    "First Name",
    "Middle Name",
    "Last Name",
    "Year Level",
    "Section",
    "Email",
    "Phone",
    "Tribe",
];

#[derive(Parser)]
#[command(name = "fjma")]
#[command(about = "FJMA membership records", long_about = None)]
struct Cli {
    /// Database file; overrides FJMA_DB_PATH
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrator credentials
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Officer records
    #[command(subcommand)]
    Officer(OfficerCommand),
    /// Member records and tribes
    #[command(subcommand)]
    Member(MemberCommand),
}

/// Passwords are read from the terminal, or from the first stdin line when
/// input is piped.
#[derive(Subcommand)]
enum AdminCommand {
    Add {
        username: String,
        email: String,
    },
    List,
    Update {
        username: String,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
        #[arg(long)]
        email: Option<String>,
    },
    Delete {
        username: String,
    },
    Verify {
        username: String,
    },
}

#[derive(Subcommand)]
enum OfficerCommand {
    Add(OfficerArgs),
    List,
    Update(OfficerArgs),
    Delete { school_id: String },
    /// List deleted officers
    Archive,
}

#[derive(Subcommand)]
enum MemberCommand {
    Add(MemberArgs),
    List,
    Update(MemberArgs),
    Delete { school_id: String },
    /// List deleted members
    Archive,
    /// List one tribe's container
    Tribe {
        name: String,
        #[arg(long)]
        archived: bool,
    },
    /// Report member/tribe drift
    Check,
}

#[derive(Args)]
struct OfficerArgs {
    school_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    middle_name: Option<String>,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    date_appointed: String,
    #[arg(long)]
    date_joined: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
}

impl From<OfficerArgs> for Officer {
    fn from(args: OfficerArgs) -> Self {
        Self {
            school_id: args.school_id,
            first_name: args.first_name,
            middle_name: args.middle_name,
            last_name: args.last_name,
            position: args.position,
            date_appointed: args.date_appointed,
            date_joined: args.date_joined,
            email_address: args.email,
            phone_number: args.phone,
        }
    }
}

#[derive(Args)]
struct MemberArgs {
    school_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    middle_name: Option<String>,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    year_level: String,
    #[arg(long)]
    section: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    /// Larab, Makani, Lawod or Lasang (any case)
    #[arg(long)]
    tribe: String,
}

impl From<MemberArgs> for MemberDraft {
    fn from(args: MemberArgs) -> Self {
        Self {
            school_id: args.school_id,
            first_name: args.first_name,
            middle_name: args.middle_name,
            last_name: args.last_name,
            year_level: args.year_level,
            section: args.section,
            email_address: args.email,
            phone_number: args.phone,
            tribe: args.tribe,
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db.into();
    }
    init_logging_from_config(&config).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match cli.command {
        Commands::Admin(command) => run_admin(&conn, &config, command),
        Commands::Officer(command) => run_officer(&conn, command),
        Commands::Member(command) => run_member(&conn, command),
    }
}

fn run_admin(conn: &Connection, config: &CoreConfig, command: AdminCommand) -> Result<()> {
    let service = CredentialService::new(SqliteCredentialRepository::try_new(conn)?, &config.hash)?;
    match command {
        AdminCommand::Add { username, email } => {
            let password = read_new_password(&username)?;
            service.add_admin(&username, &password, &email)?
        }
        AdminCommand::List => {
            let rows: Vec<Vec<String>> = service
                .list_admins()?
                .into_iter()
                .map(|account| vec![account.username, account.email])
                .collect();
            print!("{}", render_table(&["Username", "Email"], &rows));
        }
        AdminCommand::Update {
            username,
            password,
            email,
        } => {
            let password = if password {
                Some(read_new_password(&username)?)
            } else {
                None
            };
            service.update_admin(&username, password.as_deref(), email.as_deref())?
        }
        AdminCommand::Delete { username } => {
            if !service.delete_admin(&username)? {
                println!("no admin named `{username}`");
            }
        }
        AdminCommand::Verify { username } => {
            let password = read_password(&format!("Password for {username}: "))?;
            if !service.verify(&username, &password)? {
                bail!("invalid username or password");
            }
            println!("ok");
        }
    }
    Ok(())
}

fn run_officer(conn: &Connection, command: OfficerCommand) -> Result<()> {
    let service = OfficerService::new(SqliteOfficerRepository::try_new(conn)?);
    match command {
        OfficerCommand::Add(args) => service.add_officer(&args.into())?,
        OfficerCommand::List => {
            let rows: Vec<_> = service.list_officers()?.iter().map(officer_row).collect();
            print!("{}", render_table(OFFICER_HEADERS, &rows));
        }
        OfficerCommand::Update(args) => service.update_officer(&args.into())?,
        OfficerCommand::Delete { school_id } => {
            report_delete(&school_id, service.delete_officer(&school_id)?)
        }
        OfficerCommand::Archive => {
            let rows: Vec<_> = service
                .list_archived_officers()?
                .iter()
                .map(|entry| with_deleted_at(officer_row(&entry.officer), &entry.deleted_at))
                .collect();
            print!("{}", render_table(&archive_headers(OFFICER_HEADERS), &rows));
        }
    }
    Ok(())
}

fn run_member(conn: &Connection, command: MemberCommand) -> Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    match command {
        MemberCommand::Add(args) => {
            service.add_member(&args.into())?;
        }
        MemberCommand::List => {
            let rows: Vec<_> = service.list_members()?.iter().map(member_row).collect();
            print!("{}", render_table(MEMBER_HEADERS, &rows));
        }
        MemberCommand::Update(args) => {
            service.update_member(&args.into())?;
        }
        MemberCommand::Delete { school_id } => {
            report_delete(&school_id, service.delete_member(&school_id)?)
        }
        MemberCommand::Archive => {
            let rows: Vec<_> = service
                .list_archived_members()?
                .iter()
                .map(|entry| with_deleted_at(member_row(&entry.member), &entry.deleted_at))
                .collect();
            print!("{}", render_table(&archive_headers(MEMBER_HEADERS), &rows));
        }
        MemberCommand::Tribe { name, archived } => {
            let tribe: Tribe = name.parse()?;
            let headers = &MEMBER_HEADERS[..MEMBER_HEADERS.len() - 1];
            if archived {
                let rows: Vec<_> = service
                    .list_archived_tribe_members(tribe)?
                    .iter()
                    .map(|entry| with_deleted_at(mirror_row(&entry.member), &entry.deleted_at))
                    .collect();
                print!("{}", render_table(&archive_headers(headers), &rows));
            } else {
                let rows: Vec<_> = service
                    .list_tribe_members(tribe)?
                    .iter()
                    .map(mirror_row)
                    .collect();
                print!("{}", render_table(headers, &rows));
            }
        }
        MemberCommand::Check => {
            let issues = service.check_consistency()?;
            for issue in &issues {
                println!("{issue}");
            }
            if !issues.is_empty() {
                bail!("{} consistency issue(s) found", issues.len());
            }
            println!("ok");
        }
    }
    Ok(())
}

fn read_new_password(username: &str) -> Result<String> {
    let password = read_password(&format!("New password for {username}: "))?;
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn read_password(prompt: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password(prompt).context("failed to read password");
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(strip_line_ending(&line).to_string())
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

fn report_delete(school_id: &str, outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Archived { deleted_at } => println!("archived `{school_id}` at {deleted_at}"),
        DeleteOutcome::Absent => println!("no record with school id `{school_id}`"),
    }
}

fn archive_headers<'a>(headers: &[&'a str]) -> Vec<&'a str> {
    let mut all = headers.to_vec();
    all.push("Deleted At");
    all
}

fn with_deleted_at(mut row: Vec<String>, deleted_at: &str) -> Vec<String> {
    row.push(deleted_at.to_string());
    row
}

fn officer_row(officer: &Officer) -> Vec<String> {
    vec![
        officer.school_id.clone(),
        officer.first_name.clone(),
        officer.middle_name.clone().unwrap_or_default(),
        officer.last_name.clone(),
        officer.position.clone(),
        officer.date_appointed.clone(),
        officer.date_joined.clone(),
        officer.email_address.clone(),
        officer.phone_number.clone(),
    ]
}

fn member_row(member: &Member) -> Vec<String> {
    let mut row = mirror_row(&member.mirror());
    row.push(member.tribe.to_string());
    row
}

fn mirror_row(mirror: &TribeMember) -> Vec<String> {
    vec![
        mirror.school_id.clone(),
        mirror.first_name.clone(),
        mirror.middle_name.clone().unwrap_or_default(),
        mirror.last_name.clone(),
        mirror.year_level.clone(),
        mirror.section.clone(),
        mirror.email_address.clone(),
        mirror.phone_number.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::strip_line_ending;

    #[test]
    fn piped_password_keeps_inner_whitespace() {
        assert_eq!(strip_line_ending(" pass word \n"), " pass word ");
        assert_eq!(strip_line_ending("secret\r\n"), "secret");
        assert_eq!(strip_line_ending("secret"), "secret");
    }
}
