use boardmod::app_config::AppConfig;
use boardmod::password::CredentialHasher;
use boardmod::{db, ModeratorDirectory, ReportAggregator, Role};
use env_logger::Env;

const USAGE: &str = "Usage: boardmod <command>

Commands:
  init-schema                          Create missing tables
  create-admin <username> <password>   Create a moderator holding the admin role
  list-moderators                      Print every moderator with roles and boards
  reports <username>                   Print the reports visible to a moderator";

#[actix_rt::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let command = match args.first() {
        Some(command) => command.as_str(),
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = AppConfig::load()?;
    let conn = db::connect(&config.database).await?;

    match (command, &args[1..]) {
        ("init-schema", []) => {
            db::create_schema(&conn).await?;
        }
        ("create-admin", [username, password]) => {
            let hasher = CredentialHasher::new(&config.hashing)?;
            let directory = ModeratorDirectory::new(conn, hasher);
            let admin = directory
                .create_with_roles(username, password, &[Role::Admin])
                .await?;
            println!("Created admin '{}' with id {}", admin.username, admin.id);
        }
        ("list-moderators", []) => {
            let hasher = CredentialHasher::new(&config.hashing)?;
            let directory = ModeratorDirectory::new(conn, hasher);
            for moderator in directory.list_all().await? {
                let roles: Vec<&str> = moderator.roles.iter().map(|role| role.as_str()).collect();
                println!(
                    "{}\t{}\troles={}\tboards={:?}",
                    moderator.id,
                    moderator.username,
                    roles.join(","),
                    moderator.boards
                );
            }
        }
        ("reports", [username]) => {
            let hasher = CredentialHasher::new(&config.hashing)?;
            let directory = ModeratorDirectory::new(conn.clone(), hasher);
            let moderator = directory
                .find_by_username(username)
                .await?
                .ok_or_else(|| format!("No moderator named '{}'", username))?;

            let aggregator = ReportAggregator::new(conn);
            for report in aggregator.list_reports(&moderator).await? {
                println!(
                    "{}\tpost={}\tcount={}\t{}",
                    report.id, report.post_id, report.count, report.date
                );
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
