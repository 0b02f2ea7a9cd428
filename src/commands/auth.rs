use clap::Args;
use parser_console::api::operations::BalanceOperations;
use parser_console::api::schema::auth::Balance;
use parser_console::error::{AppError, AppResult};
use parser_console::shell::Shell;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name
    #[arg(short, long)]
    username: String,

    /// Password; read from stdin when omitted
    #[arg(short, long, env = "PARSER_CONSOLE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

pub async fn login(shell: &Shell, args: LoginArgs) -> AppResult<()> {
    let password = match args.password {
        Some(password) => password,
        None => {
            eprint!("Password: ");
            let mut line = String::new();
            BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let session = shell.login(&args.username, &password).await?;
    println!(
        "Logged in as {}, session kept until {}",
        args.username,
        render::timestamp(session.expires_at)
    );
    Ok(())
}

pub async fn logout(shell: &Shell) -> AppResult<()> {
    shell.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn status(shell: &Shell) -> AppResult<()> {
    let Some(session) = shell.session() else {
        println!("Not logged in");
        return Ok(());
    };

    println!("Session saved:   {}", render::timestamp(session.saved_at));
    println!("Session kept to: {}", render::timestamp(session.expires_at));
    match session.claims_expiry() {
        Some(exp) => println!("Token expires:   {}", render::timestamp(exp)),
        None => println!("Token expires:   unknown"),
    }

    let token = match shell.require_token() {
        Ok(token) => token,
        Err(AppError::NotLoggedIn) => {
            println!("The token has expired, log in again");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    let balance = BalanceOperations::fetch(&shell.state().client, &token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Balance unavailable: {}", e);
            Balance::Unavailable
        });
    println!("Balance:         {}", balance);
    Ok(())
}
